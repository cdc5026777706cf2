#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

pub mod conf;
pub mod config;
pub mod error;
pub mod fragment;
pub mod logging;
pub mod registry;
pub mod resolve;
pub mod value;

pub use error::{Error, Result};
pub use fragment::{Fragment, GlobalAccess, RuleSetting, Severity};
pub use registry::{Lookup, Registry};
pub use resolve::{MergedConfig, OutputFormat, resolve, resolve_all, schema_json};
pub use value::Value;
