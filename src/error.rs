//! Error types shared by the registry, the resolver and the loaders.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A name was looked up that is neither a fragment nor an external base.
    #[error("{}", unknown_message(name, referenced_by.as_deref()))]
    UnknownFragment {
        name: String,
        /// Fragment whose `extends` list named the missing entry.
        referenced_by: Option<String>,
    },

    /// `register` or `declare_external` was called twice for one name.
    #[error("fragment '{name}' is already registered")]
    DuplicateName { name: String },

    /// A fragment transitively extends itself. The chain starts and ends
    /// with the repeated name.
    #[error("cyclic extension: {}", chain.join(" -> "))]
    CyclicExtension { chain: Vec<String> },

    /// Two fragments disagree on the shape of the same option.
    #[error(
        "conflicting types for '{path}' in fragment '{fragment}': expected {expected}, found {found}"
    )]
    ConflictingType {
        fragment: String,
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid fragment '{name}': {reason}")]
    InvalidFragment { name: String, reason: String },

    #[error("failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to parse {origin}: {reason}")]
    Parse { origin: String, reason: String },

    #[error("failed to render merged config: {0}")]
    Render(String),
}

impl Error {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFragment {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

fn unknown_message(name: &str, referenced_by: Option<&str>) -> String {
    match referenced_by {
        Some(parent) => format!("unknown fragment '{name}' (extended by '{parent}')"),
        None => format!("unknown fragment '{name}'"),
    }
}
