//! Flattening of `extends` chains into one effective configuration.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use schemars::JsonSchema;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::fragment::{Fragment, GlobalAccess, RuleSetting, Severity, push_unique};
use crate::registry::{Lookup, Registry};
use crate::value::{Value, deep_merge};

/// The effective configuration handed to the lint tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergedConfig {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    env: BTreeMap<String, bool>,
    /// External bases, resolved by the consumer before the rest of this
    /// document.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extends: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parser: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    parser_options: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    plugins: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    globals: BTreeMap<String, GlobalAccess>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    rules: BTreeMap<String, RuleSetting>,
    #[serde(skip)]
    applied: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

impl OutputFormat {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

impl MergedConfig {
    /// Apply one fragment's own fields on top of what has been merged so
    /// far. `extends` is not followed here; see [`resolve`].
    ///
    /// # Errors
    /// Returns [`Error::ConflictingType`] when a parser option is a mapping
    /// on one side only. `self` is left partially merged in that case and
    /// should be discarded.
    pub fn merge_fragment(&mut self, name: &str, frag: &Fragment) -> Result<()> {
        self.env
            .extend(frag.env().iter().map(|(k, v)| (k.clone(), *v)));

        if let Some(parser) = frag.parser() {
            self.parser = Some(parser.to_owned());
        }

        for (key, val) in frag.parser_options() {
            match self.parser_options.get_mut(key) {
                Some(existing) => {
                    deep_merge(existing, val, &format!("parserOptions.{key}")).map_err(
                        |conflict| Error::ConflictingType {
                            fragment: name.to_owned(),
                            path: conflict.path,
                            expected: conflict.expected,
                            found: conflict.found,
                        },
                    )?;
                }
                None => {
                    self.parser_options.insert(key.clone(), val.clone());
                }
            }
        }

        for plugin in frag.plugins() {
            push_unique(&mut self.plugins, plugin);
        }

        self.globals
            .extend(frag.globals().iter().map(|(k, v)| (k.clone(), *v)));
        self.rules
            .extend(frag.rules().iter().map(|(k, v)| (k.clone(), v.clone())));

        self.applied.push(name.to_owned());
        Ok(())
    }

    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, bool> {
        &self.env
    }

    #[must_use]
    pub fn extends(&self) -> &[String] {
        &self.extends
    }

    #[must_use]
    pub fn parser(&self) -> Option<&str> {
        self.parser.as_deref()
    }

    #[must_use]
    pub const fn parser_options(&self) -> &BTreeMap<String, Value> {
        &self.parser_options
    }

    #[must_use]
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    #[must_use]
    pub const fn globals(&self) -> &BTreeMap<String, GlobalAccess> {
        &self.globals
    }

    #[must_use]
    pub const fn rules(&self) -> &BTreeMap<String, RuleSetting> {
        &self.rules
    }

    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&RuleSetting> {
        self.rules.get(name)
    }

    #[must_use]
    pub fn rule_severity(&self, name: &str) -> Option<Severity> {
        self.rules.get(name).map(|r| r.severity)
    }

    /// Fragments applied, in application order. Each appears once.
    #[must_use]
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    /// Serialize for the lint tool.
    ///
    /// # Errors
    /// Returns [`Error::Render`] when the serializer rejects the document.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| Error::Render(e.to_string()))
            }
            OutputFormat::Toml => toml::to_string(self).map_err(|e| Error::Render(e.to_string())),
        }
    }
}

/// JSON schema describing the rendered JSON form of [`MergedConfig`].
///
/// # Errors
/// Returns [`Error::Render`] if the schema cannot be serialized.
pub fn schema_json() -> Result<String> {
    let schema = schemars::schema_for!(MergedConfig);
    serde_json::to_string_pretty(&schema).map_err(|e| Error::Render(e.to_string()))
}

/// Resolve `name` into one effective configuration.
///
/// Parents are applied depth-first, left to right, each before the fragment
/// that extends it. A fragment reached along several paths is applied only
/// the first time.
///
/// # Errors
/// - [`Error::UnknownFragment`] when `name` or any `extends` entry is missing.
/// - [`Error::CyclicExtension`] when a fragment reaches itself.
/// - [`Error::ConflictingType`] when parser options disagree on shape.
pub fn resolve(registry: &Registry, name: &str) -> Result<MergedConfig> {
    let root = registry.resolve(name)?;
    let mut out = MergedConfig::default();
    let mut stack = vec![name.to_owned()];
    let mut visited = HashSet::new();
    apply(registry, name, root, &mut stack, &mut visited, &mut out)?;
    tracing::debug!(name, applied = out.applied.len(), "resolved");
    Ok(out)
}

fn apply(
    registry: &Registry,
    name: &str,
    frag: &Fragment,
    stack: &mut Vec<String>,
    visited: &mut HashSet<String>,
    out: &mut MergedConfig,
) -> Result<()> {
    for parent in frag.extends() {
        if let Some(pos) = stack.iter().position(|s| s == parent) {
            let mut chain = stack[pos..].to_vec();
            chain.push(parent.clone());
            return Err(Error::CyclicExtension { chain });
        }
        if visited.contains(parent) {
            tracing::trace!(fragment = %parent, "already applied, skipping");
            continue;
        }
        let found = registry
            .lookup(parent)
            .map_err(|_| Error::UnknownFragment {
                name: parent.clone(),
                referenced_by: Some(name.to_owned()),
            })?;
        match found {
            Lookup::External => push_unique(&mut out.extends, parent),
            Lookup::Fragment(base) => {
                stack.push(parent.clone());
                apply(registry, parent, base, stack, visited, out)?;
                stack.pop();
            }
        }
    }
    tracing::debug!(fragment = name, depth = stack.len(), "applying");
    out.merge_fragment(name, frag)?;
    visited.insert(name.to_owned());
    Ok(())
}

/// Resolve every registered fragment, in parallel, in name order.
#[must_use]
pub fn resolve_all(registry: &Registry) -> Vec<(String, Result<MergedConfig>)> {
    let names: Vec<&str> = registry.fragment_names().collect();
    names
        .par_iter()
        .map(|name| ((*name).to_owned(), resolve(registry, name)))
        .collect()
}
