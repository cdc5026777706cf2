//! Tagged option values.
//!
//! Every free-form part of a fragment (parser options, rule options) is held
//! as a [`Value`], so merging and serialization are written once over the
//! variant instead of per option.

use std::collections::BTreeMap;

use saphyr::YamlOwned;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of the variant, used in type-conflict messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "mapping",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Convert a loaded YAML node.
    ///
    /// # Errors
    /// Returns a message when the node holds a null, an alias, or a mapping
    /// key that is not a scalar.
    pub fn from_yaml(node: &YamlOwned) -> Result<Self, String> {
        if let Some(flag) = node.as_bool() {
            return Ok(Self::Bool(flag));
        }
        if let Some(num) = node.as_integer() {
            return Ok(Self::Integer(num));
        }
        if let Some(num) = node.as_floating_point() {
            return Ok(Self::Float(num));
        }
        if let Some(text) = node.as_str() {
            return Ok(Self::String(text.to_owned()));
        }
        if let Some(seq) = node.as_sequence() {
            return seq
                .iter()
                .map(Self::from_yaml)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List);
        }
        if let Some(map) = node.as_mapping() {
            let mut out = BTreeMap::new();
            for (key, value) in map {
                out.insert(yaml_key(key)?, Self::from_yaml(value)?);
            }
            return Ok(Self::Map(out));
        }
        if node.is_null() {
            return Err("null values are not supported".to_string());
        }
        Err(format!("unsupported YAML node {node:?}"))
    }
}

fn yaml_key(key: &YamlOwned) -> Result<String, String> {
    match (
        key.as_str(),
        key.as_integer(),
        key.as_bool(),
        key.as_floating_point(),
    ) {
        (Some(text), _, _, _) => Ok(text.to_owned()),
        (None, Some(num), _, _) => Ok(num.to_string()),
        (None, None, Some(flag), _) => Ok(flag.to_string()),
        (None, None, None, Some(float)) => Ok(float.to_string()),
        _ => Err(format!("mapping keys must be scalars, found {key:?}")),
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Shape disagreement found while deep-merging two values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeConflict {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

/// Merge `src` into `dst` key by key.
///
/// Mappings merge recursively. A mapping on only one side is a conflict;
/// any other pair is replaced by `src`.
pub(crate) fn deep_merge(dst: &mut Value, src: &Value, path: &str) -> Result<(), TypeConflict> {
    if let (Value::Map(dst_map), Value::Map(src_map)) = (&mut *dst, src) {
        for (key, val) in src_map {
            let child = format!("{path}.{key}");
            match dst_map.get_mut(key) {
                Some(existing) => deep_merge(existing, val, &child)?,
                None => {
                    dst_map.insert(key.clone(), val.clone());
                }
            }
        }
        return Ok(());
    }
    if matches!(dst, Value::Map(_)) || matches!(src, Value::Map(_)) {
        return Err(TypeConflict {
            path: path.to_owned(),
            expected: dst.kind(),
            found: src.kind(),
        });
    }
    *dst = src.clone();
    Ok(())
}
