use std::borrow::Cow;
use std::collections::BTreeMap;

use saphyr::{LoadableYamlNode, YamlOwned};
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::value::Value;

const KNOWN_KEYS: [&str; 7] = [
    "env",
    "extends",
    "parser",
    "parserOptions",
    "plugins",
    "globals",
    "rules",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Off,
    Warn,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Accepts the string and numeric spellings (`"warn"` or `1`).
    #[must_use]
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => match s.as_str() {
                "off" => Some(Self::Off),
                "warn" => Some(Self::Warn),
                "error" => Some(Self::Error),
                _ => None,
            },
            Value::Integer(0) => Some(Self::Off),
            Value::Integer(1) => Some(Self::Warn),
            Value::Integer(2) => Some(Self::Error),
            _ => None,
        }
    }
}

/// A rule's severity plus whatever options the rule takes.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSetting {
    pub severity: Severity,
    pub options: Vec<Value>,
}

impl RuleSetting {
    #[must_use]
    pub const fn new(severity: Severity) -> Self {
        Self {
            severity,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, option: Value) -> Self {
        self.options.push(option);
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.severity != Severity::Off
    }

    fn parse(fragment: &str, rule: &str, value: &Value) -> Result<Self> {
        if let Some(severity) = Severity::parse(value) {
            return Ok(Self::new(severity));
        }
        let bad_severity = || {
            Error::invalid(
                fragment,
                format!(
                    "rule '{rule}' should be \"off\", \"warn\", \"error\" (or 0, 1, 2), or a list starting with one"
                ),
            )
        };
        let Some((first, rest)) = value.as_list().and_then(<[Value]>::split_first) else {
            return Err(bad_severity());
        };
        let severity = Severity::parse(first).ok_or_else(bad_severity)?;
        Ok(Self {
            severity,
            options: rest.to_vec(),
        })
    }
}

impl Serialize for RuleSetting {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.options.is_empty() {
            return self.severity.serialize(serializer);
        }
        let mut seq = serializer.serialize_seq(Some(self.options.len() + 1))?;
        seq.serialize_element(&self.severity)?;
        for option in &self.options {
            seq.serialize_element(option)?;
        }
        seq.end()
    }
}

impl JsonSchema for RuleSetting {
    fn schema_name() -> Cow<'static, str> {
        "RuleSetting".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        let severity = generator.subschema_for::<Severity>();
        let option = generator.subschema_for::<Value>();
        json_schema!({
            "oneOf": [
                severity,
                {
                    "type": "array",
                    "minItems": 2,
                    "prefixItems": [severity],
                    "items": option
                }
            ]
        })
    }
}

/// How a declared global may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GlobalAccess {
    Readonly,
    Writable,
    Off,
}

impl GlobalAccess {
    #[must_use]
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(false) => Some(Self::Readonly),
            Value::Bool(true) => Some(Self::Writable),
            Value::String(s) => match s.as_str() {
                "readonly" | "readable" => Some(Self::Readonly),
                "writable" | "writeable" => Some(Self::Writable),
                "off" => Some(Self::Off),
                _ => None,
            },
            _ => None,
        }
    }
}

/// One reusable bundle of lint options.
///
/// Fragments are immutable once registered; the builder methods are only
/// meant for assembling one before handing it to a registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    env: BTreeMap<String, bool>,
    extends: Vec<String>,
    parser: Option<String>,
    parser_options: BTreeMap<String, Value>,
    plugins: Vec<String>,
    globals: BTreeMap<String, GlobalAccess>,
    rules: BTreeMap<String, RuleSetting>,
}

impl Fragment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_env(mut self, name: &str, enabled: bool) -> Self {
        self.env.insert(name.to_owned(), enabled);
        self
    }

    #[must_use]
    pub fn with_extends(mut self, name: &str) -> Self {
        self.extends.push(name.to_owned());
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: &str) -> Self {
        self.parser = Some(parser.to_owned());
        self
    }

    #[must_use]
    pub fn with_parser_option(mut self, key: &str, value: Value) -> Self {
        self.parser_options.insert(key.to_owned(), value);
        self
    }

    #[must_use]
    pub fn with_plugin(mut self, plugin: &str) -> Self {
        push_unique(&mut self.plugins, plugin);
        self
    }

    #[must_use]
    pub fn with_global(mut self, name: &str, access: GlobalAccess) -> Self {
        self.globals.insert(name.to_owned(), access);
        self
    }

    #[must_use]
    pub fn with_rule(mut self, name: &str, setting: RuleSetting) -> Self {
        self.rules.insert(name.to_owned(), setting);
        self
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

    pub(crate) fn extends_mut(&mut self) -> &mut Vec<String> {
        &mut self.extends
    }

    /// Parse a YAML document into a fragment named `name`.
    ///
    /// # Errors
    /// Returns [`Error::Parse`] for malformed YAML and
    /// [`Error::InvalidFragment`] when the text holds more than one document
    /// or a field has the wrong shape.
    pub fn from_yaml_str(name: &str, s: &str) -> Result<Self> {
        let docs = YamlOwned::load_from_str(s).map_err(|e| Error::Parse {
            origin: name.to_owned(),
            reason: e.to_string(),
        })?;
        if docs.len() > 1 {
            return Err(Error::invalid(
                name,
                format!("expected a single YAML document, found {}", docs.len()),
            ));
        }
        let Some(doc) = docs.first() else {
            return Ok(Self::default());
        };
        let value = Value::from_yaml(doc).map_err(|reason| Error::invalid(name, reason))?;
        Self::from_value(name, &value)
    }

    /// Build a fragment from an already-parsed document.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFragment`] when the document is not a mapping,
    /// names an unknown key, or a field has the wrong shape.
    pub fn from_value(name: &str, doc: &Value) -> Result<Self> {
        let Some(map) = doc.as_map() else {
            return Err(Error::invalid(name, "not a mapping"));
        };
        if let Some(key) = map.keys().find(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            return Err(Error::invalid(name, format!("unknown key '{key}'")));
        }

        let mut frag = Self::default();

        if let Some(node) = map.get("env") {
            frag.env = parse_env(name, node)?;
        }

        if let Some(node) = map.get("extends") {
            frag.extends = string_or_list(node).ok_or_else(|| {
                Error::invalid(name, "extends should be a name or a list of names")
            })?;
        }

        if let Some(node) = map.get("parser") {
            let Some(parser) = node.as_str() else {
                return Err(Error::invalid(name, "parser should be a string"));
            };
            if !parser.is_empty() {
                frag.parser = Some(parser.to_owned());
            }
        }

        if let Some(node) = map.get("parserOptions") {
            let Some(opts) = node.as_map() else {
                return Err(Error::invalid(name, "parserOptions should be a mapping"));
            };
            frag.parser_options = opts.clone();
        }

        if let Some(node) = map.get("plugins") {
            let plugins = node
                .as_list()
                .and_then(|items| items.iter().map(Value::as_str).collect::<Option<Vec<_>>>())
                .ok_or_else(|| Error::invalid(name, "plugins should be a list of names"))?;
            for plugin in plugins {
                push_unique(&mut frag.plugins, plugin);
            }
        }

        if let Some(node) = map.get("globals") {
            let Some(globals) = node.as_map() else {
                return Err(Error::invalid(name, "globals should be a mapping"));
            };
            for (ident, flag) in globals {
                let access = GlobalAccess::parse(flag).ok_or_else(|| {
                    Error::invalid(
                        name,
                        format!(
                            "global '{ident}' should be a boolean, \"readonly\", \"writable\" or \"off\""
                        ),
                    )
                })?;
                frag.globals.insert(ident.clone(), access);
            }
        }

        if let Some(node) = map.get("rules") {
            let Some(rules) = node.as_map() else {
                return Err(Error::invalid(name, "rules should be a mapping"));
            };
            for (rule, setting) in rules {
                frag.rules
                    .insert(rule.clone(), RuleSetting::parse(name, rule, setting)?);
            }
        }

        Ok(frag)
    }
}

fn parse_env(name: &str, node: &Value) -> Result<BTreeMap<String, bool>> {
    let bad = || Error::invalid(name, "env should be a list of names or a mapping of booleans");
    match node {
        Value::List(items) => items
            .iter()
            .map(|item| item.as_str().map(|s| (s.to_owned(), true)))
            .collect::<Option<_>>()
            .ok_or_else(bad),
        Value::Map(flags) => flags
            .iter()
            .map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
            .collect::<Option<_>>()
            .ok_or_else(bad),
        _ => Err(bad()),
    }
}

fn string_or_list(node: &Value) -> Option<Vec<String>> {
    match node {
        Value::String(s) => Some(vec![s.clone()]),
        Value::List(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect(),
        _ => None,
    }
}

pub(crate) fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|e| e == item) {
        list.push(item.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_category() {
        let frag = Fragment::from_yaml_str(
            "t",
            r"
env: {node: true, browser: false}
extends: [base, 'eslint:recommended']
parser: babel-eslint
parserOptions:
  ecmaFeatures: {jsx: true}
plugins: [react, react]
globals: {React: false, jQuery: writable}
rules:
  semi: error
  quotes: [warn, single]
  eqeqeq: 0
",
        )
        .unwrap();

        assert_eq!(frag.env().get("node"), Some(&true));
        assert_eq!(frag.env().get("browser"), Some(&false));
        assert_eq!(frag.extends(), ["base", "eslint:recommended"]);
        assert_eq!(frag.parser(), Some("babel-eslint"));
        assert!(frag.parser_options().contains_key("ecmaFeatures"));
        assert_eq!(frag.plugins(), ["react"]);
        assert_eq!(frag.globals()["React"], GlobalAccess::Readonly);
        assert_eq!(frag.globals()["jQuery"], GlobalAccess::Writable);
        assert_eq!(frag.rules()["semi"], RuleSetting::new(Severity::Error));
        assert_eq!(
            frag.rules()["quotes"],
            RuleSetting::new(Severity::Warn).with_option("single".into())
        );
        assert!(!frag.rules()["eqeqeq"].is_enabled());
    }

    #[test]
    fn env_list_enables_each_name() {
        let frag = Fragment::from_yaml_str("t", "env: [es6, node]\n").unwrap();
        assert_eq!(frag.env().len(), 2);
        assert!(frag.env().values().all(|v| *v));
    }

    #[test]
    fn extends_accepts_single_string() {
        let frag = Fragment::from_yaml_str("t", "extends: base\n").unwrap();
        assert_eq!(frag.extends(), ["base"]);
    }

    #[test]
    fn empty_parser_counts_as_absent() {
        let frag = Fragment::from_yaml_str("t", "parser: ''\n").unwrap();
        assert_eq!(frag.parser(), None);
    }

    #[test]
    fn multiple_documents_are_rejected() {
        let err = Fragment::from_yaml_str("t", "plugins: [react]\n---\nplugins: [vue]\n")
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidFragment {
                name: "t".into(),
                reason: "expected a single YAML document, found 2".into()
            }
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = Fragment::from_yaml_str("t", "overrides: []\n").unwrap_err();
        assert_eq!(
            err,
            Error::InvalidFragment {
                name: "t".into(),
                reason: "unknown key 'overrides'".into()
            }
        );
    }

    #[test]
    fn bad_rule_severity_is_rejected() {
        for doc in ["rules: {semi: loud}\n", "rules: {semi: 3}\n", "rules: {semi: []}\n"] {
            let err = Fragment::from_yaml_str("t", doc).unwrap_err();
            assert!(err.to_string().contains("rule 'semi'"), "{doc}: {err}");
        }
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        for (doc, needle) in [
            ("- a\n", "not a mapping"),
            ("env: node\n", "env should be"),
            ("env: {node: yes please}\n", "env should be"),
            ("extends: {a: b}\n", "extends should be"),
            ("parser: 3\n", "parser should be"),
            ("parserOptions: [a]\n", "parserOptions should be"),
            ("plugins: react\n", "plugins should be"),
            ("globals: {React: maybe}\n", "global 'React'"),
            ("rules: [semi]\n", "rules should be"),
        ] {
            let err = Fragment::from_yaml_str("t", doc).unwrap_err();
            assert!(err.to_string().contains(needle), "{doc}: {err}");
        }
    }

    #[test]
    fn rule_setting_serializes_to_short_form_without_options() {
        let bare = RuleSetting::new(Severity::Error);
        assert_eq!(serde_json::to_string(&bare).unwrap(), r#""error""#);
        let with_opts = RuleSetting::new(Severity::Error).with_option(Value::Map(
            [("varsIgnorePattern".to_string(), Value::from("rest"))].into(),
        ));
        assert_eq!(
            serde_json::to_string(&with_opts).unwrap(),
            r#"["error",{"varsIgnorePattern":"rest"}]"#
        );
    }
}
