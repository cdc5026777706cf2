#![allow(clippy::module_name_repetitions)]

// Built-in presets, embedded as YAML. Names listed in `EXTERNAL_BASES` are
// resolved by the consuming lint tool and only passed through.

pub const NAMES: [&str; 4] = ["javascript", "es6", "react", "es6-react"];

pub const EXTERNAL_BASES: [&str; 2] = ["eslint:recommended", "plugin:react/recommended"];

#[must_use]
pub fn builtin(name: &str) -> Option<&'static str> {
    match name {
        "javascript" => Some(JAVASCRIPT),
        "es6" => Some(ES6),
        "react" => Some(REACT),
        "es6-react" => Some(ES6_REACT),
        _ => None,
    }
}

/// True for references owned by the consumer (`eslint:*`, `plugin:*`).
#[must_use]
pub fn is_external_reference(name: &str) -> bool {
    name.starts_with("eslint:") || name.starts_with("plugin:")
}

const JAVASCRIPT: &str = r"
env:
  node: true
  browser: true
  amd: true
  jquery: true
  mocha: true
extends:
  - 'eslint:recommended'
parser: babel-eslint
";

const ES6: &str = r"
extends:
  - javascript
env:
  es6: true
parserOptions:
  ecmaVersion: 6
  sourceType: module
rules:
  no-var: [error]
  prefer-const: [error]
  prefer-arrow-callback: [error]
  arrow-parens: [error, as-needed]
  object-shorthand: [error, always]
";

const REACT: &str = r"
extends:
  - 'plugin:react/recommended'
globals:
  React: false
parserOptions:
  ecmaFeatures:
    jsx: true
plugins:
  - react
rules:
  react/display-name: [error]
  react/jsx-sort-props: [error]
  react/no-multi-comp: [error]
  react/prop-types: [error]
";

const ES6_REACT: &str = r"
extends:
  - es6
  - react
rules:
  no-unused-vars: [error, {varsIgnorePattern: rest}]
";
