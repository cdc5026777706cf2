use lint_presets::{GlobalAccess, OutputFormat, Registry, Severity, Value, resolve, schema_json};

#[test]
fn every_builtin_resolves() {
    let reg = Registry::builtin();
    for name in lint_presets::conf::NAMES {
        let merged = resolve(&reg, name).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(merged.applied().last().map(String::as_str), Some(name));
    }
}

#[test]
fn javascript_preset_sets_environments_and_parser() {
    let merged = resolve(&Registry::builtin(), "javascript").unwrap();
    for env in ["node", "browser", "amd", "jquery", "mocha"] {
        assert_eq!(merged.env().get(env), Some(&true), "{env}");
    }
    assert_eq!(merged.parser(), Some("babel-eslint"));
    assert_eq!(merged.extends(), ["eslint:recommended"]);
}

#[test]
fn es6_react_combines_both_presets() {
    let merged = resolve(&Registry::builtin(), "es6-react").unwrap();

    assert_eq!(merged.applied(), ["javascript", "es6", "react", "es6-react"]);
    assert_eq!(
        merged.extends(),
        ["eslint:recommended", "plugin:react/recommended"]
    );
    assert_eq!(merged.parser(), Some("babel-eslint"));
    assert_eq!(merged.plugins(), ["react"]);
    assert_eq!(merged.globals().get("React"), Some(&GlobalAccess::Readonly));
    assert_eq!(merged.env().get("es6"), Some(&true));

    let features = merged.parser_options()["ecmaFeatures"].as_map().unwrap();
    assert_eq!(features["jsx"], Value::Bool(true));
    assert_eq!(merged.parser_options()["ecmaVersion"], Value::Integer(6));

    for rule in [
        "react/display-name",
        "react/jsx-sort-props",
        "react/no-multi-comp",
        "react/prop-types",
        "prefer-const",
    ] {
        assert_eq!(merged.rule_severity(rule), Some(Severity::Error), "{rule}");
    }
    let unused = merged.rule("no-unused-vars").unwrap();
    assert_eq!(unused.severity, Severity::Error);
    assert_eq!(
        unused.options[0].as_map().unwrap()["varsIgnorePattern"],
        Value::from("rest")
    );
}

#[test]
fn react_preset_stands_alone() {
    let merged = resolve(&Registry::builtin(), "react").unwrap();
    assert_eq!(merged.parser(), None);
    assert!(merged.env().is_empty());
    assert_eq!(merged.extends(), ["plugin:react/recommended"]);
}

#[test]
fn rendered_json_matches_schema() {
    let schema: serde_json::Value = serde_json::from_str(&schema_json().unwrap()).unwrap();
    let validator = jsonschema::validator_for(&schema).expect("schema compiles");

    let reg = Registry::builtin();
    for name in lint_presets::conf::NAMES {
        let text = resolve(&reg, name)
            .unwrap()
            .render(OutputFormat::Json)
            .unwrap();
        let instance: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(validator.is_valid(&instance), "{name}: {text}");
    }
}

#[test]
fn rendered_json_uses_tool_key_spelling() {
    let text = resolve(&Registry::builtin(), "es6-react")
        .unwrap()
        .render(OutputFormat::Json)
        .unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(doc.get("parserOptions").is_some());
    assert!(doc.get("applied").is_none());
    assert_eq!(doc["rules"]["react/prop-types"], serde_json::json!("error"));
    assert_eq!(
        doc["rules"]["no-unused-vars"],
        serde_json::json!(["error", {"varsIgnorePattern": "rest"}])
    );
    assert_eq!(doc["globals"]["React"], serde_json::json!("readonly"));
}

#[test]
fn renders_toml() {
    let text = resolve(&Registry::builtin(), "es6-react")
        .unwrap()
        .render(OutputFormat::Toml)
        .unwrap();
    let doc: toml::Table = toml::from_str(&text).expect("valid toml");
    assert_eq!(doc["parser"].as_str(), Some("babel-eslint"), "{text}");
    assert_eq!(doc["rules"]["react/prop-types"].as_str(), Some("error"));
    assert_eq!(doc["parserOptions"]["ecmaVersion"].as_integer(), Some(6));
}
