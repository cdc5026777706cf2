use std::thread;

use lint_presets::{Error, Fragment, Registry, resolve, resolve_all};

#[test]
fn shared_registry_resolves_from_many_threads() {
    let reg = Registry::builtin();
    let expected = resolve(&reg, "es6-react").unwrap();

    thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| resolve(&reg, "es6-react").unwrap()))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn resolve_all_reports_each_fragment_in_name_order() {
    let mut reg = Registry::builtin();
    reg.register("zz-broken", Fragment::new().with_extends("zz-broken"))
        .unwrap();
    reg.register("aa-orphan", Fragment::new().with_extends("missing"))
        .unwrap();

    let results = resolve_all(&reg);
    let names: Vec<&str> = results.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        ["aa-orphan", "es6", "es6-react", "javascript", "react", "zz-broken"]
    );

    for (name, outcome) in &results {
        match name.as_str() {
            "aa-orphan" => assert!(matches!(outcome, Err(Error::UnknownFragment { .. }))),
            "zz-broken" => assert!(matches!(outcome, Err(Error::CyclicExtension { .. }))),
            _ => assert!(outcome.is_ok(), "{name}"),
        }
    }
}
