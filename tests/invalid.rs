use derived_fields as df;
use df::functions::Registry;
use df::{derive, try_derive, Config, DeriveError};
use serde_json::{json, Value};

#[test]
fn test_self_dependency() {
    let config = Config::new().field("a", derive(|i| i["a"].clone(), ["a"]));
    let err = df::resolve(&config, "a").unwrap_err();
    assert!(matches!(err, DeriveError::CircularDependency { ref chain, .. } if chain == "a->a"));
}

// A dependency that names nothing in the config fails instead of reading null.
#[test]
fn test_undeclared_dependency() {
    let config = Config::new().field("b", derive(|i| i["ghost"].clone(), ["ghost"]));
    let err = df::build(&config, 0).unwrap_err();
    assert_eq!(
        err,
        DeriveError::UnknownField { field: "ghost".into(), chain: "b->ghost".into() }
    );
}

#[test]
fn test_deriver_failure_aborts_pass() {
    let config = Config::new()
        .field("a", json!("nan"))
        .field(
            "b",
            try_derive(
                |i| {
                    i["a"]
                        .as_f64()
                        .map(Value::from)
                        .ok_or_else(|| DeriveError::Runtime("a must be numeric".into()))
                },
                ["a"],
            ),
        );
    let err = df::build(&config, 0).unwrap_err();
    assert_eq!(err.to_string(), "runtime error: a must be numeric");
}

#[test]
fn test_json_config_errors() {
    let reg = Registry::with_builtins();
    let err = Config::from_json(&json!({"a": {"$derive": {"fn": "missing"}}}), &reg).unwrap_err();
    assert_eq!(err, DeriveError::UnknownFunction("missing".into()));

    let err = Config::from_json(&json!({"a": {"$derive": {"from": ["b"]}}}), &reg).unwrap_err();
    assert!(matches!(err, DeriveError::InvalidConfig(_)), "{err}");

    let err = Config::from_json(&json!({"a": {"$derive": {"fn": "upper", "args": [1]}}}), &reg).unwrap_err();
    assert!(err.to_string().starts_with("invalid config:"), "{err}");
}

#[test]
fn test_json_cycle() {
    let config = json!({
        "x": {"$derive": {"fn": "copy", "from": ["y"]}},
        "y": {"$derive": {"fn": "copy", "from": ["x"]}}
    });
    let err = df::build_json(&config, 0).unwrap_err();
    // Fields are visited in name order, so "x" is requested first.
    assert!(err.to_string().ends_with("x->y->x"), "{err}");
}
