use derived_fields as df;
use serde_json::json;

#[test]
fn test_builtin_copy() {
    let record = df::build_json(&json!({"a": [1, 2], "b": {"$derive": {"fn": "copy", "from": ["a"]}}}), 0).unwrap();
    assert_eq!(record["b"], json!([1, 2]));
}

#[test]
fn test_builtin_concat_without_separator() {
    let record = df::build_json(
        &json!({"a": "x", "b": 1, "c": null, "d": {"$derive": {"fn": "concat", "from": ["a", "b", "c"]}}}),
        0,
    )
    .unwrap();
    assert_eq!(record["d"], json!("x1"));
}

#[test]
fn test_builtin_sum() {
    let record = df::build_json(
        &json!({"a": 1, "b": 2, "c": {"$derive": {"fn": "sum", "from": ["a", "b"]}}, "d": {"$derive": {"fn": "sum", "from": ["c", "c"]}}}),
        0,
    )
    .unwrap();
    // Repeated keys collapse into one input entry.
    assert_eq!(record["d"], json!(3));
}

#[test]
fn test_builtin_upper_passthrough() {
    let record = df::build_json(&json!({"n": 4, "u": {"$derive": {"fn": "upper", "from": ["n"]}}}), 0).unwrap();
    assert_eq!(record["u"], json!(4));
}

// A substituted value that looks like a placeholder is left alone, whatever
// order the keys were declared in.
#[test]
fn test_builtin_template_key_order() {
    let build = |from: [&str; 2]| {
        df::build_json(
            &json!({
                "first": "{last}",
                "last": "X",
                "t": {"$derive": {"fn": "template", "from": from, "args": ["{first}"]}}
            }),
            0,
        )
        .unwrap()
    };
    let forward = build(["first", "last"]);
    let reverse = build(["last", "first"]);
    assert_eq!(forward["t"], reverse["t"]);
    assert_eq!(forward["t"], json!("{last}"));
}
