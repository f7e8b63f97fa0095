use qson::{qson, QsonMap, Value};

#[test]
fn qson_macro_null() {
    assert_eq!(qson!(null), Value::Null);
}

#[test]
fn qson_macro_booleans() {
    assert_eq!(qson!(true), Value::Bool(true));
    assert_eq!(qson!(false), Value::Bool(false));
}

#[test]
fn qson_macro_numbers() {
    assert_eq!(qson!(42), Value::Number(42.0));
    assert_eq!(qson!(3.5), Value::Number(3.5));
    assert_eq!(qson!(-123), Value::Number(-123.0));
}

#[test]
fn qson_macro_strings() {
    assert_eq!(qson!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(qson!(""), Value::String(String::new()));
}

#[test]
fn qson_macro_arrays() {
    assert_eq!(qson!([]), Value::Array(vec![]));
    assert_eq!(
        qson!([1, true, "x"]),
        Value::Array(vec![
            Value::Number(1.0),
            Value::Bool(true),
            Value::String("x".to_string()),
        ])
    );
}

#[test]
fn qson_macro_objects() {
    assert_eq!(qson!({}), Value::Object(QsonMap::new()));

    let value = qson!({
        "query": "boats",
        "page": 2,
        "opts": {"debug": false},
        "tags": ["a", "b"]
    });
    let map = value.as_object().unwrap();
    assert_eq!(map.len(), 4);
    assert_eq!(map.get("query"), Some(&Value::from("boats")));
    assert_eq!(map.get("page"), Some(&Value::Number(2.0)));
    assert_eq!(map.get("opts"), Some(&qson!({"debug": false})));
    assert_eq!(map.get("tags"), Some(&qson!(["a", "b"])));
}

#[test]
fn qson_macro_preserves_key_order() {
    let value = qson!({"z": 1, "a": 2, "m": 3});
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn qson_macro_accepts_expressions() {
    let page = 3u32;
    let tags = vec!["new", "cheap"];
    assert_eq!(qson!(page), Value::Number(3.0));
    assert_eq!(qson!(tags), qson!(["new", "cheap"]));
}

#[test]
fn qson_macro_output_serializes() {
    let value = qson!({"a": [1, 2], "b": null});
    assert_eq!(qson::stringify(&value).unwrap(), "(a~(1'2)'b~null)");
}
