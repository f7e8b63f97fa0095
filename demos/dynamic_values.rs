//! Building and inspecting QSON values at runtime.
//!
//! Run with: cargo run --example dynamic_values

use qson::{qson, QsonMap, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Literal syntax via the macro
    let value = qson!({
        "query": "boats",
        "page": 2,
        "tags": ["new", "cheap"],
        "extra": null
    });
    println!("macro:   {}", qson::stringify(&value)?);

    // Or built up imperatively
    let mut map = QsonMap::new();
    map.insert("query".to_string(), Value::from("boats"));
    map.insert("page".to_string(), Value::from(2));
    let built = Value::Object(map);
    println!("built:   {}", qson::stringify(&built)?);

    // Parsed text is inspectable without a schema
    let parsed = qson::parse("(user~(name~Alice'age~30)'active~true)")?;
    if let Some(user) = parsed.as_object().and_then(|o| o.get("user")) {
        let name = user.as_object().and_then(|o| o.get("name")).and_then(Value::as_str);
        let age = user.as_object().and_then(|o| o.get("age")).and_then(Value::as_i64);
        println!("parsed:  name={name:?} age={age:?}");
    }

    // Strings that look like other types survive unharmed
    let tricky = qson!(["true", "1.5", "null", ""]);
    let text = qson::stringify(&tricky)?;
    println!("tricky:  {text}");
    assert_eq!(qson::parse(&text)?, tricky);

    Ok(())
}
