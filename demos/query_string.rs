//! Encoding typed search parameters into a URL query string and back.
//!
//! Run with: cargo run --example query_string

use qson::QsonOptions;
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct SearchRequest {
    query: String,
    page: u32,
    filters: Vec<Filter>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Filter {
    field: String,
    values: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let request = SearchRequest {
        query: "blue boats".to_string(),
        page: 2,
        filters: vec![Filter {
            field: "length".to_string(),
            values: vec!["10m".to_string(), "12m".to_string()],
        }],
    };

    // The whole request becomes an ordinary-looking query string; only the
    // nested filters need QSON syntax
    let value = qson::to_value(&request)?;
    let qs = qson::to_query_string(&value)?;
    println!("GET /search?{qs}\n");

    // And straight back into the typed request
    let received = qson::from_query_string(&qs)?;
    let parsed: SearchRequest = qson::from_value(received)?;
    println!("Decoded: {parsed:?}\n");

    // Tracking parameters added along the way are easy to skip
    let dirty = format!("{qs}&utm_source=newsletter");
    let cleaned = qson::from_query_string_with_options(
        &dirty,
        &QsonOptions::default(),
        &["utm_source"],
    )?;
    println!("Without tracking params: {cleaned}\n");

    // A custom fallback parameter name for non-object payloads
    let options = QsonOptions::new().with_param_name("q");
    let qs = qson::to_query_string_with_options(&qson::to_value(&[1, 2, 3])?, &options)?;
    println!("Array under a custom name: {qs}");

    Ok(())
}
