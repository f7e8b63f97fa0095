//! End-to-end tests: typed data through QSON text and query strings.

use qson::{
    from_query_string, from_query_string_with_options, from_str, parse, qson, to_param_map,
    to_query_string, to_query_string_with_options, to_string, to_value, QsonOptions, Value,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct SearchRequest {
    query: String,
    page: u32,
    per_page: u32,
    filters: Vec<Filter>,
    debug: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Filter {
    field: String,
    values: Vec<String>,
}

fn sample_request() -> SearchRequest {
    SearchRequest {
        query: "blue boats".to_string(),
        page: 2,
        per_page: 50,
        filters: vec![
            Filter {
                field: "length".to_string(),
                values: vec!["10m".to_string(), "12m".to_string()],
            },
            Filter {
                field: "year".to_string(),
                values: vec!["2020".to_string()],
            },
        ],
        debug: false,
    }
}

#[test]
fn struct_to_text_and_back() {
    let request = sample_request();
    let text = to_string(&request).unwrap();
    assert_eq!(
        text,
        "(query~blue boats'page~2'per_page~50'filters~((field~length'values~(10m'12m))'(field~year'values~(_2020)))'debug~false)"
    );
    assert_eq!(from_str::<SearchRequest>(&text).unwrap(), request);
}

#[test]
fn struct_through_a_query_string() {
    let request = sample_request();
    let value = to_value(&request).unwrap();
    let qs = to_query_string(&value).unwrap();
    assert_eq!(
        qs,
        "query=blue+boats&page=2&per_page=50&filters=((field~length'values~(10m'12m))'(field~year'values~(_2020)))&debug=false"
    );

    let back = from_query_string(&qs).unwrap();
    assert_eq!(qson::from_value::<SearchRequest>(back).unwrap(), request);
}

#[test]
fn param_map_explosion() {
    let value = qson!({"a": 3, "b": [1, 2], "c": {"d": true}});
    let params = to_param_map(&value).unwrap();
    let entries: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![("a", "3"), ("b", "(1'2)"), ("c", "(d~true)")]
    );
}

#[test]
fn param_map_fallback_for_awkward_keys() {
    let value = qson!({"a key": 1, "b": 2});
    let params = to_param_map(&value).unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params.get("_").map(String::as_str), Some("(a key~1'b~2)"));
}

#[test]
fn ignore_keys_filters_tracking_params() {
    let value = from_query_string_with_options(
        "query=boats&page=2&utm_source=mail&fbclid=xyz",
        &QsonOptions::default(),
        &["utm_source", "fbclid"],
    )
    .unwrap();
    assert_eq!(value, qson!({"query": "boats", "page": 2}));
}

#[test]
fn options_variants_of_every_entry_point() {
    let options = QsonOptions::new().with_param_name("payload");
    let value = qson!([1, "two"]);

    let qs = to_query_string_with_options(&value, &options).unwrap();
    assert_eq!(qs, "payload=(1'two)");
    assert_eq!(
        from_query_string_with_options(&qs, &options, &[]).unwrap(),
        value
    );
    // With the default options the same string stays wrapped
    assert_eq!(
        from_query_string(&qs).unwrap(),
        qson!({"payload": [1, "two"]})
    );
}

#[test]
fn enums_round_trip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Sort {
        Relevance,
        Field(String),
        Range { from: u32, to: u32 },
    }

    for sort in [
        Sort::Relevance,
        Sort::Field("price".to_string()),
        Sort::Range { from: 10, to: 20 },
    ] {
        let text = to_string(&sort).unwrap();
        assert_eq!(from_str::<Sort>(&text).unwrap(), sort, "via {text}");
    }

    assert_eq!(to_string(&Sort::Relevance).unwrap(), "Relevance");
    assert_eq!(to_string(&Sort::Field("price".to_string())).unwrap(), "(Field~price)");
    assert_eq!(
        to_string(&Sort::Range { from: 10, to: 20 }).unwrap(),
        "(Range~(from~10'to~20))"
    );
}

#[test]
fn optional_fields() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Page {
        cursor: Option<String>,
        limit: Option<u32>,
    }

    let page = Page {
        cursor: Some("abc".to_string()),
        limit: None,
    };
    let text = to_string(&page).unwrap();
    assert_eq!(text, "(cursor~abc'limit~null)");
    assert_eq!(from_str::<Page>(&text).unwrap(), page);
}

#[test]
fn maps_with_dynamic_keys() {
    use std::collections::BTreeMap;

    let mut counts = BTreeMap::new();
    counts.insert("red".to_string(), 3u32);
    counts.insert("blue".to_string(), 5u32);
    let text = to_string(&counts).unwrap();
    assert_eq!(text, "(blue~5'red~3)");
    assert_eq!(from_str::<BTreeMap<String, u32>>(&text).unwrap(), counts);
}

#[test]
fn transcoding_from_json() {
    // The value model is a subset of JSON's, so a serde_json tree carries
    // straight over
    let json: serde_json::Value = serde_json::from_str(
        r#"{"query": "boats", "page": 2, "tags": ["new", "cheap"], "extra": null}"#,
    )
    .unwrap();
    let value = to_value(&json).unwrap();
    assert_eq!(
        qson::stringify(&value).unwrap(),
        "(query~boats'page~2'tags~(new'cheap)'extra~null)"
    );

    // And back out to JSON
    let parsed = parse("(a~1'b~(true'null))").unwrap();
    let json = serde_json::to_value(&parsed).unwrap();
    assert_eq!(json, serde_json::json!({"a": 1.0, "b": [true, null]}));
}

#[test]
fn qson_is_shorter_than_percent_encoded_json() {
    let value = qson!({"a": [1, 2, 3], "b": {"c": "test"}});
    let qs = to_query_string(&value).unwrap();
    let json = serde_json::to_string(&serde_json::to_value(&value).unwrap()).unwrap();
    // Rough motivating comparison: every { } [ ] " , : in the JSON would
    // need a three-byte %XX sequence in a URL
    let percent_encoded_len: usize = json
        .bytes()
        .map(|b| if b.is_ascii_alphanumeric() { 1 } else { 3 })
        .sum();
    assert!(qs.len() < percent_encoded_len);
}

#[test]
fn values_survive_mixed_equal_signs_and_spaces() {
    let value = qson!({"note": "a=b c&d"});
    let qs = to_query_string(&value).unwrap();
    assert_eq!(qs, "note=a%3Db+c%26d");
    assert_eq!(from_query_string(&qs).unwrap(), value);
}

#[test]
fn depth_limit_guards_both_directions() {
    let mut value = Value::Number(1.0);
    for _ in 0..300 {
        value = Value::Array(vec![value]);
    }
    assert!(qson::stringify(&value).is_err());

    let bomb = format!("{}1{}", "(".repeat(300), ")".repeat(300));
    assert!(parse(&bomb).is_err());
}
