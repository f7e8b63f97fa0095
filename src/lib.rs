//! # QSON
//!
//! QSON (Query String Object Notation) is a compact text encoding for
//! JSON-like data designed to live inside URL query strings. Where JSON
//! needs `{"a":3,"b":"test"}` (and a wall of `%7B%22` once URL-encoded),
//! QSON writes `(a~3'b~test)` using characters that survive in a URL
//! unescaped.
//!
//! ## Format tour
//!
//! | Value | QSON |
//! |-------|------|
//! | `{"a": 3, "b": "test", "c": true}` | `(a~3'b~test'c~true)` |
//! | `[1, 2, 3]` | `(1'2'3)` |
//! | `{}` | `(~~)` |
//! | `[]` | `()` |
//! | `"true"` (the string) | `_true` |
//! | `null` | `null` |
//!
//! Compounds are wrapped in `(` and `)`, entries are separated by `'`, and
//! object keys are joined to their values with `~`. A leading `_` forces a
//! token to parse as a string, and `!` escapes any structural character
//! (plus `!t`, `!n`, `!r`, `!f`, `!b` and `!u` + 4 hex digits for
//! characters that cannot appear literally).
//!
//! ## Parsing and serializing values
//!
//! ```rust
//! use qson::{qson, Value};
//!
//! let value = qson::parse("(a~3'b~test'c~true)").unwrap();
//! assert_eq!(value, qson!({"a": 3, "b": "test", "c": true}));
//!
//! let text = qson::stringify(&value).unwrap();
//! assert_eq!(text, "(a~3'b~test'c~true)");
//! ```
//!
//! ## Query strings
//!
//! A top-level object with well-behaved keys spreads across individual
//! query parameters, so the result looks like any other query string:
//!
//! ```rust
//! use qson::qson;
//!
//! let value = qson!({"query": "boats", "page": 2, "sort": ["price", "asc"]});
//! let qs = qson::to_query_string(&value).unwrap();
//! assert_eq!(qs, "query=boats&page=2&sort=(price'asc)");
//!
//! assert_eq!(qson::from_query_string(&qs).unwrap(), value);
//! ```
//!
//! ## Serde
//!
//! Any `Serialize`/`Deserialize` type can go straight to and from QSON
//! text:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Search {
//!     query: String,
//!     page: u32,
//! }
//!
//! let search = Search { query: "boats".to_string(), page: 2 };
//! let text = qson::to_string(&search).unwrap();
//! assert_eq!(text, "(query~boats'page~2)");
//! assert_eq!(qson::from_str::<Search>(&text).unwrap(), search);
//! ```
//!
//! ## Options
//!
//! [`QsonOptions`] controls the fallback parameter name, how strict the
//! query layer is about parameter names, pure-ASCII output and the
//! nesting depth limit. Every top-level function has a `_with_options`
//! variant.

#[macro_use]
mod macros;

mod de;
mod error;
mod map;
mod options;
mod query;
mod ser;
mod syntax;
mod value;

pub use crate::de::from_value;
pub use crate::error::{Error, Result};
pub use crate::map::QsonMap;
pub use crate::options::QsonOptions;
pub use crate::query::ParamMap;
pub use crate::ser::{to_value, ValueSerializer};
pub use crate::value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parses QSON text into a [`Value`].
///
/// ```rust
/// let value = qson::parse("(1'2'3)").unwrap();
/// assert!(value.is_array());
/// ```
pub fn parse(input: &str) -> Result<Value> {
    de::parse_text(input, &QsonOptions::default())
}

/// Parses QSON text into a [`Value`] with explicit options.
pub fn parse_with_options(input: &str, options: &QsonOptions) -> Result<Value> {
    de::parse_text(input, options)
}

/// Serializes a [`Value`] to QSON text.
///
/// Fails only on a non-finite number or when the value nests deeper than
/// the configured limit.
///
/// One corner of the format is ambiguous: a one-element array holding the
/// empty string serializes to `()`, which parses back as the empty array.
pub fn stringify(value: &Value) -> Result<String> {
    ser::to_text(value, &QsonOptions::default())
}

/// Serializes a [`Value`] to QSON text with explicit options.
pub fn stringify_with_options(value: &Value, options: &QsonOptions) -> Result<String> {
    ser::to_text(value, options)
}

/// Serializes any `Serialize` type to QSON text.
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    stringify(&to_value(value)?)
}

/// Serializes any `Serialize` type to QSON text with explicit options.
pub fn to_string_with_options<T>(value: &T, options: &QsonOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    stringify_with_options(&to_value(value)?, options)
}

/// Parses QSON text into any `Deserialize` type.
pub fn from_str<T>(input: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(parse(input)?)
}

/// Parses QSON text into any `Deserialize` type with explicit options.
pub fn from_str_with_options<T>(input: &str, options: &QsonOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(parse_with_options(input, options)?)
}

/// Converts a [`Value`] to a map of query parameters.
///
/// An object whose keys all make safe parameter names gets one entry per
/// key; any other value is serialized whole under the default parameter
/// name.
pub fn to_param_map(value: &Value) -> Result<ParamMap> {
    query::to_param_map(value, &QsonOptions::default())
}

/// Converts a [`Value`] to a map of query parameters with explicit options.
pub fn to_param_map_with_options(value: &Value, options: &QsonOptions) -> Result<ParamMap> {
    query::to_param_map(value, options)
}

/// Reconstructs a [`Value`] from a map of query parameters.
pub fn from_param_map(params: &ParamMap) -> Result<Value> {
    query::from_param_map(params, &QsonOptions::default(), &[])
}

/// Reconstructs a [`Value`] from a map of query parameters, skipping the
/// parameters named in `ignore_keys` (tracking parameters and the like).
pub fn from_param_map_with_options(
    params: &ParamMap,
    options: &QsonOptions,
    ignore_keys: &[&str],
) -> Result<Value> {
    query::from_param_map(params, options, ignore_keys)
}

/// Converts a [`Value`] to a URL query string (without a leading `?`).
pub fn to_query_string(value: &Value) -> Result<String> {
    query::to_query_string(value, &QsonOptions::default())
}

/// Converts a [`Value`] to a URL query string with explicit options.
pub fn to_query_string_with_options(value: &Value, options: &QsonOptions) -> Result<String> {
    query::to_query_string(value, options)
}

/// Reconstructs a [`Value`] from a URL query string (without a leading
/// `?`). The empty string decodes to the empty object.
pub fn from_query_string(input: &str) -> Result<Value> {
    query::from_query_string(input, &QsonOptions::default(), &[])
}

/// Reconstructs a [`Value`] from a URL query string, skipping the
/// parameters named in `ignore_keys`.
pub fn from_query_string_with_options(
    input: &str,
    options: &QsonOptions,
    ignore_keys: &[&str],
) -> Result<Value> {
    query::from_query_string(input, options, ignore_keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let value = qson!({
            "a": 3,
            "b": "test",
            "c": [true, null, {"d": 1.5}],
            "e": {}
        });
        let text = stringify(&value).unwrap();
        assert_eq!(text, "(a~3'b~test'c~(true'null'(d~1.5))'e~(~~))");
        assert_eq!(parse(&text).unwrap(), value);
    }

    #[test]
    fn query_string_round_trip() {
        let value = qson!({"a": 3, "b": "test", "c": true});
        let qs = to_query_string(&value).unwrap();
        assert_eq!(qs, "a=3&b=test&c=true");
        assert_eq!(from_query_string(&qs).unwrap(), value);
    }

    #[test]
    fn serde_round_trip() {
        use serde::{Deserialize, Serialize};

        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Filter {
            field: String,
            values: Vec<String>,
        }

        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Search {
            query: String,
            page: u32,
            filters: Vec<Filter>,
        }

        let search = Search {
            query: "blue boats".to_string(),
            page: 2,
            filters: vec![Filter {
                field: "size".to_string(),
                values: vec!["10m".to_string(), "12m".to_string()],
            }],
        };
        let text = to_string(&search).unwrap();
        assert_eq!(from_str::<Search>(&text).unwrap(), search);
    }

    #[test]
    fn options_thread_through() {
        let options = QsonOptions::new()
            .with_param_name("data")
            .with_unicode_escaping(true);
        let value = qson!(["\u{e9}"]);
        let qs = to_query_string_with_options(&value, &options).unwrap();
        assert_eq!(qs, "data=(!u00E9)");
        assert_eq!(
            from_query_string_with_options(&qs, &options, &[]).unwrap(),
            value
        );
    }
}
