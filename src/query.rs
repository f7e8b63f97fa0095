//! Mapping between QSON values and URL query strings.
//!
//! A top-level object whose keys all make safe bare parameter names is
//! exploded into one query parameter per key, each carrying the QSON text
//! of its value. Anything else (arrays, scalars, objects with awkward keys)
//! is serialized whole under a single parameter, `_` by default.
//!
//! ```rust
//! use qson::qson;
//!
//! let value = qson!({"query": "test", "page": 3});
//! assert_eq!(qson::to_query_string(&value).unwrap(), "query=test&page=3");
//!
//! let value = qson!([1, 2, 3]);
//! assert_eq!(qson::to_query_string(&value).unwrap(), "_=(1'2'3)");
//! ```
//!
//! Percent-encoding here deliberately differs from the generic
//! `application/x-www-form-urlencoded` rules: the QSON structural
//! characters `( ) ' ~ !` and `*` stay literal so encoded values remain
//! readable, and space becomes `+`.

use crate::syntax::{self, QS_ENTRY_SEP, QS_KEY_VAL_SEP};
use crate::{de, ser, Error, QsonMap, QsonOptions, Result, Value};
use indexmap::IndexMap;
use std::fmt::Write as _;

/// An ordered set of named query parameters, each holding a QSON fragment.
pub type ParamMap = IndexMap<String, String>;

pub(crate) fn to_param_map(value: &Value, options: &QsonOptions) -> Result<ParamMap> {
    let mut params = ParamMap::new();
    if let Value::Object(obj) = value {
        for (key, entry) in obj.iter() {
            if !usable_param_name(key, options) {
                // One awkward key and the whole object falls back to a
                // single parameter.
                params.clear();
                params.insert(options.param_name.clone(), ser::to_text(value, options)?);
                return Ok(params);
            }
            params.insert(key.clone(), ser::to_text(entry, options)?);
        }
    } else {
        params.insert(options.param_name.clone(), ser::to_text(value, options)?);
    }
    Ok(params)
}

fn usable_param_name(key: &str, options: &QsonOptions) -> bool {
    if key == options.param_name {
        return false;
    }
    if options.allow_any_param_name {
        !key.is_empty()
    } else {
        syntax::is_safe_param_name(key)
    }
}

pub(crate) fn from_param_map(
    params: &ParamMap,
    options: &QsonOptions,
    ignore_keys: &[&str],
) -> Result<Value> {
    let mut result = QsonMap::new();
    for (key, fragment) in params {
        if ignore_keys.contains(&key.as_str()) {
            continue;
        }
        result.insert(key.clone(), de::parse_text(fragment, options)?);
    }
    if result.len() == 1 {
        if let Some(value) = result.get(options.param_name.as_str()) {
            return Ok(value.clone());
        }
    }
    Ok(Value::Object(result))
}

pub(crate) fn to_query_string(value: &Value, options: &QsonOptions) -> Result<String> {
    let params = to_param_map(value, options)?;
    let mut out = String::new();
    for (i, (key, fragment)) in params.iter().enumerate() {
        if i > 0 {
            out.push(QS_ENTRY_SEP);
        }
        out.push_str(&encode_component(key));
        out.push(QS_KEY_VAL_SEP);
        out.push_str(&encode_component(fragment));
    }
    Ok(out)
}

pub(crate) fn from_query_string(
    input: &str,
    options: &QsonOptions,
    ignore_keys: &[&str],
) -> Result<Value> {
    if input.is_empty() {
        return Ok(Value::Object(QsonMap::new()));
    }
    let segments: Vec<&str> = input.split(QS_ENTRY_SEP).collect();
    let mut params = ParamMap::new();
    let mut offset = 0;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            // A trailing separator is tolerated, a hole between
            // parameters is not.
            if i + 1 == segments.len() {
                break;
            }
            return Err(Error::parse(offset, "empty query string parameter"));
        }
        let Some(eq) = segment.find(QS_KEY_VAL_SEP) else {
            return Err(Error::parse(
                offset,
                format!("query string parameter without '{QS_KEY_VAL_SEP}'"),
            ));
        };
        let (raw_key, raw_value) = (&segment[..eq], &segment[eq + 1..]);
        if raw_value.contains(QS_KEY_VAL_SEP) {
            return Err(Error::parse(
                offset + eq + 1,
                format!("query string parameter with more than one '{QS_KEY_VAL_SEP}'"),
            ));
        }
        let key = decode_component(raw_key, offset)?;
        if key.is_empty() {
            return Err(Error::parse(offset, "empty query string parameter name"));
        }
        let value = decode_component(raw_value, offset + eq + 1)?;
        params.insert(key, value);
        offset += segment.len() + 1;
    }
    from_param_map(&params, options, ignore_keys)
}

/// Characters that survive percent-encoding untouched: the RFC 3986
/// unreserved set plus the characters QSON relies on staying readable.
fn is_literal(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'_' | b'.' | b'~' | b'!' | b'*' | b'\'' | b'(' | b')'
        )
}

pub(crate) fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &byte in s.as_bytes() {
        if is_literal(byte) {
            out.push(byte as char);
        } else if byte == b' ' {
            out.push('+');
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Percent-decodes one key or fragment. `offset` is the byte position of
/// the component within the full query string, used for error positions.
pub(crate) fn decode_component(s: &str, offset: usize) -> Result<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .ok_or_else(|| Error::parse(offset + i, "truncated percent escape"))?;
                let hi = (hex[0] as char).to_digit(16);
                let lo = (hex[1] as char).to_digit(16);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push((hi * 16 + lo) as u8),
                    _ => return Err(Error::parse(offset + i, "invalid percent escape")),
                }
                i += 3;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8(out)
        .map_err(|_| Error::parse(offset, "percent-encoded text is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> QsonOptions {
        QsonOptions::default()
    }

    #[test]
    fn object_explodes_into_parameters() {
        let value = qson!({"a": 3, "b": "test", "c": true});
        assert_eq!(
            to_query_string(&value, &defaults()).unwrap(),
            "a=3&b=test&c=true"
        );
    }

    #[test]
    fn non_object_uses_default_parameter() {
        assert_eq!(
            to_query_string(&qson!([1, 2, 3]), &defaults()).unwrap(),
            "_=(1'2'3)"
        );
        assert_eq!(to_query_string(&qson!(42), &defaults()).unwrap(), "_=42");
        assert_eq!(to_query_string(&Value::Null, &defaults()).unwrap(), "_=null");
    }

    #[test]
    fn empty_object_round_trips_through_empty_string() {
        assert_eq!(to_query_string(&qson!({}), &defaults()).unwrap(), "");
        assert_eq!(from_query_string("", &defaults(), &[]).unwrap(), qson!({}));
    }

    #[test]
    fn awkward_keys_collapse_to_one_parameter() {
        // Key contains a space
        assert_eq!(
            to_query_string(&qson!({"a b": 1}), &defaults()).unwrap(),
            "_=(a+b~1)"
        );
        // Key collides with the default parameter name
        assert_eq!(
            to_query_string(&qson!({"_": 1}), &defaults()).unwrap(),
            "_=(!_~1)"
        );
    }

    #[test]
    fn any_param_name_mode() {
        let options = QsonOptions::new().with_any_param_name(true);
        assert_eq!(
            to_query_string(&qson!({"a b": 1}), &options).unwrap(),
            "a+b=1"
        );
        // The default parameter name still forces the fallback
        assert_eq!(
            to_query_string(&qson!({"_": 1}), &options).unwrap(),
            "_=(!_~1)"
        );
        assert_eq!(
            from_query_string("a+b=1", &options, &[]).unwrap(),
            qson!({"a b": 1})
        );
    }

    #[test]
    fn custom_param_name() {
        let options = QsonOptions::new().with_param_name("q");
        assert_eq!(
            to_query_string(&qson!([1, 2]), &options).unwrap(),
            "q=(1'2)"
        );
        assert_eq!(
            from_query_string("q=(1'2)", &options, &[]).unwrap(),
            qson!([1, 2])
        );
    }

    #[test]
    fn parse_query_string() {
        assert_eq!(
            from_query_string("a=3&b=test&c=true", &defaults(), &[]).unwrap(),
            qson!({"a": 3, "b": "test", "c": true})
        );
        assert_eq!(
            from_query_string("_=(1'2'3)", &defaults(), &[]).unwrap(),
            qson!([1, 2, 3])
        );
        // A single non-default parameter stays wrapped in an object
        assert_eq!(
            from_query_string("a=1", &defaults(), &[]).unwrap(),
            qson!({"a": 1})
        );
    }

    #[test]
    fn trailing_separator_tolerated() {
        assert_eq!(
            from_query_string("a=b&", &defaults(), &[]).unwrap(),
            qson!({"a": "b"})
        );
    }

    #[test]
    fn malformed_query_strings() {
        assert!(from_query_string("&a=b", &defaults(), &[]).is_err());
        assert!(from_query_string("a=b&&c=d", &defaults(), &[]).is_err());
        assert!(from_query_string("a", &defaults(), &[]).is_err());
        assert!(from_query_string("=1", &defaults(), &[]).is_err());
        assert!(from_query_string("a==b", &defaults(), &[]).is_err());
    }

    #[test]
    fn ignored_keys_are_dropped() {
        let value =
            from_query_string("a=1&utm_source=mail&b=2", &defaults(), &["utm_source"]).unwrap();
        assert_eq!(value, qson!({"a": 1, "b": 2}));
    }

    #[test]
    fn percent_codec() {
        assert_eq!(encode_component("a b"), "a+b");
        assert_eq!(encode_component("caf\u{e9}"), "caf%C3%A9");
        assert_eq!(encode_component("(a~1'b~2)"), "(a~1'b~2)");
        assert_eq!(encode_component("x=y&z"), "x%3Dy%26z");

        assert_eq!(decode_component("a+b", 0).unwrap(), "a b");
        assert_eq!(decode_component("a%20b", 0).unwrap(), "a b");
        assert_eq!(decode_component("caf%C3%A9", 0).unwrap(), "caf\u{e9}");
        assert!(decode_component("%G1", 0).is_err());
        assert!(decode_component("%2", 0).is_err());
        // Truncated multibyte sequence
        assert!(decode_component("%C3", 0).is_err());
    }

    #[test]
    fn unicode_survives_the_query_string() {
        let value = qson!({"name": "Andr\u{e9}"});
        let qs = to_query_string(&value, &defaults()).unwrap();
        assert_eq!(qs, "name=Andr%C3%A9");
        assert_eq!(from_query_string(&qs, &defaults(), &[]).unwrap(), value);
    }
}
