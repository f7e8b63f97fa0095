//! QSON grammar constants and token classification.
//!
//! The text grammar uses six sentinel characters, chosen so that a QSON
//! fragment survives inside a URL query string without percent-escaping:
//!
//! | Character | Role |
//! |-----------|------|
//! | `(` | open a compound (array or object) |
//! | `)` | close a compound |
//! | `'` | entry separator inside a compound |
//! | `~` | key/value separator inside an object |
//! | `_` | forced-string marker (leading) |
//! | `!` | escape character |
//!
//! The empty object is written with the reserved sentinel `(~~)` to keep it
//! distinguishable from the empty array `()`.

/// Start of a compound value (array or object).
pub const START_COMPOUND: char = '(';
/// End of a compound value.
pub const END_COMPOUND: char = ')';
/// QSON key/value separator.
pub const KEY_VAL_SEP: char = '~';
/// QSON entry separator.
pub const ENTRY_SEP: char = '\'';
/// Leading marker forcing a token to parse as a string.
pub const FORCE_STRING: char = '_';
/// Escape character, similar to `\` in many languages.
pub const ESCAPE: char = '!';

/// Regular query string entry separator.
pub const QS_ENTRY_SEP: char = '&';
/// Regular query string key/value separator.
pub const QS_KEY_VAL_SEP: char = '=';

/// Only these three characters end a key or value token while scanning.
#[inline]
pub(crate) const fn is_terminator(ch: char) -> bool {
    matches!(ch, KEY_VAL_SEP | ENTRY_SEP | END_COMPOUND)
}

/// Strict number grammar: `-`? (`0` | nonzero digits) (`.` digits)?
/// ((`e`|`E`) sign? digits)?. Tokens matching it coerce to Number on parse
/// and trigger the forced-string marker on serialize.
pub(crate) fn is_number_string(s: &str) -> bool {
    let mut chars = s.chars().peekable();
    if chars.peek() == Some(&'-') {
        chars.next();
    }
    match chars.next() {
        Some('0') => {}
        Some(c) if c.is_ascii_digit() => {
            while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
                chars.next();
            }
        }
        _ => return false,
    }
    if chars.peek() == Some(&'.') {
        chars.next();
        if !matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            return false;
        }
        while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            chars.next();
        }
    }
    if matches!(chars.peek(), Some('e') | Some('E')) {
        chars.next();
        if matches!(chars.peek(), Some('+') | Some('-')) {
            chars.next();
        }
        if !matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            return false;
        }
        while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            chars.next();
        }
    }
    chars.next().is_none()
}

/// Safe bare parameter names are non-empty runs of word characters.
/// Anything else forces the whole value under the default parameter name.
pub(crate) fn is_safe_param_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
