//! QSON deserialization.
//!
//! The parser is a recursive descent over the character stream with a
//! single cursor and one character of lookahead. A compound starts at `(`;
//! whether it is an array or an object is only known once the character
//! after the first token has been seen, so keys and values share one
//! scanning routine and the caller picks the interpretation afterwards.
//!
//! The second half of the module implements [`serde::Deserializer`] for
//! [`Value`], so a parsed tree can be turned into any `Deserialize` type:
//!
//! ```rust
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, PartialEq, Debug)]
//! struct Point { x: i32, y: i32 }
//!
//! let point: Point = qson::from_str("(x~1'y~2)").unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```

use crate::syntax::{
    self, END_COMPOUND, ENTRY_SEP, ESCAPE, FORCE_STRING, KEY_VAL_SEP, START_COMPOUND,
};
use crate::{Error, QsonMap, QsonOptions, Result, Value};
use serde::de::{
    self, Deserialize, DeserializeOwned, EnumAccess, Expected, IntoDeserializer, Unexpected,
    VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;

/// Parses one QSON value from the input.
///
/// The entry separator doubles as end-of-value at the top level (the
/// query-string layer relies on this); anything else left over after the
/// value is an error.
pub(crate) fn parse_text(input: &str, options: &QsonOptions) -> Result<Value> {
    let mut parser = Parser::new(input, options);
    let value = parser.value()?;
    if let Some(ch) = parser.peek() {
        if ch != ENTRY_SEP {
            return Err(parser.error(format!("unexpected character '{ch}' after value")));
        }
    }
    Ok(value)
}

/// A scanned simple token: the coerced value, and the string to use when
/// the surrounding grammar turns out to need a key instead. The key keeps
/// a leading forced-string marker verbatim and is never type-coerced.
struct Scanned {
    value: Value,
    key: String,
}

/// Result of reading one key-or-value position. Compounds can never serve
/// as object keys.
enum Token {
    Simple(Scanned),
    Compound(Value),
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    options: &'a QsonOptions,
}

impl<'a> Parser<'a> {
    fn new(input: &str, options: &'a QsonOptions) -> Self {
        Parser {
            chars: input.chars().collect(),
            pos: 0,
            depth: 0,
            options,
        }
    }

    fn error(&self, msg: impl Into<String>) -> Error {
        Error::parse(self.pos, msg)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn accept(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.accept(expected) {
            return Ok(());
        }
        match self.peek() {
            Some(found) => Err(self.error(format!("expected '{expected}', found '{found}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn value(&mut self) -> Result<Value> {
        Ok(match self.key_or_value()? {
            Token::Simple(scanned) => scanned.value,
            Token::Compound(value) => value,
        })
    }

    fn key_or_value(&mut self) -> Result<Token> {
        if self.accept(START_COMPOUND) {
            self.depth += 1;
            if self.depth > self.options.max_depth {
                return Err(self.error(format!(
                    "nesting deeper than {} levels",
                    self.options.max_depth
                )));
            }
            let value = if self.accept(END_COMPOUND) {
                Value::Array(Vec::new())
            } else {
                let value = self.array_or_object()?;
                self.expect(END_COMPOUND)?;
                value
            };
            self.depth -= 1;
            Ok(Token::Compound(value))
        } else {
            Ok(Token::Simple(self.scan_token()?))
        }
    }

    fn array_or_object(&mut self) -> Result<Value> {
        let first = self.key_or_value()?;
        if self.accept(KEY_VAL_SEP) {
            let key = match first {
                Token::Simple(scanned) => scanned.key,
                Token::Compound(_) => {
                    return Err(self.error("compound value cannot be an object key"))
                }
            };
            self.object(key)
        } else {
            let value = match first {
                Token::Simple(scanned) => scanned.value,
                Token::Compound(value) => value,
            };
            self.array(value)
        }
    }

    fn object(&mut self, first_key: String) -> Result<Value> {
        let mut map = QsonMap::new();
        if first_key.is_empty() && self.accept(KEY_VAL_SEP) {
            // The empty-object sentinel (~~)
            return Ok(Value::Object(map));
        }
        let value = self.value()?;
        map.insert(first_key, value);
        while self.accept(ENTRY_SEP) {
            let key = self.scan_token()?.key;
            self.expect(KEY_VAL_SEP)?;
            let value = self.value()?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }

    fn array(&mut self, first: Value) -> Result<Value> {
        let mut elements = vec![first];
        while self.accept(ENTRY_SEP) {
            elements.push(self.value()?);
        }
        Ok(Value::Array(elements))
    }

    /// Scans one simple token up to the next terminator, decoding escapes.
    fn scan_token(&mut self) -> Result<Scanned> {
        let explicit = self.accept(FORCE_STRING);
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if syntax::is_terminator(ch) {
                break;
            }
            self.pos += 1;
            if ch == ESCAPE {
                text.push(self.escape_char()?);
            } else {
                text.push(ch);
            }
        }
        if explicit {
            let mut key = String::with_capacity(text.len() + 1);
            key.push(FORCE_STRING);
            key.push_str(&text);
            return Ok(Scanned {
                value: Value::String(text),
                key,
            });
        }
        let value = match text.as_str() {
            "null" => Value::Null,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ if syntax::is_number_string(&text) => match text.parse::<f64>() {
                // A number too large for a double stays a string, so the
                // value can still be re-encoded.
                Ok(n) if n.is_finite() => Value::Number(n),
                _ => Value::String(text.clone()),
            },
            _ => Value::String(text.clone()),
        };
        Ok(Scanned { value, key: text })
    }

    /// Decodes one escape sequence. The escape character itself has already
    /// been consumed.
    fn escape_char(&mut self) -> Result<char> {
        let Some(ch) = self.bump() else {
            return Err(self.error(format!("input ends with escape character '{ESCAPE}'")));
        };
        match ch {
            START_COMPOUND | END_COMPOUND | KEY_VAL_SEP | ENTRY_SEP | FORCE_STRING | ESCAPE => {
                Ok(ch)
            }
            't' => Ok('\t'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            'f' => Ok('\u{000C}'),
            'b' => Ok('\u{0008}'),
            'u' => self.unicode_escape(),
            _ => Err(self.error(format!("illegal escape sequence {ESCAPE}{ch}"))),
        }
    }

    /// Decodes the 4-hex-digit payload of a `!u` escape. A high surrogate
    /// must be immediately followed by a second `!u` escape carrying the low
    /// half; the pair composes to a single code point.
    fn unicode_escape(&mut self) -> Result<char> {
        let unit = self.hex4()?;
        if (0xD800..=0xDBFF).contains(&unit) {
            if !(self.accept(ESCAPE) && self.accept('u')) {
                return Err(self.error("unpaired surrogate in unicode escape"));
            }
            let low = self.hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.error("unpaired surrogate in unicode escape"));
            }
            let code = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
            char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape"))
        } else if (0xDC00..=0xDFFF).contains(&unit) {
            Err(self.error("unpaired surrogate in unicode escape"))
        } else {
            char::from_u32(u32::from(unit)).ok_or_else(|| self.error("invalid unicode escape"))
        }
    }

    fn hex4(&mut self) -> Result<u16> {
        let mut code: u16 = 0;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|ch| ch.to_digit(16))
                .ok_or_else(|| self.error("malformed unicode escape sequence"))?;
            code = code * 16 + digit as u16;
        }
        Ok(code)
    }
}

/// Converts a [`Value`] into any `Deserialize` type.
///
/// ```rust
/// let value = qson::parse("(1'2'3)").unwrap();
/// let numbers: Vec<u32> = qson::from_value(value).unwrap();
/// assert_eq!(numbers, [1, 2, 3]);
/// ```
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(value)
}

impl Value {
    #[cold]
    fn invalid_type(&self, exp: &dyn Expected) -> Error {
        de::Error::invalid_type(self.unexpected(), exp)
    }

    fn unexpected(&self) -> Unexpected<'_> {
        match self {
            Value::Null => Unexpected::Unit,
            Value::Bool(b) => Unexpected::Bool(*b),
            Value::Number(n) => Unexpected::Float(*n),
            Value::String(s) => Unexpected::Str(s),
            Value::Array(_) => Unexpected::Seq,
            Value::Object(_) => Unexpected::Map,
        }
    }
}

macro_rules! deserialize_number {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: Visitor<'de>,
        {
            match self {
                Value::Number(n)
                    if n.fract() == 0.0 && n >= <$ty>::MIN as f64 && n <= <$ty>::MAX as f64 =>
                {
                    visitor.$visit(n as $ty)
                }
                _ => Err(self.invalid_type(&visitor)),
            }
        }
    };
}

impl<'de> de::Deserializer<'de> for Value {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => visitor.visit_f64(n),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(arr) => {
                visitor.visit_seq(de::value::SeqDeserializer::new(arr.into_iter()))
            }
            Value::Object(obj) => {
                visitor.visit_map(de::value::MapDeserializer::new(obj.into_iter()))
            }
        }
    }

    deserialize_number!(deserialize_i8, visit_i8, i8);
    deserialize_number!(deserialize_i16, visit_i16, i16);
    deserialize_number!(deserialize_i32, visit_i32, i32);
    deserialize_number!(deserialize_i64, visit_i64, i64);
    deserialize_number!(deserialize_u8, visit_u8, u8);
    deserialize_number!(deserialize_u16, visit_u16, u16);
    deserialize_number!(deserialize_u32, visit_u32, u32);
    deserialize_number!(deserialize_u64, visit_u64, u64);

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Number(n) => visitor.visit_f64(n),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let (variant, value) = match self {
            Value::String(variant) => (variant, None),
            Value::Object(obj) => {
                let mut iter = obj.into_iter();
                let Some((variant, value)) = iter.next() else {
                    return Err(de::Error::invalid_value(
                        Unexpected::Map,
                        &"object with a single variant key",
                    ));
                };
                if iter.next().is_some() {
                    return Err(de::Error::invalid_value(
                        Unexpected::Map,
                        &"object with a single variant key",
                    ));
                }
                (variant, Some(value))
            }
            other => return Err(other.invalid_type(&"string or object")),
        };
        visitor.visit_enum(EnumDeserializer { variant, value })
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        drop(self);
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier
    }
}

impl<'de> IntoDeserializer<'de, Error> for Value {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, VariantDeserializer)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = self.variant.into_deserializer();
        let visitor = VariantDeserializer { value: self.value };
        seed.deserialize(variant).map(|v| (v, visitor))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(value) => Deserialize::deserialize(value),
            None => Ok(()),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(value),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"newtype variant",
            )),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(arr)) => {
                visitor.visit_seq(de::value::SeqDeserializer::new(arr.into_iter()))
            }
            Some(other) => Err(other.invalid_type(&"tuple variant")),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"tuple variant",
            )),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(Value::Object(obj)) => {
                visitor.visit_map(de::value::MapDeserializer::new(obj.into_iter()))
            }
            Some(other) => Err(other.invalid_type(&"struct variant")),
            None => Err(de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"struct variant",
            )),
        }
    }
}
