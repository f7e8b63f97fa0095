//! QSON serialization.
//!
//! Two layers live here. The lower one renders a [`Value`] tree as QSON
//! text, applying structural escaping, the forced-string marker and the
//! canonical number format. The upper one is [`ValueSerializer`], a
//! [`serde::Serializer`] that turns any `Serialize` type into a [`Value`]
//! so it can go through the same renderer.
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let text = qson::to_string(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(text, "(x~1'y~2)");
//! ```

use crate::syntax::{
    self, END_COMPOUND, ENTRY_SEP, ESCAPE, FORCE_STRING, KEY_VAL_SEP, START_COMPOUND,
};
use crate::{Error, QsonMap, QsonOptions, Result, Value};
use serde::{ser, Serialize};
use std::fmt::Write as _;

/// Renders a value tree as QSON text.
pub(crate) fn to_text(value: &Value, options: &QsonOptions) -> Result<String> {
    let mut writer = TextWriter {
        out: String::with_capacity(64),
        options,
    };
    writer.write_value(value, 0)?;
    Ok(writer.out)
}

struct TextWriter<'a> {
    out: String,
    options: &'a QsonOptions,
}

impl TextWriter<'_> {
    fn write_value(&mut self, value: &Value, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(Error::format(format!(
                "nesting deeper than {} levels",
                self.options.max_depth
            )));
        }
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.write_number(*n)?,
            Value::String(s) => self.write_string(s),
            Value::Array(arr) => {
                self.out.push(START_COMPOUND);
                for (i, element) in arr.iter().enumerate() {
                    if i > 0 {
                        self.out.push(ENTRY_SEP);
                    }
                    self.write_value(element, depth + 1)?;
                }
                self.out.push(END_COMPOUND);
            }
            Value::Object(obj) => {
                if obj.is_empty() {
                    // Empty objects get a dedicated notation so they stay
                    // distinguishable from the empty array ().
                    self.out.push(START_COMPOUND);
                    self.out.push(KEY_VAL_SEP);
                    self.out.push(KEY_VAL_SEP);
                    self.out.push(END_COMPOUND);
                } else {
                    self.out.push(START_COMPOUND);
                    for (i, (key, val)) in obj.iter().enumerate() {
                        if i > 0 {
                            self.out.push(ENTRY_SEP);
                        }
                        self.write_escaped(key);
                        self.out.push(KEY_VAL_SEP);
                        self.write_value(val, depth + 1)?;
                    }
                    self.out.push(END_COMPOUND);
                }
            }
        }
        Ok(())
    }

    /// Canonical number rendering. Integral doubles below 1e15 in magnitude
    /// print as plain integers; everything else picks the shorter of the
    /// decimal and exponential forms. Both re-parse to the same bits.
    fn write_number(&mut self, n: f64) -> Result<()> {
        if !n.is_finite() {
            return Err(Error::format(format!("cannot represent number {n}")));
        }
        if n == n.trunc() && n.abs() < 1e15 {
            let _ = write!(self.out, "{n}");
            return Ok(());
        }
        let plain = format!("{n}");
        let exp = format!("{n:e}");
        self.out.push_str(if exp.len() < plain.len() { &exp } else { &plain });
        Ok(())
    }

    fn write_string(&mut self, s: &str) {
        if s == "null" || s == "true" || s == "false" || syntax::is_number_string(s) {
            // Marker so the text re-parses as a string rather than the
            // literal or number it spells.
            self.out.push(FORCE_STRING);
            self.out.push_str(s);
        } else {
            self.write_escaped(s);
        }
    }

    /// Escapes structural characters. `)`, `~`, `'` and `!` always end or
    /// alter a token so they are escaped everywhere; `(` and `_` only carry
    /// meaning as the first character of a token.
    fn write_escaped(&mut self, s: &str) {
        for (i, ch) in s.chars().enumerate() {
            match ch {
                END_COMPOUND | KEY_VAL_SEP | ENTRY_SEP | ESCAPE => {
                    self.out.push(ESCAPE);
                    self.out.push(ch);
                }
                START_COMPOUND | FORCE_STRING if i == 0 => {
                    self.out.push(ESCAPE);
                    self.out.push(ch);
                }
                '\t' if self.options.escape_unicode => self.out.push_str("!t"),
                '\n' if self.options.escape_unicode => self.out.push_str("!n"),
                '\r' if self.options.escape_unicode => self.out.push_str("!r"),
                '\u{000C}' if self.options.escape_unicode => self.out.push_str("!f"),
                '\u{0008}' if self.options.escape_unicode => self.out.push_str("!b"),
                _ if self.options.escape_unicode && (ch.is_ascii_control() || !ch.is_ascii()) => {
                    let mut units = [0u16; 2];
                    for unit in ch.encode_utf16(&mut units) {
                        let _ = write!(self.out, "!u{unit:04X}");
                    }
                }
                _ => self.out.push(ch),
            }
        }
    }
}

/// Serializer producing a [`Value`] tree from any `Serialize` type.
///
/// Enum variants use the external representation: unit variants become the
/// variant name as a string, all other variants a single-entry object keyed
/// by the variant name.
pub struct ValueSerializer;

/// Converts a `Serialize` type into a [`Value`].
///
/// ```rust
/// use qson::Value;
///
/// let value = qson::to_value(&vec![1, 2, 3]).unwrap();
/// assert_eq!(
///     value,
///     Value::Array(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)])
/// );
/// ```
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Number(v as f64))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Number(v as f64))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Number(v as f64))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(v as f64))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Number(v as f64))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Number(v as f64))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Number(v as f64))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(v as f64))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Number(v as f64))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Number(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(
            v.iter().map(|b| Value::Number(*b as f64)).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let mut map = QsonMap::new();
        map.insert(variant.to_string(), value.serialize(ValueSerializer)?);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeVec {
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap {
            map: QsonMap::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            map: QsonMap::with_capacity(len),
        })
    }
}

pub struct SerializeVec {
    vec: Vec<Value>,
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeTupleVariant {
    variant: &'static str,
    vec: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut map = QsonMap::new();
        map.insert(self.variant.to_string(), Value::Array(self.vec));
        Ok(Value::Object(map))
    }
}

pub struct SerializeMap {
    map: QsonMap,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        // serialize_key is always called before serialize_value
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::format("map value serialized before its key"))?;
        self.map.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.map))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    map: QsonMap,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut map = QsonMap::new();
        map.insert(self.variant.to_string(), Value::Object(self.map));
        Ok(Value::Object(map))
    }
}

/// Map keys must come out as strings; anything else cannot be a QSON key.
struct MapKeySerializer;

fn key_must_be_string() -> Error {
    Error::format("map keys must be strings")
}

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_bool(self, _v: bool) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_i8(self, _v: i8) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_i16(self, _v: i16) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_i32(self, _v: i32) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_i64(self, _v: i64) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_u8(self, _v: u8) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_u16(self, _v: u16) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_u32(self, _v: u32) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_u64(self, _v: u64) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_must_be_string())
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_must_be_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_must_be_string())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_string())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_string())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_string())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_string())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_string())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_must_be_string())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_string())
    }
}
