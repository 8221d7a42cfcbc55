// SPDX-License-Identifier: Apache-2.0

//! A dynamically typed JSON document.

use crate::buffer::{BufferReader, BufferWriter};
use crate::dto::{ArrayWriter, Decode, Encode, ObjectWriter};
use crate::error::CodecError;
use crate::scalar;
use crate::tape::TapeCursor;
use crate::token::TokenType;

/// Members of an object in document order. Duplicate keys are kept.
pub type Members = Vec<(String, Value)>;

/// Any JSON value.
///
/// ```
/// use tapejson::Value;
///
/// let v: Value = tapejson::from_str(r#"{"k":[1,"two",null]}"#).unwrap();
/// assert_eq!(v.get("k").and_then(|k| k.as_array()).map(Vec::len), Some(3));
/// assert_eq!(v.to_string(), r#"{"k":[1.0,"two",null]}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Members),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Members> {
        match self {
            Self::Object(m) => Some(m),
            _ => None,
        }
    }

    /// First member named `key`, if this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Members> for Value {
    fn from(v: Members) -> Self {
        Self::Object(v)
    }
}

/// A container still collecting members while decoding.
struct Open {
    container: Value,
    remaining: usize,
    /// Key this container is stored under in its parent object.
    key: Option<String>,
}

impl Decode for Value {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        let mut open: Vec<Open> = Vec::new();
        loop {
            let in_object = matches!(open.last(), Some(Open { container: Self::Object(_), .. }));
            let mut key = if in_object { Some(cursor.read_key()?) } else { None };

            let token = cursor.peek()?;
            let mut value = match token.kind {
                TokenType::Object | TokenType::Array => {
                    let (count, container) = if token.kind == TokenType::Object {
                        let pairs = cursor.begin_object()?;
                        let members = Vec::with_capacity(pairs.min(cursor.remaining()));
                        (pairs, Self::Object(members))
                    } else {
                        let elements = cursor.begin_array()?;
                        let values = Vec::with_capacity(elements.min(cursor.remaining()));
                        (elements, Self::Array(values))
                    };
                    if count > 0 {
                        open.push(Open {
                            container,
                            remaining: count,
                            key,
                        });
                        continue;
                    }
                    container
                }
                TokenType::String => Self::String(cursor.read_string()?),
                TokenType::Number => Self::Number(cursor.read_f64()?),
                TokenType::True | TokenType::False => Self::Bool(cursor.read_bool()?),
                TokenType::Null => {
                    cursor.read_null()?;
                    Self::Null
                }
            };

            // Store the finished value, then every container it completes.
            loop {
                let Some(mut parent) = open.pop() else {
                    return Ok(value);
                };
                match &mut parent.container {
                    Self::Object(members) => members.push((key.take().unwrap_or_default(), value)),
                    Self::Array(values) => values.push(value),
                    _ => {}
                }
                parent.remaining -= 1;
                if parent.remaining > 0 {
                    open.push(parent);
                    break;
                }
                value = parent.container;
                key = parent.key;
            }
        }
    }
}

impl Value {
    /// Writes the value as JSON. When `strict` is false, non-finite numbers
    /// are written as `null` instead of failing.
    fn write<W: BufferWriter + ?Sized>(
        &self,
        writer: &mut W,
        strict: bool,
    ) -> Result<(), CodecError> {
        match self {
            Self::Null => scalar::encode_null(writer),
            Self::Bool(b) => scalar::encode_bool(*b, writer),
            Self::Number(n) if !strict && !n.is_finite() => scalar::encode_null(writer),
            Self::Number(n) => scalar::encode_f64(*n, writer),
            Self::String(s) => scalar::encode_str(s, writer),
            Self::Array(values) => {
                let mut array = ArrayWriter::new(writer)?;
                for value in values {
                    array.element(&Lenient(value, strict))?;
                }
                array.finish()
            }
            Self::Object(members) => {
                let mut object = ObjectWriter::new(writer)?;
                for (key, value) in members {
                    object.field(key, &Lenient(value, strict))?;
                }
                object.finish()
            }
        }
    }
}

/// A nested value carrying its parent's strictness through the writers.
struct Lenient<'v>(&'v Value, bool);

impl Encode for Lenient<'_> {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        self.0.write(writer, self.1)
    }
}

impl Encode for Value {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        self.write(writer, true)
    }
}

/// Compact JSON text. Non-finite numbers, which [`to_string`](crate::to_string)
/// rejects, are shown as `null`.
impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut bytes: Vec<u8> = Vec::new();
        self.write(&mut bytes, false).map_err(|_| core::fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&bytes))
    }
}
