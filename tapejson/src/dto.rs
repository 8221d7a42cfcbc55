// SPDX-License-Identifier: Apache-2.0

//! Typed decode/encode of data-transfer objects.
//!
//! A DTO implements [`Decode`] by walking a [`TapeCursor`] and [`Encode`] by
//! writing straight into a [`BufferWriter`], usually through
//! [`ObjectWriter`] and [`ArrayWriter`].
//!
//! ```
//! use tapejson::{
//!     BufferReader, BufferWriter, CodecError, Decode, Encode, ObjectWriter, TapeCursor,
//! };
//!
//! #[derive(Debug, PartialEq)]
//! struct Endpoint {
//!     host: String,
//!     port: u16,
//! }
//!
//! impl Decode for Endpoint {
//!     fn decode<R: BufferReader + ?Sized>(
//!         cursor: &mut TapeCursor<'_, R>,
//!     ) -> Result<Self, CodecError> {
//!         let object = cursor.peek()?;
//!         let (mut host, mut port) = (None, None);
//!         for _ in 0..cursor.begin_object()? {
//!             match cursor.read_key()?.as_str() {
//!                 "host" => host = Some(cursor.read_string()?),
//!                 "port" => port = Some(cursor.read_integer()?),
//!                 _ => cursor.skip_value()?,
//!             }
//!         }
//!         Ok(Endpoint {
//!             host: host.ok_or_else(|| tapejson::missing_field("host", &object))?,
//!             port: port.ok_or_else(|| tapejson::missing_field("port", &object))?,
//!         })
//!     }
//! }
//!
//! impl Encode for Endpoint {
//!     fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
//!         let mut object = ObjectWriter::new(writer)?;
//!         object.field("host", &self.host)?;
//!         object.field("port", &self.port)?;
//!         object.finish()
//!     }
//! }
//!
//! let json = r#"{"port":8443,"tls":true,"host":"core"}"#;
//! let endpoint: Endpoint = tapejson::from_str(json).unwrap();
//! assert_eq!(endpoint, Endpoint { host: "core".into(), port: 8443 });
//! assert_eq!(tapejson::to_string(&endpoint).unwrap(), r#"{"host":"core","port":8443}"#);
//! ```

use crate::buffer::{BufferReader, BufferWriter, SliceReader};
use crate::error::{CodecError, EncodeFault, SyntaxFault};
use crate::scalar;
use crate::tape::{Tape, TapeCursor};
use crate::token::Token;
use crate::tokenizer::tokenize;

/// A type that can be read from the tape, consuming exactly one value.
pub trait Decode: Sized {
    fn decode<R: BufferReader + ?Sized>(cursor: &mut TapeCursor<'_, R>) -> Result<Self, CodecError>;
}

/// A type that can write itself as one JSON value.
pub trait Encode {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError>;
}

/// Decodes the whole tape as one `T`.
pub fn decode_one<T, R>(tape: &Tape, reader: &R) -> Result<T, CodecError>
where
    T: Decode,
    R: BufferReader + ?Sized,
{
    let mut cursor = tape.cursor(reader);
    let value = T::decode(&mut cursor)?;
    expect_end(&cursor)?;
    Ok(value)
}

/// Decodes a top-level array, each element independently as a `T`.
pub fn decode_many<T, R>(tape: &Tape, reader: &R) -> Result<Vec<T>, CodecError>
where
    T: Decode,
    R: BufferReader + ?Sized,
{
    let mut cursor = tape.cursor(reader);
    let values = Vec::<T>::decode(&mut cursor)?;
    expect_end(&cursor)?;
    Ok(values)
}

fn expect_end<R: BufferReader + ?Sized>(cursor: &TapeCursor<'_, R>) -> Result<(), CodecError> {
    if cursor.at_end() {
        return Ok(());
    }
    let token = cursor.peek()?;
    Err(SyntaxFault::new(
        "Unconsumed tokens",
        cursor.token_text(&token).as_bytes(),
        token.begin,
    )
    .into())
}

pub fn encode_one<T, W>(value: &T, writer: &mut W) -> Result<(), CodecError>
where
    T: Encode + ?Sized,
    W: BufferWriter + ?Sized,
{
    value.encode(writer)
}

/// Writes `values` as one JSON array.
pub fn encode_many<T, W>(values: &[T], writer: &mut W) -> Result<(), CodecError>
where
    T: Encode,
    W: BufferWriter + ?Sized,
{
    values.encode(writer)
}

/// Tokenizes and decodes a complete document.
pub fn from_slice<T: Decode>(json: &[u8]) -> Result<T, CodecError> {
    let mut reader = SliceReader::new(json);
    let tape = tokenize(&mut reader)?;
    decode_one(&tape, &reader)
}

pub fn from_str<T: Decode>(json: &str) -> Result<T, CodecError> {
    from_slice(json.as_bytes())
}

pub fn to_vec<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    value.encode(&mut out)?;
    Ok(out)
}

pub fn to_string<T: Encode + ?Sized>(value: &T) -> Result<String, CodecError> {
    let bytes = to_vec(value)?;
    // Encoders only emit UTF-8.
    String::from_utf8(bytes).map_err(|e| {
        let offset = e.utf8_error().valid_up_to();
        EncodeFault::new("Invalid UTF-8", &String::from_utf8_lossy(e.as_bytes()), offset).into()
    })
}

/// Fault for a required DTO member absent from `object`.
pub fn missing_field(name: &str, object: &Token) -> CodecError {
    SyntaxFault::new(format!("Missing field '{name}'"), b"", object.begin).into()
}

/// Writes the members of one JSON object.
///
/// The opening brace is written by [`new`](Self::new) and the closing one by
/// [`finish`](Self::finish).
pub struct ObjectWriter<'w, W: ?Sized> {
    writer: &'w mut W,
    first: bool,
}

impl<'w, W: BufferWriter + ?Sized> ObjectWriter<'w, W> {
    pub fn new(writer: &'w mut W) -> Result<Self, CodecError> {
        writer.write_byte(b'{')?;
        Ok(Self {
            writer,
            first: true,
        })
    }

    pub fn field<T: Encode + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), CodecError> {
        if !self.first {
            self.writer.write_byte(b',')?;
        }
        self.first = false;
        scalar::encode_str(name, &mut *self.writer)?;
        self.writer.write_byte(b':')?;
        value.encode(&mut *self.writer)
    }

    /// Writes the member only when `value` is present.
    pub fn optional_field<T: Encode>(
        &mut self,
        name: &str,
        value: Option<&T>,
    ) -> Result<(), CodecError> {
        match value {
            Some(value) => self.field(name, value),
            None => Ok(()),
        }
    }

    pub fn finish(self) -> Result<(), CodecError> {
        self.writer.write_byte(b'}')?;
        Ok(())
    }
}

/// Writes the elements of one JSON array.
pub struct ArrayWriter<'w, W: ?Sized> {
    writer: &'w mut W,
    first: bool,
}

impl<'w, W: BufferWriter + ?Sized> ArrayWriter<'w, W> {
    pub fn new(writer: &'w mut W) -> Result<Self, CodecError> {
        writer.write_byte(b'[')?;
        Ok(Self {
            writer,
            first: true,
        })
    }

    pub fn element<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        if !self.first {
            self.writer.write_byte(b',')?;
        }
        self.first = false;
        value.encode(&mut *self.writer)
    }

    pub fn finish(self) -> Result<(), CodecError> {
        self.writer.write_byte(b']')?;
        Ok(())
    }
}

impl Decode for bool {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        cursor.read_bool()
    }
}

impl Encode for bool {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        scalar::encode_bool(*self, writer)
    }
}

impl Decode for () {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        cursor.read_null()
    }
}

impl Encode for () {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        scalar::encode_null(writer)
    }
}

macro_rules! integer_codec {
    ($encode:ident as $wide:ty: $($t:ty)*) => {$(
        impl Decode for $t {
            fn decode<R: BufferReader + ?Sized>(
                cursor: &mut TapeCursor<'_, R>,
            ) -> Result<Self, CodecError> {
                cursor.read_integer()
            }
        }

        impl Encode for $t {
            fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
                scalar::$encode(*self as $wide, writer)
            }
        }
    )*};
}

integer_codec!(encode_i128 as i128: i8 i16 i32 i64 i128 isize);
integer_codec!(encode_u128 as u128: u8 u16 u32 u64 u128 usize);

impl Decode for f64 {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        cursor.read_f64()
    }
}

impl Encode for f64 {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        scalar::encode_f64(*self, writer)
    }
}

impl Decode for f32 {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        let token = cursor.next()?;
        scalar::decode_f32(&token, cursor.source())
    }
}

impl Encode for f32 {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        scalar::encode_f32(*self, writer)
    }
}

impl Decode for String {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        cursor.read_string()
    }
}

impl Encode for String {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        scalar::encode_str(self, writer)
    }
}

impl Encode for str {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        scalar::encode_str(self, writer)
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        if cursor.is_null()? {
            cursor.read_null()?;
            Ok(None)
        } else {
            T::decode(cursor).map(Some)
        }
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        match self {
            Some(value) => value.encode(writer),
            None => scalar::encode_null(writer),
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        let count = cursor.begin_array()?;
        // The count comes from the tape, so it never exceeds the tokens left.
        let mut values = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            values.push(T::decode(cursor)?);
        }
        Ok(values)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        let mut array = ArrayWriter::new(writer)?;
        for value in self {
            array.element(value)?;
        }
        array.finish()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        self.as_slice().encode(writer)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        T::decode(cursor).map(Box::new)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        (**self).encode(writer)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        (**self).encode(writer)
    }
}
