// SPDX-License-Identifier: Apache-2.0

use core::ops::Deref;
use core::str::FromStr;

use super::ParseCatalogError;
use crate::buffer::{BufferReader, BufferWriter};
use crate::dto::{Decode, Encode};
use crate::error::{CodecError, SyntaxFault};
use crate::scalar::number::{number_literal, scan_number};
use crate::scalar::{self, expect_kind, with_span};
use crate::tape::TapeCursor;
use crate::token::TokenType;

fn is_number_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    scan_number(|i| bytes.get(i).copied()) == Ok(bytes.len())
}

fn is_integer_literal(text: &str) -> bool {
    is_number_literal(text) && !text.contains(['.', 'e', 'E'])
}

/// Reads a NUMBER token's literal text without converting it.
fn decode_literal<T, R>(cursor: &mut TapeCursor<'_, R>) -> Result<T, CodecError>
where
    T: FromStr<Err = ParseCatalogError>,
    R: BufferReader + ?Sized,
{
    let token = cursor.next()?;
    expect_kind(&token, TokenType::Number, cursor.source())?;
    with_span(&token, cursor.source(), |text| {
        let literal = number_literal(text, token.begin)?;
        literal.parse().map_err(|e: ParseCatalogError| {
            SyntaxFault::new(e.to_string(), text, token.begin).into()
        })
    })
}

/// An integer of any magnitude, kept as its decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInteger(String);

impl BigInteger {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the value if it fits `T`.
    pub fn parse<T: FromStr>(&self) -> Result<T, T::Err> {
        self.0.parse()
    }
}

impl FromStr for BigInteger {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_integer_literal(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ParseCatalogError::new("big integer"))
        }
    }
}

impl From<i128> for BigInteger {
    fn from(value: i128) -> Self {
        Self(value.to_string())
    }
}

impl From<u128> for BigInteger {
    fn from(value: u128) -> Self {
        Self(value.to_string())
    }
}

impl Deref for BigInteger {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for BigInteger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Decode for BigInteger {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        decode_literal(cursor)
    }
}

impl Encode for BigInteger {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        writer.write_bytes(self.0.as_bytes())?;
        Ok(())
    }
}

/// A decimal of any precision, kept as its JSON number text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigDecimal(String);

impl BigDecimal {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Nearest `f64`; precision beyond it is lost.
    pub fn to_f64(&self) -> f64 {
        self.0.parse().unwrap_or(f64::NAN)
    }
}

impl FromStr for BigDecimal {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_number_literal(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ParseCatalogError::new("big decimal"))
        }
    }
}

impl From<BigInteger> for BigDecimal {
    fn from(value: BigInteger) -> Self {
        Self(value.0)
    }
}

impl Deref for BigDecimal {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Decode for BigDecimal {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        decode_literal(cursor)
    }
}

impl Encode for BigDecimal {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        writer.write_bytes(self.0.as_bytes())?;
        Ok(())
    }
}

/// A proleptic ISO calendar year, written as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(pub i32);

impl FromStr for Year {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_integer_literal(s) {
            return Err(ParseCatalogError::new("year"));
        }
        s.parse().map(Year).map_err(|_| ParseCatalogError::new("year"))
    }
}

impl core::fmt::Display for Year {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Decode for Year {
    fn decode<R: BufferReader + ?Sized>(
        cursor: &mut TapeCursor<'_, R>,
    ) -> Result<Self, CodecError> {
        cursor.read_integer().map(Year)
    }
}

impl Encode for Year {
    fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
        scalar::encode_i64(i64::from(self.0), writer)
    }
}
