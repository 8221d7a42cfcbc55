// SPDX-License-Identifier: Apache-2.0

//! Arbitrary-precision and temporal members of the value catalog.
//!
//! Numeric members travel as bare JSON numbers, temporal members as JSON
//! strings in their canonical ISO-8601 form. Each type also implements
//! [`FromStr`] and [`Display`] over that same text.

use core::fmt::Display;
use core::str::FromStr;

use crate::buffer::{write_fmt, BufferReader, BufferWriter};
use crate::error::{CodecError, SyntaxFault};
use crate::tape::TapeCursor;

mod numeric;
#[cfg(feature = "temporal")]
mod temporal;

pub use numeric::{BigDecimal, BigInteger, Year};
#[cfg(feature = "temporal")]
pub use temporal::{Duration, Instant, OffsetDateTime, Period, YearMonth, ZoneId, ZonedDateTime};

/// Text that is not the canonical form of a catalog type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}")]
pub struct ParseCatalogError {
    kind: &'static str,
}

impl ParseCatalogError {
    pub(crate) const fn new(kind: &'static str) -> Self {
        Self { kind }
    }

    /// Name of the type that failed to parse, e.g. `"duration"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

/// Reads a STRING token and parses its decoded content as `T`.
#[cfg_attr(not(feature = "temporal"), allow(dead_code))]
pub(crate) fn decode_text<T, R>(cursor: &mut TapeCursor<'_, R>) -> Result<T, CodecError>
where
    T: FromStr<Err = ParseCatalogError>,
    R: BufferReader + ?Sized,
{
    let token = cursor.peek()?;
    let text = cursor.read_string()?;
    text.parse().map_err(|e: ParseCatalogError| {
        SyntaxFault::new(e.to_string(), text.as_bytes(), token.begin).into()
    })
}

/// Writes the canonical text of `value` as a JSON string.
///
/// Canonical forms never contain bytes that need escaping.
#[cfg_attr(not(feature = "temporal"), allow(dead_code))]
pub(crate) fn encode_text<T, W>(value: &T, writer: &mut W) -> Result<(), CodecError>
where
    T: Display + ?Sized,
    W: BufferWriter + ?Sized,
{
    writer.write_byte(b'"')?;
    write_fmt(writer, format_args!("{value}"))?;
    writer.write_byte(b'"')?;
    Ok(())
}
