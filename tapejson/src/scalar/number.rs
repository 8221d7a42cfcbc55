// SPDX-License-Identifier: Apache-2.0

use core::str::FromStr;

use crate::buffer::{write_fmt, BufferReader, BufferWriter};
use crate::error::{CodecError, EncodeFault, SyntaxFault};
use crate::scalar::{expect_kind, with_span};
use crate::token::{Token, TokenType};

/// Scans `-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?` from the start of an input
/// addressed through `byte_at`.
///
/// Returns the length of the literal, or the index at which a required digit
/// was missing.
pub(crate) fn scan_number<F>(mut byte_at: F) -> Result<usize, usize>
where
    F: FnMut(usize) -> Option<u8>,
{
    let mut i = 0;
    if byte_at(0) == Some(b'-') {
        i = 1;
    }
    i = required_digits(&mut byte_at, i)?;
    if byte_at(i) == Some(b'.') {
        i = required_digits(&mut byte_at, i + 1)?;
    }
    if let Some(b'e' | b'E') = byte_at(i) {
        i += 1;
        if let Some(b'+' | b'-') = byte_at(i) {
            i += 1;
        }
        i = required_digits(&mut byte_at, i)?;
    }
    Ok(i)
}

fn required_digits<F>(byte_at: &mut F, from: usize) -> Result<usize, usize>
where
    F: FnMut(usize) -> Option<u8>,
{
    let mut i = from;
    while let Some(b'0'..=b'9') = byte_at(i) {
        i += 1;
    }
    if i == from {
        Err(from)
    } else {
        Ok(i)
    }
}

/// `0x…`/`0X…` with an optional sign. Many host parsers take these; JSON does not.
pub(crate) fn looks_hexadecimal(text: &[u8]) -> bool {
    let digits = text.strip_prefix(b"-").unwrap_or(text);
    matches!(digits, [b'0', b'x' | b'X', ..])
}

/// Checks that `text` is exactly one JSON number literal.
pub(crate) fn number_literal(text: &[u8], offset: usize) -> Result<&str, SyntaxFault> {
    if looks_hexadecimal(text) {
        return Err(SyntaxFault::new(
            "Hexadecimal numbers are not permitted",
            text,
            offset,
        ));
    }
    if scan_number(|i| text.get(i).copied()) != Ok(text.len()) {
        return Err(SyntaxFault::new("Invalid number", text, offset));
    }
    // The grammar above only admits ASCII.
    core::str::from_utf8(text).map_err(|_| SyntaxFault::new("Invalid number", text, offset))
}

fn parse_finite<T: FromStr>(
    text: &[u8],
    offset: usize,
    is_finite: fn(&T) -> bool,
) -> Result<T, SyntaxFault> {
    let literal = number_literal(text, offset)?;
    let value: T = literal
        .parse()
        .map_err(|_| SyntaxFault::new("Invalid number", text, offset))?;
    if !is_finite(&value) {
        return Err(SyntaxFault::new("Number out of range", text, offset));
    }
    Ok(value)
}

/// Parses a raw number literal found at `offset` into an `f64`.
pub fn parse_number(text: &[u8], offset: usize) -> Result<f64, SyntaxFault> {
    parse_finite(text, offset, |v: &f64| v.is_finite())
}

/// Parses a raw integer literal found at `offset`; fractions and exponents
/// are rejected rather than truncated.
pub fn parse_integer<T: FromStr>(text: &[u8], offset: usize) -> Result<T, SyntaxFault> {
    let literal = number_literal(text, offset)?;
    if literal.contains(['.', 'e', 'E']) {
        return Err(SyntaxFault::new("Expected integer", text, offset));
    }
    literal
        .parse()
        .map_err(|_| SyntaxFault::new("Integer out of range", text, offset))
}

/// Decodes a NUMBER token into an `f64`.
pub fn decode_number<R: BufferReader + ?Sized>(
    token: &Token,
    reader: &R,
) -> Result<f64, CodecError> {
    expect_kind(token, TokenType::Number, reader)?;
    with_span(token, reader, |text| Ok(parse_number(text, token.begin)?))
}

/// Decodes a NUMBER token into an `f32`, rounding the literal once.
pub fn decode_f32<R: BufferReader + ?Sized>(token: &Token, reader: &R) -> Result<f32, CodecError> {
    expect_kind(token, TokenType::Number, reader)?;
    with_span(token, reader, |text| {
        Ok(parse_finite(text, token.begin, |v: &f32| v.is_finite())?)
    })
}

/// Decodes a NUMBER token into any integer type, exactly.
pub fn decode_integer<T, R>(token: &Token, reader: &R) -> Result<T, CodecError>
where
    T: FromStr,
    R: BufferReader + ?Sized,
{
    expect_kind(token, TokenType::Number, reader)?;
    with_span(token, reader, |text| Ok(parse_integer(text, token.begin)?))
}

fn non_finite<W: BufferWriter + ?Sized>(text: &str, writer: &W) -> CodecError {
    EncodeFault::new("Non-finite number", text, writer.write_offset()).into()
}

/// Writes the shortest decimal text that reads back as the same `f64`.
pub fn encode_f64<W: BufferWriter + ?Sized>(value: f64, writer: &mut W) -> Result<(), CodecError> {
    if value.is_nan() {
        return Err(non_finite("NaN", writer));
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return Err(non_finite(text, writer));
    }
    // Debug formatting is shortest round-trip and switches to exponent
    // notation for very large or small magnitudes; both forms are valid JSON.
    write_fmt(writer, format_args!("{value:?}"))?;
    Ok(())
}

/// As [`encode_f64`], with the shortest text for the `f32` value.
pub fn encode_f32<W: BufferWriter + ?Sized>(value: f32, writer: &mut W) -> Result<(), CodecError> {
    if !value.is_finite() {
        return encode_f64(f64::from(value), writer);
    }
    write_fmt(writer, format_args!("{value:?}"))?;
    Ok(())
}

fn write_magnitude<W: BufferWriter + ?Sized>(
    mut magnitude: u128,
    negative: bool,
    writer: &mut W,
) -> Result<(), CodecError> {
    // u128::MAX has 39 digits, plus room for the sign.
    let mut digits = [0u8; 40];
    let mut pos = digits.len();
    loop {
        pos -= 1;
        digits[pos] = b'0' + (magnitude % 10) as u8;
        magnitude /= 10;
        if magnitude == 0 {
            break;
        }
    }
    if negative {
        pos -= 1;
        digits[pos] = b'-';
    }
    writer.write_bytes(&digits[pos..])?;
    Ok(())
}

pub fn encode_i128<W: BufferWriter + ?Sized>(
    value: i128,
    writer: &mut W,
) -> Result<(), CodecError> {
    write_magnitude(value.unsigned_abs(), value < 0, writer)
}

pub fn encode_u128<W: BufferWriter + ?Sized>(
    value: u128,
    writer: &mut W,
) -> Result<(), CodecError> {
    write_magnitude(value, false, writer)
}

pub fn encode_i64<W: BufferWriter + ?Sized>(value: i64, writer: &mut W) -> Result<(), CodecError> {
    encode_i128(i128::from(value), writer)
}

pub fn encode_u64<W: BufferWriter + ?Sized>(value: u64, writer: &mut W) -> Result<(), CodecError> {
    encode_u128(u128::from(value), writer)
}
