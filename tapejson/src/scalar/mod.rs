// SPDX-License-Identifier: Apache-2.0

//! Decoding of token spans into native scalars and encoding of native scalars
//! straight into a [`BufferWriter`].

use crate::buffer::{BufferReader, BufferWriter};
use crate::error::{CodecError, SyntaxFault, MAX_FAULT_TEXT};
use crate::token::{Token, TokenType};

pub mod number;
pub mod string;

pub use number::{
    decode_f32, decode_integer, decode_number, encode_f32, encode_f64, encode_i128, encode_i64,
    encode_u128, encode_u64,
};
pub use string::{decode_string, encode_str};

/// Spans up to this length are copied to the stack rather than the heap.
const INLINE_SPAN: usize = 64;

pub fn decode_bool<R: BufferReader + ?Sized>(
    token: &Token,
    reader: &R,
) -> Result<bool, CodecError> {
    match token.kind {
        TokenType::True => Ok(true),
        TokenType::False => Ok(false),
        _ => Err(mismatch("boolean", token, reader).into()),
    }
}

pub fn decode_null<R: BufferReader + ?Sized>(token: &Token, reader: &R) -> Result<(), CodecError> {
    match token.kind {
        TokenType::Null => Ok(()),
        _ => Err(mismatch("null", token, reader).into()),
    }
}

pub fn encode_bool<W: BufferWriter + ?Sized>(
    value: bool,
    writer: &mut W,
) -> Result<(), CodecError> {
    let literal: &[u8] = if value { b"true" } else { b"false" };
    writer.write_bytes(literal)?;
    Ok(())
}

pub fn encode_null<W: BufferWriter + ?Sized>(writer: &mut W) -> Result<(), CodecError> {
    writer.write_bytes(b"null")?;
    Ok(())
}

/// Fails unless `token` is of the expected kind.
pub(crate) fn expect_kind<R: BufferReader + ?Sized>(
    token: &Token,
    kind: TokenType,
    reader: &R,
) -> Result<(), SyntaxFault> {
    if token.kind == kind {
        Ok(())
    } else {
        Err(mismatch(kind.as_str(), token, reader))
    }
}

pub(crate) fn mismatch<R: BufferReader + ?Sized>(
    expected: &str,
    token: &Token,
    reader: &R,
) -> SyntaxFault {
    SyntaxFault::new(
        format!("Expected {expected}, found {}", token.kind),
        &token_text(token, reader),
        token.begin,
    )
}

/// The first few bytes of a token's span, for diagnostics.
pub(crate) fn token_text<R: BufferReader + ?Sized>(token: &Token, reader: &R) -> Vec<u8> {
    let mut text = vec![0u8; token.len().min(MAX_FAULT_TEXT + 3)];
    if reader.get_bytes(token.begin, &mut text).is_err() {
        text.clear();
    }
    text
}

/// Copies the raw span of `token` out of the reader and hands it to `f`.
pub(crate) fn with_span<R, T, F>(token: &Token, reader: &R, f: F) -> Result<T, CodecError>
where
    R: BufferReader + ?Sized,
    F: FnOnce(&mut [u8]) -> Result<T, CodecError>,
{
    let len = token.len();
    if len <= INLINE_SPAN {
        let mut inline = [0u8; INLINE_SPAN];
        let span = &mut inline[..len];
        reader.get_bytes(token.begin, span)?;
        f(span)
    } else {
        let mut heap = vec![0u8; len];
        reader.get_bytes(token.begin, &mut heap)?;
        f(&mut heap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SliceReader;
    use test_log::test;

    #[test]
    fn test_bool_and_null() {
        let reader = SliceReader::from("true false null");
        let t = Token::scalar(TokenType::True, 0, 4);
        let f = Token::scalar(TokenType::False, 5, 10);
        let n = Token::scalar(TokenType::Null, 11, 15);

        assert_eq!(decode_bool(&t, &reader), Ok(true));
        assert_eq!(decode_bool(&f, &reader), Ok(false));
        assert_eq!(decode_null(&n, &reader), Ok(()));

        let err = decode_bool(&n, &reader).unwrap_err();
        let fault = err.as_syntax().unwrap();
        assert_eq!(fault.message(), "Expected boolean, found null");
        assert_eq!(fault.value(), "null");
        assert_eq!(fault.offset(), 11);

        assert!(decode_null(&t, &reader).is_err());
    }

    #[test]
    fn test_encode_literals() {
        let mut out: Vec<u8> = Vec::new();
        encode_bool(true, &mut out).unwrap();
        out.push(b',');
        encode_bool(false, &mut out).unwrap();
        out.push(b',');
        encode_null(&mut out).unwrap();
        assert_eq!(out, b"true,false,null");
    }

    #[test]
    fn test_with_span_large() {
        let text = "x".repeat(INLINE_SPAN * 2);
        let reader = SliceReader::from(text.as_str());
        let token = Token::scalar(TokenType::String, 1, text.len());
        let len = with_span(&token, &reader, |span| Ok(span.len())).unwrap();
        assert_eq!(len, text.len() - 1);

        let past_end = Token::scalar(TokenType::String, 1, text.len() + 1);
        assert!(matches!(
            with_span(&past_end, &reader, |span| Ok(span.len())),
            Err(CodecError::OutOfBounds(_))
        ));
    }
}
