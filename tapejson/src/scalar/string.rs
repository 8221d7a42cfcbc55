// SPDX-License-Identifier: Apache-2.0

use crate::buffer::{BufferReader, BufferWriter};
use crate::error::{CodecError, SyntaxFault};
use crate::scalar::{expect_kind, with_span};
use crate::token::{Token, TokenType};

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Decodes a STRING token, resolving escape sequences.
pub fn decode_string<R: BufferReader + ?Sized>(
    token: &Token,
    reader: &R,
) -> Result<String, CodecError> {
    expect_kind(token, TokenType::String, reader)?;
    with_span(token, reader, |raw| Ok(unescape(raw, token.begin)?))
}

/// Resolves the escapes of raw string content found at `offset` in the source.
///
/// `\uXXXX` escapes are decoded one at a time. A surrogate half is never
/// combined with its neighbour and decodes to U+FFFD.
pub fn unescape(raw: &[u8], offset: usize) -> Result<String, SyntaxFault> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let run = raw[i..]
            .iter()
            .position(|&b| b == b'\\')
            .unwrap_or(raw.len() - i);
        out.extend_from_slice(&raw[i..i + run]);
        i += run;
        if i == raw.len() {
            break;
        }

        let bad_escape = |len: usize| {
            let mut end = raw.len().min(i + len);
            // Keep a multi-byte character after the backslash whole.
            while end < raw.len() && (raw[end] & 0xC0) == 0x80 {
                end += 1;
            }
            SyntaxFault::new("Bad escape", &raw[i..end], offset + i)
        };
        let unescaped = match raw.get(i + 1) {
            Some(b'"') => b'"',
            Some(b'\\') => b'\\',
            Some(b'/') => b'/',
            Some(b'b') => 0x08,
            Some(b'f') => 0x0C,
            Some(b'n') => b'\n',
            Some(b'r') => b'\r',
            Some(b't') => b'\t',
            Some(b'u') => {
                let code = raw
                    .get(i + 2..i + 6)
                    .and_then(hex_quad)
                    .ok_or_else(|| bad_escape(6))?;
                let ch = char::from_u32(u32::from(code)).unwrap_or(char::REPLACEMENT_CHARACTER);
                let mut utf8 = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                i += 6;
                continue;
            }
            _ => return Err(bad_escape(2)),
        };
        out.push(unescaped);
        i += 2;
    }
    String::from_utf8(out).map_err(|_| SyntaxFault::new("Invalid UTF-8", raw, offset))
}

fn hex_quad(digits: &[u8]) -> Option<u16> {
    digits.iter().try_fold(0u16, |acc, &d| {
        let nibble = (d as char).to_digit(16)?;
        Some(acc << 4 | nibble as u16)
    })
}

fn escape_of(byte: u8) -> Option<&'static [u8]> {
    Some(match byte {
        b'"' => b"\\\"",
        b'\\' => b"\\\\",
        0x08 => b"\\b",
        0x0C => b"\\f",
        b'\n' => b"\\n",
        b'\r' => b"\\r",
        b'\t' => b"\\t",
        _ => return None,
    })
}

/// Writes `value` as a quoted JSON string.
///
/// Unescaped runs are copied as-is; control bytes without a short escape are
/// written as `\u00XX`.
pub fn encode_str<W: BufferWriter + ?Sized>(
    value: &str,
    writer: &mut W,
) -> Result<(), CodecError> {
    let bytes = value.as_bytes();
    writer.write_byte(b'"')?;
    let mut run_start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let short = escape_of(byte);
        if short.is_none() && byte >= 0x20 {
            continue;
        }
        writer.write_bytes(&bytes[run_start..i])?;
        run_start = i + 1;
        match short {
            Some(escape) => writer.write_bytes(escape)?,
            None => writer.write_bytes(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[usize::from(byte >> 4)],
                HEX[usize::from(byte & 0x0F)],
            ])?,
        }
    }
    writer.write_bytes(&bytes[run_start..])?;
    writer.write_byte(b'"')?;
    Ok(())
}
