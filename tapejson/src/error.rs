// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;

/// Longest slice of offending input carried by a fault, in bytes.
pub const MAX_FAULT_TEXT: usize = 32;

/// Malformed input detected while tokenizing or decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}: {value:?}")]
pub struct SyntaxFault {
    message: Cow<'static, str>,
    value: String,
    offset: usize,
}

impl SyntaxFault {
    pub fn new(message: impl Into<Cow<'static, str>>, value: &[u8], offset: usize) -> Self {
        Self {
            message: message.into(),
            value: fault_text(value),
            offset,
        }
    }

    /// Short diagnostic message, e.g. `"Bad escape"`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The offending input, truncated to [`MAX_FAULT_TEXT`] bytes.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Byte offset into the source where the fault was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// A value that has no JSON representation was handed to an encoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}: {value:?}")]
pub struct EncodeFault {
    message: Cow<'static, str>,
    value: String,
    offset: usize,
}

impl EncodeFault {
    pub fn new(message: impl Into<Cow<'static, str>>, value: &str, offset: usize) -> Self {
        Self {
            message: message.into(),
            value: fault_text(value.as_bytes()),
            offset,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Write offset of the sink when the fault was raised.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// A buffer cursor was asked to address bytes outside its range.
///
/// This is a contract violation by the caller, not a property of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("out of bounds: {requested} byte(s) at offset {offset}, limit {limit}")]
pub struct OutOfBounds {
    pub offset: usize,
    pub requested: usize,
    pub limit: usize,
}

impl OutOfBounds {
    pub(crate) fn check(offset: usize, requested: usize, limit: usize) -> Result<(), Self> {
        match offset.checked_add(requested) {
            Some(end) if end <= limit => Ok(()),
            _ => Err(Self {
                offset,
                requested,
                limit,
            }),
        }
    }
}

/// Every failure a decode or encode entry point can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("syntax fault: {0}")]
    Syntax(#[from] SyntaxFault),
    #[error("encode fault: {0}")]
    Encode(#[from] EncodeFault),
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBounds),
}

impl CodecError {
    pub fn as_syntax(&self) -> Option<&SyntaxFault> {
        match self {
            CodecError::Syntax(fault) => Some(fault),
            _ => None,
        }
    }

    pub fn as_encode(&self) -> Option<&EncodeFault> {
        match self {
            CodecError::Encode(fault) => Some(fault),
            _ => None,
        }
    }
}

/// Bounded, lossy rendering of offending input for diagnostics.
fn fault_text(bytes: &[u8]) -> String {
    let mut end = bytes.len().min(MAX_FAULT_TEXT);
    // Extend to a char boundary so a multi-byte sequence is not split.
    while end < bytes.len() && end < MAX_FAULT_TEXT + 3 && (bytes[end] & 0xC0) == 0x80 {
        end += 1;
    }
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
