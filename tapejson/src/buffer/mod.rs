// SPDX-License-Identifier: Apache-2.0

//! Offset-tracked cursors over contiguous byte ranges.
//!
//! The tokenizer, the tape cursor and the encoders only ever talk to a
//! [`BufferReader`] or a [`BufferWriter`], so the same codec runs over a plain
//! byte slice, a `Vec<u8>` or a pooled network buffer.

use crate::error::OutOfBounds;

#[cfg(feature = "bytes")]
mod pooled;
mod slice;

#[cfg(feature = "bytes")]
pub use pooled::BytesReader;
pub use slice::{SliceReader, SliceWriter};

/// Read side of a contiguous byte range.
///
/// Implementors provide the offset bookkeeping and offset-addressed access;
/// the sequential operations are derived from those.
pub trait BufferReader {
    /// Current read offset.
    fn read_offset(&self) -> usize;

    /// Repositions the read offset. Fails if `offset` is past [`limit`](Self::limit).
    fn set_read_offset(&mut self, offset: usize) -> Result<(), OutOfBounds>;

    /// Length of the addressable range.
    fn limit(&self) -> usize;

    /// Copies `target.len()` bytes starting at `offset` without moving the cursor.
    fn get_bytes(&self, offset: usize, target: &mut [u8]) -> Result<(), OutOfBounds>;

    /// Bytes remaining between the read offset and the limit.
    fn readable_bytes(&self) -> usize {
        self.limit().saturating_sub(self.read_offset())
    }

    /// Byte at `offset`, cursor untouched.
    fn get_byte(&self, offset: usize) -> Result<u8, OutOfBounds> {
        let mut byte = [0u8; 1];
        self.get_bytes(offset, &mut byte)?;
        Ok(byte[0])
    }

    /// Byte at the read offset, without advancing.
    fn peek_byte(&self) -> Result<u8, OutOfBounds> {
        self.get_byte(self.read_offset())
    }

    /// Byte at the read offset, advancing past it.
    fn read_byte(&mut self) -> Result<u8, OutOfBounds> {
        let byte = self.peek_byte()?;
        self.skip_bytes(1)?;
        Ok(byte)
    }

    /// Fills `target` from the read offset and advances by its length.
    fn read_bytes(&mut self, target: &mut [u8]) -> Result<(), OutOfBounds> {
        let offset = self.read_offset();
        self.get_bytes(offset, target)?;
        self.skip_bytes(target.len())
    }

    /// Advances `n` bytes without reading them.
    fn skip_bytes(&mut self, n: usize) -> Result<(), OutOfBounds> {
        let offset = self.read_offset();
        OutOfBounds::check(offset, n, self.limit())?;
        self.set_read_offset(offset + n)
    }
}

/// Write side of a byte sink.
pub trait BufferWriter {
    /// Current write offset, i.e. the number of bytes written so far.
    fn write_offset(&self) -> usize;

    /// Moves the write offset back (discarding what follows) or, for
    /// fixed-capacity sinks, anywhere within capacity.
    fn set_write_offset(&mut self, offset: usize) -> Result<(), OutOfBounds>;

    /// Appends `bytes`, advancing the write offset.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), OutOfBounds>;

    fn write_byte(&mut self, byte: u8) -> Result<(), OutOfBounds> {
        self.write_bytes(&[byte])
    }
}

impl<R: BufferReader + ?Sized> BufferReader for &mut R {
    fn read_offset(&self) -> usize {
        (**self).read_offset()
    }
    fn set_read_offset(&mut self, offset: usize) -> Result<(), OutOfBounds> {
        (**self).set_read_offset(offset)
    }
    fn limit(&self) -> usize {
        (**self).limit()
    }
    fn get_bytes(&self, offset: usize, target: &mut [u8]) -> Result<(), OutOfBounds> {
        (**self).get_bytes(offset, target)
    }
}

impl<W: BufferWriter + ?Sized> BufferWriter for &mut W {
    fn write_offset(&self) -> usize {
        (**self).write_offset()
    }
    fn set_write_offset(&mut self, offset: usize) -> Result<(), OutOfBounds> {
        (**self).set_write_offset(offset)
    }
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), OutOfBounds> {
        (**self).write_bytes(bytes)
    }
}

/// Growable sink: the write offset is the vector length.
impl BufferWriter for Vec<u8> {
    fn write_offset(&self) -> usize {
        self.len()
    }

    fn set_write_offset(&mut self, offset: usize) -> Result<(), OutOfBounds> {
        OutOfBounds::check(offset, 0, self.len())?;
        self.truncate(offset);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), OutOfBounds> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Adapter letting `core::fmt` machinery render straight into a writer.
///
/// The first [`OutOfBounds`] raised by the sink is kept so callers can report
/// it instead of the opaque `fmt::Error`.
pub(crate) struct FmtSink<'w, W: BufferWriter + ?Sized> {
    writer: &'w mut W,
    pub(crate) error: Option<OutOfBounds>,
}

impl<'w, W: BufferWriter + ?Sized> FmtSink<'w, W> {
    pub(crate) fn new(writer: &'w mut W) -> Self {
        Self {
            writer,
            error: None,
        }
    }
}

impl<W: BufferWriter + ?Sized> core::fmt::Write for FmtSink<'_, W> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.writer.write_bytes(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            core::fmt::Error
        })
    }
}

/// Renders `args` directly into `writer`, without an intermediate `String`.
pub(crate) fn write_fmt<W: BufferWriter + ?Sized>(
    writer: &mut W,
    args: core::fmt::Arguments<'_>,
) -> Result<(), OutOfBounds> {
    let mut sink = FmtSink::new(writer);
    let result = core::fmt::Write::write_fmt(&mut sink, args);
    let error = sink.error.take();
    match (result, error) {
        (Ok(()), _) => Ok(()),
        (Err(_), Some(error)) => Err(error),
        (Err(_), None) => {
            let offset = writer.write_offset();
            Err(OutOfBounds {
                offset,
                requested: 0,
                limit: offset,
            })
        }
    }
}
