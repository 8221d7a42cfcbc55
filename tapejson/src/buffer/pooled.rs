// SPDX-License-Identifier: Apache-2.0

//! Cursor adapters for the `bytes` crate, the buffer type network stacks hand
//! message bodies around in.

use bytes::{BufMut, Bytes, BytesMut};

use super::{BufferReader, BufferWriter};
use crate::error::OutOfBounds;

/// A reader over a shared, reference-counted [`Bytes`] buffer.
///
/// Cloning the reader is cheap and does not copy the payload; each clone has
/// its own read offset.
#[derive(Debug, Clone)]
pub struct BytesReader {
    data: Bytes,
    pos: usize,
}

impl BytesReader {
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// Releases the underlying buffer.
    pub fn into_inner(self) -> Bytes {
        self.data
    }

    /// Zero-copy view of `start..end` sharing the same allocation.
    pub fn slice(&self, start: usize, end: usize) -> Result<Bytes, OutOfBounds> {
        if start > end {
            return Err(OutOfBounds {
                offset: start,
                requested: 0,
                limit: self.data.len(),
            });
        }
        OutOfBounds::check(start, end - start, self.data.len())?;
        Ok(self.data.slice(start..end))
    }
}

impl From<Bytes> for BytesReader {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<BytesMut> for BytesReader {
    fn from(data: BytesMut) -> Self {
        Self::new(data.freeze())
    }
}

impl BufferReader for BytesReader {
    fn read_offset(&self) -> usize {
        self.pos
    }

    fn set_read_offset(&mut self, offset: usize) -> Result<(), OutOfBounds> {
        OutOfBounds::check(offset, 0, self.data.len())?;
        self.pos = offset;
        Ok(())
    }

    fn limit(&self) -> usize {
        self.data.len()
    }

    fn get_bytes(&self, offset: usize, target: &mut [u8]) -> Result<(), OutOfBounds> {
        OutOfBounds::check(offset, target.len(), self.data.len())?;
        target.copy_from_slice(&self.data[offset..offset + target.len()]);
        Ok(())
    }
}

/// `BytesMut` grows on demand, so writes only fail when repositioning.
impl BufferWriter for BytesMut {
    fn write_offset(&self) -> usize {
        self.len()
    }

    fn set_write_offset(&mut self, offset: usize) -> Result<(), OutOfBounds> {
        OutOfBounds::check(offset, 0, self.len())?;
        self.truncate(offset);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), OutOfBounds> {
        self.put_slice(bytes);
        Ok(())
    }
}
