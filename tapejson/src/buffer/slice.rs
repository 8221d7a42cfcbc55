// SPDX-License-Identifier: Apache-2.0

use super::{BufferReader, BufferWriter};
use crate::error::OutOfBounds;

/// A reader over a borrowed byte slice and a read position.
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// The whole underlying slice, independent of the read position.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Bounds-checked view of `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<&'a [u8], OutOfBounds> {
        self.data.get(start..end).ok_or(OutOfBounds {
            offset: start,
            requested: end.saturating_sub(start),
            limit: self.data.len(),
        })
    }
}

impl<'a> From<&'a [u8]> for SliceReader<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl<'a> From<&'a str> for SliceReader<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl BufferReader for SliceReader<'_> {
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

    fn get_byte(&self, offset: usize) -> Result<u8, OutOfBounds> {
        self.data.get(offset).copied().ok_or(OutOfBounds {
            offset,
            requested: 1,
            limit: self.data.len(),
        })
    }
}

/// A fixed-capacity writer over a borrowed mutable slice.
///
/// Unlike `Vec<u8>`, writes past the end of the slice fail.
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

impl BufferWriter for SliceWriter<'_> {
    fn write_offset(&self) -> usize {
        self.pos
    }

    fn set_write_offset(&mut self, offset: usize) -> Result<(), OutOfBounds> {
        OutOfBounds::check(offset, 0, self.buf.len())?;
        self.pos = offset;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), OutOfBounds> {
        OutOfBounds::check(self.pos, bytes.len(), self.buf.len())?;
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}
