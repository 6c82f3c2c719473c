use std::io::{self, ErrorKind, Read};

use bytes::Bytes;

use super::charset::Charset;
use super::reader::ByteOrder;
use crate::error::ReadError;

/// Cursor-based storage behind a [`SequentialReader`].
pub trait SequentialSource {
    /// Fill `buf` completely or fail with [`ReadError::EndOfData`].
    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), ReadError>;

    /// Advance by up to `count` bytes, stopping at the end of data.
    ///
    /// Returns the number of bytes actually skipped.
    fn skip_up_to(&mut self, count: u64) -> Result<u64, ReadError>;

    /// Bytes consumed so far.
    fn position(&self) -> u64;
}

/// Sequential cursor over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct SliceCursor {
    data: Bytes,
    pos: usize,
}

impl SliceCursor {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl SequentialSource for SliceCursor {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        if buf.len() > self.remaining() {
            return Err(ReadError::EndOfData {
                requested: buf.len() as u64,
                available: self.remaining() as u64,
            });
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }

    fn skip_up_to(&mut self, count: u64) -> Result<u64, ReadError> {
        let n = count.min(self.remaining() as u64);
        self.pos += n as usize;
        Ok(n)
    }

    fn position(&self) -> u64 {
        self.pos as u64
    }
}

/// Sequential cursor over any [`Read`] implementation.
pub struct StreamCursor<R> {
    inner: R,
    pos: u64,
}

impl<R: Read> StreamCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }
}

impl<R: Read> SequentialSource for StreamCursor<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.pos += filled as u64;
                    return Err(ReadError::EndOfData {
                        requested: buf.len() as u64,
                        available: filled as u64,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.pos += filled as u64;
        Ok(())
    }

    fn skip_up_to(&mut self, count: u64) -> Result<u64, ReadError> {
        let n = io::copy(&mut (&mut self.inner).take(count), &mut io::sink())?;
        self.pos += n;
        Ok(n)
    }

    fn position(&self) -> u64 {
        self.pos
    }
}

// =============================================================================
// SequentialReader
// =============================================================================

/// Reads primitive values from a forward-moving cursor.
///
/// Shares the primitive vocabulary of
/// [`RandomAccessReader`](super::RandomAccessReader) but consumes bytes as it
/// goes. Big-endian by default.
pub struct SequentialReader<S> {
    source: S,
    byte_order: ByteOrder,
}

impl SequentialReader<SliceCursor> {
    /// Reader over an in-memory buffer.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(SliceCursor::new(data))
    }
}

impl<R: Read> SequentialReader<StreamCursor<R>> {
    /// Reader over a stream.
    pub fn from_reader(inner: R) -> Self {
        Self::new(StreamCursor::new(inner))
    }
}

impl<S: SequentialSource> SequentialReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            byte_order: ByteOrder::BigEndian,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.source.position()
    }

    fn fetch<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut buf = [0u8; N];
        self.source.read_into(&mut buf)?;
        Ok(buf)
    }

    pub fn get_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.fetch::<1>()?[0])
    }

    pub fn get_i8(&mut self) -> Result<i8, ReadError> {
        Ok(self.get_u8()? as i8)
    }

    pub fn get_u16(&mut self) -> Result<u16, ReadError> {
        let bytes = self.fetch::<2>()?;
        Ok(self.byte_order.read_u16(&bytes))
    }

    pub fn get_i16(&mut self) -> Result<i16, ReadError> {
        Ok(self.get_u16()? as i16)
    }

    pub fn get_u24(&mut self) -> Result<u32, ReadError> {
        let bytes = self.fetch::<3>()?;
        Ok(self.byte_order.read_u24(&bytes))
    }

    pub fn get_i24(&mut self) -> Result<i32, ReadError> {
        Ok(((self.get_u24()? << 8) as i32) >> 8)
    }

    pub fn get_u32(&mut self) -> Result<u32, ReadError> {
        let bytes = self.fetch::<4>()?;
        Ok(self.byte_order.read_u32(&bytes))
    }

    pub fn get_i32(&mut self) -> Result<i32, ReadError> {
        Ok(self.get_u32()? as i32)
    }

    pub fn get_u64(&mut self) -> Result<u64, ReadError> {
        let bytes = self.fetch::<8>()?;
        Ok(self.byte_order.read_u64(&bytes))
    }

    pub fn get_i64(&mut self) -> Result<i64, ReadError> {
        Ok(self.get_u64()? as i64)
    }

    pub fn get_f32(&mut self) -> Result<f32, ReadError> {
        Ok(f32::from_bits(self.get_u32()?))
    }

    pub fn get_f64(&mut self) -> Result<f64, ReadError> {
        Ok(f64::from_bits(self.get_u64()?))
    }

    pub fn get_s15_fixed16(&mut self) -> Result<f32, ReadError> {
        Ok((f64::from(self.get_i32()?) / 65536.0) as f32)
    }

    pub fn get_bytes(&mut self, count: usize) -> Result<Bytes, ReadError> {
        let mut buf = vec![0u8; count];
        self.source.read_into(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    pub fn get_string(&mut self, count: usize, charset: Charset) -> Result<String, ReadError> {
        Ok(charset.decode(&self.get_bytes(count)?))
    }

    /// Bytes up to the first NUL, consuming at most `max_len` bytes.
    ///
    /// The terminator is consumed but not returned.
    pub fn get_null_terminated_bytes(&mut self, max_len: usize) -> Result<Bytes, ReadError> {
        let mut out = Vec::new();
        while out.len() < max_len {
            match self.get_u8()? {
                0 => break,
                b => out.push(b),
            }
        }
        Ok(Bytes::from(out))
    }

    pub fn get_null_terminated_string(&mut self, max_len: usize, charset: Charset) -> Result<String, ReadError> {
        Ok(charset.decode(&self.get_null_terminated_bytes(max_len)?))
    }

    /// Skip exactly `count` bytes.
    ///
    /// Fails with [`ReadError::EndOfData`] if the data ends first; the cursor
    /// is then left at the end.
    pub fn skip(&mut self, count: u64) -> Result<(), ReadError> {
        let skipped = self.source.skip_up_to(count)?;
        if skipped != count {
            return Err(ReadError::EndOfData {
                requested: count,
                available: skipped,
            });
        }
        Ok(())
    }

    /// Skip up to `count` bytes, clamping at the end of data.
    ///
    /// Returns whether the full count was skipped.
    pub fn try_skip(&mut self, count: u64) -> bool {
        matches!(self.source.skip_up_to(count), Ok(skipped) if skipped == count)
    }
}
