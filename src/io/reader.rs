//! Bounds-checked, endian-aware random access over a [`ByteSource`].
//!
//! Every read validates the requested range before the source is touched and
//! reports violations as [`BoundsError`]. Multi-byte values are assembled from
//! single-byte fetches according to the reader's current [`ByteOrder`], which
//! defaults to big-endian (Motorola) and may be toggled at any time.

use bytes::Bytes;
use serde::Serialize;

use super::charset::Charset;
use super::source::{ByteArraySource, ByteSource};
use crate::error::{BoundsError, ReadError};

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) applied to multi-byte reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    #[default]
    BigEndian,
}

impl ByteOrder {
    /// The other byte order.
    pub const fn opposite(self) -> Self {
        match self {
            ByteOrder::LittleEndian => ByteOrder::BigEndian,
            ByteOrder::BigEndian => ByteOrder::LittleEndian,
        }
    }

    /// Read a u16 from a byte slice using this byte order.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 2 bytes.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        let raw = [bytes[0], bytes[1]];
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(raw),
            ByteOrder::BigEndian => u16::from_be_bytes(raw),
        }
    }

    /// Read a 24-bit unsigned value from a byte slice using this byte order.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 3 bytes.
    #[inline]
    pub fn read_u24(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]),
            ByteOrder::BigEndian => u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 4 bytes.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(raw),
            ByteOrder::BigEndian => u32::from_be_bytes(raw),
        }
    }

    /// Read a u64 from a byte slice using this byte order.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 8 bytes.
    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        let raw = [
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ];
        match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(raw),
            ByteOrder::BigEndian => u64::from_be_bytes(raw),
        }
    }
}

// =============================================================================
// RandomAccessReader
// =============================================================================

/// Reads primitive values at arbitrary indices of a [`ByteSource`].
pub struct RandomAccessReader<S> {
    source: S,
    byte_order: ByteOrder,
}

impl RandomAccessReader<ByteArraySource> {
    /// Reader over an in-memory buffer.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(ByteArraySource::new(data))
    }
}

impl<S: ByteSource> RandomAccessReader<S> {
    /// Create a big-endian reader over `source`.
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

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Total length of the source.
    ///
    /// For stream-backed sources this reads the stream to its end.
    pub fn length(&mut self) -> Result<u64, ReadError> {
        self.source.length()
    }

    /// Check that `count` bytes starting at `index` can be read.
    ///
    /// Returns the index as an unsigned offset on success.
    pub fn validate(&mut self, index: i64, count: i64) -> Result<u64, ReadError> {
        if index < 0 {
            return Err(BoundsError::NegativeIndex {
                index,
                requested: count,
                length: self.source.available(),
            }
            .into());
        }
        if count < 0 {
            return Err(BoundsError::NegativeCount {
                index,
                requested: count,
                length: self.source.available(),
            }
            .into());
        }
        let start = index as u64;
        if self.source.ensure(start, count as u64)? {
            Ok(start)
        } else {
            Err(BoundsError::PastEnd {
                index,
                requested: count,
                length: self.source.available(),
            }
            .into())
        }
    }

    /// Non-failing form of [`validate`](Self::validate).
    pub fn is_valid_range(&mut self, index: i64, count: i64) -> bool {
        self.validate(index, count).is_ok()
    }

    fn fetch<const N: usize>(&mut self, index: i64) -> Result<[u8; N], ReadError> {
        let start = self.validate(index, N as i64)?;
        let mut buf = [0u8; N];
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.source.byte_at(start + i as u64)?;
        }
        Ok(buf)
    }

    pub fn get_u8(&mut self, index: i64) -> Result<u8, ReadError> {
        Ok(self.fetch::<1>(index)?[0])
    }

    pub fn get_i8(&mut self, index: i64) -> Result<i8, ReadError> {
        Ok(self.get_u8(index)? as i8)
    }

    pub fn get_u16(&mut self, index: i64) -> Result<u16, ReadError> {
        let bytes = self.fetch::<2>(index)?;
        Ok(self.byte_order.read_u16(&bytes))
    }

    pub fn get_i16(&mut self, index: i64) -> Result<i16, ReadError> {
        Ok(self.get_u16(index)? as i16)
    }

    pub fn get_u24(&mut self, index: i64) -> Result<u32, ReadError> {
        let bytes = self.fetch::<3>(index)?;
        Ok(self.byte_order.read_u24(&bytes))
    }

    /// Signed 24-bit value, sign-extended to 32 bits.
    pub fn get_i24(&mut self, index: i64) -> Result<i32, ReadError> {
        Ok(((self.get_u24(index)? << 8) as i32) >> 8)
    }

    pub fn get_u32(&mut self, index: i64) -> Result<u32, ReadError> {
        let bytes = self.fetch::<4>(index)?;
        Ok(self.byte_order.read_u32(&bytes))
    }

    pub fn get_i32(&mut self, index: i64) -> Result<i32, ReadError> {
        Ok(self.get_u32(index)? as i32)
    }

    pub fn get_u64(&mut self, index: i64) -> Result<u64, ReadError> {
        let bytes = self.fetch::<8>(index)?;
        Ok(self.byte_order.read_u64(&bytes))
    }

    pub fn get_i64(&mut self, index: i64) -> Result<i64, ReadError> {
        Ok(self.get_u64(index)? as i64)
    }

    pub fn get_f32(&mut self, index: i64) -> Result<f32, ReadError> {
        Ok(f32::from_bits(self.get_u32(index)?))
    }

    pub fn get_f64(&mut self, index: i64) -> Result<f64, ReadError> {
        Ok(f64::from_bits(self.get_u64(index)?))
    }

    /// Signed 16.16 fixed-point number.
    pub fn get_s15_fixed16(&mut self, index: i64) -> Result<f32, ReadError> {
        Ok((f64::from(self.get_i32(index)?) / 65536.0) as f32)
    }

    pub fn get_bytes(&mut self, index: i64, count: i64) -> Result<Bytes, ReadError> {
        let start = self.validate(index, count)?;
        self.source.bytes_at(start, count as usize)
    }

    pub fn get_string(&mut self, index: i64, count: i64, charset: Charset) -> Result<String, ReadError> {
        Ok(charset.decode(&self.get_bytes(index, count)?))
    }

    /// Bytes up to (excluding) the first NUL within `max_len` bytes.
    ///
    /// The whole `max_len` window must be readable.
    pub fn get_null_terminated_bytes(&mut self, index: i64, max_len: i64) -> Result<Bytes, ReadError> {
        let bytes = self.get_bytes(index, max_len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(bytes.slice(..end))
    }

    pub fn get_null_terminated_string(
        &mut self,
        index: i64,
        max_len: i64,
        charset: Charset,
    ) -> Result<String, ReadError> {
        Ok(charset.decode(&self.get_null_terminated_bytes(index, max_len)?))
    }
}
