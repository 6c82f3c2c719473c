use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::error::{BoundsError, ReadError};

/// Random-access storage behind a [`RandomAccessReader`](super::RandomAccessReader).
///
/// Sources report availability rather than validating requests themselves:
/// sign checks and error construction live in the reader, so every source
/// produces the same [`BoundsError`] shapes.
pub trait ByteSource {
    /// Make `[index, index + count)` available, loading it if needed.
    ///
    /// Returns `Ok(false)` when the source ends before the range does.
    fn ensure(&mut self, index: u64, count: u64) -> Result<bool, ReadError>;

    /// Fetch a single byte.
    fn byte_at(&mut self, index: u64) -> Result<u8, ReadError>;

    /// Fetch `count` bytes starting at `index`.
    fn bytes_at(&mut self, index: u64, count: usize) -> Result<Bytes, ReadError> {
        let mut out = Vec::with_capacity(count);
        for i in 0..count as u64 {
            out.push(self.byte_at(index + i)?);
        }
        Ok(Bytes::from(out))
    }

    /// Number of bytes known to be available without further I/O.
    fn available(&self) -> u64;

    /// Total number of bytes, reading the source to its end if necessary.
    fn length(&mut self) -> Result<u64, ReadError>;
}

fn past_end(index: u64, requested: u64, length: u64) -> ReadError {
    BoundsError::PastEnd {
        index: index as i64,
        requested: requested as i64,
        length,
    }
    .into()
}

// =============================================================================
// In-memory buffer
// =============================================================================

/// A fully materialized byte buffer.
#[derive(Debug, Clone, Default)]
pub struct ByteArraySource {
    data: Bytes,
}

impl ByteArraySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// The underlying buffer.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }
}

impl From<Bytes> for ByteArraySource {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<Vec<u8>> for ByteArraySource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ByteSource for ByteArraySource {
    fn ensure(&mut self, index: u64, count: u64) -> Result<bool, ReadError> {
        Ok(index
            .checked_add(count)
            .is_some_and(|end| end <= self.data.len() as u64))
    }

    fn byte_at(&mut self, index: u64) -> Result<u8, ReadError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.data.get(i).copied())
            .ok_or_else(|| past_end(index, 1, self.data.len() as u64))
    }

    fn bytes_at(&mut self, index: u64, count: usize) -> Result<Bytes, ReadError> {
        if !self.ensure(index, count as u64)? {
            return Err(past_end(index, count as u64, self.data.len() as u64));
        }
        let start = index as usize;
        Ok(self.data.slice(start..start + count))
    }

    fn available(&self) -> u64 {
        self.data.len() as u64
    }

    fn length(&mut self) -> Result<u64, ReadError> {
        Ok(self.data.len() as u64)
    }
}

// =============================================================================
// Forward-only stream
// =============================================================================

/// Default chunk size for [`StreamSource`]: 2KB
pub const DEFAULT_CHUNK_SIZE: usize = 2 * 1024;

/// Random access over a forward-only stream.
///
/// The stream is pulled in fixed-size chunks as reads reach further into it,
/// and every chunk is retained so that earlier offsets stay readable.
/// Memory use is proportional to the highest offset touched.
pub struct StreamSource<R> {
    stream: R,
    chunk_size: usize,
    /// All chunks but the last are exactly `chunk_size` long
    chunks: Vec<Vec<u8>>,
    loaded: u64,
    finished: bool,
}

impl<R: Read> StreamSource<R> {
    /// Wrap a stream using the default chunk size.
    pub fn new(stream: R) -> Self {
        Self::with_chunk_size(stream, DEFAULT_CHUNK_SIZE)
    }

    /// Wrap a stream, buffering it `chunk_size` bytes at a time.
    pub fn with_chunk_size(stream: R, chunk_size: usize) -> Self {
        Self {
            stream,
            chunk_size: chunk_size.max(1),
            chunks: Vec::new(),
            loaded: 0,
            finished: false,
        }
    }

    /// Whether the end of the stream has been reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pull chunks until `end` bytes are buffered or the stream ends.
    fn load_until(&mut self, end: u64) -> Result<(), ReadError> {
        while !self.finished && self.loaded < end {
            let mut chunk = vec![0u8; self.chunk_size];
            let mut filled = 0;
            while filled < self.chunk_size {
                match self.stream.read(&mut chunk[filled..]) {
                    Ok(0) => {
                        self.finished = true;
                        break;
                    }
                    Ok(n) => filled += n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            if filled > 0 {
                chunk.truncate(filled);
                self.loaded += filled as u64;
                self.chunks.push(chunk);
            }
        }
        Ok(())
    }

    #[inline]
    fn chunk_for_offset(&self, offset: u64) -> usize {
        (offset / self.chunk_size as u64) as usize
    }

    #[inline]
    fn offset_within_chunk(&self, offset: u64) -> usize {
        (offset % self.chunk_size as u64) as usize
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn ensure(&mut self, index: u64, count: u64) -> Result<bool, ReadError> {
        let Some(end) = index.checked_add(count) else {
            return Ok(false);
        };
        self.load_until(end)?;
        Ok(end <= self.loaded)
    }

    fn byte_at(&mut self, index: u64) -> Result<u8, ReadError> {
        self.load_until(index.saturating_add(1))?;
        if index >= self.loaded {
            return Err(past_end(index, 1, self.loaded));
        }
        Ok(self.chunks[self.chunk_for_offset(index)][self.offset_within_chunk(index)])
    }

    fn bytes_at(&mut self, index: u64, count: usize) -> Result<Bytes, ReadError> {
        if !self.ensure(index, count as u64)? {
            return Err(past_end(index, count as u64, self.loaded));
        }

        let mut result = BytesMut::with_capacity(count);
        let mut remaining = count;
        let mut current = index;
        while remaining > 0 {
            let chunk = &self.chunks[self.chunk_for_offset(current)];
            let within = self.offset_within_chunk(current);
            let take = std::cmp::min(chunk.len() - within, remaining);
            result.extend_from_slice(&chunk[within..within + take]);
            remaining -= take;
            current += take as u64;
        }
        Ok(result.freeze())
    }

    fn available(&self) -> u64 {
        self.loaded
    }

    fn length(&mut self) -> Result<u64, ReadError> {
        self.load_until(u64::MAX)?;
        Ok(self.loaded)
    }
}
