use std::io::{Read, Seek, SeekFrom};
use std::num::NonZeroUsize;

use bytes::{Bytes, BytesMut};
use lru::LruCache;
use tracing::trace;

use super::source::ByteSource;
use crate::error::{BoundsError, ReadError};

/// Default block size: 64KB
/// Large enough to cover a typical Exif segment in one read.
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Default cache capacity in number of blocks.
/// 16 blocks * 64KB = 1MB default cache size.
pub const DEFAULT_BLOCK_CACHE_CAPACITY: usize = 16;

/// Block-cached random access over a seekable file or stream.
///
/// IFD walking performs many small reads at scattered offsets. Rather than
/// seeking for every one of them, the source is read in fixed-size blocks
/// kept in an LRU cache.
///
/// Features:
/// - Fixed-size blocks (default 64KB)
/// - LRU eviction when the cache reaches capacity
/// - Handles reads spanning multiple blocks
pub struct SeekableSource<R> {
    /// The underlying reader
    inner: R,
    /// Total length, taken from the end position at construction
    len: u64,
    /// Block size in bytes
    block_size: usize,
    /// Cached blocks indexed by block number
    cache: LruCache<u64, Bytes>,
    /// Number of blocks fetched from `inner`
    fetches: usize,
}

impl<R: Read + Seek> SeekableSource<R> {
    /// Wrap a seekable reader with the default block size and capacity.
    pub fn new(inner: R) -> Result<Self, ReadError> {
        Self::with_capacity(inner, DEFAULT_BLOCK_SIZE, DEFAULT_BLOCK_CACHE_CAPACITY)
    }

    /// Wrap a seekable reader with a custom block size and capacity.
    ///
    /// # Arguments
    /// * `inner` - The underlying reader to wrap
    /// * `block_size` - Size of each cached block in bytes
    /// * `capacity` - Maximum number of blocks to cache
    pub fn with_capacity(mut inner: R, block_size: usize, capacity: usize) -> Result<Self, ReadError> {
        let len = inner.seek(SeekFrom::End(0))?;
        Ok(Self {
            inner,
            len,
            block_size: block_size.max(1),
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            fetches: 0,
        })
    }

    /// Number of blocks read from the underlying reader so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Get a block from cache or read it from the underlying reader.
    fn get_block(&mut self, block_idx: u64) -> Result<Bytes, ReadError> {
        if let Some(data) = self.cache.get(&block_idx) {
            return Ok(data.clone());
        }
        let data = self.fetch_block_from_source(block_idx)?;
        self.cache.put(block_idx, data.clone());
        Ok(data)
    }

    fn fetch_block_from_source(&mut self, block_idx: u64) -> Result<Bytes, ReadError> {
        let offset = block_idx * self.block_size as u64;

        // The last block may be short
        let remaining = self.len.saturating_sub(offset);
        if remaining == 0 {
            return Err(BoundsError::PastEnd {
                index: offset as i64,
                requested: self.block_size as i64,
                length: self.len,
            }
            .into());
        }

        let len = std::cmp::min(self.block_size as u64, remaining) as usize;
        let mut buf = vec![0u8; len];
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.read_exact(&mut buf)?;
        self.fetches += 1;
        trace!(block = block_idx, len, "Fetched block");
        Ok(Bytes::from(buf))
    }

    #[inline]
    fn block_for_offset(&self, offset: u64) -> u64 {
        offset / self.block_size as u64
    }

    #[inline]
    fn offset_within_block(&self, offset: u64) -> usize {
        (offset % self.block_size as u64) as usize
    }
}

impl<R: Read + Seek> ByteSource for SeekableSource<R> {
    fn ensure(&mut self, index: u64, count: u64) -> Result<bool, ReadError> {
        Ok(index.checked_add(count).is_some_and(|end| end <= self.len))
    }

    fn byte_at(&mut self, index: u64) -> Result<u8, ReadError> {
        let block = self.get_block(self.block_for_offset(index))?;
        block
            .get(self.offset_within_block(index))
            .copied()
            .ok_or_else(|| {
                BoundsError::PastEnd {
                    index: index as i64,
                    requested: 1,
                    length: self.len,
                }
                .into()
            })
    }

    fn bytes_at(&mut self, index: u64, count: usize) -> Result<Bytes, ReadError> {
        if !self.ensure(index, count as u64)? {
            return Err(BoundsError::PastEnd {
                index: index as i64,
                requested: count as i64,
                length: self.len,
            }
            .into());
        }

        if count == 0 {
            return Ok(Bytes::new());
        }

        let start_block = self.block_for_offset(index);
        let end_block = self.block_for_offset(index + count as u64 - 1);

        if start_block == end_block {
            let block = self.get_block(start_block)?;
            let block_offset = self.offset_within_block(index);
            Ok(block.slice(block_offset..block_offset + count))
        } else {
            let mut result = BytesMut::with_capacity(count);
            let mut remaining = count;
            let mut current_offset = index;

            for block_idx in start_block..=end_block {
                let block = self.get_block(block_idx)?;
                let block_offset = self.offset_within_block(current_offset);
                let bytes_in_block = std::cmp::min(block.len() - block_offset, remaining);

                result.extend_from_slice(&block[block_offset..block_offset + bytes_in_block]);

                remaining -= bytes_in_block;
                current_offset += bytes_in_block as u64;
            }

            Ok(result.freeze())
        }
    }

    fn available(&self) -> u64 {
        self.len
    }

    fn length(&mut self) -> Result<u64, ReadError> {
        Ok(self.len)
    }
}
