//! Decoder configuration.
//!
//! [`DecodeOptions`] collects the knobs that control how tolerant the IFD
//! walker is and how input sources are buffered. It derives serde traits so
//! an embedding application can load it from its own configuration file;
//! every field has a default, so partial documents are accepted.
//!
//! # Example
//!
//! ```ignore
//! use tiff_metadata::config::DecodeOptions;
//!
//! let options: DecodeOptions = serde_json::from_str(r#"{ "strict_makernotes": true }"#)?;
//! let mut reader = options.open_stream(std::io::stdin());
//! ```

use std::io::{Read, Seek};

use serde::{Deserialize, Serialize};

use crate::error::ReadError;
use crate::io::{
    RandomAccessReader, SeekableSource, StreamSource, DEFAULT_BLOCK_CACHE_CAPACITY, DEFAULT_BLOCK_SIZE,
    DEFAULT_CHUNK_SIZE,
};

// =============================================================================
// Default Values
// =============================================================================

/// Default number of unknown format codes tolerated within one IFD.
pub const DEFAULT_MAX_INVALID_FORMATS: usize = 5;

/// Default limit on sub-IFD nesting.
pub const DEFAULT_MAX_IFD_DEPTH: usize = 32;

// =============================================================================
// DecodeOptions
// =============================================================================

/// Options for a decode call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Abandon an IFD once more than this many entries have unknown format codes.
    pub max_invalid_formats: usize,

    /// Deepest sub-IFD nesting the walker will enter. Follower IFDs chained
    /// through next pointers stay at their predecessor's depth.
    pub max_ifd_depth: usize,

    /// Record an error for makernotes that match no known vendor layout.
    ///
    /// They are always left undecoded; this only controls whether that is
    /// reported.
    pub strict_makernotes: bool,

    /// Resolve the thumbnail image bytes once the walk completes.
    pub extract_thumbnail: bool,

    /// Chunk size used when buffering forward-only streams.
    pub stream_chunk_size: usize,

    /// Block size used when caching seekable sources.
    pub block_size: usize,

    /// Number of blocks kept in the seekable-source cache.
    pub block_cache_capacity: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_invalid_formats: DEFAULT_MAX_INVALID_FORMATS,
            max_ifd_depth: DEFAULT_MAX_IFD_DEPTH,
            strict_makernotes: false,
            extract_thumbnail: true,
            stream_chunk_size: DEFAULT_CHUNK_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            block_cache_capacity: DEFAULT_BLOCK_CACHE_CAPACITY,
        }
    }
}

impl DecodeOptions {
    /// Validate the configuration.
    ///
    /// Returns an error message if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_ifd_depth == 0 {
            return Err("max_ifd_depth must be greater than 0".to_string());
        }
        if self.stream_chunk_size == 0 {
            return Err("stream_chunk_size must be greater than 0".to_string());
        }
        if self.block_size == 0 {
            return Err("block_size must be greater than 0".to_string());
        }
        if self.block_cache_capacity == 0 {
            return Err("block_cache_capacity must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Random-access reader over a forward-only stream.
    pub fn open_stream<R: Read>(&self, stream: R) -> RandomAccessReader<StreamSource<R>> {
        RandomAccessReader::new(StreamSource::with_chunk_size(stream, self.stream_chunk_size))
    }

    /// Random-access reader over a seekable file, cached in blocks.
    pub fn open_seekable<R: Read + Seek>(&self, inner: R) -> Result<RandomAccessReader<SeekableSource<R>>, ReadError> {
        let source = SeekableSource::with_capacity(inner, self.block_size, self.block_cache_capacity)?;
        Ok(RandomAccessReader::new(source))
    }
}
