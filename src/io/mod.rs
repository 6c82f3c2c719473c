//! Byte-level input for the metadata decoders.
//!
//! - [`RandomAccessReader`] reads at arbitrary offsets of a [`ByteSource`]
//! - [`SequentialReader`] reads from a forward-moving cursor
//!
//! Sources cover in-memory buffers, forward-only streams and block-cached
//! seekable files.

mod block_cache;
mod charset;
mod reader;
mod sequential;
mod source;

pub use block_cache::{SeekableSource, DEFAULT_BLOCK_CACHE_CAPACITY, DEFAULT_BLOCK_SIZE};
pub use charset::Charset;
pub use reader::{ByteOrder, RandomAccessReader};
pub use sequential::{SequentialReader, SequentialSource, SliceCursor, StreamCursor};
pub use source::{ByteArraySource, ByteSource, StreamSource, DEFAULT_CHUNK_SIZE};
