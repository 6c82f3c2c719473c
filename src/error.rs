use thiserror::Error;

use crate::metadata::TagId;

/// A read outside the bytes available from a source.
///
/// Every variant carries the requested index, the requested byte count and
/// the number of bytes the source was known to hold when the read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundsError {
    /// The starting index was negative
    #[error("Attempt to read from buffer using a negative index ({index})")]
    NegativeIndex {
        index: i64,
        requested: i64,
        length: u64,
    },

    /// The number of requested bytes was negative
    #[error("Number of requested bytes cannot be negative ({requested})")]
    NegativeCount {
        index: i64,
        requested: i64,
        length: u64,
    },

    /// The range ends past the last byte of the source
    #[error(
        "Attempt to read from beyond end of underlying data source \
         (requested index: {index}, requested count: {requested}, length: {length})"
    )]
    PastEnd {
        index: i64,
        requested: i64,
        length: u64,
    },
}

impl BoundsError {
    /// Index that was requested.
    pub const fn index(&self) -> i64 {
        match *self {
            BoundsError::NegativeIndex { index, .. }
            | BoundsError::NegativeCount { index, .. }
            | BoundsError::PastEnd { index, .. } => index,
        }
    }

    /// Number of bytes that were requested.
    pub const fn requested(&self) -> i64 {
        match *self {
            BoundsError::NegativeIndex { requested, .. }
            | BoundsError::NegativeCount { requested, .. }
            | BoundsError::PastEnd { requested, .. } => requested,
        }
    }

    /// Length of the source at the time of the failed read.
    pub const fn length(&self) -> u64 {
        match *self {
            BoundsError::NegativeIndex { length, .. }
            | BoundsError::NegativeCount { length, .. }
            | BoundsError::PastEnd { length, .. } => length,
        }
    }
}

/// Errors raised by byte readers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Random-access read outside the source
    #[error(transparent)]
    Bounds(#[from] BoundsError),

    /// Sequential read or skip ran out of data
    #[error("End of data reached: requested {requested} bytes, {available} available")]
    EndOfData { requested: u64, available: u64 },

    /// Failure of the underlying stream
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        ReadError::Io(err.to_string())
    }
}

/// Errors that abort a whole decode call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The first two bytes are neither "MM" nor "II"
    #[error("Unclear distinction between Motorola/Intel byte ordering: 0x{0:04X}")]
    InvalidByteOrder(u16),

    /// The handler rejected the marker that follows the byte order
    #[error("Unexpected TIFF marker: 0x{0:04X}")]
    UnexpectedMarker(u16),

    /// The header itself could not be read
    #[error("Unable to read TIFF header: {0}")]
    Header(#[from] ReadError),
}

/// A stored tag value could not be presented as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// The tag is not present in the directory
    #[error("Tag 0x{tag:04X} has not been set")]
    Missing { tag: TagId },

    /// The tag is present but stored in an incompatible form
    #[error("Tag 0x{tag:04X} cannot be converted to {target}: it is stored as {stored}")]
    Unconvertible {
        tag: TagId,
        stored: &'static str,
        target: &'static str,
    },
}

/// Errors from building a [`ByteTrie`](crate::format::ByteTrie).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    /// Another value is already attached to the same byte path
    #[error("Value already set for this trie node")]
    ValueAlreadySet,
}

/// A text encoding name that is not supported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported text encoding: {0}")]
pub struct EncodingError(pub String);
