//! Photoshop metadata.
//!
//! Photoshop writes its image resources either as a standalone run of
//! "8BIM" blocks (PSD files, JPEG APP13 segments) or inside a TIFF tag.
//! [`resources::extract`] decodes the former; [`extract`] decodes a whole
//! Photoshop-written TIFF structure.

mod handler;
pub mod resources;

pub use handler::PhotoshopTiffHandler;

use bytes::Bytes;

use crate::config::DecodeOptions;
use crate::error::FormatError;
use crate::format::tiff::decode_with_options;
use crate::io::{ByteSource, RandomAccessReader};
use crate::metadata::Metadata;

/// Decode a Photoshop-written TIFF structure held in memory.
pub fn extract(data: impl Into<Bytes>) -> Result<Metadata, FormatError> {
    let mut reader = RandomAccessReader::from_bytes(data);
    extract_from(&mut reader, 0, &DecodeOptions::default())
}

/// Decode a Photoshop-written TIFF structure starting at `start_offset`.
pub fn extract_from<S: ByteSource>(
    reader: &mut RandomAccessReader<S>,
    start_offset: i64,
    options: &DecodeOptions,
) -> Result<Metadata, FormatError> {
    decode_with_options(reader, &mut PhotoshopTiffHandler::new(), start_offset, options)
}
