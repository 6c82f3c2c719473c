//! Exif decoding.
//!
//! Exif data is a TIFF structure: IFD0 describes the main image and points
//! to the Exif sub-IFD (camera settings), the GPS IFD and, through the
//! makernote tag, to vendor-specific data. IFD1 describes the thumbnail.
//!
//! The input must already be isolated: `data` starts at the TIFF header
//! ("II" or "MM"), after any container preamble such as JPEG's "Exif\0\0".
//!
//! # Example
//!
//! ```ignore
//! use tiff_metadata::format::exif;
//!
//! let metadata = exif::extract(tiff_bytes)?;
//! for directory in &metadata {
//!     for error in directory.errors() {
//!         eprintln!("{}: {}", directory.name(), error);
//!     }
//! }
//! ```

mod handler;
mod record;
pub mod makernote;
mod print_im;

pub use handler::{ExifHandler, TAG_MAKERNOTE_PRINT_IM};
pub use print_im::TAG_PRINT_IM_VERSION;

use bytes::Bytes;

use crate::config::DecodeOptions;
use crate::error::FormatError;
use crate::format::tiff::decode_with_options;
use crate::io::{ByteSource, RandomAccessReader};
use crate::metadata::Metadata;

/// Decode Exif data held in memory.
pub fn extract(data: impl Into<Bytes>) -> Result<Metadata, FormatError> {
    extract_with_options(data, &DecodeOptions::default())
}

/// [`extract`] with explicit options.
pub fn extract_with_options(data: impl Into<Bytes>, options: &DecodeOptions) -> Result<Metadata, FormatError> {
    let mut reader = RandomAccessReader::from_bytes(data);
    extract_from(&mut reader, 0, options)
}

/// Decode Exif data whose TIFF header starts at `start_offset` in `reader`.
pub fn extract_from<S: ByteSource>(
    reader: &mut RandomAccessReader<S>,
    start_offset: i64,
    options: &DecodeOptions,
) -> Result<Metadata, FormatError> {
    decode_with_options(reader, &mut ExifHandler::new(), start_offset, options)
}
