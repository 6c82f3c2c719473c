//! # tiff-metadata
//!
//! Decoder for metadata stored in TIFF-style Image File Directories: Exif,
//! GPS, thumbnails, vendor makernotes and Photoshop image resources.
//!
//! Input is untrusted. Every read is bounds-checked, pointer cycles are
//! detected and, past the header, problems never abort a decode: they are
//! recorded on the directory being filled and decoding carries on with the
//! next tag or directory.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`io`] - Bounds-checked readers over buffers, streams and seekable files
//! - [`mod@format`] - The IFD walker, the Exif and Photoshop handlers and
//!   makernote dispatch
//! - [`metadata`] - Directories, typed tag values and their coercions
//! - [`config`] - Decode options
//! - [`error`] - Error types
//!
//! Locating the metadata inside a container (JPEG segments, PNG chunks, ...)
//! is left to the caller; decoders expect the isolated TIFF bytes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tiff_metadata::format::exif;
//! use tiff_metadata::DirectoryKind;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("exif.tiff")?;
//! let metadata = exif::extract(data)?;
//!
//! if let Some(ifd0) = metadata.first_of(DirectoryKind::ExifIfd0) {
//!     println!("Make: {:?}", ifd0.string(0x010F));
//! }
//! if let Some(location) = metadata.geo_location() {
//!     println!("Taken at {location}");
//! }
//! for (kind, error) in metadata.errors() {
//!     eprintln!("{kind}: {error}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod metadata;

// Re-export commonly used types
pub use config::DecodeOptions;
pub use error::{BoundsError, EncodingError, FormatError, ReadError, TagError, TrieError};
pub use format::exif::ExifHandler;
pub use format::photoshop::PhotoshopTiffHandler;
pub use format::tiff::{decode, decode_with_options, FieldType, IfdWalker, TagEntry, TiffHandler};
pub use format::ByteTrie;
pub use io::{ByteOrder, ByteSource, Charset, RandomAccessReader, SequentialReader};
pub use metadata::{Directory, DirectoryKind, GeoLocation, Makernote, Metadata, Rational, TagArray, TagId, TagValue};
