//! TIFF IFD decoding.
//!
//! This module walks the IFD graph shared by TIFF, Exif and a number of raw
//! formats, handing format-specific decisions to a [`TiffHandler`].
//!
//! # Key Concepts
//!
//! - **Byte order**: the header declares the endianness (II = little-endian,
//!   MM = big-endian). Makernotes may switch it for their own IFDs; the walker
//!   restores it when leaving each IFD.
//!
//! - **IFD (Image File Directory)**: a counted list of 12-byte entries
//!   followed by a pointer to the next IFD. Entries may point to further
//!   IFDs, so the structure is a graph; offsets are only decoded once.
//!
//! - **Inline vs offset values**: values of four bytes or less are stored in
//!   the entry itself, larger values at an offset relative to the current
//!   base.

mod handler;
mod parser;
pub mod tags;
mod walker;

pub use handler::TiffHandler;
pub use parser::{TiffHeader, TIFF_HEADER_SIZE};
pub use tags::FieldType;
pub use walker::{decode, decode_with_options, IfdWalker, TagEntry, IFD_ENTRY_SIZE};
