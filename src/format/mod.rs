//! Decoders for TIFF-structured metadata.
//!
//! - [`tiff`]: the IFD walker and the [`TiffHandler`](tiff::TiffHandler) seam
//! - [`exif`]: Exif, GPS, thumbnails and vendor makernotes
//! - [`photoshop`]: Photoshop image resources and Photoshop-written TIFFs
//!
//! [`ByteTrie`] backs the signature sniffing used to recognise makernotes.

pub mod exif;
pub mod photoshop;
pub mod tiff;
mod trie;

pub use trie::ByteTrie;
