//! TIFF header parsing.
//!
//! The header is the entry point of every IFD walk: it fixes the byte order
//! for all subsequent reads and names the first directory.
//!
//! # TIFF Header Structure (8 bytes)
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Format marker (42 for TIFF/Exif, 0x4F52 / 0x5352 for Olympus ORF,
//!            0x55 for Panasonic RW2)
//! Bytes 4-7: Offset to first IFD, relative to the start of the header
//! ```

use crate::error::FormatError;
use crate::io::{ByteOrder, ByteSource, RandomAccessReader};

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Size of the TIFF header in bytes
pub const TIFF_HEADER_SIZE: i64 = 8;

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF header.
///
/// The format marker is not interpreted here; handlers decide which markers
/// they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values that follow
    pub byte_order: ByteOrder,

    /// The 16-bit marker after the byte order
    pub marker: u16,

    /// Absolute offset of the first IFD
    pub first_ifd_offset: i64,
}

impl TiffHeader {
    /// Read the header at `start_offset` and switch `reader` to its byte order.
    ///
    /// # Errors
    /// - `InvalidByteOrder` if the first two bytes are not II or MM
    /// - `Header` if the eight header bytes cannot be read
    pub fn read<S: ByteSource>(reader: &mut RandomAccessReader<S>, start_offset: i64) -> Result<Self, FormatError> {
        // Both markers are palindromes, so the current byte order is irrelevant
        let magic = reader.get_u16(start_offset)?;
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(FormatError::InvalidByteOrder(magic)),
        };
        reader.set_byte_order(byte_order);

        let marker = reader.get_u16(start_offset + 2)?;
        let first_ifd_offset = i64::from(reader.get_i32(start_offset + 4)?) + start_offset;

        Ok(TiffHeader {
            byte_order,
            marker,
            first_ifd_offset,
        })
    }
}
