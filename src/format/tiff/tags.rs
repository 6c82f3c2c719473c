//! TIFF field type and tag definitions.
//!
//! This module defines the vocabulary for IFD walking:
//! - Field types that determine how entry values are encoded
//! - Tag IDs the handlers dispatch on (sub-IFD pointers, embedded blocks)
//!
//! Descriptive tag names are left to consumers.

use crate::metadata::TagId;

// =============================================================================
// TIFF Field Types
// =============================================================================

/// TIFF field types that determine how values are encoded.
///
/// Each field type has a fixed component size, which is critical for:
/// - Determining if a value fits inline in an IFD entry
/// - Reading arrays of values correctly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer (1 byte)
    Byte = 1,

    /// 8-bit ASCII character, NUL-terminated (1 byte)
    Ascii = 2,

    /// Unsigned 16-bit integer (2 bytes)
    Short = 3,

    /// Unsigned 32-bit integer (4 bytes)
    Long = 4,

    /// Two unsigned 32-bit integers: numerator, denominator (8 bytes)
    Rational = 5,

    /// Signed 8-bit integer (1 byte)
    SByte = 6,

    /// Undefined byte data (1 byte per element)
    Undefined = 7,

    /// Signed 16-bit integer (2 bytes)
    SShort = 8,

    /// Signed 32-bit integer (4 bytes)
    SLong = 9,

    /// Two signed 32-bit integers (8 bytes)
    SRational = 10,

    /// IEEE single precision float (4 bytes)
    Float = 11,

    /// IEEE double precision float (8 bytes)
    Double = 12,

    /// Unsigned 32-bit IFD offset (4 bytes)
    Ifd = 13,
}

impl FieldType {
    /// Size of a single component of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => 1,
            FieldType::Short | FieldType::SShort => 2,
            FieldType::Long | FieldType::SLong | FieldType::Float | FieldType::Ifd => 4,
            FieldType::Rational | FieldType::SRational | FieldType::Double => 8,
        }
    }

    /// Create a FieldType from its numeric format code.
    ///
    /// Returns `None` for unknown codes.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            6 => Some(FieldType::SByte),
            7 => Some(FieldType::Undefined),
            8 => Some(FieldType::SShort),
            9 => Some(FieldType::SLong),
            10 => Some(FieldType::SRational),
            11 => Some(FieldType::Float),
            12 => Some(FieldType::Double),
            13 => Some(FieldType::Ifd),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Maximum bytes stored inline in the 4-byte value field of an entry.
    pub const INLINE_THRESHOLD: u64 = 4;

    /// Check if `count` components of this type fit inline in an entry.
    #[inline]
    pub fn fits_inline(self, count: u64) -> bool {
        self.size_in_bytes() as u64 * count <= Self::INLINE_THRESHOLD
    }
}

// =============================================================================
// Exif Tags
// =============================================================================

// -----------------------------------------------------------------------------
// IFD0 / image structure
// -----------------------------------------------------------------------------

pub const TAG_COMPRESSION: TagId = 0x0103;
pub const TAG_MAKE: TagId = 0x010F;
pub const TAG_MODEL: TagId = 0x0110;
pub const TAG_ORIENTATION: TagId = 0x0112;
/// Present on every page of a multipage TIFF
pub const TAG_PAGE_NUMBER: TagId = 0x0129;
/// Pointer(s) to additional image IFDs
pub const TAG_SUB_IFD_OFFSET: TagId = 0x014A;
pub const TAG_THUMBNAIL_OFFSET: TagId = 0x0201;
pub const TAG_THUMBNAIL_LENGTH: TagId = 0x0202;
pub const TAG_DATETIME: TagId = 0x0132;

// -----------------------------------------------------------------------------
// Sub-directory pointers
// -----------------------------------------------------------------------------

pub const TAG_EXIF_SUB_IFD_OFFSET: TagId = 0x8769;
pub const TAG_GPS_INFO_OFFSET: TagId = 0x8825;
pub const TAG_INTEROP_OFFSET: TagId = 0xA005;

// -----------------------------------------------------------------------------
// Embedded blocks
// -----------------------------------------------------------------------------

/// XMP packet (ApplicationNotes)
pub const TAG_APPLICATION_NOTES: TagId = 0x02BC;
/// IPTC-NAA record stream
pub const TAG_IPTC_NAA: TagId = 0x83BB;
/// Photoshop image resource blocks
pub const TAG_PHOTOSHOP_SETTINGS: TagId = 0x8649;
/// ICC profile
pub const TAG_INTER_COLOR_PROFILE: TagId = 0x8773;
pub const TAG_MAKERNOTE: TagId = 0x927C;
/// Epson PrintIM block
pub const TAG_PRINT_IMAGE_MATCHING_INFO: TagId = 0xC4A5;

// -----------------------------------------------------------------------------
// Olympus makernote sub-directories
// -----------------------------------------------------------------------------

pub const TAG_OLYMPUS_EQUIPMENT: TagId = 0x2010;
pub const TAG_OLYMPUS_CAMERA_SETTINGS: TagId = 0x2020;
pub const TAG_OLYMPUS_RAW_DEVELOPMENT: TagId = 0x2030;
pub const TAG_OLYMPUS_RAW_DEVELOPMENT_2: TagId = 0x2031;
pub const TAG_OLYMPUS_IMAGE_PROCESSING: TagId = 0x2040;
pub const TAG_OLYMPUS_FOCUS_INFO: TagId = 0x2050;
pub const TAG_OLYMPUS_RAW_INFO: TagId = 0x3000;
/// Nested copy of the main makernote directory
pub const TAG_OLYMPUS_MAIN_INFO: TagId = 0x4000;
