//! Vendor makernote dispatch.
//!
//! A makernote is an opaque Exif value whose layout depends on the camera
//! vendor. Most are IFDs with a vendor header in front; they differ in where
//! the IFD starts, what their offsets are relative to and sometimes in byte
//! order. The layout is chosen from the camera make in IFD0 and a short
//! signature at the start of the note. Rules are ordered and the first match
//! wins.

use std::sync::LazyLock;

use tracing::debug;

use super::handler::ExifHandler;
use super::record;
use crate::error::ReadError;
use crate::format::tiff::tags::TAG_MAKE;
use crate::format::tiff::{IfdWalker, TagEntry};
use crate::format::ByteTrie;
use crate::io::{ByteOrder, ByteSource};
use crate::metadata::{DirectoryKind, Makernote};

/// Leading bytes that identify a makernote layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signature {
    Olympus,
    OlympusType2,
    Nikon,
    SonyCam,
    SonyEricsson,
    Sigma,
    Kodak,
    CasioQvc,
    Fujifilm,
    Kyocera,
    Leica,
    LeicaType5,
    Panasonic,
    Aoc,
    Sanyo,
    RicohText,
    Apple,
    ReconyxUltraFire,
    ReconyxHyperFire2,
}

const SIGNATURES: &[(Signature, &[u8])] = &[
    (Signature::Olympus, b"OLYMP\0"),
    (Signature::Olympus, b"EPSON"),
    (Signature::Olympus, b"AGFA"),
    (Signature::OlympusType2, b"OLYMPUS\0II"),
    (Signature::Nikon, b"Nikon"),
    (Signature::SonyCam, b"SONY CAM"),
    (Signature::SonyCam, b"SONY DSC"),
    (Signature::SonyEricsson, b"SEMC MS\0\0\0\0\0"),
    (Signature::Sigma, b"SIGMA\0\0\0"),
    (Signature::Sigma, b"FOVEON\0\0"),
    (Signature::Kodak, b"KDK"),
    (Signature::CasioQvc, b"QVC\0\0\0"),
    (Signature::Fujifilm, b"FUJIFILM"),
    (Signature::Kyocera, b"KYOCERA"),
    (Signature::Leica, b"LEICA"),
    (Signature::LeicaType5, b"LEICA\0\x01\0"),
    (Signature::LeicaType5, b"LEICA\0\x04\0"),
    (Signature::LeicaType5, b"LEICA\0\x05\0"),
    (Signature::LeicaType5, b"LEICA\0\x06\0"),
    (Signature::LeicaType5, b"LEICA\0\x07\0"),
    (Signature::Panasonic, b"Panasonic\0\0\0"),
    (Signature::Aoc, b"AOC\0"),
    (Signature::Sanyo, b"SANYO\0\x01\0"),
    (Signature::RicohText, b"Rv"),
    (Signature::RicohText, b"Rev"),
    (Signature::Apple, b"Apple iOS\0"),
    (Signature::ReconyxUltraFire, b"RECONYXUF"),
    (Signature::ReconyxHyperFire2, b"RECONYXH2"),
];

/// Version word that opens a Reconyx HyperFire note
const RECONYX_HYPERFIRE_VERSION: u16 = 0xF101;

static SIGNATURE_TRIE: LazyLock<ByteTrie<Signature>> = LazyLock::new(|| {
    let mut trie = ByteTrie::new();
    for &(signature, prefix) in SIGNATURES {
        trie.insert(signature, &[prefix])
            .expect("makernote signatures are distinct");
    }
    trie
});

/// Number of leading note bytes needed to recognise any signature.
pub fn signature_len() -> usize {
    SIGNATURE_TRIE.max_depth()
}

// =============================================================================
// Dialects
// =============================================================================

/// Where a makernote IFD begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfdStart {
    /// Fixed distance from the start of the note
    Fixed(i64),
    /// The note stores a 32-bit offset to the IFD (relative to the note) here
    Pointer(i64),
}

/// What offsets inside a makernote IFD are relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    /// The enclosing TIFF base
    Tiff,
    /// The start of the note plus a fixed distance
    Note(i64),
}

/// IFD-shaped makernote layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfdDialect {
    pub kind: Makernote,
    pub start: IfdStart,
    pub base: Base,
    /// Byte order forced for the makernote sub-tree
    pub byte_order: Option<ByteOrder>,
}

/// Flat makernote records with fields at fixed offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Kodak,
    ReconyxHyperFire,
    ReconyxUltraFire,
    ReconyxHyperFire2,
}

/// Decoding strategy for one makernote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Ifd(IfdDialect),
    Record(Record),
    /// Recognised vendor, unknown variant
    Unsupported(&'static str),
}

const fn ifd(kind: Makernote, start: i64, base: Base) -> Dialect {
    Dialect::Ifd(IfdDialect {
        kind,
        start: IfdStart::Fixed(start),
        base,
        byte_order: None,
    })
}

const fn ifd_ordered(kind: Makernote, start: IfdStart, base: Base, byte_order: ByteOrder) -> Dialect {
    Dialect::Ifd(IfdDialect {
        kind,
        start,
        base,
        byte_order: Some(byte_order),
    })
}

fn make_starts_with(make: &str, prefix: &str) -> bool {
    make.len() >= prefix.len() && make.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Choose the makernote layout from the camera make and the note's leading
/// bytes, read in `byte_order`. `None` means the note is not understood.
pub fn select(make: Option<&str>, prefix: &[u8], byte_order: ByteOrder) -> Option<Dialect> {
    let make = make.map(str::trim).unwrap_or("");
    let signature = SIGNATURE_TRIE.find(prefix).copied();
    let leading_word = match prefix {
        [a, b, ..] => Some(match byte_order {
            ByteOrder::BigEndian => u16::from_be_bytes([*a, *b]),
            ByteOrder::LittleEndian => u16::from_le_bytes([*a, *b]),
        }),
        _ => None,
    };

    use Base::{Note, Tiff};
    use Makernote as M;

    let dialect = match signature {
        Some(Signature::Olympus) => ifd(M::OlympusMain, 8, Tiff),
        Some(Signature::OlympusType2) => ifd(M::OlympusMain, 12, Note(0)),
        _ if make_starts_with(make, "MINOLTA") => ifd(M::OlympusMain, 0, Tiff),
        _ if make_starts_with(make, "NIKON") => {
            if signature == Some(Signature::Nikon) {
                match prefix.get(6).copied() {
                    Some(1) => ifd(M::NikonType1, 8, Tiff),
                    Some(2) => ifd(M::NikonType2, 18, Note(10)),
                    _ => Dialect::Unsupported("Unsupported Nikon makernote data ignored."),
                }
            } else {
                ifd(M::NikonType2, 0, Tiff)
            }
        }
        Some(Signature::SonyCam) => ifd(M::SonyType1, 12, Tiff),
        // Case-sensitive: "Sony Ericsson" phones use the SEMC layout below
        _ if make.starts_with("SONY") && prefix.get(..2) != Some(&[0x01, 0x00][..]) => {
            ifd(M::SonyType1, 0, Tiff)
        }
        Some(Signature::SonyEricsson) => {
            ifd_ordered(M::SonyType6, IfdStart::Fixed(20), Tiff, ByteOrder::BigEndian)
        }
        Some(Signature::Sigma) => ifd(M::Sigma, 10, Tiff),
        Some(Signature::Kodak) => Dialect::Record(Record::Kodak),
        _ if make.eq_ignore_ascii_case("Canon") => ifd(M::Canon, 0, Tiff),
        _ if make_starts_with(make, "CASIO") => {
            if signature == Some(Signature::CasioQvc) {
                ifd(M::CasioType2, 6, Tiff)
            } else {
                ifd(M::CasioType1, 0, Tiff)
            }
        }
        _ if signature == Some(Signature::Fujifilm) || make.eq_ignore_ascii_case("FUJIFILM") => {
            ifd_ordered(M::Fujifilm, IfdStart::Pointer(8), Note(0), ByteOrder::LittleEndian)
        }
        Some(Signature::Kyocera) => ifd(M::Kyocera, 22, Tiff),
        Some(Signature::LeicaType5) => {
            ifd_ordered(M::LeicaType5, IfdStart::Fixed(8), Note(0), ByteOrder::LittleEndian)
        }
        Some(Signature::Leica) => match make {
            "Leica Camera AG" => ifd_ordered(M::Leica, IfdStart::Fixed(8), Tiff, ByteOrder::LittleEndian),
            "LEICA" => ifd_ordered(M::Panasonic, IfdStart::Fixed(8), Tiff, ByteOrder::LittleEndian),
            _ => return None,
        },
        Some(Signature::Panasonic) => ifd(M::Panasonic, 12, Tiff),
        // Casio type 2 tags with offsets relative to the note (Pentax *ist D)
        Some(Signature::Aoc) => ifd(M::CasioType2, 6, Note(0)),
        _ if make_starts_with(make, "PENTAX") || make_starts_with(make, "ASAHI") => ifd(M::Pentax, 0, Note(0)),
        Some(Signature::Sanyo) => ifd(M::Sanyo, 8, Note(0)),
        _ if make_starts_with(make, "RICOH") => {
            // Text-form Ricoh notes are not IFDs
            if signature == Some(Signature::RicohText) {
                return None;
            }
            if prefix.get(..5).is_some_and(|p| p.eq_ignore_ascii_case(b"Ricoh")) {
                ifd_ordered(M::Ricoh, IfdStart::Fixed(8), Note(0), ByteOrder::BigEndian)
            } else {
                return None;
            }
        }
        Some(Signature::Apple) => ifd_ordered(M::Apple, IfdStart::Fixed(14), Note(0), ByteOrder::BigEndian),
        _ if leading_word == Some(RECONYX_HYPERFIRE_VERSION) => Dialect::Record(Record::ReconyxHyperFire),
        Some(Signature::ReconyxUltraFire) => Dialect::Record(Record::ReconyxUltraFire),
        Some(Signature::ReconyxHyperFire2) => Dialect::Record(Record::ReconyxHyperFire2),
        _ if make_starts_with(make, "SAMSUNG") => ifd(M::Samsung, 0, Tiff),
        _ if make.eq_ignore_ascii_case("DJI") => ifd(M::Dji, 0, Tiff),
        _ if make == "FLIR Systems" => ifd(M::Flir, 0, Tiff),
        _ => return None,
    };
    Some(dialect)
}

// =============================================================================
// Processing
// =============================================================================

/// Decode the makernote described by `entry`.
///
/// Returns `Ok(false)` when the note was not decoded, leaving the walker to
/// store it as raw bytes.
pub(super) fn process<S: ByteSource>(
    handler: &mut ExifHandler,
    walker: &mut IfdWalker<'_, S>,
    entry: &TagEntry,
) -> Result<bool, ReadError> {
    let make = walker
        .metadata()
        .first_of(DirectoryKind::ExifIfd0)
        .and_then(|ifd0| ifd0.string(TAG_MAKE));
    let note = entry.value_offset;
    let prefix_len = entry.byte_len().min(signature_len() as i64);
    let prefix = walker.reader().get_bytes(note, prefix_len)?;

    let byte_order = walker.reader().byte_order();

    match select(make.as_deref(), &prefix, byte_order) {
        Some(Dialect::Ifd(dialect)) => {
            debug!(kind = ?dialect.kind, offset = note, "Decoding makernote");
            let byte_order = dialect.byte_order.unwrap_or(byte_order);
            walker.with_byte_order(byte_order, |walker| {
                let ifd_offset = match dialect.start {
                    IfdStart::Fixed(start) => note + start,
                    IfdStart::Pointer(at) => note + i64::from(walker.reader().get_i32(note + at)?),
                };
                let base = match dialect.base {
                    Base::Tiff => entry.base_offset,
                    Base::Note(skip) => note + skip,
                };
                walker.process_ifd(handler, DirectoryKind::Makernote(dialect.kind), ifd_offset, base);
                Ok(true)
            })
        }
        Some(Dialect::Record(record)) => {
            debug!(?record, offset = note, "Decoding makernote record");
            record::extract(walker, record, note);
            Ok(true)
        }
        Some(Dialect::Unsupported(message)) => {
            walker.add_error(message);
            Ok(false)
        }
        None => {
            debug!(make = make.as_deref().unwrap_or(""), "Unrecognised makernote left undecoded");
            if walker.options().strict_makernotes {
                walker.add_error(format!(
                    "Unrecognised makernote (camera make: {})",
                    make.as_deref().unwrap_or("unknown")
                ));
            }
            Ok(false)
        }
    }
}
