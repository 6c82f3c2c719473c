//! Property-based tests.
//!
//! Uses proptest to check invariants that must hold for arbitrary input:
//! decoding never panics, byte order never changes decoded values and
//! bounds checks agree with the buffer length.

use proptest::prelude::*;

use tiff_metadata::format::{exif, photoshop};
use tiff_metadata::{ByteOrder, DecodeOptions, Metadata, RandomAccessReader, Rational};

use super::test_utils::{single_ifd_tiff, Value};

// ===== Helpers =====

fn as_json(metadata: &Metadata) -> serde_json::Value {
    serde_json::to_value(metadata).unwrap()
}

/// Entries covering the numeric field types, with distinct ascending tags.
fn arbitrary_entries() -> impl Strategy<Value = Vec<(u16, Value)>> {
    (
        prop::collection::vec(any::<u16>(), 1..6),
        prop::collection::vec(any::<u32>(), 1..4),
        prop::collection::vec((any::<i32>(), any::<i32>()), 1..3),
        prop::collection::vec(any::<i16>(), 1..5),
        prop::collection::vec(any::<u8>(), 1..9),
        "[ -~]{0,12}",
    )
        .prop_map(|(shorts, longs, srationals, sshorts, bytes, text)| {
            vec![
                (0x0100, Value::Short(shorts)),
                (0x0101, Value::Long(longs)),
                (0x0102, Value::SRational(srationals)),
                (0x0103, Value::SShort(sshorts)),
                (0x0104, Value::Byte(bytes)),
                (0x0105, Value::Ascii(text)),
            ]
        })
}

// ===== Property Tests =====

proptest! {
    /// Property: Arbitrary bytes never panic the Exif decoder
    #[test]
    fn random_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = exif::extract(data);
    }

    /// Property: Arbitrary IFD bodies behind a valid header never panic
    #[test]
    fn random_ifds_never_panic(
        big_endian in any::<bool>(),
        body in prop::collection::vec(any::<u8>(), 0..512)
    ) {
        let mut data = if big_endian {
            b"MM\0\x2A\0\0\0\x08".to_vec()
        } else {
            b"II\x2A\0\x08\0\0\0".to_vec()
        };
        data.extend(body);

        let metadata = exif::extract(data);
        prop_assert!(metadata.is_ok());
    }

    /// Property: Arbitrary resource data never panics and always yields the
    /// Photoshop directory first
    #[test]
    fn random_resources_never_panic(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let metadata = photoshop::resources::extract(data, &DecodeOptions::default());
        prop_assert!(metadata.len() >= 1);
    }

    /// Property: The same entries decode identically in either byte order
    #[test]
    fn byte_order_symmetry(entries in arbitrary_entries()) {
        let big = exif::extract(single_ifd_tiff(ByteOrder::BigEndian, &entries)).unwrap();
        let little = exif::extract(single_ifd_tiff(ByteOrder::LittleEndian, &entries)).unwrap();

        prop_assert!(!big.has_errors());
        prop_assert_eq!(as_json(&big), as_json(&little));
    }

    /// Property: Reads succeed exactly when the range lies within the buffer
    #[test]
    fn reader_bounds_agree_with_length(
        len in 0usize..64,
        index in -8i64..80,
        count in -4i64..80
    ) {
        let mut reader = RandomAccessReader::from_bytes(vec![0xA5u8; len]);
        let in_bounds = index >= 0 && count >= 0 && index + count <= len as i64;

        let result = reader.get_bytes(index, count);
        prop_assert_eq!(result.is_ok(), in_bounds);
        if let Ok(bytes) = result {
            prop_assert_eq!(bytes.len() as i64, count);
        }
        prop_assert_eq!(reader.get_u16(index).is_ok(), index >= 0 && index + 2 <= len as i64);
    }

    /// Property: Rationals compare by value
    #[test]
    fn rational_equality_by_value(
        numerator in -10_000i64..10_000,
        denominator in 1i64..10_000,
        factor in 1i64..1_000
    ) {
        let rational = Rational::new(numerator, denominator);
        prop_assert_eq!(rational, Rational::new(numerator * factor, denominator * factor));
        prop_assert_eq!(rational.simplified(), rational);
    }
}
