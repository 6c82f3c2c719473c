//! Input source integration tests.
//!
//! Tests verify:
//! - Forward-only streams and block-cached seekable readers decode exactly
//!   like in-memory buffers, including pointers to earlier offsets
//! - Truncated inputs fail the same way on every source
//! - The block cache avoids re-reading the source

use std::io::Cursor;

use tiff_metadata::format::exif;
use tiff_metadata::{ByteOrder, DecodeOptions, DirectoryKind, Metadata};

use super::test_utils::{init_tracing, TiffBuilder, TrickleReader, Value};

const THUMBNAIL: &[u8] = &[0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x01, 0xFF, 0xD9];

/// Exif data where every sub-directory sits before IFD0, so the walk reads
/// backwards through the input.
fn exif_fixture(order: ByteOrder) -> Vec<u8> {
    let mut builder = TiffBuilder::new(order);
    let thumbnail = builder.append(THUMBNAIL);

    let interop = builder.ifd(&[(0x0001, Value::ascii("R98"))]);
    let sub_ifd = builder.ifd(&[
        (0x829A, Value::Rational(vec![(1, 250)])),
        (0x9003, Value::ascii("2021:03:04 05:06:07")),
        (0xA005, Value::long(interop)),
    ]);
    let gps = builder.ifd(&[
        (0x0001, Value::ascii("N")),
        (0x0002, Value::Rational(vec![(48, 1), (51, 1), (30, 1)])),
        (0x0003, Value::ascii("E")),
        (0x0004, Value::Rational(vec![(2, 1), (17, 1), (40, 1)])),
    ]);
    let ifd0 = builder.ifd(&[
        (0x010F, Value::ascii("Canon")),
        (0x0110, Value::ascii("Canon EOS 5D")),
        (0x8769, Value::long(sub_ifd)),
        (0x8825, Value::long(gps)),
    ]);
    let ifd1 = builder.ifd(&[
        (0x0103, Value::short(6)),
        (0x0201, Value::long(thumbnail)),
        (0x0202, Value::long(THUMBNAIL.len() as u32)),
    ]);
    builder.set_first_ifd(ifd0);
    builder.set_next_ifd(ifd0, ifd1);
    builder.build()
}

fn as_json(metadata: &Metadata) -> serde_json::Value {
    serde_json::to_value(metadata).unwrap()
}

fn small_buffers() -> DecodeOptions {
    DecodeOptions {
        stream_chunk_size: 16,
        block_size: 32,
        block_cache_capacity: 2,
        ..Default::default()
    }
}

// =============================================================================
// Source Equivalence
// =============================================================================

#[test]
fn test_fixture_decodes() {
    let metadata = exif::extract(exif_fixture(ByteOrder::LittleEndian)).unwrap();

    let kinds: Vec<_> = metadata.iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            DirectoryKind::ExifIfd0,
            DirectoryKind::ExifSubIfd,
            DirectoryKind::ExifInterop,
            DirectoryKind::Gps,
            DirectoryKind::ExifThumbnail,
        ]
    );
    assert!(!metadata.has_errors());
    assert!(metadata.geo_location().is_some());

    let thumbnail = metadata.first_of(DirectoryKind::ExifThumbnail).unwrap();
    assert_eq!(&thumbnail.payload().unwrap()[..], THUMBNAIL);
}

#[test]
fn test_stream_matches_memory() {
    init_tracing();
    let options = small_buffers();

    for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
        let data = exif_fixture(order);
        let expected = exif::extract_with_options(data.clone(), &options).unwrap();

        for step in [1, 3, 64] {
            let mut reader = options.open_stream(TrickleReader::new(data.clone(), step));
            let metadata = exif::extract_from(&mut reader, 0, &options).unwrap();
            assert_eq!(as_json(&metadata), as_json(&expected), "step {step}");
        }
    }
}

#[test]
fn test_seekable_matches_memory() {
    let options = small_buffers();
    let data = exif_fixture(ByteOrder::BigEndian);
    let expected = exif::extract_with_options(data.clone(), &options).unwrap();

    let mut reader = options.open_seekable(Cursor::new(data)).unwrap();
    let metadata = exif::extract_from(&mut reader, 0, &options).unwrap();
    assert_eq!(as_json(&metadata), as_json(&expected));
}

#[test]
fn test_truncated_input_on_every_source() {
    let options = small_buffers();
    let mut data = exif_fixture(ByteOrder::LittleEndian);
    // Cut into IFD1 and its thumbnail pointer
    data.truncate(data.len() - 10);

    let expected = exif::extract_with_options(data.clone(), &options).unwrap();
    assert!(expected.contains(DirectoryKind::ExifIfd0));

    let mut stream = options.open_stream(TrickleReader::new(data.clone(), 5));
    let from_stream = exif::extract_from(&mut stream, 0, &options).unwrap();
    assert_eq!(as_json(&from_stream), as_json(&expected));

    let mut seekable = options.open_seekable(Cursor::new(data)).unwrap();
    let from_seekable = exif::extract_from(&mut seekable, 0, &options).unwrap();
    assert_eq!(as_json(&from_seekable), as_json(&expected));
}

#[test]
fn test_stream_with_preamble() {
    let options = DecodeOptions::default();
    let data = exif_fixture(ByteOrder::BigEndian);
    let expected = exif::extract(data.clone()).unwrap();

    let mut prefixed = b"Exif\0\0".to_vec();
    prefixed.extend(data);
    let mut reader = options.open_stream(TrickleReader::new(prefixed, 7));
    let metadata = exif::extract_from(&mut reader, 6, &options).unwrap();

    assert_eq!(as_json(&metadata), as_json(&expected));
}

#[test]
fn test_empty_stream() {
    let options = DecodeOptions::default();
    let mut reader = options.open_stream(TrickleReader::new(Vec::new(), 4));
    assert!(exif::extract_from(&mut reader, 0, &options).is_err());
}

// =============================================================================
// Block Cache
// =============================================================================

#[test]
fn test_block_cache_serves_repeat_decodes() {
    let data = exif_fixture(ByteOrder::LittleEndian);
    let block_size = 32;
    let blocks = data.len().div_ceil(block_size);
    let options = DecodeOptions {
        block_size,
        block_cache_capacity: blocks,
        ..Default::default()
    };

    let mut reader = options.open_seekable(Cursor::new(data)).unwrap();
    exif::extract_from(&mut reader, 0, &options).unwrap();
    let fetched = reader.source().fetch_count();
    assert!(fetched > 0 && fetched <= blocks);

    // Everything fits in the cache, so a second pass reads nothing new
    exif::extract_from(&mut reader, 0, &options).unwrap();
    assert_eq!(reader.source().fetch_count(), fetched);
}
