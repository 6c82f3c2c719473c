//! Exif decoding integration tests.
//!
//! Tests verify:
//! - Entry values decode per field type in both byte orders
//! - Damaged entries and directories are reported without aborting
//! - Sub-IFD, GPS and thumbnail chains are followed, cycles are not
//! - Embedded XMP, IPTC and PrintIM blocks become their own directories

use chrono::NaiveDate;

use tiff_metadata::format::exif;
use tiff_metadata::io::RandomAccessReader;
use tiff_metadata::{ByteOrder, DecodeOptions, DirectoryKind, FormatError, TagArray, TagError, TagValue};

use super::test_utils::{init_tracing, single_ifd_tiff, TiffBuilder, Value};

const BOTH_ORDERS: [ByteOrder; 2] = [ByteOrder::BigEndian, ByteOrder::LittleEndian];

// =============================================================================
// Entry Values
// =============================================================================

#[test]
fn test_orientation_short() {
    init_tracing();
    for order in BOTH_ORDERS {
        let data = single_ifd_tiff(order, &[(0x0112, Value::short(1))]);
        let metadata = exif::extract(data).unwrap();

        assert_eq!(metadata.len(), 1);
        let ifd0 = metadata.first_of(DirectoryKind::ExifIfd0).unwrap();
        assert_eq!(ifd0.get_int(0x0112), Ok(1));
        assert!(!ifd0.has_errors());
    }
}

#[test]
fn test_signed_values() {
    for order in BOTH_ORDERS {
        let data = single_ifd_tiff(
            order,
            &[
                (0x9201, Value::SShort(vec![-64])),
                (0x9204, Value::SRational(vec![(-64, 32)])),
                (0x9205, Value::SLong(vec![-100_000])),
                (0x9206, Value::SByte(vec![-3])),
            ],
        );
        let metadata = exif::extract(data).unwrap();
        let ifd0 = metadata.get(0).unwrap();

        assert_eq!(ifd0.get_int(0x9201), Ok(-64));
        assert_eq!(ifd0.get_double(0x9204), Ok(-2.0));
        assert_eq!(ifd0.get_long(0x9205), Ok(-100_000));
        assert_eq!(ifd0.get_int(0x9206), Ok(-3));
    }
}

#[test]
fn test_every_entry_decodes() {
    for order in BOTH_ORDERS {
        let entries = [
            (0x0100, Value::Long(vec![4000])),
            (0x0102, Value::Short(vec![8, 8, 8])),
            (0x010F, Value::ascii("Acme Imaging Corporation")),
            (0x011A, Value::Rational(vec![(72, 1)])),
            (0x0200, Value::Byte(vec![7])),
            (0x9000, Value::Undefined(b"0232".to_vec())),
            (0xA500, Value::Float(vec![2.2])),
            (0xA501, Value::Double(vec![1.0e-3, 2.5])),
        ];
        let metadata = exif::extract(single_ifd_tiff(order, &entries)).unwrap();
        let ifd0 = metadata.get(0).unwrap();

        assert_eq!(ifd0.tag_count(), entries.len());
        assert_eq!(ifd0.get_long(0x0100), Ok(4000));
        assert_eq!(ifd0.get_int_array(0x0102), Ok(vec![8, 8, 8]));
        assert_eq!(ifd0.get_string(0x0102), Ok("8 8 8".to_string()));
        assert_eq!(ifd0.get_string(0x010F), Ok("Acme Imaging Corporation".to_string()));
        assert_eq!(ifd0.get_int(0x011A), Ok(72));
        assert_eq!(ifd0.get_int(0x0200), Ok(7));
        assert_eq!(ifd0.get_bytes(0x9000), Ok(b"0232".to_vec()));
        assert!((ifd0.get_double(0xA500).unwrap() - 2.2).abs() < 1e-6);
        assert_eq!(
            ifd0.value(0xA501),
            Some(&TagValue::Array(TagArray::Double(vec![1.0e-3, 2.5])))
        );
    }
}

#[test]
fn test_coercion_failures() {
    let data = single_ifd_tiff(
        ByteOrder::BigEndian,
        &[(0x0102, Value::Short(vec![8, 8, 8])), (0x0110, Value::ascii("1234"))],
    );
    let metadata = exif::extract(data).unwrap();
    let ifd0 = metadata.get(0).unwrap();

    // Multi-element arrays have no scalar form
    assert!(matches!(ifd0.get_int(0x0102), Err(TagError::Unconvertible { tag: 0x0102, .. })));
    assert_eq!(ifd0.int(0x0102), None);
    assert_eq!(ifd0.get_int(0x0999), Err(TagError::Missing { tag: 0x0999 }));

    // Numeric text parses
    assert_eq!(ifd0.get_int(0x0110), Ok(1234));
    assert_eq!(ifd0.get_double(0x0110), Ok(1234.0));
}

#[test]
fn test_entry_order_preserved() {
    let data = single_ifd_tiff(
        ByteOrder::LittleEndian,
        &[
            (0x0112, Value::short(1)),
            (0x0100, Value::long(10)),
            (0x0101, Value::long(20)),
        ],
    );
    let metadata = exif::extract(data).unwrap();
    let ids: Vec<_> = metadata.get(0).unwrap().tags().map(|tag| tag.id).collect();
    assert_eq!(ids, vec![0x0112, 0x0100, 0x0101]);
}

// =============================================================================
// Damaged Input
// =============================================================================

#[test]
fn test_out_of_range_value_keeps_sibling() {
    init_tracing();
    for order in BOTH_ORDERS {
        let data = single_ifd_tiff(
            order,
            &[
                (
                    0x010F,
                    Value::At {
                        format: 2,
                        count: 20,
                        offset: 5000,
                    },
                ),
                (0x0112, Value::short(6)),
            ],
        );
        let metadata = exif::extract(data).unwrap();
        let ifd0 = metadata.get(0).unwrap();

        assert_eq!(ifd0.errors().len(), 1);
        assert!(ifd0.errors()[0].starts_with("Error decoding tag 0x010F"));
        assert!(!ifd0.contains(0x010F));
        assert_eq!(ifd0.get_int(0x0112), Ok(6));
    }
}

#[test]
fn test_unknown_format_code_recorded() {
    let data = single_ifd_tiff(
        ByteOrder::BigEndian,
        &[
            (
                0x0200,
                Value::Raw {
                    format: 0x20,
                    count: 1,
                    field: [0; 4],
                },
            ),
            (0x0112, Value::short(3)),
        ],
    );
    let metadata = exif::extract(data).unwrap();
    let ifd0 = metadata.get(0).unwrap();
    assert_eq!(ifd0.errors(), ["Invalid TIFF tag format code 32 for tag 0x0200"]);
    assert_eq!(ifd0.get_int(0x0112), Ok(3));
}

#[test]
fn test_zero_format_code_is_empty() {
    let data = single_ifd_tiff(
        ByteOrder::BigEndian,
        &[(
            0x0000,
            Value::Raw {
                format: 0,
                count: 0,
                field: [0; 4],
            },
        )],
    );
    let metadata = exif::extract(data).unwrap();
    let ifd0 = metadata.get(0).unwrap();
    assert!(ifd0.is_empty());
    assert!(!ifd0.has_errors());
}

#[test]
fn test_header_errors() {
    assert!(matches!(
        exif::extract(TiffBuilder::with_marker(ByteOrder::LittleEndian, 0x2B).build()),
        Err(FormatError::UnexpectedMarker(0x2B))
    ));
    assert!(matches!(exif::extract(b"XX\0\x2A".to_vec()), Err(FormatError::InvalidByteOrder(_))));
    assert!(matches!(exif::extract(Vec::<u8>::new()), Err(FormatError::Header(_))));
}

#[test]
fn test_truncated_ifd() {
    let mut data = single_ifd_tiff(ByteOrder::BigEndian, &[(0x0112, Value::short(1)), (0x0100, Value::long(5))]);
    data.truncate(20);
    let metadata = exif::extract(data).unwrap();
    assert_eq!(metadata.get(0).unwrap().errors(), ["Illegally sized IFD"]);
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn test_self_referencing_ifd() {
    for order in BOTH_ORDERS {
        let mut builder = TiffBuilder::new(order);
        let ifd0 = builder.ifd(&[(0x0112, Value::short(1))]);
        builder.set_first_ifd(ifd0);
        builder.set_next_ifd(ifd0, ifd0);

        let metadata = exif::extract(builder.build()).unwrap();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.get(0).unwrap().get_int(0x0112), Ok(1));
    }
}

#[test]
fn test_sub_ifd_pointer_cycle() {
    let mut builder = TiffBuilder::new(ByteOrder::BigEndian);
    // The first IFD lands right after the header
    let ifd0 = builder.ifd(&[(0x0112, Value::short(1)), (0x014A, Value::long(8))]);
    assert_eq!(ifd0, 8);

    let metadata = exif::extract(builder.build()).unwrap();
    assert_eq!(metadata.len(), 1);
    assert!(!metadata.has_errors());
}

fn nested_sub_ifd_chain(levels: usize) -> Vec<u8> {
    let mut builder = TiffBuilder::new(ByteOrder::BigEndian);
    let mut child = builder.ifd(&[(0x0001, Value::short(1))]);
    for _ in 0..levels {
        child = builder.ifd(&[(0x014A, Value::long(child))]);
    }
    builder.set_first_ifd(child);
    builder.build()
}

#[test]
fn test_deeply_nested_sub_ifds_stop_at_depth_limit() {
    init_tracing();
    let metadata = exif::extract(nested_sub_ifd_chain(5000)).unwrap();

    assert_eq!(metadata.len(), 32);
    let errors: Vec<_> = metadata.errors().collect();
    assert_eq!(errors, vec![(DirectoryKind::ExifSubIfd, "IFD nesting too deep")]);
    assert_eq!(metadata.get(31).unwrap().errors(), ["IFD nesting too deep"]);
}

#[test]
fn test_custom_depth_limit() {
    let data = nested_sub_ifd_chain(10);
    let options = DecodeOptions {
        max_ifd_depth: 3,
        ..Default::default()
    };
    let metadata = exif::extract_with_options(data.clone(), &options).unwrap();
    assert_eq!(metadata.len(), 3);
    assert!(metadata.has_errors());

    // Eleven directories fit under the default limit
    let metadata = exif::extract(data).unwrap();
    assert_eq!(metadata.len(), 11);
    assert!(!metadata.has_errors());
}

#[test]
fn test_backward_next_pointer_ignored() {
    let mut builder = TiffBuilder::new(ByteOrder::LittleEndian);
    let earlier = builder.ifd(&[(0x0100, Value::long(1))]);
    let ifd0 = builder.ifd(&[(0x0112, Value::short(1))]);
    builder.set_first_ifd(ifd0);
    builder.set_next_ifd(ifd0, earlier);

    let metadata = exif::extract(builder.build()).unwrap();
    assert_eq!(metadata.len(), 1);
}

#[test]
fn test_exif_gps_and_interop_directories() {
    init_tracing();
    for order in BOTH_ORDERS {
        let mut builder = TiffBuilder::new(order);
        let interop = builder.ifd(&[(0x0001, Value::ascii("R98"))]);
        let sub_ifd = builder.ifd(&[
            (0x9003, Value::ascii("2021:06:01 12:30:00")),
            (0xA005, Value::long(interop)),
        ]);
        let gps = builder.ifd(&[
            (0x0001, Value::ascii("N")),
            (0x0002, Value::Rational(vec![(51, 1), (30, 1), (0, 1)])),
            (0x0003, Value::ascii("W")),
            (0x0004, Value::Rational(vec![(0, 1), (7, 1), (396, 10)])),
        ]);
        let ifd0 = builder.ifd(&[
            (0x010F, Value::ascii("Acme")),
            (0x8769, Value::long(sub_ifd)),
            (0x8825, Value::long(gps)),
        ]);
        builder.set_first_ifd(ifd0);

        let metadata = exif::extract(builder.build()).unwrap();
        let kinds: Vec<_> = metadata.iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                DirectoryKind::ExifIfd0,
                DirectoryKind::ExifSubIfd,
                DirectoryKind::ExifInterop,
                DirectoryKind::Gps,
            ]
        );
        assert!(!metadata.has_errors());

        // Pointer tags are followed, not stored
        assert!(!metadata.get(0).unwrap().contains(0x8769));

        let sub_ifd = metadata.first_of(DirectoryKind::ExifSubIfd).unwrap();
        let expected = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap().and_hms_opt(12, 30, 0).unwrap();
        assert_eq!(sub_ifd.get_date(0x9003), Ok(expected));

        let interop = metadata.first_of(DirectoryKind::ExifInterop).unwrap();
        assert_eq!(interop.string(0x0001).as_deref(), Some("R98"));

        let location = metadata.geo_location().unwrap();
        assert!((location.latitude - 51.5).abs() < 1e-9);
        assert!((location.longitude + 0.127_666).abs() < 1e-5);
    }
}

#[test]
fn test_thumbnail_chain_and_payload() {
    let jpeg = [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43, 0xFF, 0xD9];

    for order in BOTH_ORDERS {
        let mut builder = TiffBuilder::new(order);
        let ifd0 = builder.ifd(&[(0x0112, Value::short(1))]);
        let image = builder.append(&jpeg);
        let ifd1 = builder.ifd(&[
            (0x0103, Value::short(6)),
            (0x0201, Value::long(image)),
            (0x0202, Value::long(jpeg.len() as u32)),
        ]);
        builder.set_first_ifd(ifd0);
        builder.set_next_ifd(ifd0, ifd1);
        let data = builder.build();

        let metadata = exif::extract(data.clone()).unwrap();
        let thumbnail = metadata.first_of(DirectoryKind::ExifThumbnail).unwrap();
        assert_eq!(thumbnail.get_int(0x0103), Ok(6));
        assert_eq!(thumbnail.payload().map(|p| p.to_vec()), Some(jpeg.to_vec()));

        let options = DecodeOptions {
            extract_thumbnail: false,
            ..Default::default()
        };
        let metadata = exif::extract_with_options(data, &options).unwrap();
        assert!(metadata.first_of(DirectoryKind::ExifThumbnail).unwrap().payload().is_none());
    }
}

#[test]
fn test_thumbnail_out_of_range() {
    let mut builder = TiffBuilder::new(ByteOrder::BigEndian);
    let ifd0 = builder.ifd(&[(0x0112, Value::short(1))]);
    let ifd1 = builder.ifd(&[
        (0x0103, Value::short(6)),
        (0x0201, Value::long(40)),
        (0x0202, Value::long(100_000)),
    ]);
    builder.set_next_ifd(ifd0, ifd1);

    let metadata = exif::extract(builder.build()).unwrap();
    let thumbnail = metadata.first_of(DirectoryKind::ExifThumbnail).unwrap();
    assert!(thumbnail.payload().is_none());
    assert!(thumbnail.errors()[0].starts_with("Invalid thumbnail data specification"));
}

#[test]
fn test_multipage_directories() {
    let mut builder = TiffBuilder::new(ByteOrder::LittleEndian);
    let page1 = builder.ifd(&[(0x0129, Value::Short(vec![0, 3]))]);
    let page2 = builder.ifd(&[(0x0129, Value::Short(vec![1, 3]))]);
    let page3 = builder.ifd(&[(0x0129, Value::Short(vec![2, 3]))]);
    builder.set_first_ifd(page1);
    builder.set_next_ifd(page1, page2);
    builder.set_next_ifd(page2, page3);

    let metadata = exif::extract(builder.build()).unwrap();
    let kinds: Vec<_> = metadata.iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        vec![DirectoryKind::ExifIfd0, DirectoryKind::ExifImage, DirectoryKind::ExifImage]
    );
}

#[test]
fn test_alternative_markers() {
    let mut builder = TiffBuilder::with_marker(ByteOrder::LittleEndian, 0x55);
    builder.ifd(&[(0x0112, Value::short(1))]);
    let metadata = exif::extract(builder.build()).unwrap();
    assert_eq!(metadata.get(0).unwrap().kind(), DirectoryKind::PanasonicRawIfd0);

    let mut builder = TiffBuilder::with_marker(ByteOrder::LittleEndian, 0x4F52);
    builder.ifd(&[(0x0112, Value::short(1))]);
    let metadata = exif::extract(builder.build()).unwrap();
    assert_eq!(metadata.get(0).unwrap().kind(), DirectoryKind::ExifIfd0);
}

#[test]
fn test_start_offset_after_preamble() {
    let tiff = single_ifd_tiff(ByteOrder::BigEndian, &[(0x010F, Value::ascii("Acme Imaging Corporation"))]);
    let mut data = b"Exif\0\0".to_vec();
    data.extend(tiff);

    let mut reader = RandomAccessReader::from_bytes(data);
    let metadata = exif::extract_from(&mut reader, 6, &DecodeOptions::default()).unwrap();
    assert_eq!(
        metadata.get(0).unwrap().string(0x010F).as_deref(),
        Some("Acme Imaging Corporation")
    );
}

// =============================================================================
// Embedded Blocks
// =============================================================================

#[test]
fn test_xmp_and_iptc_payloads() {
    let xmp = b"<x:xmpmeta xmlns:x='adobe:ns:meta/'/>".to_vec();
    let iptc = vec![0x1C, 0x02, 0x00, 0x00, 0x02, 0x00, 0x04];
    let data = single_ifd_tiff(
        ByteOrder::BigEndian,
        &[
            (0x02BC, Value::Undefined(xmp.clone())),
            (0x83BB, Value::Undefined(iptc.clone())),
        ],
    );

    let metadata = exif::extract(data).unwrap();
    let kinds: Vec<_> = metadata.iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        vec![DirectoryKind::ExifIfd0, DirectoryKind::Xmp, DirectoryKind::Iptc]
    );
    assert_eq!(metadata.first_of(DirectoryKind::Xmp).unwrap().payload().unwrap().to_vec(), xmp);
    assert_eq!(metadata.first_of(DirectoryKind::Iptc).unwrap().payload().unwrap().to_vec(), iptc);
    assert!(metadata.get(0).unwrap().is_empty());
}

#[test]
fn test_non_iptc_data_kept_as_tag() {
    let data = single_ifd_tiff(ByteOrder::BigEndian, &[(0x83BB, Value::Undefined(vec![0x00, 0x01, 0x02, 0x03, 0x04]))]);
    let metadata = exif::extract(data).unwrap();
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata.get(0).unwrap().bytes(0x83BB), Some(vec![0, 1, 2, 3, 4]));
}

#[test]
fn test_print_im_block() {
    let mut block = b"PrintIM\x000300\0\0".to_vec();
    block.extend([0x00, 0x02]);
    block.extend([0x00, 0x01, 0x00, 0x16, 0x00, 0x16]);
    block.extend([0x00, 0x02, 0x00, 0x00, 0x00, 0x00]);
    let data = single_ifd_tiff(ByteOrder::BigEndian, &[(0xC4A5, Value::Undefined(block))]);

    let metadata = exif::extract(data).unwrap();
    let print_im = metadata.first_of(DirectoryKind::PrintIm).unwrap();
    assert_eq!(print_im.string(exif::TAG_PRINT_IM_VERSION).as_deref(), Some("0300"));
    assert_eq!(print_im.long(0x0001), Some(0x0016_0016));
    assert_eq!(print_im.long(0x0002), Some(0));
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_metadata_serializes_to_json() {
    let data = single_ifd_tiff(
        ByteOrder::BigEndian,
        &[(0x0112, Value::short(1)), (0x010F, Value::ascii("Acme"))],
    );
    let metadata = exif::extract(data).unwrap();
    let json = serde_json::to_value(&metadata).unwrap();

    assert_eq!(json[0]["kind"], "Exif IFD0");
    assert_eq!(json[0]["tags"][0]["id"], 0x0112);
    assert_eq!(json[0]["tags"][0]["value"], 1);
    assert_eq!(json[0]["tags"][1]["value"], "Acme");
    assert_eq!(json[0]["errors"].as_array().unwrap().len(), 0);
}
