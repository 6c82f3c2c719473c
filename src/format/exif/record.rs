//! Fixed-layout makernote records.
//!
//! Kodak and Reconyx notes are not IFDs: they are flat records whose fields
//! sit at fixed offsets. Each field is stored under a tag id equal to its
//! offset within the record, after any vendor header.

use chrono::NaiveDate;
use tracing::debug;

use super::makernote::Record;
use crate::error::ReadError;
use crate::format::tiff::IfdWalker;
use crate::io::{ByteOrder, ByteSource, Charset, RandomAccessReader};
use crate::metadata::{Directory, DirectoryKind, Makernote, StringValue, TagArray, TagId, TagValue};

#[derive(Debug, Clone, Copy)]
enum Field {
    /// NUL-terminated text of at most this many bytes
    Text(i64),
    /// NUL-padded UTF-16LE text of this many bytes
    Utf16(i64),
    /// A single character stored in a 16-bit word
    Char16,
    U8,
    I8,
    U16,
    I16,
    U32,
    /// 32-bit value stored as two 16-bit words, high word first
    SplitU32,
    U8s(i64),
    U16s(i64),
    Raw(i64),
    /// 16-bit millivolts, stored as volts
    Millivolts,
    /// major, minor and revision words
    Version,
    /// Two words whose hex digits spell YYYY and MMDD
    BuildDate,
    /// [`Field::Version`] followed by [`Field::BuildDate`]
    Firmware,
    /// Seconds, minutes, hour, month, day and year as 16-bit words
    DateTimeWords,
    /// Seconds, minutes, hour, day and month bytes, then a 16-bit year
    DateTimeBytes,
}

struct Layout {
    kind: Makernote,
    /// `None` keeps the byte order of the enclosing TIFF data
    byte_order: Option<ByteOrder>,
    header_size: i64,
    /// (offset within the record, encoding)
    fields: &'static [(TagId, Field)],
}

static KODAK: Layout = Layout {
    kind: Makernote::Kodak,
    byte_order: Some(ByteOrder::LittleEndian),
    header_size: 8,
    fields: &[
        (0, Field::Text(8)),  // model
        (9, Field::U8),       // quality
        (10, Field::U8),      // burst mode
        (12, Field::U16),     // image width
        (14, Field::U16),     // image height
        (16, Field::U16),     // year created
        (18, Field::Raw(2)),  // month / day
        (20, Field::Raw(4)),  // time
        (24, Field::U16),     // burst mode 2
        (27, Field::U8),      // shutter mode
        (28, Field::U8),      // metering mode
        (29, Field::U8),      // sequence number
        (30, Field::U16),     // f-number
        (32, Field::U32),     // exposure time
        (36, Field::I16),     // exposure compensation
        (56, Field::U8),      // focus mode
        (64, Field::U8),      // white balance
        (92, Field::U8),      // flash mode
        (93, Field::U8),      // flash fired
        (94, Field::U16),     // ISO setting
        (96, Field::U16),     // ISO
        (98, Field::U16),     // total zoom
        (100, Field::U16),    // date/time stamp
        (102, Field::U16),    // color mode
        (104, Field::U16),    // digital zoom
        (107, Field::I8),     // sharpness
    ],
};

static RECONYX_HYPERFIRE: Layout = Layout {
    kind: Makernote::ReconyxHyperFire,
    byte_order: None,
    header_size: 0,
    fields: &[
        (0, Field::U16),            // makernote version
        (2, Field::Firmware),       // firmware version
        (12, Field::Char16),        // trigger mode
        (14, Field::U16s(2)),       // sequence
        (18, Field::SplitU32),      // event number
        (22, Field::DateTimeWords), // date/time original
        (36, Field::U16),           // moon phase
        (38, Field::I16),           // ambient temperature (F)
        (40, Field::I16),           // ambient temperature (C)
        (42, Field::Utf16(28)),     // serial number
        (72, Field::U16),           // contrast
        (74, Field::U16),           // brightness
        (76, Field::U16),           // sharpness
        (78, Field::U16),           // saturation
        (80, Field::U16),           // infrared illuminator
        (82, Field::U16),           // motion sensitivity
        (84, Field::Millivolts),    // battery voltage
        (86, Field::Text(44)),      // user label
    ],
};

static RECONYX_ULTRAFIRE: Layout = Layout {
    kind: Makernote::ReconyxUltraFire,
    byte_order: Some(ByteOrder::BigEndian),
    header_size: 0,
    fields: &[
        (0, Field::Text(9)),        // label
        (10, Field::U32),           // makernote id
        (14, Field::U32),           // makernote size
        (18, Field::U32),           // public id
        (22, Field::U16),           // public size
        (24, Field::Raw(7)),        // camera version
        (31, Field::Raw(7)),        // UIB version
        (38, Field::Raw(7)),        // BTL version
        (45, Field::Raw(7)),        // PEX version
        (52, Field::Text(1)),       // event type
        (53, Field::U8s(2)),        // sequence
        (55, Field::U32),           // event number
        (59, Field::DateTimeBytes), // date/time original
        (66, Field::U8),            // day of week
        (67, Field::U8),            // moon phase
        (68, Field::I16),           // ambient temperature (F)
        (70, Field::I16),           // ambient temperature (C)
        (72, Field::U8),            // flash
        (73, Field::Millivolts),    // battery voltage
    ],
};

static RECONYX_HYPERFIRE_2: Layout = Layout {
    kind: Makernote::ReconyxHyperFire2,
    byte_order: Some(ByteOrder::LittleEndian),
    header_size: 0,
    fields: &[
        (16, Field::U16),           // file number
        (18, Field::U16),           // directory number
        (42, Field::Version),       // firmware version
        (48, Field::BuildDate),     // firmware date
        (52, Field::Char16),        // trigger mode
        (54, Field::U16s(2)),       // sequence
        (58, Field::SplitU32),      // event number
        (62, Field::DateTimeWords), // date/time original
        (74, Field::U16),           // day of week
        (76, Field::U16),           // moon phase
        (78, Field::I16),           // ambient temperature (F)
        (80, Field::I16),           // ambient temperature (C)
        (82, Field::U16),           // contrast
        (84, Field::U16),           // brightness
        (86, Field::U16),           // sharpness
        (88, Field::U16),           // saturation
        (90, Field::U16),           // flash
        (92, Field::U16),           // ambient infrared
        (94, Field::U16),           // ambient light
        (96, Field::U16),           // motion sensitivity
        (98, Field::Millivolts),    // battery voltage
        (100, Field::Millivolts),   // average battery voltage
        (102, Field::U16),          // battery type
        (104, Field::Text(22)),     // user label
        (126, Field::Utf16(30)),    // serial number
    ],
};

impl Record {
    fn layout(self) -> &'static Layout {
        match self {
            Record::Kodak => &KODAK,
            Record::ReconyxHyperFire => &RECONYX_HYPERFIRE,
            Record::ReconyxUltraFire => &RECONYX_ULTRAFIRE,
            Record::ReconyxHyperFire2 => &RECONYX_HYPERFIRE_2,
        }
    }
}

/// Value of one field, or a message when the bytes do not form a valid value.
type FieldValue = Result<TagValue, String>;

fn date_time(year: u16, month: u16, day: u16, hour: u16, minute: u16, second: u16) -> FieldValue {
    NaiveDate::from_ymd_opt(year.into(), month.into(), day.into())
        .and_then(|date| date.and_hms_opt(hour.into(), minute.into(), second.into()))
        .map(TagValue::from)
        .ok_or_else(|| {
            format!("Date/Time Original {year:04}:{month:02}:{day:02} {hour:02}:{minute:02}:{second:02} is not a valid date/time")
        })
}

/// Hex digits of two words, which some firmware uses to spell a decimal date.
fn build_date(year: u16, month_day: u16) -> Result<String, String> {
    let digits = format!("{year:04X}{month_day:04X}");
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        Ok(digits)
    } else {
        Err(format!("Firmware build '{digits}' is not in the expected format"))
    }
}

fn read_words<S: ByteSource>(reader: &mut RandomAccessReader<S>, offset: i64, count: i64) -> Result<Vec<u16>, ReadError> {
    (0..count).map(|i| reader.get_u16(offset + 2 * i)).collect()
}

fn read_field<S: ByteSource>(
    reader: &mut RandomAccessReader<S>,
    offset: i64,
    field: Field,
) -> Result<FieldValue, ReadError> {
    let value = match field {
        Field::Text(max_len) => {
            let bytes = reader.get_null_terminated_bytes(offset, max_len)?;
            TagValue::String(StringValue::new(bytes, Some(Charset::Utf8)))
        }
        Field::Utf16(len) => {
            let bytes = reader.get_bytes(offset, len)?;
            let end = bytes
                .chunks_exact(2)
                .position(|unit| unit == [0, 0])
                .map_or(bytes.len(), |units| 2 * units);
            TagValue::String(StringValue::new(bytes.slice(..end), Some(Charset::Utf16Le)))
        }
        Field::Char16 => {
            let unit = reader.get_u16(offset)?;
            char::decode_utf16([unit])
                .next()
                .and_then(Result::ok)
                .map_or_else(|| TagValue::from(unit), |c| TagValue::from(c.to_string()))
        }
        Field::U8 => reader.get_u8(offset)?.into(),
        Field::I8 => reader.get_i8(offset)?.into(),
        Field::U16 => reader.get_u16(offset)?.into(),
        Field::I16 => reader.get_i16(offset)?.into(),
        Field::U32 => reader.get_u32(offset)?.into(),
        Field::SplitU32 => {
            let high = u32::from(reader.get_u16(offset)?);
            let low = u32::from(reader.get_u16(offset + 2)?);
            ((high << 16) | low).into()
        }
        Field::U8s(count) => {
            let values = (0..count)
                .map(|i| reader.get_u8(offset + i).map(u64::from))
                .collect::<Result<_, _>>()?;
            TagValue::Array(TagArray::Unsigned(values))
        }
        Field::U16s(count) => {
            let values = read_words(reader, offset, count)?.into_iter().map(u64::from).collect();
            TagValue::Array(TagArray::Unsigned(values))
        }
        Field::Raw(len) => reader.get_bytes(offset, len)?.into(),
        Field::Millivolts => (f64::from(reader.get_u16(offset)?) / 1000.0).into(),
        Field::Version => {
            let words = read_words(reader, offset, 3)?;
            format!("{}.{}.{}", words[0], words[1], words[2]).into()
        }
        Field::BuildDate => {
            let words = read_words(reader, offset, 2)?;
            return Ok(build_date(words[0], words[1]).map(TagValue::from));
        }
        Field::Firmware => {
            let words = read_words(reader, offset, 5)?;
            let version = format!("{}.{}.{}", words[0], words[1], words[2]);
            return Ok(build_date(words[3], words[4]).map(|build| format!("{version}.{build}").into()));
        }
        Field::DateTimeWords => {
            let w = read_words(reader, offset, 6)?;
            return Ok(date_time(w[5], w[3], w[4], w[2], w[1], w[0]));
        }
        Field::DateTimeBytes => {
            let b = reader.get_bytes(offset, 5)?;
            let year = reader.get_u16(offset + 5)?;
            let [second, minute, hour, day, month] = [b[0], b[1], b[2], b[3], b[4]].map(u16::from);
            return Ok(date_time(year, month, day, hour, minute, second));
        }
    };
    Ok(Ok(value))
}

fn read_record<S: ByteSource>(
    reader: &mut RandomAccessReader<S>,
    layout: &Layout,
    note_offset: i64,
    directory: &mut Directory,
) -> Result<(), ReadError> {
    let data_offset = note_offset + layout.header_size;
    for &(tag, field) in layout.fields {
        match read_field(reader, data_offset + i64::from(tag), field)? {
            Ok(value) => directory.set(tag, value),
            Err(message) => directory.add_error(format!("Error processing {}: {message}", layout.kind.name())),
        }
    }
    Ok(())
}

/// Decode the record at `note_offset` into a new directory.
///
/// Fields read before a failure are kept.
pub(super) fn extract<S: ByteSource>(walker: &mut IfdWalker<'_, S>, record: Record, note_offset: i64) {
    let layout = record.layout();
    let mut directory = Directory::new(DirectoryKind::Makernote(layout.kind));

    let byte_order = layout.byte_order.unwrap_or_else(|| walker.reader().byte_order());
    let result = walker.with_byte_order(byte_order, |walker| {
        read_record(walker.reader(), layout, note_offset, &mut directory)
    });
    if let Err(err) = result {
        debug!(kind = ?layout.kind, offset = note_offset, error = %err, "Makernote record truncated");
        directory.add_error(format!("Error processing {} data: {err}", layout.kind.name()));
    }

    walker.add_directory(directory);
}
