//! Epson Print Image Matching block.
//!
//! ```text
//! Bytes 0-7:   "PrintIM\0"
//! Bytes 8-11:  Version text
//! Bytes 14-15: Entry count
//! Bytes 16-:   Entries of (u16 tag, u32 value)
//! ```
//!
//! Some writers store the count and entries in the opposite byte order to
//! the enclosing TIFF; that is detected from the count.

use crate::error::ReadError;
use crate::format::tiff::{IfdWalker, TagEntry};
use crate::io::{ByteSource, Charset, RandomAccessReader};
use crate::metadata::{Directory, DirectoryKind, StringValue, TagId};

const HEADER: &[u8] = b"PrintIM";
const ENTRIES_OFFSET: i64 = 16;
const ENTRY_SIZE: i64 = 6;

/// Tag holding the version text
pub const TAG_PRINT_IM_VERSION: TagId = 0x0000;

fn read_block<S: ByteSource>(
    reader: &mut RandomAccessReader<S>,
    offset: i64,
    byte_count: i64,
    directory: &mut Directory,
) -> Result<(), String> {
    if byte_count == 0 {
        return Err("Empty PrintIM data".to_string());
    }
    if byte_count <= 15 {
        return Err("Bad PrintIM data".to_string());
    }

    let header = reader.get_bytes(offset, 12).map_err(|e| e.to_string())?;
    if !header.starts_with(HEADER) {
        return Err("Invalid PrintIM header".to_string());
    }

    let fits = |count: u16| ENTRIES_OFFSET + ENTRY_SIZE * i64::from(count) <= byte_count;
    let mut count = reader.get_u16(offset + 14).map_err(|e| e.to_string())?;
    if !fits(count) {
        let swapped = reader.byte_order().opposite();
        reader.set_byte_order(swapped);
        count = reader.get_u16(offset + 14).map_err(|e| e.to_string())?;
        if !fits(count) {
            return Err("Bad PrintIM size".to_string());
        }
    }

    directory.set(
        TAG_PRINT_IM_VERSION,
        StringValue::new(header.slice(8..12), Some(Charset::Utf8)),
    );

    let entries = (0..i64::from(count)).try_for_each(|n| -> Result<(), ReadError> {
        let pos = offset + ENTRIES_OFFSET + ENTRY_SIZE * n;
        let tag = reader.get_u16(pos)?;
        let value = reader.get_u32(pos + 2)?;
        directory.set(tag, value);
        Ok(())
    });
    entries.map_err(|e| e.to_string())
}

/// Decode the PrintIM block of `entry` into a new directory.
pub(super) fn extract<S: ByteSource>(walker: &mut IfdWalker<'_, S>, entry: &TagEntry) {
    let mut directory = Directory::new(DirectoryKind::PrintIm);

    let byte_order = walker.reader().byte_order();
    let result = walker.with_byte_order(byte_order, |walker| {
        read_block(walker.reader(), entry.value_offset, entry.byte_len(), &mut directory)
    });
    if let Err(message) = result {
        directory.add_error(message);
    }

    walker.add_directory(directory);
}
