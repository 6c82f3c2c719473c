//! Traversal of the IFD graph.
//!
//! An IFD is a 2-byte entry count, a run of 12-byte entries and a 4-byte
//! pointer to the next IFD:
//!
//! ```text
//! Entry bytes 0-1: Tag ID
//! Entry bytes 2-3: Format code
//! Entry bytes 4-7: Component count
//! Entry bytes 8-11: Value (if <= 4 bytes) or offset to value
//! ```
//!
//! Offsets are relative to a base that starts at the TIFF header and may be
//! rebased by vendor makernotes. The walker never fails after the header:
//! damaged entries and directories are recorded as errors on the directory
//! being filled and traversal carries on.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::handler::TiffHandler;
use super::parser::{TiffHeader, TIFF_HEADER_SIZE};
use super::tags::FieldType;
use crate::config::DecodeOptions;
use crate::error::{FormatError, ReadError};
use crate::io::{ByteOrder, ByteSource, Charset, RandomAccessReader};
use crate::metadata::{Directory, DirectoryKind, Metadata, Rational, StringValue, TagArray, TagId, TagValue};

/// Size of one IFD entry in bytes
pub const IFD_ENTRY_SIZE: i64 = 12;

/// Everything known about an IFD entry before its value is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagEntry {
    pub tag_id: TagId,
    pub format_code: u16,
    /// `None` for format codes outside the TIFF field types
    pub format: Option<FieldType>,
    pub component_count: u32,
    pub byte_count: u64,
    /// Absolute offset of the value bytes
    pub value_offset: i64,
    /// Base that offsets in this entry's IFD are relative to
    pub base_offset: i64,
}

impl TagEntry {
    /// Byte count as a signed read length.
    pub fn byte_len(&self) -> i64 {
        i64::try_from(self.byte_count).unwrap_or(i64::MAX)
    }
}

enum EntryOutcome {
    Processed,
    InvalidFormat,
}

// =============================================================================
// Entry points
// =============================================================================

/// Decode the TIFF structure whose header starts at `start_offset`.
///
/// Only header-level problems fail the call; everything below the header is
/// reported through the directories' error lists.
pub fn decode<S: ByteSource, H: TiffHandler>(
    reader: &mut RandomAccessReader<S>,
    handler: &mut H,
    start_offset: i64,
) -> Result<Metadata, FormatError> {
    decode_with_options(reader, handler, start_offset, &DecodeOptions::default())
}

/// [`decode`] with explicit options.
pub fn decode_with_options<S: ByteSource, H: TiffHandler>(
    reader: &mut RandomAccessReader<S>,
    handler: &mut H,
    start_offset: i64,
    options: &DecodeOptions,
) -> Result<Metadata, FormatError> {
    let header = TiffHeader::read(reader, start_offset)?;
    let root = handler.set_format_marker(header.marker)?;

    let mut first_ifd = header.first_ifd_offset;
    let misplaced = !reader.is_valid_range(first_ifd, 2);
    if misplaced {
        warn!(
            offset = first_ifd,
            "First IFD offset is beyond the end of the data, trying default offset"
        );
        first_ifd = start_offset + TIFF_HEADER_SIZE;
    }

    let mut walker = IfdWalker::new(reader, options);
    if let Some(index) = walker.process_ifd(handler, root, first_ifd, start_offset) {
        if misplaced {
            if let Some(directory) = walker.metadata.get_mut(index) {
                directory.add_error("First IFD offset is beyond the end of the TIFF data segment -- trying default offset");
            }
        }
    }
    handler.on_complete(&mut walker, start_offset);

    let metadata = walker.into_metadata();
    debug!(
        directories = metadata.len(),
        errors = metadata.errors().count(),
        "TIFF decode complete"
    );
    Ok(metadata)
}

// =============================================================================
// IfdWalker
// =============================================================================

/// Traversal state for one decode call.
///
/// Handlers receive the walker to read bytes, add directories and recurse
/// into further IFDs.
pub struct IfdWalker<'a, S> {
    reader: &'a mut RandomAccessReader<S>,
    options: &'a DecodeOptions,
    visited: HashSet<i64>,
    metadata: Metadata,
    current: Option<usize>,
    /// Nesting of `process_ifd` calls; follower chains don't count
    depth: usize,
}

impl<'a, S: ByteSource> IfdWalker<'a, S> {
    pub fn new(reader: &'a mut RandomAccessReader<S>, options: &'a DecodeOptions) -> Self {
        Self {
            reader,
            options,
            visited: HashSet::new(),
            metadata: Metadata::new(),
            current: None,
            depth: 0,
        }
    }

    pub fn reader(&mut self) -> &mut RandomAccessReader<S> {
        self.reader
    }

    pub fn options(&self) -> &DecodeOptions {
        self.options
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn into_metadata(self) -> Metadata {
        self.metadata
    }

    /// Kind of the directory currently being filled.
    pub fn current_kind(&self) -> Option<DirectoryKind> {
        self.current_directory().map(Directory::kind)
    }

    pub fn current_directory(&self) -> Option<&Directory> {
        self.current.and_then(|i| self.metadata.get(i))
    }

    pub fn current_directory_mut(&mut self) -> Option<&mut Directory> {
        self.current.and_then(|i| self.metadata.get_mut(i))
    }

    pub fn directory_mut(&mut self, index: usize) -> Option<&mut Directory> {
        self.metadata.get_mut(index)
    }

    /// Append a directory that is not part of the IFD chain.
    pub fn add_directory(&mut self, directory: Directory) -> usize {
        self.metadata.push(directory)
    }

    /// Record an error on the directory currently being filled.
    pub fn add_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.current_directory_mut() {
            Some(directory) => directory.add_error(message),
            None => warn!("Error outside any directory: {}", message),
        }
    }

    /// Run `f` with the reader switched to `byte_order`, restoring the
    /// previous order afterwards.
    pub fn with_byte_order<T>(&mut self, byte_order: ByteOrder, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.reader.byte_order();
        self.reader.set_byte_order(byte_order);
        let result = f(self);
        self.reader.set_byte_order(saved);
        result
    }

    /// Decode the IFD at `ifd_offset` into a new directory of `kind`, then
    /// any follower IFDs chained after it.
    ///
    /// Offsets already visited in this decode are skipped, so pointer cycles
    /// terminate. Sub-IFD nesting beyond [`DecodeOptions::max_ifd_depth`] is
    /// recorded as an error on the current directory and not entered.
    /// Returns the index of the new directory, or `None` if it was skipped.
    /// The reader's byte order and the current directory are restored before
    /// returning.
    pub fn process_ifd<H: TiffHandler>(
        &mut self,
        handler: &mut H,
        kind: DirectoryKind,
        ifd_offset: i64,
        base_offset: i64,
    ) -> Option<usize> {
        if self.depth >= self.options.max_ifd_depth {
            debug!(offset = ifd_offset, kind = %kind, depth = self.depth, "IFD nesting limit reached, skipping");
            self.add_error("IFD nesting too deep");
            return None;
        }

        self.depth += 1;
        let byte_order = self.reader.byte_order();
        let mut first = None;
        let mut next = Some((kind, ifd_offset));
        // Followers are walked in a loop so long chains don't nest
        while let Some((kind, offset)) = next.take() {
            let Some((index, follower)) = self.walk_one(handler, kind, offset, base_offset) else {
                break;
            };
            first.get_or_insert(index);
            next = follower;
        }
        self.reader.set_byte_order(byte_order);
        self.depth -= 1;
        first
    }

    /// Fill one directory and report the follower IFD to walk next, if any.
    fn walk_one<H: TiffHandler>(
        &mut self,
        handler: &mut H,
        kind: DirectoryKind,
        ifd_offset: i64,
        base_offset: i64,
    ) -> Option<(usize, Option<(DirectoryKind, i64)>)> {
        if !self.visited.insert(ifd_offset) {
            debug!(offset = ifd_offset, kind = %kind, "IFD already visited, skipping");
            return None;
        }

        let index = self.metadata.push(Directory::new(kind));
        let parent = self.current.replace(index);

        let mut follower = None;
        if !self.reader.is_valid_range(ifd_offset, 2) {
            self.add_error("Ignored IFD marked to start outside data segment");
        } else {
            match self.walk_directory(handler, kind, ifd_offset, base_offset) {
                Ok(next) => follower = next,
                Err(err) => {
                    warn!(offset = ifd_offset, kind = %kind, error = %err, "IFD decode aborted");
                    self.add_error(err.to_string());
                }
            }
        }

        self.current = parent;
        Some((index, follower))
    }

    fn walk_directory<H: TiffHandler>(
        &mut self,
        handler: &mut H,
        kind: DirectoryKind,
        ifd_offset: i64,
        base_offset: i64,
    ) -> Result<Option<(DirectoryKind, i64)>, ReadError> {
        let mut tag_count = self.reader.get_u16(ifd_offset)?;

        // Some writers emit one IFD in the wrong byte order; a count with an
        // empty low byte is the tell
        if tag_count > 0xFF && tag_count & 0xFF == 0 {
            tag_count >>= 8;
            let swapped = self.reader.byte_order().opposite();
            debug!(offset = ifd_offset, "IFD entry count looks byte-swapped, reading as {:?}", swapped);
            self.reader.set_byte_order(swapped);
        }

        let entries_len = IFD_ENTRY_SIZE * i64::from(tag_count);
        if !self.reader.is_valid_range(ifd_offset, 2 + entries_len + 4) {
            self.add_error("Illegally sized IFD");
            return Ok(None);
        }

        let mut invalid_formats = 0;
        for n in 0..i64::from(tag_count) {
            let entry_offset = ifd_offset + 2 + IFD_ENTRY_SIZE * n;
            match self.process_entry(handler, kind, entry_offset, base_offset)? {
                EntryOutcome::Processed => {}
                EntryOutcome::InvalidFormat => {
                    invalid_formats += 1;
                    if invalid_formats > self.options.max_invalid_formats {
                        self.add_error("Stopping processing as too many errors seen in TIFF IFD");
                        return Ok(None);
                    }
                }
            }
        }

        let next = self.reader.get_i32(ifd_offset + 2 + entries_len)?;
        if next == 0 {
            return Ok(None);
        }
        let next = i64::from(next) + base_offset;
        if !self.reader.is_valid_range(next, 1) {
            debug!(offset = next, "Next IFD pointer is outside the data, ignoring");
            return Ok(None);
        }
        if next < ifd_offset {
            debug!(offset = next, from = ifd_offset, "Next IFD pointer points backwards, ignoring");
            return Ok(None);
        }

        let follower = self
            .current_directory()
            .and_then(|directory| handler.has_follower_directory(directory));
        Ok(follower.map(|follower| (follower, next)))
    }

    /// Read one entry header and dispatch its value.
    ///
    /// Only failures to read the 12 entry bytes themselves propagate; they
    /// were already bounds-checked as part of the IFD.
    fn process_entry<H: TiffHandler>(
        &mut self,
        handler: &mut H,
        kind: DirectoryKind,
        entry_offset: i64,
        base_offset: i64,
    ) -> Result<EntryOutcome, ReadError> {
        let tag_id = self.reader.get_u16(entry_offset)?;
        let format_code = self.reader.get_u16(entry_offset + 2)?;
        let component_count = self.reader.get_u32(entry_offset + 4)?;
        let format = FieldType::from_u16(format_code);

        let byte_count = match format {
            Some(format) => u64::from(component_count) * format.size_in_bytes() as u64,
            None => match handler.custom_format_byte_count(tag_id, format_code, component_count) {
                Some(byte_count) => byte_count,
                None => {
                    self.add_error(format!(
                        "Invalid TIFF tag format code {format_code} for tag 0x{tag_id:04X}"
                    ));
                    return Ok(EntryOutcome::InvalidFormat);
                }
            },
        };

        let value_offset = if byte_count > FieldType::INLINE_THRESHOLD {
            base_offset + i64::from(self.reader.get_u32(entry_offset + 8)?)
        } else {
            entry_offset + 8
        };

        let entry = TagEntry {
            tag_id,
            format_code,
            format,
            component_count,
            byte_count,
            value_offset,
            base_offset,
        };

        if let Err(err) = self.dispatch_entry(handler, kind, &entry) {
            debug!(tag = tag_id, error = %err, "Tag decode failed");
            self.add_error(format!("Error decoding tag 0x{tag_id:04X}: {err}"));
        }
        Ok(EntryOutcome::Processed)
    }

    fn dispatch_entry<H: TiffHandler>(
        &mut self,
        handler: &mut H,
        kind: DirectoryKind,
        entry: &TagEntry,
    ) -> Result<(), ReadError> {
        self.reader.validate(entry.value_offset, entry.byte_len())?;

        if entry.component_count > 0 && entry.byte_count == 4 * u64::from(entry.component_count) {
            if let Some(sub_kind) = handler.is_ifd_pointer_tag(kind, entry.tag_id) {
                for i in 0..i64::from(entry.component_count) {
                    let pointer = self.reader.get_u32(entry.value_offset + 4 * i)?;
                    self.process_ifd(handler, sub_kind, entry.base_offset + i64::from(pointer), entry.base_offset);
                }
                return Ok(());
            }
        }

        if handler.custom_process_tag(self, entry)? {
            return Ok(());
        }

        if let Some(value) = self.read_value(entry)? {
            if let Some(directory) = self.current_directory_mut() {
                directory.set(entry.tag_id, value);
            }
        }
        Ok(())
    }

    /// Decode an entry's value according to its field type.
    ///
    /// Single components become scalars, anything else an array. Returns
    /// `None` (recording an error) for unknown format codes.
    pub fn read_value(&mut self, entry: &TagEntry) -> Result<Option<TagValue>, ReadError> {
        let Some(format) = entry.format else {
            self.add_error(format!(
                "Invalid TIFF tag format code {} for tag 0x{:04X}",
                entry.format_code, entry.tag_id
            ));
            return Ok(None);
        };

        let offset = entry.value_offset;
        let count = entry.component_count;
        let reader = &mut *self.reader;

        let value = match format {
            FieldType::Undefined => TagValue::Bytes(reader.get_bytes(offset, i64::from(count))?),
            FieldType::Ascii => {
                let bytes = reader.get_null_terminated_bytes(offset, i64::from(count))?;
                TagValue::String(StringValue::new(bytes, Some(Charset::Utf8)))
            }
            FieldType::Byte => scalar_or_array(
                read_components(count, |i| reader.get_u8(offset + i).map(u64::from))?,
                TagValue::Unsigned,
                TagArray::Unsigned,
            ),
            FieldType::SByte => scalar_or_array(
                read_components(count, |i| reader.get_i8(offset + i).map(i64::from))?,
                TagValue::Signed,
                TagArray::Signed,
            ),
            FieldType::Short => scalar_or_array(
                read_components(count, |i| reader.get_u16(offset + 2 * i).map(u64::from))?,
                TagValue::Unsigned,
                TagArray::Unsigned,
            ),
            FieldType::SShort => scalar_or_array(
                read_components(count, |i| reader.get_i16(offset + 2 * i).map(i64::from))?,
                TagValue::Signed,
                TagArray::Signed,
            ),
            FieldType::Long | FieldType::Ifd => scalar_or_array(
                read_components(count, |i| reader.get_u32(offset + 4 * i).map(u64::from))?,
                TagValue::Unsigned,
                TagArray::Unsigned,
            ),
            FieldType::SLong => scalar_or_array(
                read_components(count, |i| reader.get_i32(offset + 4 * i).map(i64::from))?,
                TagValue::Signed,
                TagArray::Signed,
            ),
            FieldType::Float => scalar_or_array(
                read_components(count, |i| reader.get_f32(offset + 4 * i))?,
                TagValue::Float,
                TagArray::Float,
            ),
            FieldType::Double => scalar_or_array(
                read_components(count, |i| reader.get_f64(offset + 8 * i))?,
                TagValue::Double,
                TagArray::Double,
            ),
            FieldType::Rational => scalar_or_array(
                read_components(count, |i| {
                    let numerator = reader.get_u32(offset + 8 * i)?;
                    let denominator = reader.get_u32(offset + 8 * i + 4)?;
                    Ok(Rational::new(numerator.into(), denominator.into()))
                })?,
                TagValue::Rational,
                TagArray::Rational,
            ),
            FieldType::SRational => scalar_or_array(
                read_components(count, |i| {
                    let numerator = reader.get_i32(offset + 8 * i)?;
                    let denominator = reader.get_i32(offset + 8 * i + 4)?;
                    Ok(Rational::new(numerator.into(), denominator.into()))
                })?,
                TagValue::Rational,
                TagArray::Rational,
            ),
        };
        Ok(Some(value))
    }
}

fn read_components<T>(
    count: u32,
    mut read: impl FnMut(i64) -> Result<T, ReadError>,
) -> Result<Vec<T>, ReadError> {
    (0..i64::from(count)).map(|i| read(i)).collect()
}

fn scalar_or_array<T>(values: Vec<T>, scalar: fn(T) -> TagValue, array: fn(Vec<T>) -> TagArray) -> TagValue {
    match <[T; 1]>::try_from(values) {
        Ok([value]) => scalar(value),
        Err(values) => TagValue::Array(array(values)),
    }
}
