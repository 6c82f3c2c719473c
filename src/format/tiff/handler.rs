use super::walker::{IfdWalker, TagEntry};
use crate::error::{FormatError, ReadError};
use crate::io::ByteSource;
use crate::metadata::{Directory, DirectoryKind, TagId};

/// Format-specific decisions consulted by the [`IfdWalker`].
///
/// The walker owns traversal (bounds, cycles, byte order, value decoding);
/// a handler decides what the directories mean and which entries need
/// special treatment.
pub trait TiffHandler {
    /// Accept the header marker and name the root directory.
    fn set_format_marker(&mut self, marker: u16) -> Result<DirectoryKind, FormatError>;

    /// Kind of sub-directory that `tag_id` points to from within `current`,
    /// or `None` if the tag is not a sub-IFD pointer.
    fn is_ifd_pointer_tag(&mut self, current: DirectoryKind, tag_id: TagId) -> Option<DirectoryKind>;

    /// Kind of the directory that a non-zero next-IFD pointer leads to, or
    /// `None` to ignore the pointer.
    fn has_follower_directory(&mut self, current: &Directory) -> Option<DirectoryKind>;

    /// Take over decoding of one entry.
    ///
    /// Return `Ok(true)` when the entry was fully handled; `Ok(false)` lets
    /// the walker decode it as a plain value. Errors are recorded on the
    /// current directory and the walk continues with the next entry.
    fn custom_process_tag<S: ByteSource>(
        &mut self,
        walker: &mut IfdWalker<'_, S>,
        entry: &TagEntry,
    ) -> Result<bool, ReadError>;

    /// Byte count for an entry whose format code is not a TIFF field type.
    ///
    /// `None` marks the entry invalid.
    fn custom_format_byte_count(&mut self, _tag_id: TagId, _format_code: u16, _component_count: u32) -> Option<u64> {
        None
    }

    /// Called once after the root directory tree has been walked.
    fn on_complete<S: ByteSource>(&mut self, walker: &mut IfdWalker<'_, S>, base_offset: i64);
}
