use super::resources;
use crate::error::{FormatError, ReadError};
use crate::format::exif::ExifHandler;
use crate::format::tiff::tags::{TAG_APPLICATION_NOTES, TAG_INTER_COLOR_PROFILE, TAG_PHOTOSHOP_SETTINGS};
use crate::format::tiff::{IfdWalker, TagEntry, TiffHandler};
use crate::io::ByteSource;
use crate::metadata::{Directory, DirectoryKind, TagId};

/// [`TiffHandler`] for TIFF files written by Photoshop.
///
/// Adds the embedded XMP, ICC and image-resource blocks Photoshop stores in
/// any IFD; everything else is the Exif behaviour.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhotoshopTiffHandler {
    exif: ExifHandler,
}

impl PhotoshopTiffHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TiffHandler for PhotoshopTiffHandler {
    fn set_format_marker(&mut self, marker: u16) -> Result<DirectoryKind, FormatError> {
        self.exif.set_format_marker(marker)
    }

    fn is_ifd_pointer_tag(&mut self, current: DirectoryKind, tag_id: TagId) -> Option<DirectoryKind> {
        self.exif.is_ifd_pointer_tag(current, tag_id)
    }

    fn has_follower_directory(&mut self, current: &Directory) -> Option<DirectoryKind> {
        self.exif.has_follower_directory(current)
    }

    fn custom_format_byte_count(&mut self, tag_id: TagId, format_code: u16, component_count: u32) -> Option<u64> {
        self.exif.custom_format_byte_count(tag_id, format_code, component_count)
    }

    fn custom_process_tag<S: ByteSource>(
        &mut self,
        walker: &mut IfdWalker<'_, S>,
        entry: &TagEntry,
    ) -> Result<bool, ReadError> {
        match entry.tag_id {
            TAG_APPLICATION_NOTES => {
                let payload = walker.reader().get_bytes(entry.value_offset, entry.byte_len())?;
                walker.add_directory(Directory::with_payload(DirectoryKind::Xmp, payload));
                Ok(true)
            }
            TAG_PHOTOSHOP_SETTINGS => {
                let data = walker.reader().get_bytes(entry.value_offset, entry.byte_len())?;
                let decoded = resources::extract(data, walker.options());
                for directory in decoded {
                    walker.add_directory(directory);
                }
                Ok(true)
            }
            TAG_INTER_COLOR_PROFILE => {
                let payload = walker.reader().get_bytes(entry.value_offset, entry.byte_len())?;
                walker.add_directory(Directory::with_payload(DirectoryKind::Icc, payload));
                Ok(true)
            }
            _ => self.exif.custom_process_tag(walker, entry),
        }
    }

    fn on_complete<S: ByteSource>(&mut self, walker: &mut IfdWalker<'_, S>, base_offset: i64) {
        self.exif.on_complete(walker, base_offset)
    }
}
