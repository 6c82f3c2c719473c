use tracing::debug;

use super::{makernote, print_im};
use crate::error::{FormatError, ReadError};
use crate::format::tiff::tags::*;
use crate::format::tiff::{FieldType, IfdWalker, TagEntry, TiffHandler};
use crate::io::ByteSource;
use crate::metadata::{Directory, DirectoryKind, Makernote, TagId};

/// Format marker of standard TIFF and Exif data
const MARKER_TIFF: u16 = 0x002A;
/// Olympus ORF raw markers ("OR" / "SR")
const MARKER_OLYMPUS_ORF: u16 = 0x4F52;
const MARKER_OLYMPUS_SRF: u16 = 0x5352;
/// Panasonic RW2 raw marker
const MARKER_PANASONIC_RW2: u16 = 0x0055;

/// IPTC records start with this tag marker
const IPTC_TAG_MARKER: u8 = 0x1C;

/// PrintIM block inside makernotes
pub const TAG_MAKERNOTE_PRINT_IM: TagId = 0x0E00;

/// [`TiffHandler`] for Exif data: IFD0, the Exif and GPS sub-IFDs,
/// thumbnails, embedded blocks and vendor makernotes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifHandler;

impl ExifHandler {
    pub fn new() -> Self {
        Self
    }
}

impl TiffHandler for ExifHandler {
    fn set_format_marker(&mut self, marker: u16) -> Result<DirectoryKind, FormatError> {
        match marker {
            MARKER_TIFF | MARKER_OLYMPUS_ORF | MARKER_OLYMPUS_SRF => Ok(DirectoryKind::ExifIfd0),
            MARKER_PANASONIC_RW2 => Ok(DirectoryKind::PanasonicRawIfd0),
            _ => Err(FormatError::UnexpectedMarker(marker)),
        }
    }

    fn is_ifd_pointer_tag(&mut self, current: DirectoryKind, tag_id: TagId) -> Option<DirectoryKind> {
        if tag_id == TAG_SUB_IFD_OFFSET {
            return Some(DirectoryKind::ExifSubIfd);
        }

        match current {
            DirectoryKind::ExifIfd0 | DirectoryKind::PanasonicRawIfd0 => match tag_id {
                TAG_EXIF_SUB_IFD_OFFSET => Some(DirectoryKind::ExifSubIfd),
                TAG_GPS_INFO_OFFSET => Some(DirectoryKind::Gps),
                _ => None,
            },
            DirectoryKind::ExifSubIfd if tag_id == TAG_INTEROP_OFFSET => Some(DirectoryKind::ExifInterop),
            DirectoryKind::Makernote(Makernote::OlympusMain) => olympus_sub_directory(tag_id),
            _ => None,
        }
    }

    fn has_follower_directory(&mut self, current: &Directory) -> Option<DirectoryKind> {
        match current.kind() {
            // Multipage TIFFs tag every page; otherwise IFD1 is the thumbnail
            DirectoryKind::ExifIfd0 | DirectoryKind::ExifImage => {
                if current.contains(TAG_PAGE_NUMBER) {
                    Some(DirectoryKind::ExifImage)
                } else {
                    Some(DirectoryKind::ExifThumbnail)
                }
            }
            DirectoryKind::ExifThumbnail => Some(DirectoryKind::ExifThumbnail),
            _ => None,
        }
    }

    fn custom_format_byte_count(&mut self, _tag_id: TagId, format_code: u16, _component_count: u32) -> Option<u64> {
        // Seen in some makernotes; the entry carries no value
        (format_code == 0).then_some(0)
    }

    fn custom_process_tag<S: ByteSource>(
        &mut self,
        walker: &mut IfdWalker<'_, S>,
        entry: &TagEntry,
    ) -> Result<bool, ReadError> {
        let Some(kind) = walker.current_kind() else {
            return Ok(false);
        };

        if entry.tag_id == 0 && entry.byte_count == 0 {
            return Ok(true);
        }

        match (kind, entry.tag_id) {
            (DirectoryKind::ExifSubIfd, TAG_MAKERNOTE) => makernote::process(self, walker, entry),

            (DirectoryKind::ExifIfd0, TAG_IPTC_NAA) => {
                if walker.reader().get_u8(entry.value_offset)? != IPTC_TAG_MARKER {
                    return Ok(false);
                }
                let payload = walker.reader().get_bytes(entry.value_offset, entry.byte_len())?;
                walker.add_directory(Directory::with_payload(DirectoryKind::Iptc, payload));
                Ok(true)
            }

            (DirectoryKind::ExifIfd0, TAG_APPLICATION_NOTES) => {
                let payload = walker
                    .reader()
                    .get_null_terminated_bytes(entry.value_offset, entry.byte_len())?;
                walker.add_directory(Directory::with_payload(DirectoryKind::Xmp, payload));
                Ok(true)
            }

            (kind, TAG_PRINT_IMAGE_MATCHING_INFO) if !kind.is_makernote() => {
                print_im::extract(walker, entry);
                Ok(true)
            }
            (DirectoryKind::Makernote(_), TAG_MAKERNOTE_PRINT_IM) => {
                print_im::extract(walker, entry);
                Ok(true)
            }

            // Olympus sub-directories stored inline rather than behind a pointer
            (DirectoryKind::Makernote(Makernote::OlympusMain), tag_id)
                if entry.format == Some(FieldType::Undefined) =>
            {
                match olympus_sub_directory(tag_id) {
                    Some(sub_kind) => {
                        walker.process_ifd(self, sub_kind, entry.value_offset, entry.base_offset);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }

            _ => Ok(false),
        }
    }

    fn on_complete<S: ByteSource>(&mut self, walker: &mut IfdWalker<'_, S>, base_offset: i64) {
        if walker.options().extract_thumbnail {
            extract_thumbnail(walker, base_offset);
        }
    }
}

fn olympus_sub_directory(tag_id: TagId) -> Option<DirectoryKind> {
    let makernote = match tag_id {
        TAG_OLYMPUS_EQUIPMENT => Makernote::OlympusEquipment,
        TAG_OLYMPUS_CAMERA_SETTINGS => Makernote::OlympusCameraSettings,
        TAG_OLYMPUS_RAW_DEVELOPMENT => Makernote::OlympusRawDevelopment,
        TAG_OLYMPUS_RAW_DEVELOPMENT_2 => Makernote::OlympusRawDevelopment2,
        TAG_OLYMPUS_IMAGE_PROCESSING => Makernote::OlympusImageProcessing,
        TAG_OLYMPUS_FOCUS_INFO => Makernote::OlympusFocusInfo,
        TAG_OLYMPUS_RAW_INFO => Makernote::OlympusRawInfo,
        TAG_OLYMPUS_MAIN_INFO => Makernote::OlympusMain,
        _ => return None,
    };
    Some(DirectoryKind::Makernote(makernote))
}

/// Attach the compressed thumbnail image to the first thumbnail directory.
fn extract_thumbnail<S: ByteSource>(walker: &mut IfdWalker<'_, S>, base_offset: i64) {
    let Some(index) = walker.metadata().position_of(DirectoryKind::ExifThumbnail) else {
        return;
    };
    let Some(thumbnail) = walker.metadata().get(index) else {
        return;
    };
    if !thumbnail.contains(TAG_COMPRESSION) {
        return;
    }
    let (Some(offset), Some(length)) = (thumbnail.long(TAG_THUMBNAIL_OFFSET), thumbnail.long(TAG_THUMBNAIL_LENGTH))
    else {
        return;
    };

    let result = walker.reader().get_bytes(base_offset + offset, length);
    if let Some(directory) = walker.directory_mut(index) {
        match result {
            Ok(bytes) => {
                debug!(offset, length, "Thumbnail image extracted");
                directory.set_payload(bytes);
            }
            Err(err) => directory.add_error(format!("Invalid thumbnail data specification: {err}")),
        }
    }
}
