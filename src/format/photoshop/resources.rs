//! Photoshop image resource blocks.
//!
//! ```text
//! Bytes 0-3: Signature ("8BIM"; older writers use "MeSa", "PHUT", "AgHg", "DCSR")
//! Bytes 4-5: Resource id
//! Then:      Pascal-string name, padded so the offset stays even
//! Then:      u32 data size, the data, padded to even length
//! ```

use bytes::Bytes;
use tracing::debug;

use crate::config::DecodeOptions;
use crate::error::ReadError;
use crate::format::exif;
use crate::io::{Charset, SequentialReader, SliceCursor};
use crate::metadata::{Directory, DirectoryKind, Metadata, TagId};

const SIGNATURE_8BIM: &[u8] = b"8BIM";
const LEGACY_SIGNATURES: &[&[u8]] = &[b"MeSa", b"PHUT", b"AgHg", b"DCSR"];

pub const RESOURCE_IPTC: TagId = 0x0404;
pub const RESOURCE_ICC_PROFILE: TagId = 0x040F;
pub const RESOURCE_EXIF_DATA_1: TagId = 0x0422;
pub const RESOURCE_EXIF_DATA_3: TagId = 0x0423;
pub const RESOURCE_XMP_DATA: TagId = 0x0424;

/// Decode a run of image resource blocks.
///
/// The Photoshop directory comes first, followed by any directories decoded
/// from embedded IPTC, ICC, XMP or Exif resources. Problems are recorded on
/// the Photoshop directory; blocks read before a failure are kept.
pub fn extract(data: impl Into<Bytes>, options: &DecodeOptions) -> Metadata {
    let data = data.into();
    let mut photoshop = Directory::new(DirectoryKind::Photoshop);
    let mut nested = Metadata::new();

    if let Err(err) = read_blocks(data, options, &mut photoshop, &mut nested) {
        debug!(error = %err, "Photoshop resource data truncated");
        photoshop.add_error(format!("Error processing Photoshop resources: {err}"));
    }

    let mut metadata = Metadata::new();
    metadata.push(photoshop);
    metadata.extend(nested);
    metadata
}

fn read_blocks(
    data: Bytes,
    options: &DecodeOptions,
    photoshop: &mut Directory,
    nested: &mut Metadata,
) -> Result<(), ReadError> {
    let length = data.len() as u64;
    let mut reader = SequentialReader::<SliceCursor>::from_bytes(data);

    // A block needs at least signature, id, name length and size
    while reader.position() + 11 <= length {
        let signature = reader.get_bytes(4)?;
        let id = reader.get_u16()?;

        // Resource names are not kept
        let name_len = reader.get_u8()?;
        reader.skip(u64::from(name_len))?;
        if reader.position() % 2 != 0 {
            reader.skip(1)?;
        }

        let size = reader.get_u32()?;
        if u64::from(size) > length - reader.position() {
            photoshop.add_error(format!("Invalid size {size} for resource block 0x{id:04X}"));
            return Ok(());
        }
        let payload = reader.get_bytes(size as usize)?;
        if reader.position() % 2 != 0 {
            // The final pad byte is often missing
            reader.try_skip(1);
        }

        if &signature[..] != SIGNATURE_8BIM {
            if !LEGACY_SIGNATURES.contains(&&signature[..]) {
                photoshop.add_error(format!(
                    "Unknown resource block signature {}",
                    Charset::Iso8859_1.decode(&signature)
                ));
                return Ok(());
            }
            continue;
        }

        match id {
            RESOURCE_IPTC => {
                nested.push(Directory::with_payload(DirectoryKind::Iptc, payload));
            }
            RESOURCE_ICC_PROFILE => {
                nested.push(Directory::with_payload(DirectoryKind::Icc, payload));
            }
            RESOURCE_XMP_DATA => {
                nested.push(Directory::with_payload(DirectoryKind::Xmp, payload));
            }
            RESOURCE_EXIF_DATA_1 | RESOURCE_EXIF_DATA_3 => match exif::extract_with_options(payload, options) {
                Ok(metadata) => nested.extend(metadata),
                Err(err) => photoshop.add_error(format!("Error decoding Exif resource 0x{id:04X}: {err}")),
            },
            _ => photoshop.set(id, payload),
        }
    }

    debug!(
        tags = photoshop.tag_count(),
        nested = nested.len(),
        "Photoshop resources decoded"
    );
    Ok(())
}
