use std::fmt;

use serde::{Serialize, Serializer};

/// Vendor-specific makernote directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Makernote {
    OlympusMain,
    OlympusEquipment,
    OlympusCameraSettings,
    OlympusRawDevelopment,
    OlympusRawDevelopment2,
    OlympusImageProcessing,
    OlympusFocusInfo,
    OlympusRawInfo,
    NikonType1,
    NikonType2,
    SonyType1,
    SonyType6,
    Sigma,
    Kodak,
    Canon,
    CasioType1,
    CasioType2,
    Fujifilm,
    Kyocera,
    LeicaType5,
    Leica,
    Panasonic,
    Pentax,
    Sanyo,
    Ricoh,
    Apple,
    Samsung,
    Dji,
    Flir,
    ReconyxHyperFire,
    ReconyxUltraFire,
    ReconyxHyperFire2,
}

impl Makernote {
    pub const fn name(&self) -> &'static str {
        match self {
            Makernote::OlympusMain => "Olympus Makernote",
            Makernote::OlympusEquipment => "Olympus Equipment",
            Makernote::OlympusCameraSettings => "Olympus Camera Settings",
            Makernote::OlympusRawDevelopment => "Olympus Raw Development",
            Makernote::OlympusRawDevelopment2 => "Olympus Raw Development 2",
            Makernote::OlympusImageProcessing => "Olympus Image Processing",
            Makernote::OlympusFocusInfo => "Olympus Focus Info",
            Makernote::OlympusRawInfo => "Olympus Raw Info",
            Makernote::NikonType1 => "Nikon Makernote (Type 1)",
            Makernote::NikonType2 => "Nikon Makernote",
            Makernote::SonyType1 => "Sony Makernote",
            Makernote::SonyType6 => "Sony Makernote (Type 6)",
            Makernote::Sigma => "Sigma Makernote",
            Makernote::Kodak => "Kodak Makernote",
            Makernote::Canon => "Canon Makernote",
            Makernote::CasioType1 => "Casio Makernote (Type 1)",
            Makernote::CasioType2 => "Casio Makernote",
            Makernote::Fujifilm => "Fujifilm Makernote",
            Makernote::Kyocera => "Kyocera/Contax Makernote",
            Makernote::LeicaType5 => "Leica Makernote (Type 5)",
            Makernote::Leica => "Leica Makernote",
            Makernote::Panasonic => "Panasonic Makernote",
            Makernote::Pentax => "Pentax Makernote",
            Makernote::Sanyo => "Sanyo Makernote",
            Makernote::Ricoh => "Ricoh Makernote",
            Makernote::Apple => "Apple Makernote",
            Makernote::Samsung => "Samsung Makernote",
            Makernote::Dji => "DJI Makernote",
            Makernote::Flir => "FLIR Makernote",
            Makernote::ReconyxHyperFire => "Reconyx HyperFire Makernote",
            Makernote::ReconyxUltraFire => "Reconyx UltraFire Makernote",
            Makernote::ReconyxHyperFire2 => "Reconyx HyperFire 2 Makernote",
        }
    }
}

/// What a [`Directory`](super::Directory) describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryKind {
    /// Main image directory (IFD0)
    ExifIfd0,
    /// Exif sub-IFD
    ExifSubIfd,
    /// Interoperability IFD
    ExifInterop,
    /// IFD1 and any further thumbnail directories
    ExifThumbnail,
    /// Additional pages of a multipage TIFF
    ExifImage,
    Gps,
    /// IFD0 of a Panasonic RW2 raw file
    PanasonicRawIfd0,
    PrintIm,
    Xmp,
    Iptc,
    Icc,
    Photoshop,
    Makernote(Makernote),
}

impl DirectoryKind {
    pub const fn name(&self) -> &'static str {
        match self {
            DirectoryKind::ExifIfd0 => "Exif IFD0",
            DirectoryKind::ExifSubIfd => "Exif SubIFD",
            DirectoryKind::ExifInterop => "Interoperability",
            DirectoryKind::ExifThumbnail => "Exif Thumbnail",
            DirectoryKind::ExifImage => "Exif Image",
            DirectoryKind::Gps => "GPS",
            DirectoryKind::PanasonicRawIfd0 => "PanasonicRaw Exif IFD0",
            DirectoryKind::PrintIm => "PrintIM",
            DirectoryKind::Xmp => "XMP",
            DirectoryKind::Iptc => "IPTC",
            DirectoryKind::Icc => "ICC Profile",
            DirectoryKind::Photoshop => "Photoshop",
            DirectoryKind::Makernote(m) => m.name(),
        }
    }

    pub const fn is_makernote(&self) -> bool {
        matches!(self, DirectoryKind::Makernote(_))
    }
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for DirectoryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
