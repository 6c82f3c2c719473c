use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::directory::Directory;
use super::kind::DirectoryKind;
use super::value::format_with_places;
use super::TagId;

// GPS IFD tags used for position and time.
pub const TAG_GPS_LATITUDE_REF: TagId = 0x0001;
pub const TAG_GPS_LATITUDE: TagId = 0x0002;
pub const TAG_GPS_LONGITUDE_REF: TagId = 0x0003;
pub const TAG_GPS_LONGITUDE: TagId = 0x0004;
pub const TAG_GPS_TIME_STAMP: TagId = 0x0007;
pub const TAG_GPS_DATE_STAMP: TagId = 0x001D;

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Read the position recorded in a GPS directory.
    ///
    /// Returns `None` when any of the four position tags is missing or
    /// malformed, or when a coordinate is not finite or out of range.
    pub fn from_gps_directory(directory: &Directory) -> Option<Self> {
        if directory.kind() != DirectoryKind::Gps {
            return None;
        }
        let latitude = directory_coordinate(directory, TAG_GPS_LATITUDE, TAG_GPS_LATITUDE_REF, "S")?;
        let longitude = directory_coordinate(directory, TAG_GPS_LONGITUDE, TAG_GPS_LONGITUDE_REF, "W")?;
        if latitude.abs() > MAX_LATITUDE || longitude.abs() > MAX_LONGITUDE {
            return None;
        }
        Some(Self::new(latitude, longitude))
    }

    /// Latitude formatted as degrees, minutes and seconds.
    pub fn latitude_dms(&self) -> String {
        decimal_to_dms_string(self.latitude)
    }

    /// Longitude formatted as degrees, minutes and seconds.
    pub fn longitude_dms(&self) -> String {
        decimal_to_dms_string(self.longitude)
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

fn directory_coordinate(directory: &Directory, value_tag: TagId, ref_tag: TagId, negative_ref: &str) -> Option<f64> {
    let parts = directory.rational_array(value_tag)?;
    let reference = directory.string(ref_tag)?;
    let [degrees, minutes, seconds] = parts.as_slice() else {
        return None;
    };
    degrees_minutes_seconds_to_decimal(
        degrees.to_f64(),
        minutes.to_f64(),
        seconds.to_f64(),
        reference.trim().eq_ignore_ascii_case(negative_ref),
    )
}

/// Combine degrees, minutes and seconds into decimal degrees.
///
/// The sign of `degrees` is ignored; `negative` selects the hemisphere.
/// Returns `None` if the result is NaN or infinite.
pub fn degrees_minutes_seconds_to_decimal(degrees: f64, minutes: f64, seconds: f64, negative: bool) -> Option<f64> {
    let decimal = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    if !decimal.is_finite() {
        return None;
    }
    Some(if negative { -decimal } else { decimal })
}

/// Split decimal degrees into whole degrees, minutes and seconds.
pub fn decimal_to_degrees_minutes_seconds(decimal: f64) -> [f64; 3] {
    let degrees = decimal.trunc();
    let minutes = (decimal.fract() * 60.0).abs();
    let seconds = minutes.fract() * 60.0;
    [degrees, minutes.trunc(), seconds]
}

/// Render decimal degrees as `d° m' s"`.
pub fn decimal_to_dms_string(decimal: f64) -> String {
    let [degrees, minutes, seconds] = decimal_to_degrees_minutes_seconds(decimal);
    format!(
        "{}° {}' {}\"",
        format_with_places(degrees, 2),
        format_with_places(minutes, 2),
        format_with_places(seconds, 2)
    )
}

/// Combine the GPS date stamp and time stamp into a UTC timestamp.
pub fn gps_timestamp(directory: &Directory) -> Option<NaiveDateTime> {
    let date = directory.string(TAG_GPS_DATE_STAMP)?;
    let date = NaiveDate::parse_from_str(date.trim().trim_end_matches('\0'), "%Y:%m:%d").ok()?;
    let time = directory.rational_array(TAG_GPS_TIME_STAMP)?;
    let [hours, minutes, seconds] = time.as_slice() else {
        return None;
    };
    let seconds = seconds.to_f64();
    let whole_seconds = seconds.trunc();
    let nanos = ((seconds - whole_seconds) * 1e9).round() as u32;
    let time = NaiveTime::from_hms_nano_opt(
        u32::try_from(hours.to_i64()).ok()?,
        u32::try_from(minutes.to_i64()).ok()?,
        whole_seconds as u32,
        nanos.min(999_999_999),
    )?;
    Some(date.and_time(time))
}
