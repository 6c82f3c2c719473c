//! Decoded metadata model.
//!
//! A decode produces a [`Metadata`] aggregate: an ordered list of
//! [`Directory`] values, each holding [`TagValue`]s keyed by tag id plus the
//! errors met while filling it.

mod aggregate;
mod directory;
pub mod geo;
mod kind;
mod rational;
mod value;

/// Numeric tag identifier within a directory.
pub type TagId = u16;

pub use aggregate::Metadata;
pub use directory::{Directory, Tag};
pub use geo::GeoLocation;
pub use kind::{DirectoryKind, Makernote};
pub use rational::Rational;
pub use value::{StringValue, TagArray, TagValue, TIMESTAMP_FORMAT};
