//! Per-directory tag storage with typed accessors.
//!
//! Each accessor comes in two forms: `get_*` returns a [`TagError`] that
//! distinguishes a missing tag from one stored in an incompatible form, and
//! the bare name returns `None` for either case.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::kind::DirectoryKind;
use super::rational::Rational;
use super::value::TagValue;
use super::TagId;
use crate::error::TagError;
use crate::io::Charset;

/// Date-time layouts accepted by [`Directory::get_date`].
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S",
    "%Y:%m:%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Date-only layouts accepted by [`Directory::get_date`]; midnight is assumed.
const DATE_FORMATS: &[&str] = &["%Y:%m:%d", "%Y-%m-%d", "%Y.%m.%d", "%Y%m%d"];

/// One stored tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub id: TagId,
    pub value: TagValue,
}

/// Tag values and errors for one logical directory.
#[derive(Debug, Clone, Serialize)]
pub struct Directory {
    kind: DirectoryKind,
    /// Tags in first-insertion order
    tags: Vec<Tag>,
    #[serde(skip)]
    index: HashMap<TagId, usize>,
    errors: Vec<String>,
    /// Opaque embedded block (XMP packet, IPTC stream, thumbnail image, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Bytes>,
}

impl Directory {
    pub fn new(kind: DirectoryKind) -> Self {
        Self {
            kind,
            tags: Vec::new(),
            index: HashMap::new(),
            errors: Vec::new(),
            payload: None,
        }
    }

    /// Directory holding only an embedded byte payload.
    pub fn with_payload(kind: DirectoryKind, payload: Bytes) -> Self {
        let mut directory = Self::new(kind);
        directory.payload = Some(payload);
        directory
    }

    pub fn kind(&self) -> DirectoryKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    // -------------------------------------------------------------------------
    // Storage
    // -------------------------------------------------------------------------

    /// Store a value. Overwriting keeps the tag's original position.
    pub fn set(&mut self, tag: TagId, value: impl Into<TagValue>) {
        let value = value.into();
        match self.index.get(&tag) {
            Some(&i) => self.tags[i].value = value,
            None => {
                self.index.insert(tag, self.tags.len());
                self.tags.push(Tag { id: tag, value });
            }
        }
    }

    pub fn contains(&self, tag: TagId) -> bool {
        self.index.contains_key(&tag)
    }

    pub fn value(&self, tag: TagId) -> Option<&TagValue> {
        self.index.get(&tag).map(|&i| &self.tags[i].value)
    }

    /// Tags in the order they were first stored.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.payload.is_none()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    pub fn set_payload(&mut self, payload: Bytes) {
        self.payload = Some(payload);
    }

    // -------------------------------------------------------------------------
    // Typed access
    // -------------------------------------------------------------------------

    fn require<T>(
        &self,
        tag: TagId,
        target: &'static str,
        convert: impl FnOnce(&TagValue) -> Option<T>,
    ) -> Result<T, TagError> {
        let value = self.value(tag).ok_or(TagError::Missing { tag })?;
        convert(value).ok_or(TagError::Unconvertible {
            tag,
            stored: value.type_name(),
            target,
        })
    }

    pub fn get_int(&self, tag: TagId) -> Result<i32, TagError> {
        self.require(tag, "int", TagValue::as_i32)
    }

    pub fn int(&self, tag: TagId) -> Option<i32> {
        self.get_int(tag).ok()
    }

    pub fn get_long(&self, tag: TagId) -> Result<i64, TagError> {
        self.require(tag, "long", TagValue::as_i64)
    }

    pub fn long(&self, tag: TagId) -> Option<i64> {
        self.get_long(tag).ok()
    }

    pub fn get_double(&self, tag: TagId) -> Result<f64, TagError> {
        self.require(tag, "double", TagValue::as_f64)
    }

    pub fn double(&self, tag: TagId) -> Option<f64> {
        self.get_double(tag).ok()
    }

    pub fn get_rational(&self, tag: TagId) -> Result<Rational, TagError> {
        self.require(tag, "rational", TagValue::as_rational)
    }

    pub fn rational(&self, tag: TagId) -> Option<Rational> {
        self.get_rational(tag).ok()
    }

    pub fn get_rational_array(&self, tag: TagId) -> Result<Vec<Rational>, TagError> {
        self.require(tag, "rational array", TagValue::as_rational_vec)
    }

    pub fn rational_array(&self, tag: TagId) -> Option<Vec<Rational>> {
        self.get_rational_array(tag).ok()
    }

    pub fn get_int_array(&self, tag: TagId) -> Result<Vec<i64>, TagError> {
        self.require(tag, "int array", TagValue::as_i64_vec)
    }

    pub fn int_array(&self, tag: TagId) -> Option<Vec<i64>> {
        self.get_int_array(tag).ok()
    }

    pub fn get_bytes(&self, tag: TagId) -> Result<Vec<u8>, TagError> {
        self.require(tag, "byte array", TagValue::as_bytes)
    }

    pub fn bytes(&self, tag: TagId) -> Option<Vec<u8>> {
        self.get_bytes(tag).ok()
    }

    /// Display form of any stored value.
    pub fn get_string(&self, tag: TagId) -> Result<String, TagError> {
        self.require(tag, "string", |v| Some(v.to_display_string()))
    }

    pub fn string(&self, tag: TagId) -> Option<String> {
        self.get_string(tag).ok()
    }

    /// Decode stored text or bytes with an explicit encoding.
    pub fn get_string_with(&self, tag: TagId, charset: Charset) -> Result<String, TagError> {
        self.require(tag, "string", |v| match v {
            TagValue::String(s) => Some(s.decode_with(charset)),
            TagValue::Bytes(b) => Some(charset.decode(b)),
            _ => None,
        })
    }

    pub fn string_with(&self, tag: TagId, charset: Charset) -> Option<String> {
        self.get_string_with(tag, charset).ok()
    }

    /// Timestamp, parsing text in the usual Exif and ISO layouts.
    pub fn get_date(&self, tag: TagId) -> Result<NaiveDateTime, TagError> {
        self.require(tag, "date", |v| match v {
            TagValue::Timestamp(t) => Some(*t),
            TagValue::String(s) => parse_date(&s.decode()),
            _ => None,
        })
    }

    pub fn date(&self, tag: TagId) -> Option<NaiveDateTime> {
        self.get_date(tag).ok()
    }
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim().trim_end_matches('\0');
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
