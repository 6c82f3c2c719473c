use std::fmt;

use bytes::Bytes;
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use super::rational::Rational;
use crate::io::Charset;

/// Output format for timestamps rendered as text.
pub const TIMESTAMP_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

// =============================================================================
// StringValue
// =============================================================================

/// Raw text bytes together with the encoding they are believed to use.
///
/// Decoding is deferred so that callers can reinterpret the bytes with a
/// different [`Charset`] when the recorded one is wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
    bytes: Bytes,
    charset: Option<Charset>,
}

impl StringValue {
    pub fn new(bytes: impl Into<Bytes>, charset: Option<Charset>) -> Self {
        Self {
            bytes: bytes.into(),
            charset,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn charset(&self) -> Option<Charset> {
        self.charset
    }

    /// Decode with the recorded charset, falling back to UTF-8.
    pub fn decode(&self) -> String {
        self.decode_with(self.charset.unwrap_or_default())
    }

    pub fn decode_with(&self, charset: Charset) -> String {
        charset.decode(&self.bytes)
    }
}

impl fmt::Display for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.decode())
    }
}

impl From<&str> for StringValue {
    fn from(s: &str) -> Self {
        Self::new(Bytes::copy_from_slice(s.as_bytes()), Some(Charset::Utf8))
    }
}

impl From<String> for StringValue {
    fn from(s: String) -> Self {
        Self::new(Bytes::from(s.into_bytes()), Some(Charset::Utf8))
    }
}

impl Serialize for StringValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.decode())
    }
}

// =============================================================================
// TagValue
// =============================================================================

/// A homogeneous sequence of decoded values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagArray {
    Signed(Vec<i64>),
    Unsigned(Vec<u64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Rational(Vec<Rational>),
    String(Vec<StringValue>),
    Timestamp(Vec<NaiveDateTime>),
}

impl TagArray {
    pub fn len(&self) -> usize {
        match self {
            TagArray::Signed(v) => v.len(),
            TagArray::Unsigned(v) => v.len(),
            TagArray::Float(v) => v.len(),
            TagArray::Double(v) => v.len(),
            TagArray::Rational(v) => v.len(),
            TagArray::String(v) => v.len(),
            TagArray::Timestamp(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric elements widened to i64, truncating fractions.
    fn to_i64_vec(&self) -> Option<Vec<i64>> {
        match self {
            TagArray::Signed(v) => Some(v.clone()),
            TagArray::Unsigned(v) => Some(v.iter().map(|&x| x as i64).collect()),
            TagArray::Float(v) => Some(v.iter().map(|&x| x as i64).collect()),
            TagArray::Double(v) => Some(v.iter().map(|&x| x as i64).collect()),
            TagArray::Rational(v) => Some(v.iter().map(Rational::to_i64).collect()),
            TagArray::String(_) | TagArray::Timestamp(_) => None,
        }
    }

    fn first_as_f64(&self) -> Option<f64> {
        match self {
            TagArray::Signed(v) => v.first().map(|&x| x as f64),
            TagArray::Unsigned(v) => v.first().map(|&x| x as f64),
            TagArray::Float(v) => v.first().map(|&x| f64::from(x)),
            TagArray::Double(v) => v.first().copied(),
            TagArray::Rational(v) => v.first().map(Rational::to_f64),
            TagArray::String(_) | TagArray::Timestamp(_) => None,
        }
    }

    fn join(&self) -> String {
        fn joined<T>(items: &[T], f: impl Fn(&T) -> String) -> String {
            items.iter().map(f).collect::<Vec<_>>().join(" ")
        }
        match self {
            TagArray::Signed(v) => joined(v, ToString::to_string),
            TagArray::Unsigned(v) => joined(v, ToString::to_string),
            TagArray::Float(v) => joined(v, |&x| format_decimal(f64::from(x))),
            TagArray::Double(v) => joined(v, |&x| format_decimal(x)),
            TagArray::Rational(v) => joined(v, ToString::to_string),
            TagArray::String(v) => joined(v, StringValue::decode),
            TagArray::Timestamp(v) => joined(v, |t| t.format(TIMESTAMP_FORMAT).to_string()),
        }
    }
}

/// A decoded tag value.
///
/// Closed set of representations produced by the walker; the coercion
/// methods implement the conversions directories expose.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Signed(i64),
    Unsigned(u64),
    Float(f32),
    Double(f64),
    Rational(Rational),
    String(StringValue),
    Timestamp(NaiveDateTime),
    Bytes(Bytes),
    Array(TagArray),
}

impl TagValue {
    /// Name of the representation, for error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            TagValue::Signed(_) => "signed integer",
            TagValue::Unsigned(_) => "unsigned integer",
            TagValue::Float(_) => "float",
            TagValue::Double(_) => "double",
            TagValue::Rational(_) => "rational",
            TagValue::String(_) => "string",
            TagValue::Timestamp(_) => "timestamp",
            TagValue::Bytes(_) => "byte array",
            TagValue::Array(_) => "array",
        }
    }

    /// Integer view of the value.
    ///
    /// - numbers are truncated
    /// - text is parsed, or else its bytes are packed big-endian
    /// - single-element arrays and byte sequences yield their element
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TagValue::Signed(v) => Some(*v),
            TagValue::Unsigned(v) => Some(*v as i64),
            TagValue::Float(v) => Some(*v as i64),
            TagValue::Double(v) => Some(*v as i64),
            TagValue::Rational(r) => Some(r.to_i64()),
            TagValue::String(s) => Some(parse_or_pack(s)),
            TagValue::Bytes(b) if b.len() == 1 => Some(i64::from(b[0])),
            TagValue::Array(a) if a.len() == 1 => a.to_i64_vec().and_then(|v| v.first().copied()),
            _ => None,
        }
    }

    /// [`as_i64`](Self::as_i64) truncated to 32 bits.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().map(|v| v as i32)
    }

    /// Floating-point view: numbers, parsed text and single-element arrays.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Signed(v) => Some(*v as f64),
            TagValue::Unsigned(v) => Some(*v as f64),
            TagValue::Float(v) => Some(f64::from(*v)),
            TagValue::Double(v) => Some(*v),
            TagValue::Rational(r) => Some(r.to_f64()),
            TagValue::String(s) => s.decode().trim().parse().ok(),
            TagValue::Array(a) if a.len() == 1 => a.first_as_f64(),
            _ => None,
        }
    }

    /// Raw byte view.
    ///
    /// Text is cast character by character (keeping the low byte of each
    /// code point) and numeric arrays element-wise. Scalars have no byte
    /// form.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            TagValue::Bytes(b) => Some(b.to_vec()),
            TagValue::String(s) => Some(s.decode().chars().map(|c| c as u8).collect()),
            TagValue::Array(TagArray::Rational(v)) => Some(v.iter().map(Rational::to_u8).collect()),
            TagValue::Array(a) => a.to_i64_vec().map(|v| v.into_iter().map(|x| x as u8).collect()),
            _ => None,
        }
    }

    /// Integer sequence view.
    pub fn as_i64_vec(&self) -> Option<Vec<i64>> {
        match self {
            TagValue::Array(a) => a.to_i64_vec(),
            TagValue::Bytes(b) => Some(b.iter().map(|&x| i64::from(x)).collect()),
            TagValue::String(s) => Some(s.bytes().iter().map(|&x| i64::from(x)).collect()),
            other => other.as_i64().map(|v| vec![v]),
        }
    }

    /// Rational view: rationals, integers and single-element rational arrays.
    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            TagValue::Rational(r) => Some(*r),
            TagValue::Signed(v) => Some(Rational::new(*v, 1)),
            TagValue::Unsigned(v) => i64::try_from(*v).ok().map(|v| Rational::new(v, 1)),
            TagValue::Array(TagArray::Rational(v)) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_rational_vec(&self) -> Option<Vec<Rational>> {
        match self {
            TagValue::Array(TagArray::Rational(v)) => Some(v.clone()),
            TagValue::Rational(r) => Some(vec![*r]),
            _ => None,
        }
    }

    /// Human-readable rendering.
    pub fn to_display_string(&self) -> String {
        match self {
            TagValue::Signed(v) => v.to_string(),
            TagValue::Unsigned(v) => v.to_string(),
            TagValue::Float(v) => format_decimal(f64::from(*v)),
            TagValue::Double(v) => format_decimal(*v),
            TagValue::Rational(r) => r.to_simple_string(true),
            TagValue::String(s) => s.decode(),
            TagValue::Timestamp(t) => t.format(TIMESTAMP_FORMAT).to_string(),
            TagValue::Bytes(b) => b.iter().map(u8::to_string).collect::<Vec<_>>().join(" "),
            TagValue::Array(a) => a.join(),
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// Format with at most three decimal places and no trailing zeros.
pub(crate) fn format_decimal(value: f64) -> String {
    format_with_places(value, 3)
}

pub(crate) fn format_with_places(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let text = format!("{value:.places$}");
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        &text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn parse_or_pack(s: &StringValue) -> i64 {
    if let Ok(v) = s.decode().parse::<i64>() {
        return v;
    }
    s.bytes()
        .iter()
        .fold(0i64, |acc, &b| acc.wrapping_shl(8).wrapping_add(i64::from(b)))
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for TagValue {
                fn from(v: $t) -> Self {
                    TagValue::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

impl_from_int!(Signed, i64, i8, i16, i32, i64);
impl_from_int!(Unsigned, u64, u8, u16, u32, u64);

impl From<f32> for TagValue {
    fn from(v: f32) -> Self {
        TagValue::Float(v)
    }
}

impl From<f64> for TagValue {
    fn from(v: f64) -> Self {
        TagValue::Double(v)
    }
}

impl From<Rational> for TagValue {
    fn from(v: Rational) -> Self {
        TagValue::Rational(v)
    }
}

impl From<StringValue> for TagValue {
    fn from(v: StringValue) -> Self {
        TagValue::String(v)
    }
}

impl From<&str> for TagValue {
    fn from(v: &str) -> Self {
        TagValue::String(v.into())
    }
}

impl From<String> for TagValue {
    fn from(v: String) -> Self {
        TagValue::String(v.into())
    }
}

impl From<NaiveDateTime> for TagValue {
    fn from(v: NaiveDateTime) -> Self {
        TagValue::Timestamp(v)
    }
}

impl From<Bytes> for TagValue {
    fn from(v: Bytes) -> Self {
        TagValue::Bytes(v)
    }
}

impl From<Vec<u8>> for TagValue {
    fn from(v: Vec<u8>) -> Self {
        TagValue::Bytes(Bytes::from(v))
    }
}

impl From<TagArray> for TagValue {
    fn from(v: TagArray) -> Self {
        TagValue::Array(v)
    }
}

impl From<Vec<Rational>> for TagValue {
    fn from(v: Vec<Rational>) -> Self {
        TagValue::Array(TagArray::Rational(v))
    }
}
