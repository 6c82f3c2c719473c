//! Test utilities for integration tests.
//!
//! This module provides a small TIFF writer for building Exif structures with
//! chosen byte order, entries and layout, plus a tracing initializer.

use std::io::{self, Read};

use tiff_metadata::ByteOrder;

// =============================================================================
// Tracing
// =============================================================================

/// Route library logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Entry values
// =============================================================================

/// Typed value of one IFD entry.
#[derive(Debug, Clone)]
pub enum Value {
    Byte(Vec<u8>),
    Ascii(String),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<(u32, u32)>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<(i32, i32)>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    /// Arbitrary format code, count and raw 4-byte value field
    Raw { format: u16, count: u32, field: [u8; 4] },
    /// Out-of-line value whose offset is given explicitly
    At { format: u16, count: u32, offset: u32 },
}

impl Value {
    pub fn ascii(text: &str) -> Self {
        Value::Ascii(text.to_string())
    }

    pub fn short(value: u16) -> Self {
        Value::Short(vec![value])
    }

    pub fn long(value: u32) -> Self {
        Value::Long(vec![value])
    }

    /// Format code, component count and encoded bytes.
    fn encode(&self, order: ByteOrder) -> (u16, u32, Vec<u8>) {
        let mut out = Vec::new();
        let (format, count) = match self {
            Value::Byte(v) => {
                out.extend_from_slice(v);
                (1, v.len())
            }
            Value::Ascii(s) => {
                out.extend_from_slice(s.as_bytes());
                out.push(0);
                (2, out.len())
            }
            Value::Short(v) => {
                v.iter().for_each(|x| out.extend(u16_bytes(order, *x)));
                (3, v.len())
            }
            Value::Long(v) => {
                v.iter().for_each(|x| out.extend(u32_bytes(order, *x)));
                (4, v.len())
            }
            Value::Rational(v) => {
                for &(n, d) in v {
                    out.extend(u32_bytes(order, n));
                    out.extend(u32_bytes(order, d));
                }
                (5, v.len())
            }
            Value::SByte(v) => {
                out.extend(v.iter().map(|x| *x as u8));
                (6, v.len())
            }
            Value::Undefined(v) => {
                out.extend_from_slice(v);
                (7, v.len())
            }
            Value::SShort(v) => {
                v.iter().for_each(|x| out.extend(u16_bytes(order, *x as u16)));
                (8, v.len())
            }
            Value::SLong(v) => {
                v.iter().for_each(|x| out.extend(u32_bytes(order, *x as u32)));
                (9, v.len())
            }
            Value::SRational(v) => {
                for &(n, d) in v {
                    out.extend(u32_bytes(order, n as u32));
                    out.extend(u32_bytes(order, d as u32));
                }
                (10, v.len())
            }
            Value::Float(v) => {
                v.iter().for_each(|x| out.extend(u32_bytes(order, x.to_bits())));
                (11, v.len())
            }
            Value::Double(v) => {
                for x in v {
                    let bits = x.to_bits();
                    match order {
                        ByteOrder::BigEndian => out.extend(bits.to_be_bytes()),
                        ByteOrder::LittleEndian => out.extend(bits.to_le_bytes()),
                    }
                }
                (12, v.len())
            }
            Value::Raw { format, count, field } => return (*format, *count, field.to_vec()),
            Value::At { format, count, offset } => {
                return (*format, *count, u32_bytes(order, *offset).to_vec());
            }
        };
        (format, count as u32, out)
    }

    fn is_explicit(&self) -> bool {
        matches!(self, Value::Raw { .. } | Value::At { .. })
    }
}

pub fn u16_bytes(order: ByteOrder, value: u16) -> [u8; 2] {
    match order {
        ByteOrder::BigEndian => value.to_be_bytes(),
        ByteOrder::LittleEndian => value.to_le_bytes(),
    }
}

pub fn u32_bytes(order: ByteOrder, value: u32) -> [u8; 4] {
    match order {
        ByteOrder::BigEndian => value.to_be_bytes(),
        ByteOrder::LittleEndian => value.to_le_bytes(),
    }
}

// =============================================================================
// TIFF Builder
// =============================================================================

/// Appends IFDs and data blocks to a TIFF image.
///
/// Offsets are relative to the start of the header, matching how the
/// decoder resolves them. Children must be written before the entries that
/// point to them; use [`set_first_ifd`](Self::set_first_ifd) and
/// [`set_next_ifd`](Self::set_next_ifd) to link directories afterwards.
pub struct TiffBuilder {
    order: ByteOrder,
    data: Vec<u8>,
}

impl TiffBuilder {
    /// TIFF header with marker 42 and the first IFD pointer at 8.
    pub fn new(order: ByteOrder) -> Self {
        Self::with_marker(order, 0x2A)
    }

    pub fn with_marker(order: ByteOrder, marker: u16) -> Self {
        let mut data = match order {
            ByteOrder::BigEndian => b"MM".to_vec(),
            ByteOrder::LittleEndian => b"II".to_vec(),
        };
        data.extend(u16_bytes(order, marker));
        data.extend(u32_bytes(order, 8));
        Self { order, data }
    }

    /// A builder without a header, for IFDs embedded in other blocks.
    ///
    /// Offsets written by [`ifd`](Self::ifd) are relative to the start of
    /// the headless data.
    pub fn headless(order: ByteOrder) -> Self {
        Self {
            order,
            data: Vec::new(),
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn position(&self) -> u32 {
        self.data.len() as u32
    }

    /// Append raw bytes, keeping word alignment. Returns their offset.
    pub fn append(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.position();
        self.data.extend_from_slice(bytes);
        if self.data.len() % 2 != 0 {
            self.data.push(0);
        }
        offset
    }

    /// Write an IFD followed by its out-of-line values. Returns its offset.
    pub fn ifd(&mut self, entries: &[(u16, Value)]) -> u32 {
        let order = self.order;
        let start = self.data.len();
        let mut external = Vec::new();
        let external_start = start + 2 + 12 * entries.len() + 4;

        self.data.extend(u16_bytes(order, entries.len() as u16));
        for (tag, value) in entries {
            let (format, count, bytes) = value.encode(order);
            self.data.extend(u16_bytes(order, *tag));
            self.data.extend(u16_bytes(order, format));
            self.data.extend(u32_bytes(order, count));
            if bytes.len() <= 4 || value.is_explicit() {
                let mut field = bytes;
                field.resize(4, 0);
                self.data.extend(field);
            } else {
                let offset = (external_start + external.len()) as u32;
                self.data.extend(u32_bytes(order, offset));
                external.extend(bytes);
                if external.len() % 2 != 0 {
                    external.push(0);
                }
            }
        }
        self.data.extend(u32_bytes(order, 0));
        self.data.extend(external);
        start as u32
    }

    pub fn set_first_ifd(&mut self, offset: u32) {
        self.patch_u32(4, offset);
    }

    /// Point the next-IFD field of the IFD at `ifd` to `next`.
    pub fn set_next_ifd(&mut self, ifd: u32, next: u32) {
        let ifd = ifd as usize;
        let count = match self.order {
            ByteOrder::BigEndian => u16::from_be_bytes([self.data[ifd], self.data[ifd + 1]]),
            ByteOrder::LittleEndian => u16::from_le_bytes([self.data[ifd], self.data[ifd + 1]]),
        };
        self.patch_u32(ifd + 2 + 12 * count as usize, next);
    }

    pub fn patch_u32(&mut self, at: usize, value: u32) {
        let bytes = u32_bytes(self.order, value);
        self.data[at..at + 4].copy_from_slice(&bytes);
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// A single IFD in a TIFF image: the most common test fixture.
pub fn single_ifd_tiff(order: ByteOrder, entries: &[(u16, Value)]) -> Vec<u8> {
    let mut builder = TiffBuilder::new(order);
    let ifd = builder.ifd(entries);
    builder.set_first_ifd(ifd);
    builder.build()
}

/// IFD0 carrying a camera make and pointing to an Exif sub-IFD.
pub fn tiff_with_sub_ifd(order: ByteOrder, make: &str, sub_ifd_entries: &[(u16, Value)]) -> Vec<u8> {
    let mut builder = TiffBuilder::new(order);
    let sub_ifd = builder.ifd(sub_ifd_entries);
    let ifd0 = builder.ifd(&[(0x010F, Value::ascii(make)), (0x8769, Value::long(sub_ifd))]);
    builder.set_first_ifd(ifd0);
    builder.build()
}

// =============================================================================
// Streams
// =============================================================================

/// A reader that returns at most `step` bytes per call.
pub struct TrickleReader {
    data: Vec<u8>,
    position: usize,
    step: usize,
}

impl TrickleReader {
    pub fn new(data: Vec<u8>, step: usize) -> Self {
        Self {
            data,
            position: 0,
            step,
        }
    }
}

impl Read for TrickleReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.position..];
        let n = remaining.len().min(buf.len()).min(self.step);
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }
}
