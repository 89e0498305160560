// src/core/format.rs
//
// Sample format and byte order descriptors plus decoding of native-order
// raw bytes into f32 working samples.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte order of multi-byte samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the machine we are running on
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    /// Whether data stored in this order must be swapped before use
    pub fn needs_swap(&self) -> bool {
        *self != Self::native()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endianness::Little => "little",
            Endianness::Big => "big",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "little" | "le" => Some(Endianness::Little),
            "big" | "be" => Some(Endianness::Big),
            _ => None,
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// On-disk sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl SampleFormat {
    /// Every format the reader understands
    pub fn all() -> Vec<Self> {
        vec![
            Self::Int8,
            Self::Uint8,
            Self::Int16,
            Self::Uint16,
            Self::Int32,
            Self::Uint32,
            Self::Float32,
            Self::Float64,
        ]
    }

    /// Size of one sample in bytes
    pub fn width(&self) -> usize {
        match self {
            SampleFormat::Int8 | SampleFormat::Uint8 => 1,
            SampleFormat::Int16 | SampleFormat::Uint16 => 2,
            SampleFormat::Int32 | SampleFormat::Uint32 | SampleFormat::Float32 => 4,
            SampleFormat::Float64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SampleFormat::Float32 | SampleFormat::Float64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleFormat::Int8 => "int8",
            SampleFormat::Uint8 => "uint8",
            SampleFormat::Int16 => "int16",
            SampleFormat::Uint16 => "uint16",
            SampleFormat::Int32 => "int32",
            SampleFormat::Uint32 => "uint32",
            SampleFormat::Float32 => "float32",
            SampleFormat::Float64 => "float64",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|f| f.name() == name.to_lowercase())
    }

    /// Decode native-order raw bytes into `out`, one f32 per element.
    ///
    /// Values are converted without scaling, so an int16 sample of 1000
    /// becomes 1000.0. Decodes `min(out.len(), raw.len() / width)` elements
    /// and returns that count; the rest of `out` is left untouched.
    pub fn decode_into(&self, raw: &[u8], out: &mut [f32]) -> usize {
        let width = self.width();
        let count = out.len().min(raw.len() / width);
        let chunks = raw[..count * width].chunks_exact(width);

        for (dst, c) in out.iter_mut().zip(chunks) {
            *dst = match self {
                SampleFormat::Int8 => c[0] as i8 as f32,
                SampleFormat::Uint8 => c[0] as f32,
                SampleFormat::Int16 => i16::from_ne_bytes([c[0], c[1]]) as f32,
                SampleFormat::Uint16 => u16::from_ne_bytes([c[0], c[1]]) as f32,
                SampleFormat::Int32 => i32::from_ne_bytes([c[0], c[1], c[2], c[3]]) as f32,
                SampleFormat::Uint32 => u32::from_ne_bytes([c[0], c[1], c[2], c[3]]) as f32,
                SampleFormat::Float32 => f32::from_ne_bytes([c[0], c[1], c[2], c[3]]),
                SampleFormat::Float64 => {
                    f64::from_ne_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as f32
                }
            };
        }

        count
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A classification hypothesis: one (format, byte order) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatClass {
    pub format: SampleFormat,
    pub endianness: Endianness,
}

impl FormatClass {
    pub fn new(format: SampleFormat, endianness: Endianness) -> Self {
        Self { format, endianness }
    }

    /// The hypotheses searched by the classifier, in scoring order.
    ///
    /// Int32/Uint32/Uint16 are not searched. Order matters: ties in the
    /// arg-max resolve to the first entry.
    pub fn search_space() -> Vec<Self> {
        let formats = [
            SampleFormat::Int8,
            SampleFormat::Int16,
            SampleFormat::Uint8,
            SampleFormat::Float32,
            SampleFormat::Float64,
        ];

        formats
            .iter()
            .flat_map(|&format| {
                [Endianness::Little, Endianness::Big]
                    .into_iter()
                    .map(move |endianness| Self::new(format, endianness))
            })
            .collect()
    }
}

impl fmt::Display for FormatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-endian", self.format, self.endianness)
    }
}
