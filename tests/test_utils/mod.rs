// tests/test_utils/mod.rs
//
// Shared helpers for integration tests: deterministic test signals,
// sample encoders for every supported format and self-cleaning temp files.

#![allow(dead_code)]

use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use rawcheckr::{Endianness, SampleFormat};

pub const SAMPLE_RATE: f64 = 44100.0;

/// Tone mix spread up to 12 kHz, the shape of ordinary program material
pub const PROGRAM_TONES: &[(f64, f64, f64)] = &[
    (440.0, 0.3, 0.0),
    (2500.0, 0.2, 0.5),
    (7000.0, 0.15, 1.0),
    (12000.0, 0.1, 1.5),
];

/// Sum of `(frequency, amplitude, phase)` tones quantized to 16 bits
/// with TPDF dither seeded by `seed`
pub fn tones_i16(len: usize, tones: &[(f64, f64, f64)], seed: u64) -> Vec<i16> {
    tones_f64(len, tones, seed)
        .into_iter()
        .map(|v| (v * 32767.0).round().clamp(-32768.0, 32767.0) as i16)
        .collect()
}

/// Tone mix in [-1, 1] carrying TPDF dither of one 16-bit step
pub fn tones_f64(len: usize, tones: &[(f64, f64, f64)], seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let lsb = Uniform::new(-0.5, 0.5);

    (0..len)
        .map(|n| {
            let t = n as f64 / SAMPLE_RATE;
            let v: f64 = tones
                .iter()
                .map(|(f, a, p)| a * (2.0 * PI * f * t + p).sin())
                .sum();
            v + (lsb.sample(&mut rng) + lsb.sample(&mut rng)) / 32767.0
        })
        .collect()
}

/// Single dithered sine at `amplitude` of full scale
pub fn sine_with_dither(len: usize, freq: f64, amplitude: f64, seed: u64) -> Vec<i16> {
    tones_i16(len, &[(freq, amplitude, 0.0)], seed)
}

/// Interleave two equally long channels into L R L R ...
pub fn interleave(left: &[i16], right: &[i16]) -> Vec<i16> {
    left.iter()
        .zip(right)
        .flat_map(|(l, r)| [*l, *r])
        .collect()
}

pub fn i16_bytes(samples: &[i16], endianness: Endianness) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|s| match endianness {
            Endianness::Little => s.to_le_bytes(),
            Endianness::Big => s.to_be_bytes(),
        })
        .collect()
}

/// Full-scale factor and offset used to encode a [-1, 1] value
pub fn scale_of(format: SampleFormat) -> (f64, f64) {
    match format {
        SampleFormat::Int8 => (127.0, 0.0),
        SampleFormat::Uint8 => (127.0, 128.0),
        SampleFormat::Int16 => (32767.0, 0.0),
        SampleFormat::Uint16 => (32767.0, 32768.0),
        SampleFormat::Int32 => (2147483647.0, 0.0),
        SampleFormat::Uint32 => (2147483647.0, 2147483648.0),
        SampleFormat::Float32 | SampleFormat::Float64 => (1.0, 0.0),
    }
}

/// Encode one value in [-1, 1] as `format` in `endianness`
pub fn encode_sample(value: f64, format: SampleFormat, endianness: Endianness) -> Vec<u8> {
    let (scale, offset) = scale_of(format);
    let v = (value * scale + offset).round();

    let mut le: Vec<u8> = match format {
        SampleFormat::Int8 => (v as i8).to_le_bytes().to_vec(),
        SampleFormat::Uint8 => (v as u8).to_le_bytes().to_vec(),
        SampleFormat::Int16 => (v as i16).to_le_bytes().to_vec(),
        SampleFormat::Uint16 => (v as u16).to_le_bytes().to_vec(),
        SampleFormat::Int32 => (v as i32).to_le_bytes().to_vec(),
        SampleFormat::Uint32 => (v as u32).to_le_bytes().to_vec(),
        SampleFormat::Float32 => (value as f32).to_le_bytes().to_vec(),
        SampleFormat::Float64 => value.to_le_bytes().to_vec(),
    };

    if endianness == Endianness::Big {
        le.reverse();
    }
    le
}

pub fn encode(values: &[f64], format: SampleFormat, endianness: Endianness) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| encode_sample(*v, format, endianness))
        .collect()
}

/// Value the reader should produce for an encoded sample, in [-1, 1]
pub fn normalize(decoded: f32, format: SampleFormat) -> f64 {
    let (scale, offset) = scale_of(format);
    (decoded as f64 - offset) / scale
}

/// Temp file removed when dropped
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn with_bytes(suffix: &str, bytes: &[u8]) -> Self {
        let path = std::env::temp_dir().join(format!("rawcheckr_{}.{}", Uuid::new_v4(), suffix));
        fs::write(&path, bytes).expect("Failed to write temp file");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Fresh temp directory path, created on demand and removed on drop
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("rawcheckr_{}", Uuid::new_v4()));
        fs::create_dir_all(&path).expect("Failed to create temp dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
