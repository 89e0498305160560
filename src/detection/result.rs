//! Classification result types

use serde::{Deserialize, Serialize};

use crate::core::format::{Endianness, FormatClass, SampleFormat};

/// libsndfile major/subtype/endian constants, as published in sndfile.h
pub mod sndfile {
    pub const SF_FORMAT_RAW: i32 = 0x040000;
    pub const SF_FORMAT_PCM_S8: i32 = 0x0001;
    pub const SF_FORMAT_PCM_16: i32 = 0x0002;
    pub const SF_FORMAT_PCM_32: i32 = 0x0004;
    pub const SF_FORMAT_PCM_U8: i32 = 0x0005;
    pub const SF_FORMAT_FLOAT: i32 = 0x0006;
    pub const SF_FORMAT_DOUBLE: i32 = 0x0007;
    pub const SF_ENDIAN_LITTLE: i32 = 0x10000000;
    pub const SF_ENDIAN_BIG: i32 = 0x20000000;
}

/// Band powers and feature value of one hypothesis in one channel pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HypothesisScore {
    pub class: FormatClass,
    /// Windows actually integrated
    pub windows: usize,
    /// Low-band power (from the mono pass in both passes)
    pub low_power: f32,
    pub high_power: f32,
    /// `low_power / high_power`; `NEG_INFINITY` for degenerate signals
    pub feature: f32,
}

impl HypothesisScore {
    pub fn is_degenerate(&self) -> bool {
        self.feature == f32::NEG_INFINITY
    }
}

/// Winning hypothesis plus the evidence behind it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub format: SampleFormat,
    pub endianness: Endianness,
    pub channels: u16,
    /// Byte offset where audio was assumed to start
    pub signal_start: u64,
    pub mono_scores: Vec<HypothesisScore>,
    pub stereo_scores: Vec<HypothesisScore>,
}

impl ClassificationResult {
    pub fn format_class(&self) -> FormatClass {
        FormatClass::new(self.format, self.endianness)
    }

    /// Feature value that won the decision
    pub fn winning_feature(&self) -> f32 {
        let scores = if self.channels == 1 {
            &self.mono_scores
        } else {
            &self.stereo_scores
        };
        scores
            .iter()
            .find(|s| s.class == self.format_class())
            .map(|s| s.feature)
            .unwrap_or(f32::NEG_INFINITY)
    }

    /// Best feature among every other (class, channel count) hypothesis.
    ///
    /// Single-byte formats decode the same in either byte order, so the
    /// winner's byte-order twin is not a competitor.
    pub fn runner_up_feature(&self) -> f32 {
        let winner = self.format_class();

        self.mono_scores
            .iter()
            .map(|s| (s, 1u16))
            .chain(self.stereo_scores.iter().map(|s| (s, 2u16)))
            .filter(|(s, ch)| *ch != self.channels || !same_decoding(s.class, winner))
            .map(|(s, _)| s.feature)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// How far the winner is ahead of the runner-up, in dB
    pub fn margin_db(&self) -> Option<f32> {
        let win = self.winning_feature();
        let next = self.runner_up_feature();

        if win.is_finite() && next.is_finite() && win > 0.0 && next > 0.0 {
            Some(10.0 * (win / next).log10())
        } else {
            None
        }
    }

    /// libsndfile format word for opening the file as raw
    pub fn sndfile_format(&self) -> i32 {
        use sndfile::*;

        let subtype = match self.format {
            SampleFormat::Int8 => SF_FORMAT_PCM_S8,
            SampleFormat::Int16 => SF_FORMAT_PCM_16,
            SampleFormat::Int32 => SF_FORMAT_PCM_32,
            SampleFormat::Uint8 => SF_FORMAT_PCM_U8,
            SampleFormat::Float32 => SF_FORMAT_FLOAT,
            SampleFormat::Float64 => SF_FORMAT_DOUBLE,
            // no unsigned 16/32-bit subtype in libsndfile
            SampleFormat::Uint16 | SampleFormat::Uint32 => SF_FORMAT_PCM_16,
        };

        let endian = match self.endianness {
            Endianness::Little => SF_ENDIAN_LITTLE,
            Endianness::Big => SF_ENDIAN_BIG,
        };

        SF_FORMAT_RAW | subtype | endian
    }
}

/// Whether two hypotheses turn the same bytes into the same samples
fn same_decoding(a: FormatClass, b: FormatClass) -> bool {
    a.format == b.format && (a.endianness == b.endianness || a.format.width() == 1)
}
