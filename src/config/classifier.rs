// src/config/classifier.rs
//
// Tuning constants for the format classifier, with builder and JSON loading

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ClassifyError, Result};

/// A frequency sub-band, normalized to the (decimated) sample rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub center: f32,
    pub bandwidth: f32,
}

impl Band {
    pub const fn new(center: f32, bandwidth: f32) -> Self {
        Self { center, bandwidth }
    }
}

/// Complete classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Samples per analysis window
    pub window_len: usize,
    /// Polyphase decimation factor
    pub poly_taps: usize,
    /// Maximum number of windows integrated per hypothesis
    pub max_integrations: usize,
    /// Normalized frequency where the dither equalizer starts rolling off
    pub dither_f1: f32,
    /// Normalized frequency where the equalizer reaches full attenuation
    pub dither_f2: f32,
    /// Equalizer attenuation above `dither_f2` in dB
    pub dither_attenuation_db: f32,
    /// Minimum probe RMS for a window to count as signal
    pub min_rms: f32,
    /// Windows skipped between signal-start probes
    pub search_grid: usize,
    /// Leading bytes skipped as potential header
    pub header_skip: u64,
    /// Samples of each probe window used for the RMS test
    pub probe_len: usize,
    /// Low band, mono pass (equalized)
    pub mono_low: Band,
    /// High band, mono pass (equalized)
    pub mono_high: Band,
    /// High band, stereo pass (flat)
    pub stereo_high: Band,
    /// Score hypotheses on the rayon pool
    pub parallel_scoring: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            window_len: 1024,
            poly_taps: 4,
            max_integrations: 32,
            dither_f1: 0.31,
            dither_f2: 0.42,
            dither_attenuation_db: 12.0,
            min_rms: 1e-12,
            search_grid: 32,
            header_skip: 1024,
            probe_len: 64,
            mono_low: Band::new(0.25, 0.5),
            mono_high: Band::new(0.45, 0.1),
            stereo_high: Band::new(0.40, 0.2),
            parallel_scoring: false,
        }
    }
}

impl ClassifierConfig {
    /// Load overrides from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ClassifyError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Length of the signal after polyphase decimation
    pub fn decimated_len(&self) -> usize {
        self.window_len / self.poly_taps.max(1)
    }

    /// Size of the raw byte buffer: one window at the widest sample format
    pub fn raw_buffer_len(&self) -> usize {
        self.window_len * 8
    }

    pub fn validate(&self) -> Result<()> {
        if self.poly_taps == 0 {
            return Err(ClassifyError::config("poly_taps must be at least 1"));
        }
        if self.window_len == 0 || self.window_len % self.poly_taps != 0 {
            return Err(ClassifyError::config(format!(
                "window_len ({}) must be a positive multiple of poly_taps ({})",
                self.window_len, self.poly_taps
            )));
        }
        if self.probe_len == 0 || self.probe_len > self.window_len {
            return Err(ClassifyError::config(format!(
                "probe_len ({}) must be in 1..={}",
                self.probe_len, self.window_len
            )));
        }
        if self.max_integrations == 0 {
            return Err(ClassifyError::config("max_integrations must be at least 1"));
        }
        if self.search_grid == 0 {
            return Err(ClassifyError::config("search_grid must be at least 1"));
        }
        if self.dither_f1 >= self.dither_f2 {
            return Err(ClassifyError::config(format!(
                "dither_f1 ({}) must be below dither_f2 ({})",
                self.dither_f1, self.dither_f2
            )));
        }
        Ok(())
    }
}

/// Builder for custom configurations
pub struct ConfigBuilder {
    config: ClassifierConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }

    pub fn window_len(mut self, len: usize) -> Self {
        self.config.window_len = len;
        self
    }

    pub fn poly_taps(mut self, taps: usize) -> Self {
        self.config.poly_taps = taps;
        self
    }

    pub fn max_integrations(mut self, n: usize) -> Self {
        self.config.max_integrations = n;
        self
    }

    pub fn header_skip(mut self, bytes: u64) -> Self {
        self.config.header_skip = bytes;
        self
    }

    pub fn search_grid(mut self, windows: usize) -> Self {
        self.config.search_grid = windows;
        self
    }

    pub fn min_rms(mut self, threshold: f32) -> Self {
        self.config.min_rms = threshold;
        self
    }

    pub fn dither_equalizer(mut self, f1: f32, f2: f32, attenuation_db: f32) -> Self {
        self.config.dither_f1 = f1;
        self.config.dither_f2 = f2;
        self.config.dither_attenuation_db = attenuation_db;
        self
    }

    pub fn parallel_scoring(mut self, parallel: bool) -> Self {
        self.config.parallel_scoring = parallel;
        self
    }

    pub fn build(self) -> Result<ClassifierConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClassifierConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.decimated_len(), 256);
        assert_eq!(config.raw_buffer_len(), 8192);
    }

    #[test]
    fn test_builder() {
        let config = ConfigBuilder::new()
            .window_len(512)
            .poly_taps(2)
            .header_skip(0)
            .parallel_scoring(true)
            .build()
            .unwrap();

        assert_eq!(config.decimated_len(), 256);
        assert_eq!(config.header_skip, 0);
        assert!(config.parallel_scoring);
    }

    #[test]
    fn test_builder_rejects_bad_taps() {
        assert!(ConfigBuilder::new().poly_taps(0).build().is_err());
        assert!(ConfigBuilder::new().window_len(1000).poly_taps(3).build().is_err());
        assert!(ConfigBuilder::new().dither_equalizer(0.4, 0.3, 12.0).build().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ClassifierConfig::from_json(r#"{ "max_integrations": 8 }"#).unwrap();
        assert_eq!(config.max_integrations, 8);
        assert_eq!(config.window_len, 1024);
        assert_eq!(config.mono_high, Band::new(0.45, 0.1));
    }

    #[test]
    fn test_json_round_trip() {
        let config = ConfigBuilder::new().search_grid(4).build().unwrap();
        let text = config.to_json().unwrap();
        assert_eq!(ClassifierConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_config() {
        assert!(matches!(
            ClassifierConfig::from_json(r#"{ "probe_len": 4096 }"#),
            Err(ClassifyError::InvalidConfig(_))
        ));
        assert!(matches!(
            ClassifierConfig::from_json("not json"),
            Err(ClassifyError::Json(_))
        ));
    }
}
