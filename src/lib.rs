//! RawCheckr - Guess the format of headerless audio files
//!
//! Raw PCM files carry no header, so an importer has to guess how the bytes
//! are encoded. RawCheckr decodes the file under every candidate format and
//! byte order, and picks the decoding whose spectrum looks most like natural
//! audio: strong low-band energy and a quiet high band.
//!
//! ## Module Structure
//!
//! - `core` - Multi-format reader, DSP utilities, the classifier, WAV export
//! - `cli` - Command-line interface
//! - `config` - Classifier tuning constants
//! - `detection` - Classification result types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rawcheckr::{classify_file, ClassifierConfig};
//!
//! let result = classify_file("recording.raw", ClassifierConfig::default())?;
//! println!("{} {}-endian, {} channel(s)", result.format, result.endianness, result.channels);
//! ```
//!
//! ## Hypotheses
//!
//! | Format  | Width | Searched |
//! |---------|-------|----------|
//! | int8    | 1     | yes      |
//! | uint8   | 1     | yes      |
//! | int16   | 2     | yes      |
//! | uint16  | 2     | no       |
//! | int32   | 4     | no       |
//! | uint32  | 4     | no       |
//! | float32 | 4     | yes      |
//! | float64 | 8     | yes      |
//!
//! Each searched format is tried little- and big-endian, as mono and as
//! interleaved stereo.

// Core classification functionality
pub mod core;

// Command-line interface
pub mod cli;

// Configuration
pub mod config;

// Result types
pub mod detection;

pub mod error;

pub use config::{Band, ClassifierConfig, ConfigBuilder};
pub use detection::{ClassificationResult, HypothesisScore};
pub use error::{ClassifyError, Result};
pub use self::core::{
    classify_file, Endianness, FileSink, FormatClass, FormatClassifier, MultiFormatReader,
    NullSink, SampleFormat, SignalSink, SpecPowerMeter,
};
