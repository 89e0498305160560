//! Core reading, signal processing and classification modules

pub mod classifier;
pub mod dsp;
pub mod export;
pub mod format;
pub mod reader;
pub mod sink;

pub use classifier::{classify_file, FormatClassifier, IntegratedSignal};
pub use dsp::SpecPowerMeter;
pub use format::{Endianness, FormatClass, SampleFormat};
pub use reader::MultiFormatReader;
pub use sink::{FileSink, NullSink, SignalSink};
