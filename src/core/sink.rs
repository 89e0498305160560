// src/core/sink.rs
//
// Optional destination for intermediate classifier signals.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::format::FormatClass;

/// Receives each hypothesis's integrated signal before preprocessing
pub trait SignalSink: Send {
    fn write_signal(&mut self, class: FormatClass, channels: u16, samples: &[f32]) -> io::Result<()>;
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SignalSink for NullSink {
    fn write_signal(&mut self, _: FormatClass, _: u16, _: &[f32]) -> io::Result<()> {
        Ok(())
    }
}

/// Appends signals to a file as little-endian f32, back to back
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl SignalSink for FileSink {
    fn write_signal(&mut self, _: FormatClass, _: u16, samples: &[f32]) -> io::Result<()> {
        for s in samples {
            self.writer.write_all(&s.to_le_bytes())?;
        }
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::{Endianness, SampleFormat};

    #[test]
    fn test_file_sink_writes_le_floats() {
        let path = std::env::temp_dir().join(format!("rawcheckr-sink-{}.sig", std::process::id()));
        {
            let mut sink = FileSink::create(&path).unwrap();
            let class = FormatClass::new(SampleFormat::Int16, Endianness::Little);
            sink.write_signal(class, 1, &[1.0, -2.0]).unwrap();
            sink.write_signal(class, 2, &[0.5]).unwrap();
        }

        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[4..8], &(-2.0f32).to_le_bytes());
        assert_eq!(&bytes[8..12], &0.5f32.to_le_bytes());
    }
}
