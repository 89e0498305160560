// src/core/export.rs
//
// Writes a classified raw file out as a WAV file so it can be opened by
// ordinary audio tools.

use hound::{SampleFormat as WavSampleFormat, WavSpec, WavWriter};
use log::info;
use std::io::{Read, Seek};
use std::path::Path;

use crate::detection::ClassificationResult;
use crate::error::Result;
use super::format::{FormatClass, SampleFormat};
use super::reader::MultiFormatReader;

const CHUNK_SAMPLES: usize = 4096;

/// WAV layout used to store samples of `format`.
///
/// Unsigned formats are re-centred to signed, float64 is narrowed to float32.
pub fn wav_spec(format: SampleFormat, channels: u16, sample_rate: u32) -> WavSpec {
    let (bits_per_sample, sample_format) = if format.is_float() {
        (32, WavSampleFormat::Float)
    } else {
        (8 * format.width() as u16, WavSampleFormat::Int)
    };

    WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format,
    }
}

/// Decode the raw file at `input` with the classified format and write it
/// as WAV to `output`, starting at byte `offset`. Returns the number of
/// samples written (all channels).
pub fn write_wav<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    result: &ClassificationResult,
    sample_rate: u32,
    offset: u64,
    output: Q,
) -> Result<u64> {
    let mut reader = MultiFormatReader::open(input)?;
    let written = convert(&mut reader, result, sample_rate, offset, output.as_ref())?;
    info!("Wrote {} samples to {}", written, output.as_ref().display());
    Ok(written)
}

fn convert<R: Read + Seek>(
    reader: &mut MultiFormatReader<R>,
    result: &ClassificationResult,
    sample_rate: u32,
    offset: u64,
    output: &Path,
) -> Result<u64> {
    let class = result.format_class();
    let width = class.format.width();
    let spec = wav_spec(class.format, result.channels.max(1), sample_rate);
    let mut writer = WavWriter::create(output, spec)?;
    let mut raw = vec![0u8; CHUNK_SAMPLES * width];
    let mut total = 0u64;

    reader.reset(offset)?;
    loop {
        let read = reader.read_samples(&mut raw, CHUNK_SAMPLES, 1, class.format, class.endianness)?;
        write_chunk(&mut writer, class, &raw[..read * width])?;
        total += read as u64;
        if read < CHUNK_SAMPLES {
            break;
        }
    }

    // WAV frames must be complete
    let remainder = total % spec.channels as u64;
    for _ in 0..(spec.channels as u64 - remainder) % spec.channels as u64 {
        match spec.sample_format {
            WavSampleFormat::Float => writer.write_sample(0.0f32)?,
            WavSampleFormat::Int => writer.write_sample(0i32)?,
        }
    }

    writer.finalize()?;
    Ok(total)
}

fn write_chunk<W: std::io::Write + Seek>(
    writer: &mut WavWriter<W>,
    class: FormatClass,
    raw: &[u8],
) -> Result<()> {
    let width = class.format.width();
    for c in raw.chunks_exact(width) {
        match class.format {
            SampleFormat::Int8 => writer.write_sample(c[0] as i8)?,
            SampleFormat::Uint8 => writer.write_sample((c[0] as i16 - 128) as i8)?,
            SampleFormat::Int16 => writer.write_sample(i16::from_ne_bytes([c[0], c[1]]))?,
            SampleFormat::Uint16 => {
                let v = u16::from_ne_bytes([c[0], c[1]]);
                writer.write_sample((v as i32 - 32768) as i16)?
            }
            SampleFormat::Int32 => {
                writer.write_sample(i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))?
            }
            SampleFormat::Uint32 => {
                let v = u32::from_ne_bytes([c[0], c[1], c[2], c[3]]);
                writer.write_sample((v as i64 - 2_147_483_648) as i32)?
            }
            SampleFormat::Float32 => {
                writer.write_sample(f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))?
            }
            SampleFormat::Float64 => {
                let v = f64::from_ne_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]);
                writer.write_sample(v as f32)?
            }
        }
    }
    Ok(())
}
