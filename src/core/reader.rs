// src/core/reader.rs
//
// Byte-accurate reader for raw sample streams of arbitrary width, signedness
// and byte order. Samples are delivered as native-order raw bytes.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{ClassifyError, Result};
use super::format::{Endianness, SampleFormat};

/// Widest element the byte swapper handles
pub const MAX_SWAP_WIDTH: usize = 8;

/// Reads runs of samples in any supported format from a seekable stream
pub struct MultiFormatReader<R> {
    stream: Option<R>,
    /// Interleaved bytes of a strided read before channel selection
    scratch: Vec<u8>,
}

impl MultiFormatReader<BufReader<File>> {
    /// Open a file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ClassifyError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> MultiFormatReader<R> {
    /// Wrap an already open stream
    pub fn new(stream: R) -> Self {
        Self {
            stream: Some(stream),
            scratch: Vec::new(),
        }
    }

    /// Release the underlying stream. Later resets are no-ops and reads return 0.
    pub fn close(&mut self) -> Option<R> {
        self.stream.take()
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Rewind to the start of the stream
    pub fn rewind(&mut self) -> Result<()> {
        self.reset(0)
    }

    /// Move the cursor to an absolute byte offset
    pub fn reset(&mut self, offset: u64) -> Result<()> {
        if let Some(stream) = self.stream.as_mut() {
            stream.seek(SeekFrom::Start(offset))?;
        }
        Ok(())
    }

    /// Read up to `count` samples of `format` spaced `stride` samples apart.
    ///
    /// Raw bytes land in `buffer` packed at the format's width and are
    /// swapped to native order when `endianness` differs from the machine's.
    /// `count` is clamped to what fits in `buffer`. Returns the number of
    /// whole samples read, which is short at end of stream.
    pub fn read_samples(
        &mut self,
        buffer: &mut [u8],
        count: usize,
        stride: usize,
        format: SampleFormat,
        endianness: Endianness,
    ) -> Result<usize> {
        let width = format.width();
        let count = count.min(buffer.len() / width);

        let read = self.read_elements(&mut buffer[..count * width], width, stride.max(1))?;

        if endianness.needs_swap() {
            swap_bytes(&mut buffer[..read * width], width)?;
        }

        Ok(read)
    }

    fn read_elements(&mut self, buffer: &mut [u8], width: usize, stride: usize) -> Result<usize> {
        let stream = match self.stream.as_mut() {
            Some(s) => s,
            None => return Ok(0),
        };

        if stride == 1 {
            // Contiguous: one bulk read
            let got = read_full(stream, buffer)?;
            return Ok(got / width);
        }

        // Interleaved: read the whole span once, then keep every stride-th
        // element. The stream ends up where per-element seeking would leave it.
        let frame = stride * width;
        let count = buffer.len() / width;
        let span = (count * frame).saturating_sub(frame - width);
        self.scratch.resize(span, 0);
        let got = read_full(stream, &mut self.scratch)?;

        let read = if got < width { 0 } else { (got - width) / frame + 1 };
        for (element, src) in buffer
            .chunks_exact_mut(width)
            .zip(self.scratch.chunks(frame))
            .take(read)
        {
            element.copy_from_slice(&src[..width]);
        }

        if read == count && count > 0 {
            stream.seek(SeekFrom::Current((frame - width) as i64))?;
        }

        Ok(read)
    }
}

/// Fill `buf` as far as the stream allows, like fread
fn read_full<R: Read>(stream: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Reverse the bytes of every `width`-sized element in place
pub fn swap_bytes(buffer: &mut [u8], width: usize) -> Result<()> {
    if width == 0 || width > MAX_SWAP_WIDTH {
        return Err(ClassifyError::UnsupportedWidth(width));
    }

    for element in buffer.chunks_exact_mut(width) {
        element.reverse();
    }

    Ok(())
}
