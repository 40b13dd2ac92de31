//! Zstandard stream wrappers.
//!
//! Thin adapters over the `zstd` crate's streaming encoder and decoder so the
//! payload pipeline can treat compression as one more `Read`/`Write` layer.

use std::io::{self, BufReader, Read, Write};

use zstd::stream::{Decoder as ZstdDecoder, Encoder as ZstdEncoderInner};

/// ZSTD decoder.
pub struct ZstdStreamDecoder<R: Read> {
    inner: ZstdDecoder<'static, BufReader<R>>,
}

impl<R: Read> std::fmt::Debug for ZstdStreamDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZstdStreamDecoder").finish_non_exhaustive()
    }
}

impl<R: Read> ZstdStreamDecoder<R> {
    /// Creates a new ZSTD decoder.
    pub fn new(input: R) -> io::Result<Self> {
        let decoder = ZstdDecoder::new(input)?;
        Ok(Self { inner: decoder })
    }
}

impl<R: Read> Read for ZstdStreamDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// ZSTD encoder options.
#[derive(Debug, Clone)]
pub struct ZstdEncoderOptions {
    /// Compression level (1-22, default 3).
    pub level: i32,
}

impl Default for ZstdEncoderOptions {
    fn default() -> Self {
        Self { level: 3 }
    }
}

/// ZSTD encoder.
pub struct ZstdStreamEncoder<W: Write> {
    inner: ZstdEncoderInner<'static, W>,
}

impl<W: Write> std::fmt::Debug for ZstdStreamEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZstdStreamEncoder").finish_non_exhaustive()
    }
}

impl<W: Write> ZstdStreamEncoder<W> {
    /// Creates a new ZSTD encoder.
    pub fn new(output: W, options: &ZstdEncoderOptions) -> io::Result<Self> {
        let encoder = ZstdEncoderInner::new(output, options.level)?;
        Ok(Self { inner: encoder })
    }

    /// Writes the frame epilogue and returns the underlying writer.
    pub fn try_finish(self) -> io::Result<W> {
        self.inner.finish()
    }
}

impl<W: Write> Write for ZstdStreamEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
