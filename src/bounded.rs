//! A reader that stops after a declared number of bytes.
//!
//! Every file payload shares the archive stream with the records that follow
//! it. Wrapping the archive reader in a [`BoundedReader`] scoped to the
//! declared payload length keeps the decryption and decompression layers from
//! reading into the next entry.

use std::io::{self, Read};

/// Reader wrapper limited to a fixed number of bytes.
///
/// `read` returns at most `min(buf.len(), remaining)` bytes and reports end of
/// stream once the limit is reached, whether or not the inner reader has more
/// data. If the inner reader ends before the limit, `read` fails with
/// [`io::ErrorKind::UnexpectedEof`] so a truncated region is never mistaken
/// for a complete one.
pub struct BoundedReader<R> {
    inner: R,
    remaining: u64,
}

impl<R> BoundedReader<R> {
    /// Creates a reader that yields at most `limit` bytes from `inner`.
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }

    /// Returns the number of bytes still available.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let max = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = self.inner.read(&mut buf[..max])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("region ended {} bytes early", self.remaining),
            ));
        }

        self.remaining -= n as u64;
        Ok(n)
    }
}

impl<R> std::fmt::Debug for BoundedReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedReader")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}
