//! Payload codec: compression chained with authenticated encryption.
//!
//! Write path: plaintext → Zstandard → AES-256-GCM → staging buffer. The
//! stored length is only known once the tag has been appended, so every
//! payload is fully materialized in a [`StagedPayload`] before it is framed.
//!
//! Read path: bounded ciphertext → AES-256-GCM → Zstandard → sink. The
//! authentication tag is always checked, even when decompression fails, so
//! tampering is reported as such rather than as a format error.

pub mod zstd;

use std::io::{self, Read, Seek, SeekFrom, Write};

use tempfile::SpooledTempFile;

use crate::crypto::{GcmDecryptReader, GcmEncryptWriter, IV_SIZE, KEY_SIZE};
use crate::write::WriteOptions;
use crate::{Error, Result};

pub use self::zstd::{ZstdEncoderOptions, ZstdStreamDecoder, ZstdStreamEncoder};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// A fully transformed payload waiting to be copied into the archive.
///
/// Small payloads stay in memory; larger ones spill to an anonymous temporary
/// file that the operating system removes when this value is dropped.
pub struct StagedPayload {
    spool: SpooledTempFile,
    stored_len: u64,
    plain_len: u64,
}

impl StagedPayload {
    /// Exact number of stored bytes (ciphertext plus tag).
    pub fn stored_len(&self) -> u64 {
        self.stored_len
    }

    /// Number of plaintext bytes that went in.
    pub fn plain_len(&self) -> u64 {
        self.plain_len
    }

    /// Returns `true` if the payload spilled out of memory.
    pub fn is_spilled(&self) -> bool {
        self.spool.is_rolled()
    }
}

impl Read for StagedPayload {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.spool.read(buf)
    }
}

impl std::fmt::Debug for StagedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedPayload")
            .field("stored_len", &self.stored_len)
            .field("plain_len", &self.plain_len)
            .field("spilled", &self.is_spilled())
            .finish()
    }
}

/// Compresses and encrypts `input` into a staging buffer.
///
/// The returned payload is positioned at its first byte.
///
/// # Errors
///
/// Returns [`Error::Io`] if reading the input or writing the staging buffer
/// fails.
pub fn encode_payload<R: Read>(
    mut input: R,
    key: &[u8; KEY_SIZE],
    iv: &[u8; IV_SIZE],
    options: &WriteOptions,
) -> Result<StagedPayload> {
    let spool = tempfile::spooled_tempfile(options.staging_memory_limit);
    let cipher = GcmEncryptWriter::new(spool, key, iv);
    let mut encoder = ZstdStreamEncoder::new(cipher, &options.zstd_options())?;

    let plain_len = io::copy(&mut input, &mut encoder)?;

    let cipher = encoder.try_finish()?;
    let (mut spool, stored_len) = cipher.finish()?;
    spool.seek(SeekFrom::Start(0))?;

    Ok(StagedPayload {
        spool,
        stored_len,
        plain_len,
    })
}

/// Decrypts, verifies and decompresses one payload into `output`.
///
/// `input` must yield exactly the stored payload, typically through a
/// [`BoundedReader`](crate::BoundedReader). Plaintext reaches `output` before
/// the tag is checked; callers that must not expose unauthenticated data
/// write into a scratch location and keep it only on `Ok`.
///
/// Returns the number of plaintext bytes written.
///
/// # Errors
///
/// - [`Error::AuthenticationFailed`] if the tag does not verify (wrong key,
///   tampered IV, ciphertext or tag). This takes precedence over any
///   decompression failure.
/// - [`Error::InvalidFormat`] if the payload is truncated, or authenticates
///   but is not a valid Zstandard stream.
/// - [`Error::Io`] if reading the input or writing `output` fails.
pub fn decode_payload<R: Read, W: Write + ?Sized>(
    input: R,
    key: &[u8; KEY_SIZE],
    iv: &[u8; IV_SIZE],
    output: &mut W,
) -> Result<u64> {
    let mut cipher = GcmDecryptReader::new(input, key, iv);

    let outcome = decompress_into(&mut cipher, output);
    if let Err(CopyFailure::Sink(e)) = outcome {
        return Err(Error::Io(e));
    }

    let authentic = match cipher.verify() {
        Ok(authentic) => authentic,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(Error::InvalidFormat(format!("truncated payload: {}", e)));
        }
        Err(e) => return Err(Error::Io(e)),
    };
    if !authentic {
        return Err(Error::authentication_failed(None, None));
    }

    match outcome {
        Ok(written) => Ok(written),
        Err(CopyFailure::Source(e)) => Err(Error::InvalidFormat(format!(
            "payload does not decompress: {}",
            e
        ))),
        Err(CopyFailure::Sink(e)) => Err(Error::Io(e)),
    }
}

enum CopyFailure {
    Source(io::Error),
    Sink(io::Error),
}

fn decompress_into<R: Read, W: Write + ?Sized>(
    input: R,
    output: &mut W,
) -> std::result::Result<u64, CopyFailure> {
    let mut decoder = ZstdStreamDecoder::new(input).map_err(CopyFailure::Source)?;
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let n = match decoder.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyFailure::Source(e)),
        };
        output.write_all(&buf[..n]).map_err(CopyFailure::Sink)?;
        written += n as u64;
    }

    Ok(written)
}
