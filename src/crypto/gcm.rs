//! Streaming AES-256-GCM.
//!
//! One-shot AEAD APIs need the whole message in memory. These adapters run
//! GCM incrementally over `Read`/`Write` streams instead, built from the
//! AES block cipher, a 32-bit big-endian counter mode and GHASH. The output
//! is byte-identical to standard AES-256-GCM with a 96-bit IV, no associated
//! data and the 16-byte tag appended to the ciphertext.

use std::io::{self, Read, Write};

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};
use ghash::GHash;
use ghash::universal_hash::UniversalHash;

use super::{IV_SIZE, KEY_SIZE, TAG_SIZE};

type Aes256Ctr = ctr::Ctr32BE<Aes256>;
type Block = GenericArray<u8, aes::cipher::consts::U16>;

const BLOCK_SIZE: usize = 16;

/// Ciphertext is pulled from the inner reader in chunks of this size.
const READ_CHUNK: usize = 8192;

/// Marker carried by the `InvalidData` error returned on tag mismatch.
#[derive(Debug)]
struct TagMismatch;

impl std::fmt::Display for TagMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AES-GCM authentication tag mismatch")
    }
}

impl std::error::Error for TagMismatch {}

fn tag_mismatch() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, TagMismatch)
}

/// Keystream and GHASH state shared by both directions.
struct GcmState {
    keystream: Aes256Ctr,
    ghash: GHash,
    tag_mask: Block,
    partial: [u8; BLOCK_SIZE],
    partial_len: usize,
    ciphertext_len: u64,
}

impl GcmState {
    fn new(key: &[u8; KEY_SIZE], iv: &[u8; IV_SIZE]) -> Self {
        let cipher = Aes256::new(GenericArray::from_slice(key));

        let mut hash_key = Block::default();
        cipher.encrypt_block(&mut hash_key);

        // J0 = IV || 0^31 || 1; the tag is masked with E(K, J0) and the
        // payload keystream starts at inc32(J0).
        let mut j0 = [0u8; BLOCK_SIZE];
        j0[..IV_SIZE].copy_from_slice(iv);
        j0[BLOCK_SIZE - 1] = 1;

        let mut tag_mask = Block::from(j0);
        cipher.encrypt_block(&mut tag_mask);

        let mut counter = j0;
        counter[BLOCK_SIZE - 1] = 2;

        Self {
            keystream: Aes256Ctr::new(
                GenericArray::from_slice(key),
                &GenericArray::from(counter),
            ),
            ghash: GHash::new(&hash_key),
            tag_mask,
            partial: [0u8; BLOCK_SIZE],
            partial_len: 0,
            ciphertext_len: 0,
        }
    }

    fn apply_keystream(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.keystream
            .try_apply_keystream(buf)
            .map_err(|_| io::Error::other("payload exceeds the AES-GCM length limit for one IV"))
    }

    /// Feeds ciphertext into GHASH, buffering any incomplete block.
    fn absorb(&mut self, mut data: &[u8]) {
        self.ciphertext_len += data.len() as u64;

        if self.partial_len > 0 {
            let take = (BLOCK_SIZE - self.partial_len).min(data.len());
            self.partial[self.partial_len..self.partial_len + take].copy_from_slice(&data[..take]);
            self.partial_len += take;
            data = &data[take..];

            if self.partial_len < BLOCK_SIZE {
                return;
            }
            self.ghash.update(&[Block::from(self.partial)]);
            self.partial_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            self.ghash.update(&[Block::clone_from_slice(block)]);
        }

        let rest = blocks.remainder();
        self.partial[..rest.len()].copy_from_slice(rest);
        self.partial_len = rest.len();
    }

    fn finalize(mut self) -> [u8; TAG_SIZE] {
        if self.partial_len > 0 {
            self.ghash.update_padded(&self.partial[..self.partial_len]);
        }

        // len(A) = 0 in the high half, len(C) in bits in the low half
        let mut lengths = [0u8; BLOCK_SIZE];
        lengths[8..].copy_from_slice(&(self.ciphertext_len * 8).to_be_bytes());
        self.ghash.update(&[Block::from(lengths)]);

        let digest = self.ghash.finalize();
        let mut tag = [0u8; TAG_SIZE];
        for (out, (d, m)) in tag.iter_mut().zip(digest.iter().zip(self.tag_mask.iter())) {
            *out = d ^ m;
        }
        tag
    }
}

/// Streaming AES-256-GCM encryptor.
///
/// Bytes written are encrypted and forwarded immediately. [`finish`] must be
/// called to append the authentication tag.
///
/// [`finish`]: GcmEncryptWriter::finish
pub struct GcmEncryptWriter<W> {
    inner: W,
    state: GcmState,
    scratch: Vec<u8>,
    written: u64,
}

impl<W> std::fmt::Debug for GcmEncryptWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcmEncryptWriter")
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

impl<W: Write> GcmEncryptWriter<W> {
    /// Creates an encryptor writing ciphertext to `inner`.
    pub fn new(inner: W, key: &[u8; KEY_SIZE], iv: &[u8; IV_SIZE]) -> Self {
        Self {
            inner,
            state: GcmState::new(key, iv),
            scratch: Vec::new(),
            written: 0,
        }
    }

    /// Appends the tag and returns the inner writer together with the total
    /// number of bytes emitted (ciphertext plus tag).
    pub fn finish(self) -> io::Result<(W, u64)> {
        let Self {
            mut inner,
            state,
            written,
            ..
        } = self;

        let tag = state.finalize();
        inner.write_all(&tag)?;
        inner.flush()?;
        Ok((inner, written + TAG_SIZE as u64))
    }
}

impl<W: Write> Write for GcmEncryptWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(buf);
        self.state.apply_keystream(&mut self.scratch)?;
        self.state.absorb(&self.scratch);
        self.inner.write_all(&self.scratch)?;
        self.written += buf.len() as u64;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

enum Phase {
    Streaming(Box<GcmState>),
    Verified,
    Mismatch,
}

/// Streaming AES-256-GCM decryptor.
///
/// The last 16 bytes of the input are held back as the candidate tag. When
/// the input ends, the tag is compared in constant time; on mismatch `read`
/// fails with [`io::ErrorKind::InvalidData`]. Plaintext is released before
/// the tag is known, so callers must treat it as unauthenticated until
/// [`verify`] returns `true`.
///
/// [`verify`]: GcmDecryptReader::verify
pub struct GcmDecryptReader<R> {
    inner: R,
    phase: Phase,
    held: Vec<u8>,
    input_done: bool,
}

impl<R> std::fmt::Debug for GcmDecryptReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcmDecryptReader")
            .field("held", &self.held.len())
            .field("input_done", &self.input_done)
            .finish_non_exhaustive()
    }
}

impl<R: Read> GcmDecryptReader<R> {
    /// Creates a decryptor reading ciphertext-plus-tag from `inner`.
    pub fn new(inner: R, key: &[u8; KEY_SIZE], iv: &[u8; IV_SIZE]) -> Self {
        Self {
            inner,
            phase: Phase::Streaming(Box::new(GcmState::new(key, iv))),
            held: Vec::with_capacity(READ_CHUNK + TAG_SIZE),
            input_done: false,
        }
    }

    /// Consumes the rest of the input without producing plaintext and
    /// reports whether the authentication tag matched.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::UnexpectedEof`] if the input is shorter than
    /// a tag, and propagates errors from the inner reader.
    pub fn verify(&mut self) -> io::Result<bool> {
        loop {
            let Phase::Streaming(state) = &mut self.phase else {
                return Ok(matches!(self.phase, Phase::Verified));
            };

            if self.held.len() > TAG_SIZE {
                let n = self.held.len() - TAG_SIZE;
                state.absorb(&self.held[..n]);
                self.held.drain(..n);
            } else if self.input_done {
                self.check_tag()?;
            } else {
                self.fill()?;
            }
        }
    }

    /// Returns the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self) -> io::Result<()> {
        let start = self.held.len();
        self.held.resize(start + READ_CHUNK, 0);

        let n = loop {
            match self.inner.read(&mut self.held[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.held.truncate(start);
                    return Err(e);
                }
            }
        };

        self.held.truncate(start + n);
        if n == 0 {
            self.input_done = true;
        }
        Ok(())
    }

    /// Compares the held-back bytes against the computed tag.
    fn check_tag(&mut self) -> io::Result<()> {
        if self.held.len() < TAG_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "encrypted payload is shorter than its authentication tag",
            ));
        }

        if let Phase::Streaming(state) = std::mem::replace(&mut self.phase, Phase::Mismatch) {
            let expected = state.finalize();
            let diff = expected
                .iter()
                .zip(&self.held)
                .fold(0u8, |acc, (a, b)| acc | (a ^ b));
            if diff == 0 {
                self.phase = Phase::Verified;
            }
        }
        Ok(())
    }
}

impl<R: Read> Read for GcmDecryptReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        loop {
            let state = match &mut self.phase {
                Phase::Streaming(state) => state,
                Phase::Verified => return Ok(0),
                Phase::Mismatch => return Err(tag_mismatch()),
            };

            if self.held.len() > TAG_SIZE {
                let n = out.len().min(self.held.len() - TAG_SIZE);
                out[..n].copy_from_slice(&self.held[..n]);
                self.held.drain(..n);
                state.absorb(&out[..n]);
                state.apply_keystream(&mut out[..n])?;
                return Ok(n);
            }

            if self.input_done {
                self.check_tag()?;
            } else {
                self.fill()?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes_gcm::aead::Aead;
    use aes_gcm::{Aes256Gcm, Nonce};
    use std::io::Cursor;

    const KEY: [u8; KEY_SIZE] = [0x11; KEY_SIZE];
    const IV: [u8; IV_SIZE] = [0x22; IV_SIZE];

    fn reference_encrypt(key: &[u8; KEY_SIZE], iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8> {
        let cipher = <Aes256Gcm as aes_gcm::KeyInit>::new_from_slice(key).unwrap();
        cipher.encrypt(Nonce::from_slice(iv), plaintext).unwrap()
    }

    fn stream_encrypt(plaintext: &[u8], chunk: usize) -> Vec<u8> {
        let mut writer = GcmEncryptWriter::new(Vec::new(), &KEY, &IV);
        for piece in plaintext.chunks(chunk.max(1)) {
            writer.write_all(piece).unwrap();
        }
        let (out, len) = writer.finish().unwrap();
        assert_eq!(len, out.len() as u64);
        out
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn test_known_answer_empty_plaintext() {
        // AES-256-GCM test case with all-zero key and IV, empty plaintext
        let out = {
            let writer = GcmEncryptWriter::new(Vec::new(), &[0u8; KEY_SIZE], &[0u8; IV_SIZE]);
            writer.finish().unwrap().0
        };
        assert_eq!(hex(&out), "530f8afbc74536b9a963b4f1c4cb738b");
    }

    #[test]
    fn test_known_answer_one_block() {
        let mut writer = GcmEncryptWriter::new(Vec::new(), &[0u8; KEY_SIZE], &[0u8; IV_SIZE]);
        writer.write_all(&[0u8; 16]).unwrap();
        let (out, _) = writer.finish().unwrap();
        assert_eq!(
            hex(&out),
            "cea7403d4d606b6e074ec5d3baf39d18d0d1c8a799996bf0265b98b5d48ab919"
        );
    }

    #[test]
    fn test_encrypt_matches_reference_for_any_chunking() {
        for len in [0, 1, 15, 16, 17, 31, 32, 100, READ_CHUNK + 3] {
            let plaintext = pattern(len);
            let expected = reference_encrypt(&KEY, &IV, &plaintext);
            for chunk in [1, 7, 16, 1000] {
                assert_eq!(
                    stream_encrypt(&plaintext, chunk),
                    expected,
                    "len={} chunk={}",
                    len,
                    chunk
                );
            }
        }
    }

    #[test]
    fn test_decrypt_reference_ciphertext() {
        for len in [0, 1, 16, 33, 5000, 3 * READ_CHUNK + 5] {
            let plaintext = pattern(len);
            let ciphertext = reference_encrypt(&KEY, &IV, &plaintext);

            let mut reader = GcmDecryptReader::new(Cursor::new(ciphertext), &KEY, &IV);
            let mut decrypted = Vec::new();
            let mut buf = [0u8; 13];
            loop {
                let n = reader.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                decrypted.extend_from_slice(&buf[..n]);
            }

            assert_eq!(decrypted, plaintext, "len={}", len);
            assert!(reader.verify().unwrap());
        }
    }

    #[test]
    fn test_verify_without_reading() {
        let ciphertext = reference_encrypt(&KEY, &IV, &pattern(20_000));
        let mut reader = GcmDecryptReader::new(Cursor::new(ciphertext), &KEY, &IV);
        assert!(reader.verify().unwrap());
    }

    #[test]
    fn test_flipped_bit_fails_verification() {
        let plaintext = pattern(300);
        let ciphertext = reference_encrypt(&KEY, &IV, &plaintext);

        for position in [0, 150, ciphertext.len() - 1] {
            let mut tampered = ciphertext.clone();
            tampered[position] ^= 0x01;

            let mut reader = GcmDecryptReader::new(Cursor::new(tampered.clone()), &KEY, &IV);
            let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData);

            let mut reader = GcmDecryptReader::new(Cursor::new(tampered), &KEY, &IV);
            assert!(!reader.verify().unwrap(), "position {}", position);
        }
    }

    #[test]
    fn test_wrong_key_or_iv_fails_verification() {
        let ciphertext = reference_encrypt(&KEY, &IV, b"payload");

        let mut reader = GcmDecryptReader::new(Cursor::new(ciphertext.clone()), &[0x12; KEY_SIZE], &IV);
        assert!(!reader.verify().unwrap());

        let mut reader = GcmDecryptReader::new(Cursor::new(ciphertext), &KEY, &[0x23; IV_SIZE]);
        assert!(!reader.verify().unwrap());
    }

    #[test]
    fn test_input_shorter_than_tag() {
        let mut reader = GcmDecryptReader::new(Cursor::new(vec![0u8; TAG_SIZE - 1]), &KEY, &IV);
        let err = reader.verify().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_verified_reader_reports_eof() {
        let ciphertext = reference_encrypt(&KEY, &IV, b"abc");
        let mut reader = GcmDecryptReader::new(Cursor::new(ciphertext), &KEY, &IV);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abc");
        assert_eq!(reader.read(&mut [0u8; 4]).unwrap(), 0);
        assert!(reader.verify().unwrap());
    }
}
