//! Password-based AES-256-GCM encryption for archive payloads.
//!
//! This module implements the archive's cryptographic scheme:
//! - PBKDF2-HMAC-SHA256 key derivation from the password and a per-archive salt
//! - AES-256-GCM with a fresh random 96-bit IV per file entry
//! - 128-bit authentication tag appended to each payload
//!
//! The key is derived once per archive. Salts and IVs come from the operating
//! system's CSPRNG.

mod gcm;
mod password;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{Error, Result};

pub use gcm::{GcmDecryptReader, GcmEncryptWriter};
pub use password::Password;

/// Salt size in bytes, stored unencrypted as the archive header.
pub const SALT_SIZE: usize = 16;

/// AES-GCM IV size in bytes (96 bits).
pub const IV_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes (128 bits).
pub const TAG_SIZE: usize = 16;

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count used by the archive format.
pub const PBKDF2_ITERATIONS: u32 = 65536;

/// A derived AES-256 key. Wiped from memory when dropped.
pub type Key = Zeroizing<[u8; KEY_SIZE]>;

/// Derives an AES-256 key from a password and salt with PBKDF2-HMAC-SHA256.
///
/// Identical password, salt and iteration count always yield the identical
/// key. Archives use [`PBKDF2_ITERATIONS`].
///
/// # Errors
///
/// Returns [`Error::CryptoError`] if `iterations` is zero.
pub fn derive_key(password: &Password, salt: &[u8; SALT_SIZE], iterations: u32) -> Result<Key> {
    derive_key_from_bytes(password.as_bytes(), salt, iterations)
}

fn derive_key_from_bytes(password: &[u8], salt: &[u8], iterations: u32) -> Result<Key> {
    if iterations == 0 {
        return Err(Error::CryptoError(
            "PBKDF2 iteration count must be at least 1".into(),
        ));
    }

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key[..]);
    Ok(key)
}

/// Generates a fresh random archive salt.
pub fn generate_salt() -> Result<[u8; SALT_SIZE]> {
    random_bytes()
}

/// Generates a fresh random IV for one file entry.
///
/// Every file entry gets its own IV, so no IV repeats under an archive key.
pub fn generate_iv() -> Result<[u8; IV_SIZE]> {
    random_bytes()
}

fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| Error::CryptoError(format!("system random generator failed: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn test_pbkdf2_hmac_sha256_known_vectors() {
        let key = derive_key_from_bytes(b"password", b"salt", 1).unwrap();
        assert_eq!(
            hex(&key[..]),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );

        let key = derive_key_from_bytes(b"password", b"salt", 4096).unwrap();
        assert_eq!(
            hex(&key[..]),
            "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a"
        );
    }

    #[test]
    fn test_derive_key_deterministic() {
        let password = Password::new("determinism_test");
        let salt = [0x42u8; SALT_SIZE];

        let key1 = derive_key(&password, &salt, 1000).unwrap();
        let key2 = derive_key(&password, &salt, 1000).unwrap();
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_derive_key_varies_with_inputs() {
        let password = Password::new("test");
        let salt1 = [0u8; SALT_SIZE];
        let salt2 = [0xFFu8; SALT_SIZE];

        let base = derive_key(&password, &salt1, 100).unwrap();
        assert_ne!(base, derive_key(&password, &salt2, 100).unwrap());
        assert_ne!(base, derive_key(&Password::new("test2"), &salt1, 100).unwrap());
        assert_ne!(base, derive_key(&password, &salt1, 101).unwrap());
    }

    #[test]
    fn test_derive_key_rejects_zero_iterations() {
        let result = derive_key(&Password::new("test"), &[0u8; SALT_SIZE], 0);
        assert!(matches!(result, Err(Error::CryptoError(_))));
    }

    #[test]
    fn test_random_values_differ() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
        assert_ne!(generate_iv().unwrap(), generate_iv().unwrap());
    }
}
