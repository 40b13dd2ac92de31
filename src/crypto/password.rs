//! Password handling for archive encryption.

use zeroize::{Zeroize, Zeroizing};

/// A password for archive encryption/decryption.
///
/// The password bytes are kept in a buffer that is wiped when the value is
/// dropped. String passwords are used as their UTF-8 bytes.
#[derive(Clone)]
pub struct Password {
    inner: Zeroizing<Vec<u8>>,
}

impl Password {
    /// Creates a new password from a string.
    pub fn new<S: Into<String>>(password: S) -> Self {
        Self::from_bytes(password.into().into_bytes())
    }

    /// Creates a password from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            inner: Zeroizing::new(bytes),
        }
    }

    /// Copies a password out of a caller-owned buffer and scrubs the buffer.
    ///
    /// ```
    /// use sealpack::Password;
    ///
    /// let mut typed = b"secret".to_vec();
    /// let password = Password::take(&mut typed);
    /// assert_eq!(typed, vec![0u8; 6]);
    /// assert_eq!(password.as_bytes(), b"secret");
    /// ```
    pub fn take(buffer: &mut [u8]) -> Self {
        let password = Self::from_bytes(buffer.to_vec());
        buffer.zeroize();
        password
    }

    /// Returns the password bytes used for key derivation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Returns true if the password is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the length of the password in bytes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose the actual password in debug output
        f.debug_struct("Password")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Password {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_utf8_bytes() {
        let password = Password::new("пароль");
        assert_eq!(password.as_bytes(), "пароль".as_bytes());
        assert_eq!(password.len(), 12);
    }

    #[test]
    fn test_password_debug() {
        let password = Password::new("secret");
        let debug = format!("{:?}", password);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("len"));
    }

    #[test]
    fn test_password_take_scrubs_source() {
        let mut buffer = *b"hunter2";
        let password = Password::take(&mut buffer);
        assert_eq!(buffer, [0u8; 7]);
        assert_eq!(password.as_bytes(), b"hunter2");
    }

    #[test]
    fn test_password_from_conversions() {
        let a: Password = "test".into();
        let b: Password = String::from("test").into();
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert!(!a.is_empty());
        assert!(Password::new("").is_empty());
    }
}
