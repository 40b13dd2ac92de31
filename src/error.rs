//! Error types for sealpack archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when packing, unpacking or listing archives, along with a
//! convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ```rust,no_run
//! use sealpack::{Error, Password};
//!
//! fn unpack_or_reprompt(archive: &str, dest: &str) -> sealpack::Result<()> {
//!     match sealpack::unpack(archive, dest, &Password::new("first guess")) {
//!         Ok(_) => Ok(()),
//!         Err(e) if e.is_authentication_failure() => {
//!             eprintln!("Wrong password or tampered archive: {}", e);
//!             Err(e)
//!         }
//!         Err(Error::CorruptEntry { offset, reason }) => {
//!             eprintln!("Archive damaged at byte {:#x}: {}", offset, reason);
//!             Err(Error::CorruptEntry { offset, reason })
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;
use std::path::PathBuf;

/// Helper struct for formatting AuthenticationFailed error messages.
struct AuthenticationFailedDisplay<'a> {
    entry_index: Option<usize>,
    entry_name: Option<&'a str>,
}

impl std::fmt::Display for AuthenticationFailedDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Authentication failed")?;
        match (self.entry_index, self.entry_name) {
            (Some(idx), Some(name)) => write!(f, " for entry {} ({})", idx, name)?,
            (Some(idx), None) => write!(f, " for entry {}", idx)?,
            (None, Some(name)) => write!(f, " for entry '{}'", name)?,
            (None, None) => {}
        }
        write!(f, ": wrong password or tampered data")
    }
}

/// The main error type for archive operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system operations |
/// | Not found | [`SourceNotFound`][Self::SourceNotFound], [`NotADirectory`][Self::NotADirectory] | Bad source directory |
/// | Format | [`InvalidFormat`][Self::InvalidFormat], [`CorruptEntry`][Self::CorruptEntry], [`InvalidArchivePath`][Self::InvalidArchivePath] | Malformed or truncated archive |
/// | Authentication | [`AuthenticationFailed`][Self::AuthenticationFailed] | Wrong password, tampering |
/// | Configuration | [`InvalidCompressionLevel`][Self::InvalidCompressionLevel] | Bad options |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading or writing files.
    ///
    /// Check the underlying [`std::io::ErrorKind`] for specific handling.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The directory to pack does not exist.
    #[error("Source directory not found: {}", path.display())]
    SourceNotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// The path to pack exists but is not a directory.
    #[error("Source is not a directory: {}", path.display())]
    NotADirectory {
        /// The path that was requested.
        path: PathBuf,
    },

    /// The archive as a whole is not a valid sealpack archive.
    ///
    /// Returned for inputs too short to hold the salt header, and for
    /// payloads that authenticate but do not decompress.
    #[error("Invalid archive format: {0}")]
    InvalidFormat(String),

    /// An entry record is malformed or truncated.
    ///
    /// The offset is the byte position of the start of the offending entry
    /// record. Declared lengths that run past the end of the archive and
    /// unknown entry type tags are reported this way.
    #[error("Corrupt entry at offset {offset:#x}: {reason}")]
    CorruptEntry {
        /// The byte offset of the entry record.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// The AES-GCM authentication tag of a file payload did not verify.
    ///
    /// Either the password is wrong or the payload, its IV or its tag was
    /// modified. No plaintext of the failing entry is left on disk.
    ///
    /// # Recovery
    ///
    /// Prompt for the password again; the archive is not touched.
    #[error("{}", AuthenticationFailedDisplay { entry_index: *entry_index, entry_name: entry_name.as_deref() })]
    AuthenticationFailed {
        /// The entry index where authentication failed (if known).
        entry_index: Option<usize>,
        /// The entry path where authentication failed (if known).
        entry_name: Option<String>,
    },

    /// A cryptographic primitive could not be used.
    ///
    /// This covers the operating system random generator being unavailable
    /// and invalid key derivation parameters.
    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    /// An archive path is invalid.
    ///
    /// Archive paths must be non-empty, relative, use forward slashes and
    /// must not contain `.` or `..` segments. On the read side this means
    /// the archive tries to escape the extraction root.
    #[error("Invalid archive path: {0}")]
    InvalidArchivePath(String),

    /// An invalid Zstandard compression level was provided.
    #[error("invalid compression level {level}: must be 1-22")]
    InvalidCompressionLevel {
        /// The invalid level that was provided.
        level: i32,
    },
}

impl Error {
    /// Returns `true` if this error indicates a malformed or truncated archive.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::InvalidFormat(_) | Error::CorruptEntry { .. } | Error::InvalidArchivePath(_)
        )
    }

    /// Returns `true` if a payload failed AES-GCM tag verification.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Error::AuthenticationFailed { .. })
    }

    /// Returns `true` if the source directory could not be used.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SourceNotFound { .. } | Error::NotADirectory { .. }
        )
    }

    /// Returns `true` if this error might be recoverable.
    ///
    /// - `AuthenticationFailed`: retry with a different password
    /// - `Io` (transient kinds only): `WouldBlock`, `Interrupted`, `TimedOut`
    ///
    /// Nothing is retried automatically; retrying is the caller's decision.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::AuthenticationFailed { .. } => true,
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// Returns the entry index associated with this error, if any.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            Error::AuthenticationFailed { entry_index, .. } => *entry_index,
            _ => None,
        }
    }

    /// Returns the entry path associated with this error, if any.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Error::AuthenticationFailed { entry_name, .. } => entry_name.as_deref(),
            _ => None,
        }
    }

    /// Creates an AuthenticationFailed error with full context.
    pub fn authentication_failed(entry_index: Option<usize>, entry_name: Option<String>) -> Self {
        Error::AuthenticationFailed {
            entry_index,
            entry_name,
        }
    }

    /// Creates a CorruptEntry error.
    pub fn corrupt_entry(offset: u64, reason: impl Into<String>) -> Self {
        Error::CorruptEntry {
            offset,
            reason: reason.into(),
        }
    }

    /// Attaches entry context to errors that carry it.
    pub(crate) fn with_entry(self, index: usize, name: &str) -> Self {
        match self {
            Error::AuthenticationFailed { .. } => {
                Error::authentication_failed(Some(index), Some(name.to_string()))
            }
            other => other,
        }
    }
}

/// A specialized Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
