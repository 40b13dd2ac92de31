//! Exit codes for the CLI tool.

use std::io;

use sealpack::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// Wrong password or tampered data
pub const WRONG_PASSWORD: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Source directory or archive does not exist
pub const NOT_FOUND: i32 = 6;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadArchive,
    WrongPassword,
    IoError,
    NotFound,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::WrongPassword => WRONG_PASSWORD,
            Self::IoError => IO_ERROR,
            Self::NotFound => NOT_FOUND,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a sealpack error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(e) if e.kind() == io::ErrorKind::NotFound => ExitCode::NotFound,
        Error::Io(_) => ExitCode::IoError,
        Error::SourceNotFound { .. } | Error::NotADirectory { .. } => ExitCode::NotFound,
        Error::InvalidFormat(_) | Error::CorruptEntry { .. } | Error::InvalidArchivePath(_) => {
            ExitCode::BadArchive
        }
        Error::AuthenticationFailed { .. } => ExitCode::WrongPassword,
        Error::InvalidCompressionLevel { .. } => ExitCode::BadArgs,
        Error::CryptoError(_) => ExitCode::FatalError,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
