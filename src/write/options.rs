//! Write options and configuration for archive creation.

use crate::codec::ZstdEncoderOptions;

/// Lowest accepted Zstandard compression level.
pub const MIN_LEVEL: i32 = 1;

/// Highest accepted Zstandard compression level.
pub const MAX_LEVEL: i32 = 22;

/// Default Zstandard compression level.
pub const DEFAULT_LEVEL: i32 = 3;

/// Bytes a payload staging buffer keeps in memory before spilling to disk.
pub const DEFAULT_STAGING_MEMORY_LIMIT: usize = 8 * 1024 * 1024;

/// Options for archive creation.
///
/// # Example
///
/// ```rust
/// use sealpack::WriteOptions;
///
/// let options = WriteOptions::new()
///     .level(19)?
///     .staging_memory_limit(1024 * 1024);
/// assert_eq!(options.level, 19);
/// # Ok::<(), sealpack::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Zstandard compression level (1-22).
    pub level: i32,
    /// In-memory size of each payload staging buffer.
    ///
    /// Payloads that grow beyond this spill into an anonymous temporary file.
    pub staging_memory_limit: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            staging_memory_limit: DEFAULT_STAGING_MEMORY_LIMIT,
        }
    }
}

impl WriteOptions {
    /// Creates new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Zstandard compression level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`](crate::Error::InvalidCompressionLevel)
    /// if `level` is outside 1-22.
    pub fn level(mut self, level: i32) -> crate::Result<Self> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(crate::Error::InvalidCompressionLevel { level });
        }
        self.level = level;
        Ok(self)
    }

    /// Sets the in-memory size of payload staging buffers.
    pub fn staging_memory_limit(mut self, bytes: usize) -> Self {
        self.staging_memory_limit = bytes;
        self
    }

    pub(crate) fn zstd_options(&self) -> ZstdEncoderOptions {
        ZstdEncoderOptions { level: self.level }
    }
}
