//! Archive entry descriptors.

use std::fmt;

use crate::ArchivePath;
use crate::format::EntryKind;

/// An entry as recorded in an archive.
///
/// Produced by listing and by [`ArchiveReader::next_entry`](crate::ArchiveReader::next_entry).
/// Describing an entry never decrypts anything, so listing works (and yields
/// the same entries) even with a wrong password.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct EntryInfo {
    /// Zero-based position in the archive.
    pub index: usize,
    /// The path within the archive.
    pub path: ArchivePath,
    /// Directory or file.
    pub kind: EntryKind,
    /// Stored payload size for files (compressed, encrypted, tag included).
    pub payload_size: Option<u64>,
    /// Byte offset of the entry record in the archive.
    pub offset: u64,
}

impl EntryInfo {
    /// Returns `true` for directory entries.
    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    /// Returns `true` for file entries.
    pub fn is_file(&self) -> bool {
        !self.kind.is_directory()
    }
}

/// Formats as `[DIR] <path>` or `[FILE] <path>`.
impl fmt::Display for EntryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::Directory => write!(f, "[DIR] {}", self.path),
            EntryKind::File => write!(f, "[FILE] {}", self.path),
        }
    }
}
