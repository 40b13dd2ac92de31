//! Archive format constants, definitions, and low-level parsing utilities.
//!
//! An archive is a 16-byte salt followed by entry records. All integers are
//! big-endian.
//!
//! | Field | Size | Present when |
//! |---|---|---|
//! | type tag (0 = directory, 1 = file) | 1 | always |
//! | path length | 4 | always |
//! | path (UTF-8, `/`-separated) | path length | always |
//! | IV | 12 | file |
//! | payload length | 8 | file |
//! | payload (zstd, then AES-256-GCM with tag) | payload length | file |

pub mod frame;
pub mod reader;

pub use crate::crypto::{IV_SIZE, SALT_SIZE, TAG_SIZE};

/// Type tag of a directory entry.
pub const TYPE_DIRECTORY: u8 = 0;

/// Type tag of a file entry.
pub const TYPE_FILE: u8 = 1;

/// Size of the fields every entry starts with: type tag and path length.
pub const ENTRY_PREFIX_SIZE: u64 = 1 + 4;

/// Size of the fields between a file entry's path and its payload.
pub const FILE_FIELDS_SIZE: u64 = IV_SIZE as u64 + 8;

/// Kind of an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A directory, created on extraction.
    Directory,
    /// A regular file with an encrypted payload.
    File,
}

impl EntryKind {
    /// Returns the on-disk type tag.
    pub fn tag(self) -> u8 {
        match self {
            EntryKind::Directory => TYPE_DIRECTORY,
            EntryKind::File => TYPE_FILE,
        }
    }

    /// Maps an on-disk type tag back to a kind.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            TYPE_DIRECTORY => Some(EntryKind::Directory),
            TYPE_FILE => Some(EntryKind::File),
            _ => None,
        }
    }

    /// Returns `true` for directories.
    pub fn is_directory(self) -> bool {
        self == EntryKind::Directory
    }
}
