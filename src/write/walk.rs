//! Source tree scanning.
//!
//! The walk is iterative, so deep trees cannot exhaust the call stack.
//! Entries come out in pre-order with siblings sorted by name, which makes
//! archives of the same tree list in the same order on every platform.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::format::EntryKind;
use crate::{ArchivePath, Error, Result};

/// One filesystem object to be packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Path inside the archive, relative to the scanned root.
    pub path: ArchivePath,
    /// Path on disk.
    pub disk_path: PathBuf,
    /// Directory or regular file.
    pub kind: EntryKind,
    /// File size in bytes at scan time; zero for directories.
    pub size: u64,
}

/// Lists everything below `root` in pre-order.
///
/// The root itself is not included. Symbolic links are never followed; they
/// and other special files (sockets, FIFOs, devices) are skipped with a
/// warning.
///
/// # Errors
///
/// Returns [`Error::Io`] if a directory cannot be read, and
/// [`Error::InvalidArchivePath`] if a name is not valid UTF-8 or cannot be
/// represented as an archive path.
pub fn scan_tree(root: impl AsRef<Path>) -> Result<Vec<SourceEntry>> {
    let root = root.as_ref();
    let mut entries = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for dir_entry in walker {
        let dir_entry = dir_entry.map_err(|e| Error::Io(e.into()))?;
        let file_type = dir_entry.file_type();

        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_symlink() {
            log::warn!("Skipping symbolic link '{}'", dir_entry.path().display());
            continue;
        } else {
            log::warn!("Skipping special file '{}'", dir_entry.path().display());
            continue;
        };

        let path = archive_path(root, dir_entry.path())?;
        let size = match kind {
            EntryKind::File => dir_entry.metadata().map_err(|e| Error::Io(e.into()))?.len(),
            EntryKind::Directory => 0,
        };

        entries.push(SourceEntry {
            path,
            disk_path: dir_entry.into_path(),
            kind,
            size,
        });
    }

    Ok(entries)
}

/// Maps a path below `root` to its archive path, one segment per component.
fn archive_path(root: &Path, disk_path: &Path) -> Result<ArchivePath> {
    let relative = disk_path.strip_prefix(root).map_err(|_| {
        Error::InvalidArchivePath(format!("'{}' is outside the source root", disk_path.display()))
    })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        let segment = component.as_os_str().to_str().ok_or_else(|| {
            Error::InvalidArchivePath(format!(
                "file name is not valid UTF-8: '{}'",
                disk_path.display()
            ))
        })?;
        segments.push(segment);
    }

    ArchivePath::new(&segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(entries: &[SourceEntry]) -> Vec<(&str, EntryKind)> {
        entries
            .iter()
            .map(|e| (e.path.as_str(), e.kind))
            .collect()
    }

    #[test]
    fn test_empty_root() {
        let dir = TempDir::new().unwrap();
        assert!(scan_tree(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_preorder_sorted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        fs::write(root.join("z.txt"), b"z").unwrap();
        fs::write(root.join("a.txt"), b"hello").unwrap();
        fs::write(root.join("sub/b.txt"), b"world").unwrap();
        fs::write(root.join("sub/deeper/c.bin"), [0u8; 3]).unwrap();

        let entries = scan_tree(root).unwrap();
        assert_eq!(
            names(&entries),
            [
                ("a.txt", EntryKind::File),
                ("empty", EntryKind::Directory),
                ("sub", EntryKind::Directory),
                ("sub/b.txt", EntryKind::File),
                ("sub/deeper", EntryKind::Directory),
                ("sub/deeper/c.bin", EntryKind::File),
                ("z.txt", EntryKind::File),
            ]
        );

        assert_eq!(entries[0].size, 5);
        assert_eq!(entries[0].disk_path, root.join("a.txt"));
        assert_eq!(entries[2].size, 0);
    }

    // Needs a case-sensitive filesystem
    #[cfg(target_os = "linux")]
    #[test]
    fn test_uppercase_sorts_before_lowercase() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b"), b"").unwrap();
        fs::write(dir.path().join("B"), b"").unwrap();
        fs::write(dir.path().join("a"), b"").unwrap();

        let entries = scan_tree(dir.path()).unwrap();
        let order: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(order, ["B", "a", "b"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("real")).unwrap();
        fs::write(root.join("real/file"), b"x").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("loop")).unwrap();
        std::os::unix::fs::symlink(root.join("real/file"), root.join("link")).unwrap();

        let entries = scan_tree(root).unwrap();
        assert_eq!(
            names(&entries),
            [("real", EntryKind::Directory), ("real/file", EntryKind::File)]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("ok")).unwrap();
        fs::write(dir.path().join("ok").join(OsStr::from_bytes(b"bad\xff")), b"").unwrap();

        let err = scan_tree(dir.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
    }

    #[test]
    fn test_nested_paths_use_forward_slashes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::write(dir.path().join("a/b/c/d.txt"), b"deep").unwrap();

        let entries = scan_tree(dir.path()).unwrap();
        let last = entries.last().unwrap();
        assert_eq!(last.path.as_str(), "a/b/c/d.txt");
        assert_eq!(last.disk_path, dir.path().join("a/b/c/d.txt"));
        assert_eq!(last.size, 4);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = scan_tree(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
