//! Archive path type with validation for secure path handling.

use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;

/// Maximum length for archive paths (in bytes).
///
/// A malicious archive could otherwise declare a multi-gigabyte path and
/// force a matching allocation before anything else is checked.
pub const MAX_PATH_LENGTH: usize = 32768;

/// A validated archive path, relative to the archive root.
///
/// `ArchivePath` uses forward slashes as separators and validates that:
/// - The path is not empty
/// - No NUL bytes or backslashes are present
/// - The path is not absolute (does not start with `/`)
/// - No empty segments exist (no `//` or trailing `/`)
/// - No `.` or `..` segments are present (prevents path traversal)
///
/// The same validation runs when an archive is written and when it is read,
/// so an archive entry can never resolve outside the extraction root.
///
/// # Examples
///
/// ```
/// use sealpack::ArchivePath;
///
/// let path = ArchivePath::new("dir/file.txt").unwrap();
/// assert_eq!(path.as_str(), "dir/file.txt");
///
/// assert!(ArchivePath::new("../secret").is_err());
/// assert!(ArchivePath::new("/absolute/path").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Creates a new `ArchivePath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchivePath`] if the path:
    /// - Is empty or longer than [`MAX_PATH_LENGTH`] bytes
    /// - Contains NUL bytes or backslashes
    /// - Is an absolute path (starts with `/`)
    /// - Contains empty segments (e.g., `a//b`)
    /// - Contains `.` or `..` segments
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    fn validate(s: &str) -> Result<()> {
        if s.is_empty() {
            return Err(Error::InvalidArchivePath("empty path".into()));
        }

        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidArchivePath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }

        if s.contains('\0') {
            return Err(Error::InvalidArchivePath("contains NUL byte".into()));
        }

        // A backslash is a separator on Windows, so "a\..\b" would escape there
        if s.contains('\\') {
            return Err(Error::InvalidArchivePath("contains backslash".into()));
        }

        if s.starts_with('/') {
            return Err(Error::InvalidArchivePath(
                "absolute path not allowed".into(),
            ));
        }

        if s.ends_with('/') {
            return Err(Error::InvalidArchivePath(
                "trailing slash not allowed".into(),
            ));
        }

        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidArchivePath(
                    "empty segment (consecutive slashes)".into(),
                ));
            }
            if segment == "." {
                return Err(Error::InvalidArchivePath("'.' segment not allowed".into()));
            }
            if segment == ".." {
                return Err(Error::InvalidArchivePath(
                    "'..' segment not allowed (path traversal)".into(),
                ));
            }
        }

        Ok(())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the length of the path in bytes, as stored in the archive.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: a validated path is never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Joins this path with another segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting path would be invalid.
    pub fn join(&self, other: &str) -> Result<Self> {
        let joined = format!("{}/{}", self.0, other);
        Self::new(&joined)
    }

    /// Returns the parent directory of this path, if any.
    ///
    /// Returns `None` if this path has no parent (i.e., is a single segment).
    pub fn parent(&self) -> Option<Self> {
        // A prefix of a validated path is itself valid
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns an iterator over the path components (segments).
    ///
    /// ```
    /// use sealpack::ArchivePath;
    ///
    /// let path = ArchivePath::new("a/b/c.txt").unwrap();
    /// let components: Vec<_> = path.components().collect();
    /// assert_eq!(components, vec!["a", "b", "c.txt"]);
    /// ```
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Converts the path to a platform path relative to an extraction root.
    pub fn to_relative_path(&self) -> PathBuf {
        self.components().collect()
    }
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArchivePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}
