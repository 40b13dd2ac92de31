//! Temporary files that are renamed over their target once complete.

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

/// Name prefix shared by every staging file.
const PREFIX: &str = ".sealpack-";

/// Creates a staging file in `dir`.
///
/// On Unix the file is created with mode 0666 filtered through the process
/// umask, like any file created with [`std::fs::File::create`], so a renamed
/// staging file ends up with ordinary permissions rather than owner-only ones.
pub(crate) fn create_in(dir: &Path, suffix: &str) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(PREFIX).suffix(suffix);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    builder.tempfile_in(dir)
}
