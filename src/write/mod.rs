//! Archive writing API.
//!
//! [`pack`] turns a directory into an archive file. [`ArchiveWriter`] is the
//! lower-level builder it uses, usable with any [`Write`] sink.
//!
//! # Example
//!
//! ```rust
//! use sealpack::{ArchivePath, ArchiveWriter, Password};
//!
//! let mut writer = ArchiveWriter::create(Vec::new(), &Password::new("secret"))?;
//! writer.add_directory(&ArchivePath::new("docs")?)?;
//! writer.add_bytes(&ArchivePath::new("docs/readme.txt")?, b"Hello")?;
//!
//! let (result, bytes) = writer.finish_into_inner()?;
//! assert_eq!(result.entries_written(), 2);
//! assert_eq!(bytes.len() as u64, result.archive_size);
//! # Ok::<(), sealpack::Error>(())
//! ```

pub(crate) mod options;
pub mod walk;

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

pub use options::{
    DEFAULT_LEVEL, DEFAULT_STAGING_MEMORY_LIMIT, MAX_LEVEL, MIN_LEVEL, WriteOptions,
};
pub use walk::{SourceEntry, scan_tree};

use crate::codec::encode_payload;
use crate::crypto::{
    Key, PBKDF2_ITERATIONS, Password, SALT_SIZE, derive_key, generate_iv, generate_salt,
};
use crate::format::EntryKind;
use crate::format::frame::{write_directory_frame, write_file_frame};
use crate::progress::{NoProgress, ProgressReporter};
use crate::staging;
use crate::{ArchivePath, Error, Result};

/// Result of writing an archive.
#[must_use = "write results should be checked to ensure archive was created successfully"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// Number of directory entries written.
    pub directories_written: usize,
    /// Number of file entries written.
    pub files_written: usize,
    /// Total plaintext bytes of all files.
    pub total_size: u64,
    /// Total stored payload bytes (compressed, encrypted, tags included).
    pub compressed_size: u64,
    /// Size of the archive in bytes, salt header included.
    pub archive_size: u64,
}

impl WriteResult {
    /// Returns the number of entries written.
    pub fn entries_written(&self) -> usize {
        self.directories_written + self.files_written
    }

    /// Returns the compression ratio (stored / plaintext).
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.total_size as f64
        }
    }

    /// Returns the space savings as a fraction of the plaintext size.
    pub fn space_savings(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            1.0 - self.compression_ratio()
        }
    }
}

/// Streaming archive builder.
///
/// The salt header is written on construction. Entries are appended in call
/// order; each file payload is staged, then copied into the sink with its
/// exact length.
pub struct ArchiveWriter<W: Write> {
    sink: W,
    key: Key,
    salt: [u8; SALT_SIZE],
    options: WriteOptions,
    result: WriteResult,
}

impl<W: Write> std::fmt::Debug for ArchiveWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("options", &self.options)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl<W: Write> ArchiveWriter<W> {
    /// Starts an archive with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CryptoError`] if the system random generator fails and
    /// [`Error::Io`] if the header cannot be written.
    pub fn create(sink: W, password: &Password) -> Result<Self> {
        let salt = generate_salt()?;
        Self::with_salt(sink, password, salt)
    }

    /// Starts an archive with a caller-chosen salt.
    ///
    /// Reusing a salt across archives with the same password reuses the key;
    /// IVs stay random per entry, so this is safe but only useful for
    /// reproducible tests.
    pub fn with_salt(mut sink: W, password: &Password, salt: [u8; SALT_SIZE]) -> Result<Self> {
        let key = derive_key(password, &salt, PBKDF2_ITERATIONS)?;
        sink.write_all(&salt)?;

        Ok(Self {
            sink,
            key,
            salt,
            options: WriteOptions::default(),
            result: WriteResult {
                archive_size: SALT_SIZE as u64,
                ..WriteResult::default()
            },
        })
    }

    /// Sets the write options.
    pub fn options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the archive salt.
    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    /// Returns the statistics accumulated so far.
    pub fn result(&self) -> &WriteResult {
        &self.result
    }

    /// Adds a directory entry.
    pub fn add_directory(&mut self, path: &ArchivePath) -> Result<()> {
        let written = write_directory_frame(&mut self.sink, path)?;
        self.result.directories_written += 1;
        self.result.archive_size += written;
        log::debug!("Added directory '{}'", path);
        Ok(())
    }

    /// Adds a file entry whose content is read from `reader`.
    ///
    /// Returns the stored payload length.
    pub fn add_reader<R: Read>(&mut self, path: &ArchivePath, reader: R) -> Result<u64> {
        let iv = generate_iv()?;
        let mut staged = encode_payload(reader, &self.key, &iv, &self.options)?;
        let stored_len = staged.stored_len();

        let written = write_file_frame(&mut self.sink, path, &iv, &mut staged, stored_len)?;

        self.result.files_written += 1;
        self.result.total_size += staged.plain_len();
        self.result.compressed_size += stored_len;
        self.result.archive_size += written;

        log::debug!(
            "Added file '{}' ({} bytes, stored as {})",
            path,
            staged.plain_len(),
            stored_len
        );
        Ok(stored_len)
    }

    /// Adds a file entry from an in-memory buffer.
    pub fn add_bytes(&mut self, path: &ArchivePath, data: &[u8]) -> Result<u64> {
        self.add_reader(path, data)
    }

    /// Adds a file entry from a file on disk.
    pub fn add_file(&mut self, path: &ArchivePath, disk_path: impl AsRef<Path>) -> Result<u64> {
        let file = File::open(disk_path.as_ref())?;
        self.add_reader(path, BufReader::new(file))
    }

    /// Adds everything below `root`, in [`scan_tree`] order.
    ///
    /// The root itself is not added.
    pub fn add_tree(
        &mut self,
        root: impl AsRef<Path>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<()> {
        let entries = scan_tree(root)?;
        self.add_entries(&entries, progress)
    }

    /// Adds previously scanned entries.
    pub fn add_entries(
        &mut self,
        entries: &[SourceEntry],
        progress: &mut dyn ProgressReporter,
    ) -> Result<()> {
        progress.on_total_entries(entries.len());

        for entry in entries {
            let name = entry.path.as_str();
            progress.on_entry_start(name, entry.size);

            let outcome = match entry.kind {
                EntryKind::Directory => self.add_directory(&entry.path),
                EntryKind::File => self.add_file(&entry.path, &entry.disk_path).map(|_| ()),
            };

            progress.on_entry_complete(name, outcome.is_ok());
            outcome?;
        }

        Ok(())
    }

    /// Flushes the sink and returns the statistics.
    pub fn finish(self) -> Result<WriteResult> {
        let (result, _) = self.finish_into_inner()?;
        Ok(result)
    }

    /// Flushes the sink and returns it together with the statistics.
    pub fn finish_into_inner(mut self) -> Result<(WriteResult, W)> {
        self.sink.flush()?;
        Ok((self.result, self.sink))
    }
}

/// Packs `source_dir` into a new archive at `dest`.
///
/// See [`pack_with`].
pub fn pack(
    source_dir: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    password: &Password,
) -> Result<WriteResult> {
    pack_with(
        source_dir,
        dest,
        password,
        &WriteOptions::default(),
        &mut NoProgress,
    )
}

/// Packs `source_dir` into a new archive at `dest` with explicit options.
///
/// The archive is written to a temporary file next to `dest` and renamed over
/// it only once every entry has been written, so a failure leaves no partial
/// archive behind and an existing `dest` untouched.
///
/// # Errors
///
/// - [`Error::SourceNotFound`] / [`Error::NotADirectory`] for a bad source.
/// - [`Error::Io`] for filesystem failures.
/// - [`Error::InvalidArchivePath`] for names that cannot be stored.
pub fn pack_with(
    source_dir: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    password: &Password,
    options: &WriteOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<WriteResult> {
    let source = source_dir.as_ref();
    let dest = dest.as_ref();

    let metadata = match fs::metadata(source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        Err(e) => return Err(Error::Io(e)),
    };
    if !metadata.is_dir() {
        return Err(Error::NotADirectory {
            path: source.to_path_buf(),
        });
    }

    log::info!("Packing '{}' into '{}'", source.display(), dest.display());

    // Scan before the staging file exists so it can never list itself
    let entries = scan_tree(source)?;

    let dest_dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staging = staging::create_in(dest_dir, ".tmp")?;

    let mut writer =
        ArchiveWriter::create(BufWriter::new(staging), password)?.options(options.clone());
    writer.add_entries(&entries, progress)?;
    let (result, sink) = writer.finish_into_inner()?;

    let staging = sink.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    staging.as_file().sync_all()?;
    staging.persist(dest).map_err(|e| Error::Io(e.error))?;

    log::info!(
        "Packed {} directories and {} files: {} bytes into {} ({:.1}% saved)",
        result.directories_written,
        result.files_written,
        result.total_size,
        result.archive_size,
        result.space_savings() * 100.0
    );

    Ok(result)
}
