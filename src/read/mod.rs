//! Archive reading API.
//!
//! [`unpack`] restores an archive into a directory and [`list`] describes its
//! entries. Both are built on [`ArchiveReader`], which parses entries one at a
//! time from any seekable source.
//!
//! # Example
//!
//! ```rust,no_run
//! use sealpack::Password;
//!
//! let password = Password::new("secret");
//! for entry in sealpack::list("backup.sp", &password)? {
//!     println!("{}", entry);
//! }
//!
//! let result = sealpack::unpack("backup.sp", "restored", &password)?;
//! println!("{} files extracted", result.files_extracted);
//! # Ok::<(), sealpack::Error>(())
//! ```

mod entry;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

pub use entry::EntryInfo;

use crate::bounded::BoundedReader;
use crate::codec::decode_payload;
use crate::crypto::{IV_SIZE, Key, PBKDF2_ITERATIONS, Password, SALT_SIZE, derive_key};
use crate::format::EntryKind;
use crate::format::frame::{FrameKind, read_frame_header};
use crate::format::reader::read_array;
use crate::progress::{NoProgress, ProgressReporter};
use crate::staging;
use crate::{ArchivePath, Error, Result};

/// Result of an extraction.
#[must_use = "extraction results should be checked"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractResult {
    /// Number of directory entries created.
    pub directories_created: usize,
    /// Number of files extracted.
    pub files_extracted: usize,
    /// Total plaintext bytes written.
    pub bytes_extracted: u64,
}

impl ExtractResult {
    /// Returns the number of entries processed.
    pub fn entries_extracted(&self) -> usize {
        self.directories_created + self.files_extracted
    }
}

/// A file payload that has been announced but not consumed.
#[derive(Debug)]
struct PendingPayload {
    index: usize,
    path: ArchivePath,
    iv: [u8; IV_SIZE],
    len: u64,
}

/// Sequential archive parser.
///
/// [`next_entry`](Self::next_entry) walks the entry records in order. After a
/// file entry, its payload can be streamed with
/// [`read_payload`](Self::read_payload); unread payloads are skipped by
/// seeking, never decrypted.
pub struct ArchiveReader<R> {
    reader: R,
    key: Key,
    salt: [u8; SALT_SIZE],
    archive_len: u64,
    next_offset: u64,
    next_index: usize,
    /// `true` when `reader` sits exactly at `next_offset`.
    synced: bool,
    /// Offset of a record that failed to parse. Parsing never resumes past it.
    failed_at: Option<u64>,
    pending: Option<PendingPayload>,
}

impl<R> std::fmt::Debug for ArchiveReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("archive_len", &self.archive_len)
            .field("next_offset", &self.next_offset)
            .field("next_index", &self.next_index)
            .finish_non_exhaustive()
    }
}

impl ArchiveReader<BufReader<File>> {
    /// Opens an archive file.
    pub fn open_path(path: impl AsRef<Path>, password: &Password) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::open(BufReader::new(file), password)
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Reads the salt header and derives the archive key.
    ///
    /// The password is not checked here; a wrong password only shows up as
    /// an authentication failure when a payload is read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the input is shorter than the salt.
    pub fn open(mut reader: R, password: &Password) -> Result<Self> {
        let archive_len = reader.seek(SeekFrom::End(0))?;
        if archive_len < SALT_SIZE as u64 {
            return Err(Error::InvalidFormat(format!(
                "archive is {} bytes, shorter than the {}-byte salt header",
                archive_len, SALT_SIZE
            )));
        }

        reader.seek(SeekFrom::Start(0))?;
        let salt: [u8; SALT_SIZE] = read_array(&mut reader)?;
        let key = derive_key(password, &salt, PBKDF2_ITERATIONS)?;

        Ok(Self {
            reader,
            key,
            salt,
            archive_len,
            next_offset: SALT_SIZE as u64,
            next_index: 0,
            synced: true,
            failed_at: None,
            pending: None,
        })
    }

    /// Returns the archive salt.
    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    /// Returns the total archive size in bytes.
    pub fn archive_len(&self) -> u64 {
        self.archive_len
    }

    /// Parses the next entry header, skipping any unread payload.
    ///
    /// Returns `Ok(None)` at the end of the archive. Once a record is
    /// rejected, every later call fails with [`Error::CorruptEntry`] at that
    /// record's offset.
    pub fn next_entry(&mut self) -> Result<Option<EntryInfo>> {
        if let Some(failed_at) = self.failed_at {
            return Err(Error::corrupt_entry(
                failed_at,
                "entry record was already rejected",
            ));
        }
        if let Some(skipped) = self.pending.take() {
            log::trace!("Skipping {} payload bytes of '{}'", skipped.len, skipped.path);
        }
        if !self.synced {
            self.reader.seek(SeekFrom::Start(self.next_offset))?;
            self.synced = true;
        }

        let offset = self.next_offset;
        if offset >= self.archive_len {
            return Ok(None);
        }

        let header = match read_frame_header(&mut self.reader, offset, self.archive_len - offset) {
            Ok(header) => header,
            Err(e) => {
                // The reader now sits somewhere inside the rejected record
                self.failed_at = Some(offset);
                self.pending = None;
                return Err(e);
            }
        };
        let index = self.next_index;
        self.next_index += 1;
        self.next_offset = offset + header.record_len();

        let kind = header.entry_kind();
        let payload_size = match header.kind {
            FrameKind::Directory => None,
            FrameKind::File { iv, payload_len } => {
                self.synced = false;
                self.pending = Some(PendingPayload {
                    index,
                    path: header.path.clone(),
                    iv,
                    len: payload_len,
                });
                Some(payload_len)
            }
        };

        Ok(Some(EntryInfo {
            index,
            path: header.path,
            kind,
            payload_size,
            offset,
        }))
    }

    /// Decrypts and decompresses the current file entry's payload into
    /// `output`, returning the number of plaintext bytes written.
    ///
    /// Returns `Ok(0)` without writing if the last entry was a directory or
    /// its payload was already read.
    ///
    /// Plaintext is written as it is decrypted and is only known to be
    /// authentic once this returns `Ok`. On error, discard what `output`
    /// received.
    ///
    /// # Errors
    ///
    /// [`Error::AuthenticationFailed`] (with the entry index and path) on a
    /// wrong password or tampered payload.
    pub fn read_payload<W: Write + ?Sized>(&mut self, output: &mut W) -> Result<u64> {
        let Some(pending) = self.pending.take() else {
            return Ok(0);
        };

        let bounded = BoundedReader::new(&mut self.reader, pending.len);
        let written = decode_payload(bounded, &self.key, &pending.iv, output)
            .map_err(|e| e.with_entry(pending.index, pending.path.as_str()))?;

        // The payload was consumed in full and verified
        self.synced = true;
        Ok(written)
    }

    /// Reads every remaining entry header without decrypting payloads.
    pub fn list(&mut self) -> Result<Vec<EntryInfo>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next_entry()? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Extracts every remaining entry below `dest`, creating it if needed.
    ///
    /// Each file is written to a temporary file in its target directory and
    /// renamed into place only after its tag verified, so a failing entry
    /// never leaves plaintext under its final name. Entries extracted before a
    /// failure stay on disk. Existing files are overwritten.
    pub fn extract_to(
        &mut self,
        dest: impl AsRef<Path>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<ExtractResult> {
        let dest = dest.as_ref();
        fs::create_dir_all(dest)?;

        let mut result = ExtractResult::default();

        while let Some(entry) = self.next_entry()? {
            let name = entry.path.as_str();
            let target = dest.join(entry.path.to_relative_path());
            progress.on_entry_start(name, entry.payload_size.unwrap_or(0));

            let outcome = match entry.kind {
                EntryKind::Directory => fs::create_dir_all(&target).map_err(Error::from),
                EntryKind::File => self.extract_file(&target).map(|written| {
                    result.bytes_extracted += written;
                }),
            };

            progress.on_entry_complete(name, outcome.is_ok());
            outcome?;

            match entry.kind {
                EntryKind::Directory => result.directories_created += 1,
                EntryKind::File => result.files_extracted += 1,
            }
            log::debug!("Extracted '{}'", name);
        }

        Ok(result)
    }

    fn extract_file(&mut self, target: &Path) -> Result<u64> {
        let parent = target.parent().ok_or_else(|| {
            Error::InvalidArchivePath(format!("no parent directory for '{}'", target.display()))
        })?;
        fs::create_dir_all(parent)?;

        let mut staging = staging::create_in(parent, ".part")?;

        let written = {
            let mut out = BufWriter::new(staging.as_file_mut());
            let written = self.read_payload(&mut out)?;
            out.flush()?;
            written
        };

        staging.persist(target).map_err(|e| Error::Io(e.error))?;
        Ok(written)
    }
}

/// Restores the archive at `archive` into `dest`.
///
/// See [`unpack_with`].
pub fn unpack(
    archive: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    password: &Password,
) -> Result<ExtractResult> {
    unpack_with(archive, dest, password, &mut NoProgress)
}

/// Restores the archive at `archive` into `dest`, reporting progress.
///
/// `dest` is created if absent. Extraction is not atomic across entries: on
/// failure, entries already restored remain.
pub fn unpack_with(
    archive: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    password: &Password,
    progress: &mut dyn ProgressReporter,
) -> Result<ExtractResult> {
    let archive = archive.as_ref();
    let dest = dest.as_ref();
    log::info!("Unpacking '{}' into '{}'", archive.display(), dest.display());

    let mut reader = ArchiveReader::open_path(archive, password)?;
    let result = reader.extract_to(dest, progress)?;

    log::info!(
        "Unpacked {} directories and {} files ({} bytes)",
        result.directories_created,
        result.files_extracted,
        result.bytes_extracted
    );
    Ok(result)
}

/// Lists the entries of the archive at `archive` in archive order.
///
/// Payloads are skipped, never decrypted, so a wrong password is not
/// detected here.
pub fn list(archive: impl AsRef<Path>, password: &Password) -> Result<Vec<EntryInfo>> {
    let mut reader = ArchiveReader::open_path(archive, password)?;
    reader.list()
}
