//! # sealpack
//!
//! Password-protected directory archives.
//!
//! An archive is a random 16-byte salt followed by one record per directory
//! and file of the packed tree. File contents are compressed with Zstandard
//! and then encrypted with AES-256-GCM under a key derived from the password
//! with PBKDF2-HMAC-SHA256. Every file gets its own random IV and its own
//! authentication tag, so tampering and wrong passwords are detected per
//! entry. Paths and sizes are stored in the clear, which lets an archive be
//! listed without the password.
//!
//! ## Quick Start
//!
//! ### Packing a Directory
//!
//! ```rust,no_run
//! use sealpack::{Password, Result};
//!
//! fn main() -> Result<()> {
//!     let password = Password::new("correct horse battery staple");
//!     let result = sealpack::pack("./photos", "photos.sp", &password)?;
//!     println!(
//!         "Wrote {} entries ({:.1}% saved)",
//!         result.entries_written(),
//!         result.space_savings() * 100.0
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ### Unpacking and Listing
//!
//! ```rust,no_run
//! use sealpack::{Password, Result};
//!
//! fn main() -> Result<()> {
//!     let password = Password::new("correct horse battery staple");
//!
//!     for entry in sealpack::list("photos.sp", &password)? {
//!         println!("{}", entry); // "[DIR] 2024" or "[FILE] 2024/beach.jpg"
//!     }
//!
//!     sealpack::unpack("photos.sp", "./restored", &password)?;
//!     Ok(())
//! }
//! ```
//!
//! ### Building an Archive in Memory
//!
//! ```rust
//! use sealpack::{ArchivePath, ArchiveReader, ArchiveWriter, Password};
//! use std::io::Cursor;
//!
//! let password = Password::new("secret");
//! let mut writer = ArchiveWriter::create(Vec::new(), &password)?;
//! writer.add_bytes(&ArchivePath::new("hello.txt")?, b"Hello, World!")?;
//! let (_, bytes) = writer.finish_into_inner()?;
//!
//! let mut reader = ArchiveReader::open(Cursor::new(bytes), &password)?;
//! let entry = reader.next_entry()?.expect("one entry");
//! let mut content = Vec::new();
//! reader.read_payload(&mut content)?;
//! assert_eq!(entry.path.as_str(), "hello.txt");
//! assert_eq!(content, b"Hello, World!");
//! # Ok::<(), sealpack::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. Wrong passwords and tampered data
//! surface as [`Error::AuthenticationFailed`]; malformed archives as
//! [`Error::InvalidFormat`], [`Error::CorruptEntry`] or
//! [`Error::InvalidArchivePath`]:
//!
//! ```rust,no_run
//! use sealpack::{Error, Password};
//!
//! match sealpack::unpack("photos.sp", "./restored", &Password::new("guess")) {
//!     Ok(result) => println!("{} files", result.files_extracted),
//!     Err(e) if e.is_authentication_failure() => eprintln!("Wrong password"),
//!     Err(e) if e.is_corruption() => eprintln!("Damaged archive: {}", e),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: operation
//! summaries at `info`, one line per entry at `debug`, skipped symlinks and
//! special files at `warn`. Install any `log` implementation to see them.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod archive_path;
pub mod bounded;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod format;
pub mod progress;
pub mod read;
mod staging;
pub mod write;

pub use archive_path::ArchivePath;
pub use bounded::BoundedReader;
pub use crypto::Password;
pub use error::{Error, Result};
pub use format::EntryKind;
pub use progress::{NoProgress, ProgressReporter};
pub use read::{ArchiveReader, EntryInfo, ExtractResult, list, unpack, unpack_with};
pub use write::{ArchiveWriter, WriteOptions, WriteResult, pack, pack_with};
