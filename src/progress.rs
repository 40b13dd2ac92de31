//! Progress reporting for pack and unpack operations.
//!
//! The library never prints. Front ends that want feedback implement
//! [`ProgressReporter`] and pass it to [`pack_with`](crate::pack_with) or
//! [`unpack_with`](crate::unpack_with).
//!
//! # Example
//!
//! ```rust,no_run
//! use sealpack::progress::ProgressReporter;
//! use sealpack::{Password, WriteOptions};
//!
//! struct Dots;
//!
//! impl ProgressReporter for Dots {
//!     fn on_entry_complete(&mut self, _path: &str, _success: bool) {
//!         eprint!(".");
//!     }
//! }
//!
//! sealpack::pack_with("photos", "photos.sp", &Password::new("pw"), &WriteOptions::new(), &mut Dots)?;
//! # Ok::<(), sealpack::Error>(())
//! ```

/// Callbacks invoked while entries are processed.
///
/// Every method has a no-op default, so implementors override only what they
/// display.
pub trait ProgressReporter {
    /// Called once with the number of entries about to be processed.
    ///
    /// Packing knows this up front; unpacking does not and never calls it.
    fn on_total_entries(&mut self, total: usize) {
        let _ = total;
    }

    /// Called when an entry starts.
    ///
    /// `size` is the plaintext size when packing and the stored payload size
    /// when unpacking; zero for directories.
    fn on_entry_start(&mut self, path: &str, size: u64) {
        let _ = (path, size);
    }

    /// Called when an entry finishes, successfully or not.
    fn on_entry_complete(&mut self, path: &str, success: bool) {
        let _ = (path, success);
    }
}

/// A progress reporter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}
