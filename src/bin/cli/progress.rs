//! Progress bar implementation for CLI operations.

use indicatif::{ProgressBar, ProgressStyle};
use sealpack::ProgressReporter;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries {wide_msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {pos} entries {wide_msg}";

/// Progress display for pack and unpack
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a spinner; it turns into a bar once the entry count is known
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
                pb.set_style(style);
            }
            pb
        };

        Self { bar }
    }

    /// Finishes with a custom message
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.bar.finish_with_message(msg.into());
    }

    /// Stops the display where it is, leaving the failing entry visible
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl ProgressReporter for CliProgress {
    fn on_total_entries(&mut self, total: usize) {
        self.bar.set_length(total as u64);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            self.bar.set_style(style.progress_chars("#>-"));
        }
    }

    fn on_entry_start(&mut self, path: &str, _size: u64) {
        // Truncate long names on a char boundary
        let display_name = match path.char_indices().rev().nth(36) {
            Some((start, _)) if path.len() > 40 => format!("...{}", &path[start..]),
            _ => path.to_string(),
        };
        self.bar.set_message(display_name);
    }

    fn on_entry_complete(&mut self, path: &str, success: bool) {
        if success {
            self.bar.inc(1);
        } else {
            self.bar.set_message(format!("failed: {}", path));
        }
    }
}
