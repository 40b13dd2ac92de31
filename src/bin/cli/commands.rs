//! Command implementations for the CLI tool.

use std::path::Path;

use sealpack::{Error, WriteOptions};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::password::get_or_prompt_password;
use crate::progress::CliProgress;

/// Configuration for the pack command.
pub struct PackConfig<'a> {
    pub source_dir: &'a Path,
    pub archive_path: &'a Path,
    pub level: i32,
    pub password: Option<String>,
    pub quiet: bool,
}

/// Pack command implementation
pub fn pack(config: PackConfig<'_>) -> ExitCode {
    let options = match WriteOptions::new().level(config.level) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    let Some(password) = get_or_prompt_password(config.password, true) else {
        eprintln!("Error: a password is required");
        return ExitCode::BadArgs;
    };

    let mut progress = CliProgress::new(config.quiet);
    match sealpack::pack_with(
        config.source_dir,
        config.archive_path,
        &password,
        &options,
        &mut progress,
    ) {
        Ok(result) => {
            progress.finish_with_message("Done");
            if !config.quiet {
                println!(
                    "Packed {} directories and {} files into {} ({} bytes, {:.1}% saved)",
                    result.directories_written,
                    result.files_written,
                    config.archive_path.display(),
                    result.archive_size,
                    result.space_savings() * 100.0
                );
            }
            ExitCode::Success
        }
        Err(e) => {
            progress.abandon();
            report_error(&e)
        }
    }
}

/// Unpack command implementation
pub fn unpack(
    archive_path: &Path,
    output_dir: &Path,
    password: Option<String>,
    quiet: bool,
) -> ExitCode {
    let Some(password) = get_or_prompt_password(password, false) else {
        eprintln!("Error: a password is required");
        return ExitCode::BadArgs;
    };

    let mut progress = CliProgress::new(quiet);
    match sealpack::unpack_with(archive_path, output_dir, &password, &mut progress) {
        Ok(result) => {
            progress.finish_with_message("Done");
            if !quiet {
                println!(
                    "Extracted {} directories and {} files ({} bytes) to {}",
                    result.directories_created,
                    result.files_extracted,
                    result.bytes_extracted,
                    output_dir.display()
                );
            }
            ExitCode::Success
        }
        Err(e) => {
            progress.abandon();
            report_error(&e)
        }
    }
}

/// List command implementation
pub fn list(archive_path: &Path, password: Option<String>) -> ExitCode {
    let Some(password) = get_or_prompt_password(password, false) else {
        eprintln!("Error: a password is required");
        return ExitCode::BadArgs;
    };

    match sealpack::list(archive_path, &password) {
        Ok(entries) => {
            for entry in entries {
                println!("{}", entry);
            }
            ExitCode::Success
        }
        Err(e) => report_error(&e),
    }
}

fn report_error(error: &Error) -> ExitCode {
    eprintln!("Error: {}", error);
    if error.is_authentication_failure() {
        eprintln!("Check the password; the archive may also have been modified.");
    }
    error_to_exit_code(error)
}
