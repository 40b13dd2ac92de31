//! CLI tool for sealpack archive operations.

mod commands;
mod exit_codes;
mod password;
mod progress;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Password-protected directory archiver
#[derive(Parser)]
#[command(name = "sealpack")]
#[command(author, version, about = "Password-protected directory archiver", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a directory into an archive (alias: a)
    #[command(alias = "a")]
    Pack {
        /// Directory to pack
        source: PathBuf,

        /// Archive file to create
        archive: PathBuf,

        /// Zstandard compression level (1-22)
        #[arg(short = 'l', long, default_value = "3")]
        level: i32,

        /// Password (will prompt with confirmation if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },

    /// Unpack an archive into a directory (alias: x)
    #[command(alias = "x")]
    Unpack {
        /// Archive file to unpack
        archive: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Password (will prompt if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },

    /// List archive contents without decrypting them (alias: l)
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Password (will prompt if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(exit_codes::BAD_ARGS);
        }
        Err(e) => {
            // --help and --version
            let _ = e.print();
            std::process::exit(exit_codes::SUCCESS);
        }
    };

    let exit_code = match cli.command {
        Commands::Pack {
            source,
            archive,
            level,
            password,
        } => commands::pack(commands::PackConfig {
            source_dir: &source,
            archive_path: &archive,
            level,
            password,
            quiet: cli.quiet,
        }),

        Commands::Unpack {
            archive,
            output,
            password,
        } => commands::unpack(&archive, &output, password, cli.quiet),

        Commands::List { archive, password } => commands::list(&archive, password),
    };

    std::process::exit(exit_code.code());
}
