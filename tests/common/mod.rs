//! Shared test utilities for integration tests.
//!
//! This module provides helpers to build source trees on disk, create
//! archives in memory, and compare directory trees after a round trip.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sealpack::{ArchivePath, ArchiveWriter, Password, WriteOptions, WriteResult};
use tempfile::TempDir;

/// Password used by tests that do not care about its value.
pub const PASSWORD: &str = "correct horse battery staple";

/// One node of a directory tree: `None` for a directory, file bytes otherwise.
pub type Tree = BTreeMap<String, Option<Vec<u8>>>;

/// Creates directories and files below `root`.
///
/// Parent directories of files are created as needed.
pub fn build_tree(root: &Path, dirs: &[&str], files: &[(&str, &[u8])]) {
    fs::create_dir_all(root).expect("Failed to create root");
    for dir in dirs {
        fs::create_dir_all(root.join(dir)).expect("Failed to create directory");
    }
    for (name, data) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(path, data).expect("Failed to write file");
    }
}

/// Reads every directory and file below `root`, keyed by `/`-separated
/// relative path. The root itself is not included.
pub fn snapshot(root: &Path) -> Tree {
    let mut tree = Tree::new();
    let mut pending = vec![(root.to_path_buf(), String::new())];

    while let Some((dir, prefix)) = pending.pop() {
        for entry in fs::read_dir(&dir).expect("Failed to read directory") {
            let entry = entry.expect("Failed to read directory entry");
            let name = entry.file_name().into_string().expect("Non-UTF-8 name");
            let rel = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };

            if entry.file_type().unwrap().is_dir() {
                tree.insert(rel.clone(), None);
                pending.push((entry.path(), rel));
            } else {
                tree.insert(rel, Some(fs::read(entry.path()).unwrap()));
            }
        }
    }

    tree
}

/// Incompressible bytes, seeded so every run sees the same data.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill(&mut data[..]);
    data
}

/// The source tree used throughout the scenario tests:
/// `a.txt` = "hello" and `sub/b.txt` = "world".
pub fn scenario_tree(root: &Path) {
    build_tree(root, &[], &[("a.txt", b"hello"), ("sub/b.txt", b"world")]);
}

/// Packs `source` into `<workspace>/archive.sp` and returns the archive path.
pub fn pack_into(workspace: &Path, source: &Path, password: &str) -> PathBuf {
    let archive = workspace.join("archive.sp");
    let _ = sealpack::pack(source, &archive, &Password::new(password))
        .expect("Failed to pack source tree");
    archive
}

/// Creates a workspace containing the scenario tree at `src/` and its
/// archive at `archive.sp`.
pub fn scenario_archive(password: &str) -> (TempDir, PathBuf) {
    let workspace = TempDir::new().expect("Failed to create temp dir");
    let source = workspace.path().join("src");
    scenario_tree(&source);
    let archive = pack_into(workspace.path(), &source, password);
    (workspace, archive)
}

/// Creates an in-memory archive with optional configuration.
///
/// Entries with `None` data become directories. Returns both the archive
/// bytes and the WriteResult metadata.
pub fn create_archive_with_result(
    options: Option<WriteOptions>,
    password: &str,
    entries: &[(&str, Option<&[u8]>)],
) -> sealpack::Result<(Vec<u8>, WriteResult)> {
    let writer = ArchiveWriter::create(Vec::new(), &Password::new(password))?;
    let mut writer = match options {
        Some(opts) => writer.options(opts),
        None => writer,
    };

    for (name, data) in entries {
        let path = ArchivePath::new(name)?;
        match data {
            Some(data) => {
                writer.add_bytes(&path, data)?;
            }
            None => writer.add_directory(&path)?,
        }
    }

    let (result, bytes) = writer.finish_into_inner()?;
    Ok((bytes, result))
}

/// Creates an in-memory archive with default options.
pub fn create_archive(password: &str, entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
    create_archive_with_result(None, password, entries)
        .expect("Failed to create archive")
        .0
}

/// Extracts the error from a Result, panicking if it's Ok.
pub fn expect_err<T, E>(result: Result<T, E>) -> E {
    match result {
        Ok(_) => panic!("Expected error but got Ok"),
        Err(e) => e,
    }
}
