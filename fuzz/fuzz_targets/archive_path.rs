//! Fuzz target for ArchivePath::new with arbitrary string input.
//!
//! Run with: cargo +nightly fuzz run archive_path
//!
//! Properties checked for every accepted path:
//! - no `.` or `..` segment and no empty segment
//! - not absolute, no backslash, no NUL byte
//! - the relative filesystem path has one component per segment

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(path_str) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(path) = sealpack::ArchivePath::new(path_str) else {
        return;
    };

    let s = path.as_str();
    assert!(!s.starts_with('/'), "Absolute path accepted: {:?}", s);
    assert!(!s.contains('\\'), "Backslash accepted: {:?}", s);
    assert!(!s.contains('\0'), "NUL byte accepted: {:?}", s);
    for segment in s.split('/') {
        assert!(
            !segment.is_empty() && segment != "." && segment != "..",
            "Bad segment {:?} in {:?}",
            segment,
            s
        );
    }

    let relative = path.to_relative_path();
    assert!(relative.is_relative());
    assert_eq!(relative.components().count(), path.components().count());
});
