//! Fuzz target for the entry record parser with arbitrary byte input.
//!
//! Opening a full archive runs the key derivation for every input, so this
//! target drives the frame parser directly, walking records the way the
//! archive reader does and skipping payloads by offset.
//!
//! Run with: cargo +nightly fuzz run entry_frames

#![no_main]

use libfuzzer_sys::fuzz_target;
use sealpack::format::frame::read_frame_header;
use std::io::{Cursor, Seek, SeekFrom};

fuzz_target!(|data: &[u8]| {
    let total = data.len() as u64;
    let mut cursor = Cursor::new(data);
    let mut offset = 0u64;

    while offset < total {
        let Ok(header) = read_frame_header(&mut cursor, offset, total - offset) else {
            break;
        };

        // A parsed record must fit in what was left
        let record_len = header.record_len();
        assert!(record_len > 0);
        assert!(record_len <= total - offset, "record overruns input");
        assert!(!header.path.as_str().split('/').any(|s| s == ".."));

        offset += record_len;
        if cursor.seek(SeekFrom::Start(offset)).is_err() {
            break;
        }
    }
});
