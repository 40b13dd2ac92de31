//! Entry record encoding and decoding.
//!
//! Writers emit one record per entry; readers parse the record header and
//! leave the payload to the caller, who either streams it through the payload
//! codec or skips it.

use std::io::{self, Read, Write};

use super::reader::{read_array, read_bytes, read_u8, read_u32_be, read_u64_be};
use super::{ENTRY_PREFIX_SIZE, EntryKind, FILE_FIELDS_SIZE, IV_SIZE, TAG_SIZE};
use crate::archive_path::{ArchivePath, MAX_PATH_LENGTH};
use crate::{Error, Result};

/// Kind-specific part of a parsed record header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Directory record; nothing follows the path.
    Directory,
    /// File record; the payload follows immediately.
    File {
        /// Per-entry AES-GCM IV.
        iv: [u8; IV_SIZE],
        /// Exact number of payload bytes after the header.
        payload_len: u64,
    },
}

/// A parsed record header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Validated entry path.
    pub path: ArchivePath,
    /// Directory or file fields.
    pub kind: FrameKind,
    /// Number of header bytes consumed (everything before the payload).
    pub header_len: u64,
}

impl FrameHeader {
    /// Returns the entry kind.
    pub fn entry_kind(&self) -> EntryKind {
        match self.kind {
            FrameKind::Directory => EntryKind::Directory,
            FrameKind::File { .. } => EntryKind::File,
        }
    }

    /// Returns the payload length, zero for directories.
    pub fn payload_len(&self) -> u64 {
        match self.kind {
            FrameKind::Directory => 0,
            FrameKind::File { payload_len, .. } => payload_len,
        }
    }

    /// Returns the full record length, header plus payload.
    pub fn record_len(&self) -> u64 {
        self.header_len + self.payload_len()
    }
}

fn write_prefix<W: Write>(w: &mut W, kind: EntryKind, path: &ArchivePath) -> io::Result<u64> {
    let path_bytes = path.as_str().as_bytes();
    // ArchivePath caps the length far below u32::MAX
    let path_len = path_bytes.len() as u32;

    w.write_all(&[kind.tag()])?;
    w.write_all(&path_len.to_be_bytes())?;
    w.write_all(path_bytes)?;

    Ok(ENTRY_PREFIX_SIZE + path_bytes.len() as u64)
}

/// Writes a directory record. Returns the number of bytes written.
pub fn write_directory_frame<W: Write>(w: &mut W, path: &ArchivePath) -> Result<u64> {
    Ok(write_prefix(w, EntryKind::Directory, path)?)
}

/// Writes a file record, copying exactly `payload_len` bytes from `payload`.
///
/// Returns the number of bytes written, header included.
///
/// # Errors
///
/// Returns an [`Error::Io`] of kind `UnexpectedEof` if `payload` ends early.
pub fn write_file_frame<W: Write, R: Read>(
    w: &mut W,
    path: &ArchivePath,
    iv: &[u8; IV_SIZE],
    payload: R,
    payload_len: u64,
) -> Result<u64> {
    let mut written = write_prefix(w, EntryKind::File, path)?;
    w.write_all(iv)?;
    w.write_all(&payload_len.to_be_bytes())?;
    written += FILE_FIELDS_SIZE;

    let copied = io::copy(&mut payload.take(payload_len), w)?;
    if copied != payload_len {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "staged payload for '{}' ended after {} of {} bytes",
                path, copied, payload_len
            ),
        )));
    }

    Ok(written + payload_len)
}

/// Parses one record header starting at archive `offset`.
///
/// `remaining` is the number of archive bytes from `offset` to the end. Every
/// declared length is checked against it before anything is consumed, so a
/// corrupt length can neither trigger a huge allocation nor read past the end.
/// On success the reader is positioned at the payload (file) or the next
/// record (directory).
///
/// # Errors
///
/// - [`Error::CorruptEntry`] for truncated headers, unknown type tags,
///   out-of-range lengths and non-UTF-8 paths.
/// - [`Error::InvalidArchivePath`] for paths that are empty, absolute or
///   would escape the extraction root.
pub fn read_frame_header<R: Read>(r: &mut R, offset: u64, remaining: u64) -> Result<FrameHeader> {
    if remaining < ENTRY_PREFIX_SIZE {
        return Err(Error::corrupt_entry(
            offset,
            format!("truncated entry header ({} bytes left)", remaining),
        ));
    }

    let tag = read_u8(r)?;
    let kind = EntryKind::from_tag(tag)
        .ok_or_else(|| Error::corrupt_entry(offset, format!("unknown entry type tag {}", tag)))?;

    let path_len = u64::from(read_u32_be(r)?);
    let mut left = remaining - ENTRY_PREFIX_SIZE;
    if path_len > left {
        return Err(Error::corrupt_entry(
            offset,
            format!(
                "path length {} exceeds the {} bytes left in the archive",
                path_len, left
            ),
        ));
    }
    if path_len > MAX_PATH_LENGTH as u64 {
        return Err(Error::corrupt_entry(
            offset,
            format!(
                "path length {} exceeds the maximum of {}",
                path_len, MAX_PATH_LENGTH
            ),
        ));
    }

    let raw_path = read_bytes(r, path_len as usize)?;
    left -= path_len;
    let path = String::from_utf8(raw_path)
        .map_err(|_| Error::corrupt_entry(offset, "entry path is not valid UTF-8"))?;
    let path = ArchivePath::new(&path)?;

    let mut header_len = ENTRY_PREFIX_SIZE + path_len;

    let kind = match kind {
        EntryKind::Directory => FrameKind::Directory,
        EntryKind::File => {
            if left < FILE_FIELDS_SIZE {
                return Err(Error::corrupt_entry(
                    offset,
                    format!("truncated file entry '{}'", path),
                ));
            }
            left -= FILE_FIELDS_SIZE;

            let iv: [u8; IV_SIZE] = read_array(r)?;
            let payload_len = read_u64_be(r)?;
            if payload_len > left {
                return Err(Error::corrupt_entry(
                    offset,
                    format!(
                        "payload length {} of '{}' exceeds the {} bytes left in the archive",
                        payload_len, path, left
                    ),
                ));
            }
            if payload_len < TAG_SIZE as u64 {
                return Err(Error::corrupt_entry(
                    offset,
                    format!(
                        "payload length {} of '{}' is shorter than the authentication tag",
                        payload_len, path
                    ),
                ));
            }

            header_len += FILE_FIELDS_SIZE;
            FrameKind::File { iv, payload_len }
        }
    };

    Ok(FrameHeader {
        path,
        kind,
        header_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn path(s: &str) -> ArchivePath {
        ArchivePath::new(s).unwrap()
    }

    fn parse(bytes: &[u8]) -> Result<FrameHeader> {
        read_frame_header(&mut Cursor::new(bytes), 16, bytes.len() as u64)
    }

    #[test]
    fn test_directory_frame_layout() {
        let mut buf = Vec::new();
        let n = write_directory_frame(&mut buf, &path("sub")).unwrap();
        assert_eq!(n, buf.len() as u64);
        assert_eq!(buf, [0, 0, 0, 0, 3, b's', b'u', b'b']);

        let header = parse(&buf).unwrap();
        assert_eq!(header.path.as_str(), "sub");
        assert_eq!(header.kind, FrameKind::Directory);
        assert_eq!(header.header_len, 8);
        assert_eq!(header.record_len(), 8);
    }

    #[test]
    fn test_file_frame_layout() {
        let iv = [9u8; IV_SIZE];
        let payload = [0xEEu8; 20];
        let mut buf = Vec::new();
        let n = write_file_frame(&mut buf, &path("a.txt"), &iv, &payload[..], 20).unwrap();
        assert_eq!(n, buf.len() as u64);

        assert_eq!(buf[0], 1);
        assert_eq!(&buf[1..5], &[0, 0, 0, 5]);
        assert_eq!(&buf[5..10], b"a.txt");
        assert_eq!(&buf[10..22], &iv);
        assert_eq!(&buf[22..30], &20u64.to_be_bytes());
        assert_eq!(&buf[30..], &payload);

        let mut cursor = Cursor::new(&buf);
        let header = read_frame_header(&mut cursor, 0, buf.len() as u64).unwrap();
        assert_eq!(header.entry_kind(), EntryKind::File);
        assert_eq!(header.kind, FrameKind::File { iv, payload_len: 20 });
        assert_eq!(header.header_len, 30);
        assert_eq!(cursor.position(), 30);
    }

    #[test]
    fn test_write_file_frame_short_payload() {
        let err = write_file_frame(&mut Vec::new(), &path("f"), &[0; IV_SIZE], &[1u8; 5][..], 10)
            .unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_write_file_frame_copies_only_declared_bytes() {
        let mut buf = Vec::new();
        write_file_frame(&mut buf, &path("f"), &[0; IV_SIZE], &[1u8; 40][..], 16).unwrap();
        assert_eq!(buf.len(), 1 + 4 + 1 + IV_SIZE + 8 + 16);
    }

    #[test]
    fn test_truncated_prefix() {
        let err = parse(&[1, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::CorruptEntry { offset: 16, .. }));
    }

    #[test]
    fn test_unknown_tag() {
        let err = parse(&[7, 0, 0, 0, 1, b'x']).unwrap_err();
        assert!(err.to_string().contains("unknown entry type tag 7"));
    }

    #[test]
    fn test_path_length_past_end() {
        let err = parse(&[0, 0, 0, 0, 10, b'a', b'b']).unwrap_err();
        assert!(matches!(err, Error::CorruptEntry { .. }));

        let err = parse(&[0, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap_err();
        assert!(matches!(err, Error::CorruptEntry { .. }));
    }

    #[test]
    fn test_invalid_utf8_path() {
        let err = parse(&[0, 0, 0, 0, 2, 0xC3, 0x28]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_escaping_paths_rejected() {
        for bad in ["../evil", "/etc/passwd", "a/../../b", ""] {
            let mut buf = vec![0u8];
            buf.extend_from_slice(&(bad.len() as u32).to_be_bytes());
            buf.extend_from_slice(bad.as_bytes());
            let err = parse(&buf).unwrap_err();
            assert!(
                matches!(err, Error::InvalidArchivePath(_)),
                "{:?}: {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_truncated_file_fields() {
        let mut buf = vec![1u8, 0, 0, 0, 1, b'f'];
        buf.extend_from_slice(&[0u8; 10]);
        let err = parse(&buf).unwrap_err();
        assert!(err.to_string().contains("truncated file entry"));
    }

    #[test]
    fn test_payload_length_checks() {
        let header = |len: u64| {
            let mut buf = vec![1u8, 0, 0, 0, 1, b'f'];
            buf.extend_from_slice(&[0u8; IV_SIZE]);
            buf.extend_from_slice(&len.to_be_bytes());
            buf
        };

        let mut past_end = header(100);
        past_end.extend_from_slice(&[0u8; 50]);
        assert!(parse(&past_end).unwrap_err().to_string().contains("exceeds"));

        let mut huge = header(u64::MAX);
        huge.extend_from_slice(&[0u8; 16]);
        assert!(matches!(parse(&huge).unwrap_err(), Error::CorruptEntry { .. }));

        let mut short = header(4);
        short.extend_from_slice(&[0u8; 4]);
        assert!(
            parse(&short)
                .unwrap_err()
                .to_string()
                .contains("shorter than the authentication tag")
        );

        let mut exact = header(16);
        exact.extend_from_slice(&[0u8; 16]);
        assert_eq!(parse(&exact).unwrap().payload_len(), 16);
    }
}
