//! Low-level big-endian reading utilities for archive parsing.

use std::io::{self, Read};

/// Reads a single byte.
pub fn read_u8<R: Read>(r: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Reads an unsigned 32-bit big-endian integer.
pub fn read_u32_be<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Reads an unsigned 64-bit big-endian integer.
pub fn read_u64_be<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

/// Reads a fixed-size byte array.
pub fn read_array<R: Read, const N: usize>(r: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Reads exactly `count` bytes.
///
/// Callers must validate `count` against the bytes remaining in the archive
/// before calling; the buffer is allocated up front.
pub fn read_bytes<R: Read>(r: &mut R, count: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; count];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_integers_are_big_endian() {
        let data = [
            0x01, 0x00, 0x00, 0x01, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0xFF,
        ];
        let mut cursor = Cursor::new(&data);
        assert_eq!(read_u8(&mut cursor).unwrap(), 1);
        assert_eq!(read_u32_be(&mut cursor).unwrap(), 0x0000_0102);
        assert_eq!(read_u64_be(&mut cursor).unwrap(), 0x0100);
        assert_eq!(read_u8(&mut cursor).unwrap(), 0xFF);
    }

    #[test]
    fn test_read_array_and_bytes() {
        let mut cursor = Cursor::new(b"abcdef".to_vec());
        let head: [u8; 2] = read_array(&mut cursor).unwrap();
        assert_eq!(&head, b"ab");
        assert_eq!(read_bytes(&mut cursor, 4).unwrap(), b"cdef");
    }

    #[test]
    fn test_short_input() {
        let mut cursor = Cursor::new([0u8; 3]);
        let err = read_u32_be(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
