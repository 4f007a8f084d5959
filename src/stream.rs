//! Byte-reader primitives shared by the container parsers.
//!
//! Both container walkers operate on any `Read + Seek` source. These helpers
//! cover the access patterns the walkers share, whole-field reads that fail
//! explicitly on a short read and length-based skips, so a partial field
//! never leaks to the caller.

use std::io::{Read, Seek, SeekFrom};

/// Read exactly `buf.len()` bytes, or report whether the stream was already
/// at end-of-file before any byte was consumed.
///
/// Returns `Ok(true)` when the buffer was filled, `Ok(false)` on a clean EOF
/// at the first byte. A short read after at least one byte is an error, since
/// it means a field was truncated mid-way.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "stream ended inside a field",
            ));
        }
        filled += n;
    }
    Ok(true)
}

/// Read exactly `len` bytes into a new buffer.
pub fn read_bytes<R: Read>(reader: &mut R, len: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Skip `len` bytes without copying them.
pub fn skip<R: Seek>(reader: &mut R, len: u64) -> std::io::Result<()> {
    reader.seek(SeekFrom::Current(len as i64))?;
    Ok(())
}
