use std::io::{ErrorKind, Read, Result};

/// Reads until `buf` is full or the reader hits EOF; returns the bytes read.
///
/// Unlike `read_exact`, a short read is not an error, so callers can tell a
/// clean end of stream from a truncated unit.
pub fn read_full<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut got = 0;
    while got < buf.len() {
        match r.read(&mut buf[got..]) {
            Ok(0) => break,
            Ok(n) => got += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(got)
}
