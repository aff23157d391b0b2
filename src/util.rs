use std::io::{ErrorKind, Read, Result};

/// Reads as many bytes as are needed to fill the buffer, possibly performing multiple reads to do
/// so (and also retrying if required to deal with EINTR).
///
/// Unlike the standard Read::read_exact() method, hitting EOF early is not an error: the
/// number of bytes that were actually read is returned instead.  This lets callers peek at a
/// fixed-size header of a stream that may legitimately be shorter than the header.
///
/// # Return value
///
///  - the number of bytes read, which is less than `buf.len()` only if EOF was reached
///  - in case of underlying errors from the Read implementation, the error is returned directly
pub(crate) fn read_exactish(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}
