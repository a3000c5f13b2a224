// Forward-only byte cursor over a blocking `Read` source.
//
// The decoders never buffer ahead: each conceptual byte fetch is a single
// one-byte read, so whatever follows a decoded value is still available to
// the caller. Wrap the source in a `BufReader` if syscall-per-byte matters.

use std::io::{self, Read};

use crate::error::{DecodeError, Result};

/// Fetch exactly one byte, mapping end of stream to `StreamExhausted`.
#[inline]
pub fn read_byte<R: Read + ?Sized>(r: &mut R, context: &'static str) -> Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)
        .map_err(|e| DecodeError::from_read(e, context))?;
    Ok(buf[0])
}

/// Fetch one byte, or `None` if the stream ended cleanly before it.
pub fn try_read_byte<R: Read + ?Sized>(r: &mut R) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match r.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::Io(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// ByteCursor
// ---------------------------------------------------------------------------

/// `Read` adapter that tracks how many bytes have been consumed.
///
/// The position only ever moves forward; there is no seek or rewind.
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    position: u64,
}

impl<R> ByteCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ByteCursor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}
