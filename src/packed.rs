// Bit-packed booleans, eight per byte.
//
// Bits are consumed least-significant first: the first flag of a group is
// bit 0 of its first byte, the eighth is bit 7. A group is closed by
// `finish_group()` on both sides so the next group starts on a fresh byte.
//
//   [true, false, true, false, false, false, false, false] -> 05

use std::io::{self, Read, Write};

use log::trace;

use crate::cursor;
use crate::error::Result;

const CONTEXT: &str = "packed boolean";

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Read-side state: the current byte and how many of its bits are unread.
///
/// Invariant: `remaining_bits <= 8`. A fetch from the source happens exactly
/// when a flag is requested with `remaining_bits == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedBooleanDecoder {
    buffer: u8,
    remaining_bits: u8,
}

impl PackedBooleanDecoder {
    /// Create a decoder with no buffered bits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next flag, fetching a new byte from `r` if the current one
    /// is used up.
    pub fn decode<R: Read + ?Sized>(&mut self, r: &mut R) -> Result<bool> {
        if self.remaining_bits == 0 {
            self.buffer = cursor::read_byte(r, CONTEXT)?;
            self.remaining_bits = 8;
            trace!("packed boolean: fetched {:#04x}", self.buffer);
        }
        let value = self.buffer & 0x01 != 0;
        self.buffer >>= 1;
        self.remaining_bits -= 1;
        Ok(value)
    }

    /// Discard unread bits so the next flag starts on a new byte.
    #[inline]
    pub fn finish_group(&mut self) {
        if self.remaining_bits != 0 {
            trace!("packed boolean: dropping {} unread bits", self.remaining_bits);
        }
        self.remaining_bits = 0;
    }

    /// Unread bits left in the current byte (0..=8).
    pub fn remaining_bits(&self) -> u8 {
        self.remaining_bits
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Write-side counterpart of [`PackedBooleanDecoder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedBooleanEncoder {
    buffer: u8,
    filled_bits: u8,
}

impl PackedBooleanEncoder {
    /// Create an encoder with no pending bits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one flag. A completed byte is held until the next flag or
    /// `finish_group()` needs the space, and written then. Returns the
    /// number of bytes written (0 or 1).
    ///
    /// On error the flag is not recorded and the held byte is kept, so the
    /// same call can be retried after a transient failure.
    pub fn encode<W: Write + ?Sized>(&mut self, w: &mut W, value: bool) -> io::Result<usize> {
        let written = if self.filled_bits == 8 { self.flush(w)? } else { 0 };
        if value {
            self.buffer |= 1 << self.filled_bits;
        }
        self.filled_bits += 1;
        Ok(written)
    }

    /// Write any pending byte. Unused high bits are zero.
    /// Returns the number of bytes written (0 or 1).
    pub fn finish_group<W: Write + ?Sized>(&mut self, w: &mut W) -> io::Result<usize> {
        if self.filled_bits > 0 {
            return self.flush(w);
        }
        Ok(0)
    }

    /// Flags buffered but not yet written (0..=8).
    pub fn pending_bits(&self) -> u8 {
        self.filled_bits
    }

    /// State is reset only once the byte has reached the sink.
    fn flush<W: Write + ?Sized>(&mut self, w: &mut W) -> io::Result<usize> {
        w.write_all(&[self.buffer])?;
        self.buffer = 0;
        self.filled_bits = 0;
        Ok(1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
