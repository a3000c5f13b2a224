// Variable-length unsigned integers.
//
// Base-128, little-endian group order: the first byte carries the lowest
// 7 bits. Every byte except the last has bit 7 set.
//
//   0     -> 00
//   127   -> 7F
//   128   -> 80 01
//   16384 -> 80 80 01

use std::io::{self, Read, Write};

use log::debug;

use crate::cursor;
use crate::error::{DecodeError, Result};

/// Maximum encoded length for a 64-bit value (ceil(64/7) = 10).
pub const MAX_VARINT_LEN: usize = 10;

/// Maximum encoded length for a 32-bit value (ceil(32/7) = 5).
pub const MAX_VARINT32_LEN: usize = 5;

const CONTEXT: &str = "varint";

/// What to do when a varint carries bits beyond the target width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Reject the value as soon as the excess group is seen.
    #[default]
    Error,
    /// Keep reading until the terminating byte and drop the excess bits.
    Wrap,
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a `u64` into `buf`. Returns the number of bytes written (1..=10),
/// starting at `buf[0]`.
#[inline]
pub fn encode_u64(mut num: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    loop {
        let group = (num & 0x7F) as u8;
        num >>= 7;
        if num == 0 {
            buf[i] = group;
            return i + 1;
        }
        buf[i] = group | 0x80;
        i += 1;
    }
}

/// Encode a `u32` into `buf`. Returns the number of bytes written (1..=5).
#[inline]
pub fn encode_u32(num: u32, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    encode_u64(u64::from(num), buf)
}

/// Encode a `u64` and write it to a `Write` sink.
pub fn write_u64<W: Write + ?Sized>(w: &mut W, num: u64) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(num, &mut buf);
    w.write_all(&buf[..len])
}

/// Encode a `u32` and write it to a `Write` sink.
pub fn write_u32<W: Write + ?Sized>(w: &mut W, num: u32) -> io::Result<()> {
    write_u64(w, u64::from(num))
}

// ---------------------------------------------------------------------------
// Decoding from byte slices
// ---------------------------------------------------------------------------

/// True if a group at `shift` would push the value past `bits` bits, or
/// asks for another group after the last one that can fit.
#[inline]
fn exceeds(group: u64, more: bool, shift: u32, bits: u32) -> bool {
    let room = bits.saturating_sub(shift);
    room < 7 && (group >> room != 0 || more)
}

fn read_slice(data: &[u8], bits: u32) -> std::result::Result<(u64, usize), VarIntError> {
    let mut val: u64 = 0;
    let mut shift: u32 = 0;
    for (i, &byte) in data.iter().enumerate() {
        let group = u64::from(byte & 0x7F);
        let more = byte & 0x80 != 0;
        if exceeds(group, more, shift, bits) {
            return Err(VarIntError::Overflow { bits });
        }
        val |= group << shift;
        if !more {
            return Ok((val, i + 1));
        }
        shift += 7;
    }
    Err(VarIntError::Underflow)
}

/// Decode a `u64` from the front of a byte slice.
/// Returns `(value, bytes_consumed)`.
pub fn read_u64(data: &[u8]) -> std::result::Result<(u64, usize), VarIntError> {
    read_slice(data, u64::BITS)
}

/// Decode a `u32` from the front of a byte slice.
pub fn read_u32(data: &[u8]) -> std::result::Result<(u32, usize), VarIntError> {
    let (val, len) = read_slice(data, u32::BITS)?;
    Ok((val as u32, len))
}

// ---------------------------------------------------------------------------
// Decoding from `Read` (streaming)
// ---------------------------------------------------------------------------

/// Continue a varint whose first byte has already been fetched.
fn read_tail<R: Read + ?Sized>(
    r: &mut R,
    first: u8,
    bits: u32,
    policy: OverflowPolicy,
) -> Result<u64> {
    let mut byte = first;
    let mut val: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let group = u64::from(byte & 0x7F);
        let more = byte & 0x80 != 0;
        if shift < bits {
            if policy == OverflowPolicy::Error && exceeds(group, more, shift, bits) {
                debug!("varint overflow: group {group:#04x} at shift {shift} exceeds {bits} bits");
                return Err(DecodeError::Overflow { bits });
            }
            val |= group << shift;
        }
        if !more {
            break;
        }
        shift = shift.saturating_add(7);
        byte = cursor::read_byte(r, CONTEXT)?;
    }
    if bits < u64::BITS {
        val &= (1u64 << bits) - 1;
    }
    Ok(val)
}

/// Read a `u64` varint from a streaming source.
pub fn stream_read_u64<R: Read + ?Sized>(r: &mut R, policy: OverflowPolicy) -> Result<u64> {
    let first = cursor::read_byte(r, CONTEXT)?;
    read_tail(r, first, u64::BITS, policy)
}

/// Read a `u32` varint from a streaming source.
pub fn stream_read_u32<R: Read + ?Sized>(r: &mut R, policy: OverflowPolicy) -> Result<u32> {
    let first = cursor::read_byte(r, CONTEXT)?;
    Ok(read_tail(r, first, u32::BITS, policy)? as u32)
}

/// Read a `u32` varint, or `None` if the stream ends before its first byte.
///
/// Ending after the first byte but before the terminator is still
/// `StreamExhausted`.
pub fn stream_try_read_u32<R: Read + ?Sized>(
    r: &mut R,
    policy: OverflowPolicy,
) -> Result<Option<u32>> {
    match cursor::try_read_byte(r)? {
        Some(first) => Ok(Some(read_tail(r, first, u32::BITS, policy)? as u32)),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Return the encoded byte-length of a `u64` value.
#[inline]
pub fn sizeof_u64(num: u64) -> usize {
    let bits = 64 - num.leading_zeros();
    (bits.max(1).div_ceil(7) as usize).min(MAX_VARINT_LEN)
}

/// Return the encoded byte-length of a `u32` value.
#[inline]
pub fn sizeof_u32(num: u32) -> usize {
    let bits = 32 - num.leading_zeros();
    (bits.max(1).div_ceil(7) as usize).min(MAX_VARINT32_LEN)
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VarIntError {
    /// Not enough input bytes to complete the integer.
    #[error("varint underflow (truncated input)")]
    Underflow,
    /// Value would overflow the target integer type.
    #[error("varint overflow: value exceeds {bits} bits")]
    Overflow { bits: u32 },
}

impl From<VarIntError> for io::Error {
    fn from(e: VarIntError) -> io::Error {
        match e {
            VarIntError::Underflow => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            VarIntError::Overflow { .. } => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
