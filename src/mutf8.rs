// Modified UTF-8, as written by Java's `DataOutput.writeUTF`.
//
// Differs from standard UTF-8 in two ways:
//   - U+0000 is the two-byte form C0 80, never a bare 00 byte
//   - supplementary characters are two 3-byte surrogate halves (CESU-8)
//
// Both sides work in UTF-16 code units; every unit takes 1, 2 or 3 bytes.

use crate::error::{DecodeError, Result};

/// Byte length of `s` once encoded.
pub fn encoded_len(s: &str) -> usize {
    s.encode_utf16().map(unit_len).sum()
}

#[inline]
fn unit_len(unit: u16) -> usize {
    match unit {
        0x0001..=0x007F => 1,
        0x0000 | 0x0080..=0x07FF => 2,
        _ => 3,
    }
}

/// Append the encoding of `s` to `out`.
pub fn encode(s: &str, out: &mut Vec<u8>) {
    out.reserve(encoded_len(s));
    for unit in s.encode_utf16() {
        match unit_len(unit) {
            1 => out.push(unit as u8),
            2 => out.extend_from_slice(&[
                0xC0 | (unit >> 6) as u8,
                0x80 | (unit & 0x3F) as u8,
            ]),
            _ => out.extend_from_slice(&[
                0xE0 | (unit >> 12) as u8,
                0x80 | ((unit >> 6) & 0x3F) as u8,
                0x80 | (unit & 0x3F) as u8,
            ]),
        }
    }
}

/// Decode a complete modified UTF-8 byte string.
///
/// A lone surrogate half has no `String` representation and is rejected.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let (unit, width) = match b >> 4 {
            0x0..=0x7 => (u16::from(b), 1),
            0xC | 0xD => {
                let b2 = continuation(bytes, i, 1)?;
                ((u16::from(b & 0x1F) << 6) | b2, 2)
            }
            0xE => {
                let b2 = continuation(bytes, i, 1)?;
                let b3 = continuation(bytes, i, 2)?;
                ((u16::from(b & 0x0F) << 12) | (b2 << 6) | b3, 3)
            }
            _ => return Err(malformed(i)),
        };
        units.push(unit);
        i += width;
    }
    String::from_utf16(&units)
        .map_err(|_| DecodeError::InvalidData("unpaired surrogate in modified utf-8".into()))
}

/// Payload bits of the continuation byte at `start + offset`.
#[inline]
fn continuation(bytes: &[u8], start: usize, offset: usize) -> Result<u16> {
    match bytes.get(start + offset) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
        Some(_) => Err(malformed(start)),
        None => Err(DecodeError::InvalidData(format!(
            "truncated modified utf-8 sequence at index {start}"
        ))),
    }
}

fn malformed(index: usize) -> DecodeError {
    DecodeError::InvalidData(format!("malformed modified utf-8 at index {index}"))
}
