// Compact data output stream: the producer side of `CompactDataInput`.
//
// Every write maps one-to-one onto a read in `input.rs`; a stream decodes
// correctly only if the reader issues the same sequence of calls, including
// the group-closing `finish_packed_boolean()`.

use std::io::{self, Write};

use log::trace;

use crate::mutf8;
use crate::packed::PackedBooleanEncoder;
use crate::varint;

/// Writer for the compact encoding.
///
/// ```
/// use compactdata::CompactDataOutput;
///
/// let mut out = CompactDataOutput::new(Vec::new());
/// out.write_var_int(128).unwrap();
/// out.write_packed_boolean(true).unwrap();
/// out.write_packed_boolean(false).unwrap();
/// out.write_packed_boolean(true).unwrap();
/// out.finish_packed_boolean().unwrap();
/// assert_eq!(out.into_inner(), [0x80, 0x01, 0x05]);
/// ```
#[derive(Debug)]
pub struct CompactDataOutput<W: Write> {
    inner: W,
    booleans: PackedBooleanEncoder,
    position: u64,
}

impl<W: Write> CompactDataOutput<W> {
    /// Create a writer over `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            inner: writer,
            booleans: PackedBooleanEncoder::new(),
            position: 0,
        }
    }

    /// Bytes handed to the sink so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Release the sink. Pending packed-boolean bits are not written; call
    /// `finish_packed_boolean()` first.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Flush the underlying sink. Does not close a packed-boolean group.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    // -- varints -----------------------------------------------------------

    /// Write a 32-bit variable-length integer.
    pub fn write_var_int(&mut self, value: u32) -> io::Result<()> {
        self.write_var_u64(u64::from(value))
    }

    /// Write a 64-bit variable-length integer.
    pub fn write_var_u64(&mut self, value: u64) -> io::Result<()> {
        let mut buf = [0u8; varint::MAX_VARINT_LEN];
        let len = varint::encode_u64(value, &mut buf);
        self.write_raw(&buf[..len])
    }

    // -- packed booleans ---------------------------------------------------

    /// Append one flag to the current packed-boolean group.
    ///
    /// On error the flag is not recorded; retrying the call is safe.
    pub fn write_packed_boolean(&mut self, value: bool) -> io::Result<()> {
        let written = self.booleans.encode(&mut self.inner, value)?;
        self.position += written as u64;
        Ok(())
    }

    /// Close the current group, writing any partial byte.
    pub fn finish_packed_boolean(&mut self) -> io::Result<()> {
        let pending = self.booleans.pending_bits();
        let written = self.booleans.finish_group(&mut self.inner)?;
        if written > 0 {
            trace!("packed boolean: flushed group byte ({pending} bits)");
        }
        self.position += written as u64;
        Ok(())
    }

    /// Write a varint length, the flags as packed booleans, and close the
    /// group.
    pub fn write_boolean_array(&mut self, values: &[bool]) -> io::Result<()> {
        let len = u32::try_from(values.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "boolean array too long"))?;
        self.write_var_int(len)?;
        for &v in values {
            self.write_packed_boolean(v)?;
        }
        self.finish_packed_boolean()
    }

    // -- plain scalars -----------------------------------------------------

    /// Write a single raw byte.
    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_raw(&[value])
    }

    /// Write a whole-byte boolean (`1` or `0`).
    pub fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.write_raw(&[u8::from(value)])
    }

    /// Write a big-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> io::Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    /// Write a big-endian `i64`.
    pub fn write_i64(&mut self, value: i64) -> io::Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    /// Write a string as a big-endian `u16` byte length plus modified
    /// UTF-8 bytes. The limit applies to the encoded length.
    pub fn write_utf(&mut self, value: &str) -> io::Result<()> {
        let encoded_len = mutf8::encoded_len(value);
        let len = u16::try_from(encoded_len).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("string of {encoded_len} encoded bytes exceeds u16 length prefix"),
            )
        })?;
        let mut buf = Vec::with_capacity(2 + encoded_len);
        buf.extend_from_slice(&len.to_be_bytes());
        mutf8::encode(value, &mut buf);
        self.write_raw(&buf)
    }

    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }
}
