// Compact data input stream.
//
// CompactDataInput wraps a single forward-only byte source and layers the
// two compact primitives (varints and packed booleans) over it, plus the
// plain big-endian scalar reads that record decoders interleave with them.
// The varint and packed-boolean paths share the cursor but not state.

use std::io::Read;

use log::debug;

use crate::cursor::{self, ByteCursor};
use crate::error::{DecodeError, Result};
use crate::mutf8;
use crate::packed::PackedBooleanDecoder;
use crate::varint::{self, OverflowPolicy};

/// Default upper bound for length-prefixed arrays (16 Mi elements).
pub const DEFAULT_MAX_ARRAY_LEN: usize = 1 << 24;

/// Most elements reserved before any are read; longer arrays grow as needed.
const ARRAY_PREALLOC_CAP: usize = 4096;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Handling of varints wider than the target integer.
    pub overflow: OverflowPolicy,
    /// Largest length prefix accepted by `read_boolean_array`.
    pub max_array_len: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::Error,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
        }
    }
}

impl DecodeOptions {
    /// Set the varint overflow policy.
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Set the largest accepted array length prefix.
    pub fn with_max_array_len(mut self, max_array_len: usize) -> Self {
        self.max_array_len = max_array_len;
        self
    }
}

// ---------------------------------------------------------------------------
// CompactDataInput
// ---------------------------------------------------------------------------

/// Reader for the compact encoding produced by
/// [`CompactDataOutput`](crate::output::CompactDataOutput).
///
/// Pass `&mut reader` to keep ownership of the source. Not synchronized:
/// sharing one instance across threads needs external locking.
///
/// ```
/// use compactdata::CompactDataInput;
///
/// let mut input = CompactDataInput::new(&[0x80u8, 0x01, 0x05][..]);
/// assert_eq!(input.read_var_int().unwrap(), 128);
/// assert!(input.read_packed_boolean().unwrap());
/// assert!(!input.read_packed_boolean().unwrap());
/// input.finish_packed_boolean();
/// ```
#[derive(Debug)]
pub struct CompactDataInput<R> {
    inner: ByteCursor<R>,
    booleans: PackedBooleanDecoder,
    options: DecodeOptions,
}

impl<R: Read> CompactDataInput<R> {
    /// Create a reader with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecodeOptions::default())
    }

    /// Create a reader with explicit options.
    pub fn with_options(reader: R, options: DecodeOptions) -> Self {
        Self {
            inner: ByteCursor::new(reader),
            booleans: PackedBooleanDecoder::new(),
            options,
        }
    }

    /// Options this reader was built with.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Bytes consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Mutably borrow the underlying source. Reading from it directly
    /// desynchronizes `position()`.
    pub fn get_mut(&mut self) -> &mut R {
        self.inner.get_mut()
    }

    /// Release the source. Unread bits of a packed-boolean byte are lost.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    // -- varints -----------------------------------------------------------

    /// Read a 32-bit variable-length integer.
    pub fn read_var_int(&mut self) -> Result<u32> {
        varint::stream_read_u32(&mut self.inner, self.options.overflow)
    }

    /// Read a 64-bit variable-length integer.
    pub fn read_var_u64(&mut self) -> Result<u64> {
        varint::stream_read_u64(&mut self.inner, self.options.overflow)
    }

    /// Like [`read_var_int`](Self::read_var_int), but `Ok(None)` if the
    /// source ends cleanly before the value starts.
    pub fn try_read_var_int(&mut self) -> Result<Option<u32>> {
        varint::stream_try_read_u32(&mut self.inner, self.options.overflow)
    }

    // -- packed booleans ---------------------------------------------------

    /// Read one packed boolean. Call
    /// [`finish_packed_boolean`](Self::finish_packed_boolean) after the last
    /// flag of a group.
    pub fn read_packed_boolean(&mut self) -> Result<bool> {
        self.booleans.decode(&mut self.inner)
    }

    /// End the current group of packed booleans.
    pub fn finish_packed_boolean(&mut self) {
        self.booleans.finish_group();
    }

    /// Read a varint length followed by that many packed booleans, then
    /// close the group.
    pub fn read_boolean_array(&mut self) -> Result<Vec<bool>> {
        let len = self.read_var_int()? as usize;
        if len > self.options.max_array_len {
            debug!(
                "boolean array length {len} over limit {}",
                self.options.max_array_len
            );
            return Err(DecodeError::LengthLimit {
                len,
                max: self.options.max_array_len,
            });
        }
        let mut values = Vec::with_capacity(len.min(ARRAY_PREALLOC_CAP));
        for _ in 0..len {
            values.push(self.read_packed_boolean()?);
        }
        self.finish_packed_boolean();
        Ok(values)
    }

    // -- plain scalars -----------------------------------------------------

    /// Read a single raw byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        cursor::read_byte(&mut self.inner, "byte")
    }

    /// Read a whole-byte boolean (nonzero is true).
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(cursor::read_byte(&mut self.inner, "boolean")? != 0)
    }

    /// Read a big-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf, "i32")?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Read a big-endian `i64`.
    pub fn read_i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf, "i64")?;
        Ok(i64::from_be_bytes(buf))
    }

    /// Read a string: big-endian `u16` byte length, then modified UTF-8
    /// bytes (`C0 80` for NUL, surrogate pairs for supplementary characters).
    pub fn read_utf(&mut self) -> Result<String> {
        let mut len = [0u8; 2];
        self.read_exact(&mut len, "string length")?;
        let mut bytes = vec![0u8; usize::from(u16::from_be_bytes(len))];
        self.read_exact(&mut bytes, "string")?;
        mutf8::decode(&bytes)
    }

    fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<()> {
        self.inner
            .read_exact(buf)
            .map_err(|e| DecodeError::from_read(e, context))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaves_varints_and_booleans() {
        // 300, flags [1,0,1], 7, flags [0,1]
        let data: &[u8] = &[0xAC, 0x02, 0x05, 0x07, 0x02];
        let mut input = CompactDataInput::new(data);
        assert_eq!(input.read_var_int().unwrap(), 300);
        assert!(input.read_packed_boolean().unwrap());
        assert!(!input.read_packed_boolean().unwrap());
        assert!(input.read_packed_boolean().unwrap());
        input.finish_packed_boolean();
        assert_eq!(input.read_var_int().unwrap(), 7);
        assert!(!input.read_packed_boolean().unwrap());
        assert!(input.read_packed_boolean().unwrap());
        input.finish_packed_boolean();
        assert_eq!(input.position(), data.len() as u64);
    }

    #[test]
    fn position_is_monotonic() {
        let data: &[u8] = &[0x80, 0x80, 0x01, 0xFF];
        let mut input = CompactDataInput::new(data);
        assert_eq!(input.position(), 0);
        input.read_var_int().unwrap();
        assert_eq!(input.position(), 3);
        input.read_packed_boolean().unwrap();
        assert_eq!(input.position(), 4);
        // Remaining bits come from the buffered byte.
        input.read_packed_boolean().unwrap();
        assert_eq!(input.position(), 4);
    }

    #[test]
    fn empty_source_is_exhausted() {
        let mut input = CompactDataInput::new(&[] as &[u8]);
        assert!(input.read_var_int().unwrap_err().is_exhausted());
        assert!(input.read_packed_boolean().unwrap_err().is_exhausted());
        assert!(input.read_i64().unwrap_err().is_exhausted());
        assert_eq!(input.try_read_var_int().unwrap(), None);
    }

    #[test]
    fn wrap_policy_from_options() {
        let data: &[u8] = &[0x80, 0x80, 0x80, 0x80, 0x10];
        let mut strict = CompactDataInput::new(data);
        assert!(matches!(
            strict.read_var_int(),
            Err(DecodeError::Overflow { bits: 32 })
        ));

        let opts = DecodeOptions::default().with_overflow(OverflowPolicy::Wrap);
        let mut lenient = CompactDataInput::with_options(data, opts);
        assert_eq!(lenient.read_var_int().unwrap(), 0);
    }

    #[test]
    fn boolean_array_closes_group() {
        // len 3, flags 0b011, then varint 9
        let data: &[u8] = &[0x03, 0x03, 0x09];
        let mut input = CompactDataInput::new(data);
        assert_eq!(input.read_boolean_array().unwrap(), [true, true, false]);
        assert_eq!(input.read_var_int().unwrap(), 9);
    }

    #[test]
    fn boolean_array_empty_reads_no_flag_byte() {
        let data: &[u8] = &[0x00, 0x2A];
        let mut input = CompactDataInput::new(data);
        assert!(input.read_boolean_array().unwrap().is_empty());
        assert_eq!(input.read_var_int().unwrap(), 42);
    }

    #[test]
    fn boolean_array_respects_limit() {
        let data: &[u8] = &[0x90, 0x4E]; // 10000
        let opts = DecodeOptions::default().with_max_array_len(16);
        let mut input = CompactDataInput::with_options(data, opts);
        assert!(matches!(
            input.read_boolean_array(),
            Err(DecodeError::LengthLimit { len: 10000, max: 16 })
        ));
    }

    #[test]
    fn big_endian_scalars() {
        let mut data: Vec<u8> = Vec::new();
        data.extend_from_slice(&(-2i32).to_be_bytes());
        data.extend_from_slice(&0x0102_0304_0506_0708i64.to_be_bytes());
        data.extend_from_slice(&[0x00, 0x02, b'o', b'k', 0x01, 0xEE]);
        let mut input = CompactDataInput::new(&data[..]);
        assert_eq!(input.read_i32().unwrap(), -2);
        assert_eq!(input.read_i64().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(input.read_utf().unwrap(), "ok");
        assert!(input.read_bool().unwrap());
        assert_eq!(input.read_u8().unwrap(), 0xEE);
    }

    #[test]
    fn reads_java_modified_utf8() {
        // DataOutputStream.writeUTF("a\0b") and writeUTF("\u{1F600}").
        let data: &[u8] = &[
            0x00, 0x04, 0x61, 0xC0, 0x80, 0x62, //
            0x00, 0x06, 0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80,
        ];
        let mut input = CompactDataInput::new(data);
        assert_eq!(input.read_utf().unwrap(), "a\0b");
        assert_eq!(input.read_utf().unwrap(), "\u{1F600}");
        assert_eq!(input.position(), data.len() as u64);
    }

    #[test]
    fn invalid_modified_utf8_is_rejected() {
        let data: &[u8] = &[0x00, 0x01, 0xFF];
        let mut input = CompactDataInput::new(data);
        assert!(matches!(
            input.read_utf(),
            Err(DecodeError::InvalidData(_))
        ));
    }

    #[test]
    fn boolean_array_large_length_on_short_input() {
        // Length 16 Mi is within the default limit but the flags are missing.
        let data: &[u8] = &[0x80, 0x80, 0x80, 0x08, 0xFF];
        let mut input = CompactDataInput::new(data);
        assert!(input.read_boolean_array().unwrap_err().is_exhausted());
        assert_eq!(input.position(), data.len() as u64);
    }

    #[test]
    fn borrowed_source_keeps_remaining_bytes() {
        let mut src: &[u8] = &[0x01, 0x02, 0x03];
        {
            let mut input = CompactDataInput::new(&mut src);
            assert_eq!(input.read_var_int().unwrap(), 1);
        }
        assert_eq!(src, &[0x02, 0x03]);
    }
}
