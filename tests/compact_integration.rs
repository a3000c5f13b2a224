use std::io::{self, Read};

use compactdata::varint::{self, MAX_VARINT_LEN};
use compactdata::{
    CompactDataInput, CompactDataOutput, DecodeError, DecodeOptions, OverflowPolicy,
    PackedBooleanDecoder,
};

/// Source that yields its bytes, then fails with a transport error.
struct FailingAfter {
    data: Vec<u8>,
    pos: usize,
}

impl Read for FailingAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        }
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Source that counts how many read calls it served.
struct CountingReads<'a> {
    data: &'a [u8],
    calls: usize,
}

impl Read for CountingReads<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.calls += 1;
        self.data.read(buf)
    }
}

fn encode(val: u32) -> Vec<u8> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = varint::encode_u32(val, &mut buf);
    buf[..len].to_vec()
}

#[test]
fn varint_byte_count_boundaries() {
    let cases: &[(u32, &[u8])] = &[
        (0, &[0x00]),
        (127, &[0x7F]),
        (128, &[0x80, 0x01]),
        (16384, &[0x80, 0x80, 0x01]),
    ];
    for &(val, bytes) in cases {
        assert_eq!(encode(val), bytes, "encoding of {val}");
        let mut input = CompactDataInput::new(bytes);
        assert_eq!(input.read_var_int().unwrap(), val);
        assert_eq!(input.position(), bytes.len() as u64);
    }
}

#[test]
fn packed_boolean_bit_order() {
    let flags = [true, false, true, false, false, false, false, false];
    let mut out = CompactDataOutput::new(Vec::new());
    for f in flags {
        out.write_packed_boolean(f).unwrap();
    }
    out.finish_packed_boolean().unwrap();
    let bytes = out.into_inner();
    assert_eq!(bytes, [0x05]);

    let mut input = CompactDataInput::new(&bytes[..]);
    let decoded: Vec<bool> = (0..8).map(|_| input.read_packed_boolean().unwrap()).collect();
    assert_eq!(decoded, flags);
}

#[test]
fn finish_is_idempotent_for_alignment() {
    // Nothing consumed yet.
    let data: &[u8] = &[0x01, 0x00, 0x01];
    let mut input = CompactDataInput::new(data);
    input.finish_packed_boolean();
    assert!(input.read_packed_boolean().unwrap());
    assert_eq!(input.position(), 1);

    // Right after a fetch, then finished twice.
    input.finish_packed_boolean();
    input.finish_packed_boolean();
    assert!(!input.read_packed_boolean().unwrap());
    assert_eq!(input.position(), 2);

    input.finish_packed_boolean();
    assert!(input.read_packed_boolean().unwrap());
    assert_eq!(input.position(), 3);
}

#[test]
fn partial_byte_flush_discards_rest() {
    let data: &[u8] = &[0x07, 0x01];
    let mut input = CompactDataInput::new(data);
    for _ in 0..3 {
        assert!(input.read_packed_boolean().unwrap());
    }
    input.finish_packed_boolean();
    assert!(input.read_packed_boolean().unwrap());
    assert_eq!(input.position(), 2);
}

#[test]
fn missing_finish_corrupts_alignment() {
    // Without the finish call the second group reads leftover bits of 0x07.
    let data: &[u8] = &[0x07, 0x00];
    let mut input = CompactDataInput::new(data);
    input.read_packed_boolean().unwrap();
    assert!(input.read_packed_boolean().unwrap());
    assert_eq!(input.position(), 1);
}

#[test]
fn empty_source_reports_exhaustion() {
    let mut input = CompactDataInput::new(io::empty());
    assert!(matches!(
        input.read_var_int(),
        Err(DecodeError::StreamExhausted { .. })
    ));
    assert!(matches!(
        input.read_packed_boolean(),
        Err(DecodeError::StreamExhausted { .. })
    ));
}

#[test]
fn truncated_varint_reports_exhaustion() {
    let data: &[u8] = &[0xFF, 0xFF];
    let mut input = CompactDataInput::new(data);
    let err = input.read_var_int().unwrap_err();
    assert!(err.is_exhausted(), "got {err:?}");
    assert_eq!(input.position(), 2);
}

#[test]
fn transport_errors_propagate_unchanged() {
    let src = FailingAfter {
        data: vec![0x80],
        pos: 0,
    };
    let mut input = CompactDataInput::new(src);
    match input.read_var_int() {
        Err(DecodeError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("unexpected {other:?}"),
    }

    let mut dec = PackedBooleanDecoder::new();
    let mut src = FailingAfter {
        data: Vec::new(),
        pos: 0,
    };
    assert!(matches!(dec.decode(&mut src), Err(DecodeError::Io(_))));
}

#[test]
fn packed_decoder_reads_one_byte_per_fetch() {
    let mut src = CountingReads {
        data: &[0xAA, 0x55, 0x01],
        calls: 0,
    };
    let mut dec = PackedBooleanDecoder::new();
    let first: Vec<bool> = (0..8).map(|_| dec.decode(&mut src).unwrap()).collect();
    assert_eq!(first, [false, true, false, true, false, true, false, true]);
    assert_eq!(src.calls, 1);
    dec.decode(&mut src).unwrap();
    assert_eq!(src.calls, 2);
    // The third byte is still unread.
    assert_eq!(src.data, &[0x01]);
}

#[test]
fn overflow_policy_is_configurable() {
    let over_long: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF, 0x7F];

    let mut strict = CompactDataInput::new(over_long);
    assert!(matches!(
        strict.read_var_int(),
        Err(DecodeError::Overflow { bits: 32 })
    ));

    let opts = DecodeOptions::default().with_overflow(OverflowPolicy::Wrap);
    let mut lenient = CompactDataInput::with_options(over_long, opts);
    assert_eq!(lenient.read_var_int().unwrap(), u32::MAX);

    // The same bytes are a legal 64-bit value.
    let mut wide = CompactDataInput::new(over_long);
    assert_eq!(wide.read_var_u64().unwrap(), (1u64 << 35) - 1);
}

#[test]
fn mixed_record_roundtrip() {
    let mut out = CompactDataOutput::new(Vec::new());
    out.write_i64(0x1234_5678_9ABC_DEF0).unwrap();
    out.write_utf("com/example/Foo").unwrap();
    out.write_var_int(3).unwrap();
    for flags in [&[true, false][..], &[][..], &[false; 17][..]] {
        out.write_boolean_array(flags).unwrap();
    }
    out.write_var_u64(u64::MAX).unwrap();
    out.write_bool(true).unwrap();
    out.write_i32(-1).unwrap();
    out.flush().unwrap();
    let written = out.position();
    let bytes = out.into_inner();
    assert_eq!(written, bytes.len() as u64);

    let mut input = CompactDataInput::new(&bytes[..]);
    assert_eq!(input.read_i64().unwrap(), 0x1234_5678_9ABC_DEF0);
    assert_eq!(input.read_utf().unwrap(), "com/example/Foo");
    let count = input.read_var_int().unwrap();
    assert_eq!(count, 3);
    assert_eq!(input.read_boolean_array().unwrap(), [true, false]);
    assert!(input.read_boolean_array().unwrap().is_empty());
    assert_eq!(input.read_boolean_array().unwrap(), vec![false; 17]);
    assert_eq!(input.read_var_u64().unwrap(), u64::MAX);
    assert!(input.read_bool().unwrap());
    assert_eq!(input.read_i32().unwrap(), -1);
    assert_eq!(input.try_read_var_int().unwrap(), None);
    assert_eq!(input.position(), written);
}

#[test]
fn decode_error_converts_to_io_error() {
    fn read_count<R: Read>(input: &mut CompactDataInput<R>) -> io::Result<u32> {
        Ok(input.read_var_int()?)
    }
    let data: &[u8] = &[0x80];
    let mut input = CompactDataInput::new(data);
    let err = read_count(&mut input).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}
