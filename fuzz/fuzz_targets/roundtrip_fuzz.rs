#![no_main]
use compactdata::{CompactDataInput, CompactDataOutput};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Interpret the input as a script: each byte picks a field kind and the
    // following bytes provide its payload.
    let mut out = CompactDataOutput::new(Vec::new());
    let mut ints = Vec::new();
    let mut flags = Vec::new();
    for chunk in data.chunks(5) {
        if chunk[0] & 1 == 0 {
            let mut raw = [0u8; 4];
            raw[..chunk.len() - 1].copy_from_slice(&chunk[1..]);
            let v = u32::from_le_bytes(raw);
            out.write_var_int(v).unwrap();
            ints.push(v);
        } else {
            let group: Vec<bool> = chunk[1..]
                .iter()
                .flat_map(|b| (0..8).map(move |i| b & (1 << i) != 0))
                .take(usize::from(chunk[0] >> 1).max(1))
                .collect();
            for &f in &group {
                out.write_packed_boolean(f).unwrap();
            }
            out.finish_packed_boolean().unwrap();
            flags.push(group);
        }
    }
    let bytes = out.into_inner();

    let mut input = CompactDataInput::new(&bytes[..]);
    let (mut ii, mut fi) = (0, 0);
    for chunk in data.chunks(5) {
        if chunk[0] & 1 == 0 {
            assert_eq!(input.read_var_int().unwrap(), ints[ii]);
            ii += 1;
        } else {
            for &f in &flags[fi] {
                assert_eq!(input.read_packed_boolean().unwrap(), f);
            }
            input.finish_packed_boolean();
            fi += 1;
        }
    }
    assert_eq!(input.position(), bytes.len() as u64);
});
