#![no_main]
use compactdata::{CompactDataInput, DecodeOptions, OverflowPolicy};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The decoders must never panic on arbitrary bytes, only return errors.
    if data.is_empty() {
        return;
    }
    let policy = if data[0] & 1 == 0 {
        OverflowPolicy::Error
    } else {
        OverflowPolicy::Wrap
    };
    let opts = DecodeOptions::default()
        .with_overflow(policy)
        .with_max_array_len(4096);
    let payload = &data[1..];

    // Drive the reads in an order chosen by the payload itself.
    let mut input = CompactDataInput::with_options(payload, opts);
    let mut step = 0usize;
    loop {
        let ok = match payload.get(step % payload.len().max(1)).copied().unwrap_or(0) % 5 {
            0 => input.read_var_int().is_ok(),
            1 => input.read_var_u64().is_ok(),
            2 => input.read_packed_boolean().is_ok(),
            3 => {
                input.finish_packed_boolean();
                true
            }
            _ => input.read_boolean_array().is_ok(),
        };
        // finish_packed_boolean never consumes, so bound the step count too.
        if !ok || step > 8 * payload.len() {
            break;
        }
        step += 1;
    }
});
