#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz CLI argument parsing with arbitrary NUL-separated arguments.
    let args: Vec<String> = data
        .split(|&b| b == 0)
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect();
    compactdata::cli::fuzz_try_parse_args(&args);
});
