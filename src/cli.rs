// Command-line inspector for compact data streams.
//
// Dumps varint and packed-boolean sequences from a file or stdin, and
// produces varint encodings for hand-built test input.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::input::{CompactDataInput, DEFAULT_MAX_ARRAY_LEN, DecodeOptions};
use crate::output::CompactDataOutput;
use crate::varint::{self, OverflowPolicy};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Compact binary data inspector.
#[derive(Parser, Debug)]
#[command(
    name = "compactdata",
    version,
    about = "Inspect varint and packed-boolean streams",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print results as JSON.
    #[arg(long = "json", global = true)]
    json_output: bool,

    /// Drop excess bits of over-long varints instead of failing.
    #[arg(long = "wrap-overflow", global = true)]
    wrap_overflow: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decode consecutive varints until end of input.
    Varints(VarintsArgs),
    /// Decode fixed-size groups of packed booleans until end of input.
    Bools(BoolsArgs),
    /// Encode values as varints.
    Encode(EncodeArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct VarintsArgs {
    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BoolsArgs {
    /// Flags per group; each group starts on a fresh byte.
    #[arg(long, short = 'g', value_parser = clap::value_parser!(u32).range(1..), default_value_t = 8)]
    group_size: u32,

    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Values to encode.
    #[arg(required = true)]
    values: Vec<u32>,

    /// Write raw bytes to this file instead of hex to stdout.
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Varints,
    Bools,
    Encode,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    decode: DecodeOptions,
    group_size: usize,
    values: Vec<u32>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let overflow = if cli.wrap_overflow {
        OverflowPolicy::Wrap
    } else {
        OverflowPolicy::Error
    };
    let mut opts = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        decode: DecodeOptions::default().with_overflow(overflow),
        group_size: 8,
        values: Vec::new(),
        input_file: None,
        output_file: None,
    };

    match cli.command {
        Cmd::Varints(args) => {
            opts.command = Command::Varints;
            opts.input_file = args.input;
        }
        Cmd::Bools(args) => {
            opts.command = Command::Bools;
            opts.group_size = args.group_size as usize;
            opts.input_file = args.input;
        }
        Cmd::Encode(args) => {
            opts.command = Command::Encode;
            opts.values = args.values;
            opts.output_file = args.output;
        }
        Cmd::Config => {}
    }
    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("compactdata".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared I/O helpers
// ---------------------------------------------------------------------------

fn open_input(opts: &Options) -> Option<Box<dyn Read>> {
    let reader: Box<dyn Read> = match &opts.input_file {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::with_capacity(BUF_SIZE, f)),
            Err(e) => {
                eprintln!("compactdata: input file: {}: {e}", path.display());
                return None;
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };
    Some(reader)
}

fn print_json(value: &serde_json::Value) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{s}");
            0
        }
        Err(e) => {
            eprintln!("compactdata: json: {e}");
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("compactdata version {version} (Rust)");
    eprintln!("MAX_VARINT_LEN={}", varint::MAX_VARINT_LEN);
    eprintln!("MAX_VARINT32_LEN={}", varint::MAX_VARINT32_LEN);
    eprintln!("DEFAULT_MAX_ARRAY_LEN={DEFAULT_MAX_ARRAY_LEN}");
    eprintln!("DEFAULT_OVERFLOW={:?}", OverflowPolicy::default());
    0
}

// ---------------------------------------------------------------------------
// Decode commands
// ---------------------------------------------------------------------------

fn cmd_varints(opts: &Options) -> i32 {
    let Some(reader) = open_input(opts) else {
        return 1;
    };
    let mut input = CompactDataInput::with_options(reader, opts.decode);
    let mut values = Vec::new();

    loop {
        match input.try_read_var_int() {
            Ok(Some(v)) => values.push(v),
            Ok(None) => break,
            Err(e) => {
                eprintln!(
                    "compactdata: varint #{} at offset {}: {e}",
                    values.len(),
                    input.position()
                );
                return 1;
            }
        }
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "compactdata: varints: {} values, {} bytes",
            values.len(),
            input.position()
        );
    }

    if opts.json_output {
        return print_json(&serde_json::json!({
            "command": "varints",
            "bytes": input.position(),
            "values": values,
        }));
    }
    if !opts.quiet {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        for v in &values {
            if let Err(e) = writeln!(out, "{v}") {
                eprintln!("compactdata: write error: {e}");
                return 1;
            }
        }
        if let Err(e) = out.flush() {
            eprintln!("compactdata: write flush error: {e}");
            return 1;
        }
    }
    0
}

fn cmd_bools(opts: &Options) -> i32 {
    let Some(reader) = open_input(opts) else {
        return 1;
    };
    let mut input = CompactDataInput::with_options(reader, opts.decode);
    let mut groups: Vec<Vec<bool>> = Vec::new();

    'groups: loop {
        let mut group = Vec::with_capacity(opts.group_size.min(1024));
        while group.len() < opts.group_size {
            match input.read_packed_boolean() {
                Ok(flag) => group.push(flag),
                // The first flag of a group always fetches a fresh byte, so
                // running dry there is a clean end.
                Err(e) if e.is_exhausted() && group.is_empty() => break 'groups,
                Err(e) => {
                    eprintln!(
                        "compactdata: group #{} flag {}: {e}",
                        groups.len(),
                        group.len()
                    );
                    return 1;
                }
            }
        }
        input.finish_packed_boolean();
        groups.push(group);
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "compactdata: bools: {} groups of {}, {} bytes",
            groups.len(),
            opts.group_size,
            input.position()
        );
    }

    if opts.json_output {
        return print_json(&serde_json::json!({
            "command": "bools",
            "group_size": opts.group_size,
            "bytes": input.position(),
            "groups": groups,
        }));
    }
    if !opts.quiet {
        for group in &groups {
            let line: String = group.iter().map(|&b| if b { '1' } else { '0' }).collect();
            println!("{line}");
        }
    }
    0
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn cmd_encode(opts: &Options) -> i32 {
    match &opts.output_file {
        Some(path) => {
            if path.exists() && !opts.force {
                eprintln!(
                    "compactdata: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return 1;
            }
            let file = match File::create(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("compactdata: output file: {}: {e}", path.display());
                    return 1;
                }
            };
            let mut out = CompactDataOutput::new(BufWriter::with_capacity(BUF_SIZE, file));
            let written = opts
                .values
                .iter()
                .try_for_each(|&v| out.write_var_int(v))
                .and_then(|()| out.flush());
            if let Err(e) = written {
                eprintln!("compactdata: write error: {e}");
                return 1;
            }
            if opts.verbose > 0 && !opts.quiet {
                eprintln!(
                    "compactdata: encode: {} values, {} bytes",
                    opts.values.len(),
                    out.position()
                );
            }
            0
        }
        None => {
            let encoded: Vec<String> = opts
                .values
                .iter()
                .map(|&v| {
                    let mut buf = [0u8; varint::MAX_VARINT_LEN];
                    let len = varint::encode_u32(v, &mut buf);
                    buf[..len]
                        .iter()
                        .map(|b| format!("{b:02x}"))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect();
            if opts.json_output {
                return print_json(&serde_json::json!({
                    "command": "encode",
                    "values": opts.values,
                    "encoded": encoded,
                }));
            }
            for line in &encoded {
                println!("{line}");
            }
            0
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let opts = resolve_options(cli);

    let exit_code = match opts.command {
        Command::Varints => cmd_varints(&opts),
        Command::Bools => cmd_bools(&opts),
        Command::Encode => cmd_encode(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
