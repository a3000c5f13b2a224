//! Compactdata: compact binary decoding primitives.
//!
//! Two primitives share one forward-only byte cursor:
//! - base-128 variable-length unsigned integers (`varint`)
//! - booleans packed eight per byte, least-significant bit first (`packed`)
//!
//! `CompactDataInput` exposes both over any `std::io::Read`, and
//! `CompactDataOutput` produces conforming streams.
//!
//! # Quick Start
//!
//! ```
//! use compactdata::{CompactDataInput, CompactDataOutput};
//!
//! let mut out = CompactDataOutput::new(Vec::new());
//! out.write_var_int(16384).unwrap();
//! for flag in [true, false, true] {
//!     out.write_packed_boolean(flag).unwrap();
//! }
//! out.finish_packed_boolean().unwrap();
//! let bytes = out.into_inner();
//! assert_eq!(bytes, [0x80, 0x80, 0x01, 0x05]);
//!
//! let mut input = CompactDataInput::new(&bytes[..]);
//! assert_eq!(input.read_var_int().unwrap(), 16384);
//! assert!(input.read_packed_boolean().unwrap());
//! assert!(!input.read_packed_boolean().unwrap());
//! assert!(input.read_packed_boolean().unwrap());
//! input.finish_packed_boolean();
//! ```

pub mod cursor;
pub mod error;
pub mod input;
pub mod mutf8;
pub mod output;
pub mod packed;
pub mod varint;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{DecodeError, Result};
pub use input::{CompactDataInput, DecodeOptions};
pub use output::CompactDataOutput;
pub use packed::{PackedBooleanDecoder, PackedBooleanEncoder};
pub use varint::{OverflowPolicy, VarIntError};
