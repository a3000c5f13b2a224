// Decoder error taxonomy.
//
// Every failure is fatal to the decode call that hit it; there is no retry
// or local recovery anywhere in the crate.

use std::io;

use log::debug;

use crate::varint::VarIntError;

/// Crate-wide result alias for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A byte was required but the underlying source had none left.
    #[error("stream exhausted while reading {context}")]
    StreamExhausted { context: &'static str },

    /// Lower-level transport failure, propagated unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// VarInt does not fit the target width.
    #[error("varint overflow: value exceeds {bits} bits")]
    Overflow { bits: u32 },

    /// Bytes that do not form a valid value, e.g. malformed modified UTF-8.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A length prefix exceeds the configured limit.
    #[error("length {len} exceeds limit {max}")]
    LengthLimit { len: usize, max: usize },
}

impl DecodeError {
    /// Map a raw read error, folding EOF into `StreamExhausted`.
    pub(crate) fn from_read(e: io::Error, context: &'static str) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            debug!("stream exhausted while reading {context}");
            Self::StreamExhausted { context }
        } else {
            Self::Io(e)
        }
    }

    /// True for `StreamExhausted`.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::StreamExhausted { .. })
    }
}

impl From<VarIntError> for DecodeError {
    fn from(e: VarIntError) -> Self {
        match e {
            VarIntError::Underflow => Self::StreamExhausted { context: "varint" },
            VarIntError::Overflow { bits } => Self::Overflow { bits },
        }
    }
}

impl From<DecodeError> for io::Error {
    fn from(e: DecodeError) -> io::Error {
        match e {
            DecodeError::Io(inner) => inner,
            DecodeError::StreamExhausted { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
