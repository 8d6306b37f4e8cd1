// Error types for the TRC reader

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrcError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("FormatError: descriptor marker not found in the first {0} bytes")]
    MarkerNotFound(usize),

    #[error("FormatError: invalid byte-order flag {0}")]
    InvalidByteOrder(u16),

    #[error("FormatError: buffer truncated: need {needed} bytes, got {available}")]
    BufferTruncated { needed: usize, available: usize },

    #[error("FormatError: unsupported sample width (COMM_TYPE = {0})")]
    UnsupportedSampleWidth(u16),

    #[error("FormatError: array length mismatch: {0}")]
    ArrayLengthMismatch(String),

    #[error("FormatError: invalid trigger timestamp: {0}")]
    InvalidTriggerTimestamp(String),
}

impl TrcError {
    /// True for every variant raised by the decoder itself (i.e. not I/O).
    pub fn is_format_error(&self) -> bool {
        !matches!(self, TrcError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, TrcError>;
