//! Error types for prism-common.

use thiserror::Error;

/// Common error type for binary reading.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at offset {position}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        position: usize,
        needed: usize,
        available: usize,
    },

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Missing null terminator in string.
    #[error("string missing null terminator at offset {0}")]
    MissingNullTerminator(usize),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
