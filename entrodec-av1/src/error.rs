//! AV1 decoder error types.

use thiserror::Error;

/// Errors raised by the AV1 symbol decoder.
#[derive(Error, Debug)]
pub enum Av1Error {
    /// The underlying bit source failed (truncated stream).
    #[error(transparent)]
    Bitstream(#[from] entrodec_core::Error),

    /// A caller-supplied CDF is not decodable (too short, or its last
    /// probability entry is not 1 << 15).
    #[error("invalid CDF: {0}")]
    InvalidCdf(&'static str),
}

/// Result type alias for AV1 symbol decoding.
pub type Result<T> = std::result::Result<T, Av1Error>;
