//! Error types shared by the entrodec crates.

use thiserror::Error;

/// Errors raised by the bit-level input layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The bit source ran out of data mid-read.
    ///
    /// Entropy decoders consume bits one at a time during
    /// renormalization; hitting the end of the stream there means the
    /// stream is truncated (or the caller sized it wrong). There is no
    /// retry at this layer.
    #[error("bitstream exhausted")]
    BitstreamExhausted,

    /// A caller-supplied parameter was out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
