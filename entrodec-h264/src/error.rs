//! CABAC decoder error types.

use thiserror::Error;

use crate::SliceType;

/// Errors raised while decoding CABAC syntax elements.
///
/// Every error leaves the decoder in an undefined state; callers must
/// discard it. Bit source failures surface unchanged.
#[derive(Error, Debug)]
pub enum CabacError {
    /// The underlying bit source failed (truncated stream).
    #[error(transparent)]
    Bitstream(#[from] entrodec_core::Error),

    /// A binarization exceeded its bin cap; the stream cannot have been
    /// produced by a conforming encoder.
    #[error("malformed stream: {element} exceeded {limit} bins")]
    MalformedStream {
        element: &'static str,
        limit: u32,
    },

    /// The provider has no macroblock at an address that must exist
    /// (the macroblock currently being parsed). This is a logic error
    /// in the caller, not a stream error.
    #[error("macroblock at address {addr} missing from provider")]
    MissingNeighbor { addr: i32 },

    /// The requested element is not defined for the decoder's slice
    /// type.
    #[error("{element} is not decodable in {slice_type:?} slices")]
    InvalidSliceType {
        element: &'static str,
        slice_type: SliceType,
    },
}

/// Result type alias for CABAC decoding.
pub type CabacResult<T> = std::result::Result<T, CabacError>;
