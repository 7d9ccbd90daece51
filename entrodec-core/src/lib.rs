//! Shared plumbing for the entrodec entropy coders.
//!
//! This crate provides the bit-level input abstraction consumed by the
//! CABAC and AV1 symbol decoders, a concrete slice-backed reader/writer
//! pair, and the shared error type. Nothing in here knows about any
//! particular codec.

pub mod bitstream;
pub mod error;

pub use bitstream::{BitReader, BitSource, BitWriter};
pub use error::{Error, Result};
