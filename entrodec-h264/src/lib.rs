//! H.264 CABAC entropy decoder.
//!
//! Context-adaptive binary arithmetic decoding for H.264 slice data:
//! the 9-bit range/offset arithmetic engine, the 1024-model context
//! table with per-slice initialization, and the binarization routines
//! for every CABAC-coded syntax element. Neighbor-dependent context
//! selection is fed by an external [`MacroblockProvider`]; bits come
//! from any [`entrodec_core::BitSource`].
//!
//! # Example
//!
//! ```no_run
//! use entrodec_core::{BitReader, BitSource};
//! use entrodec_h264::{CabacDecoder, SliceType};
//! # use entrodec_h264::{BlockNeighbor, Macroblock, MacroblockProvider, PartPredMode,
//! #     PartitionNeighbor};
//! # struct NoNeighbors;
//! # impl MacroblockProvider for NoNeighbors {
//! #     fn try_get_macroblock(&self, _: i32) -> Option<&Macroblock> { None }
//! #     fn derive_neighbors(&self, _: i32) -> (Option<&Macroblock>, Option<&Macroblock>) {
//! #         (None, None)
//! #     }
//! #     fn derive_neighbor_partitions(&self, _: u8, _: u8, _: u8)
//! #         -> (PartitionNeighbor<'_>, PartitionNeighbor<'_>, PartitionNeighbor<'_>,
//! #             PartitionNeighbor<'_>)
//! #     {
//! #         (PartitionNeighbor::UNAVAILABLE, PartitionNeighbor::UNAVAILABLE,
//! #          PartitionNeighbor::UNAVAILABLE, PartitionNeighbor::UNAVAILABLE)
//! #     }
//! #     fn derive_neighbor_4x4_luma(&self, _: i32, _: u8)
//! #         -> (BlockNeighbor<'_>, BlockNeighbor<'_>)
//! #     { (BlockNeighbor::UNAVAILABLE, BlockNeighbor::UNAVAILABLE) }
//! #     fn derive_neighbor_4x4_chroma(&self, _: i32, _: u8)
//! #         -> (BlockNeighbor<'_>, BlockNeighbor<'_>)
//! #     { (BlockNeighbor::UNAVAILABLE, BlockNeighbor::UNAVAILABLE) }
//! #     fn derive_neighbor_8x8_luma(&self, _: i32, _: u8)
//! #         -> (BlockNeighbor<'_>, BlockNeighbor<'_>)
//! #     { (BlockNeighbor::UNAVAILABLE, BlockNeighbor::UNAVAILABLE) }
//! #     fn derive_neighbor_8x8_luma_chroma_array_type3(&self, _: i32, _: u8)
//! #         -> (BlockNeighbor<'_>, BlockNeighbor<'_>)
//! #     { (BlockNeighbor::UNAVAILABLE, BlockNeighbor::UNAVAILABLE) }
//! #     fn derive_neighbor_8x8_chroma_array_type3(&self, _: i32, _: u8)
//! #         -> (BlockNeighbor<'_>, BlockNeighbor<'_>)
//! #     { (BlockNeighbor::UNAVAILABLE, BlockNeighbor::UNAVAILABLE) }
//! #     fn mb_part_pred_mode(&self, _: &Macroblock, _: u8) -> PartPredMode {
//! #         PartPredMode::None
//! #     }
//! #     fn sub_mb_pred_mode(&self, _: i32, _: u8) -> PartPredMode { PartPredMode::None }
//! #     fn curr_mb_addr(&self) -> i32 { 0 }
//! #     fn cabac_init_idc(&self) -> u8 { 0 }
//! #     fn constrained_intra_pred(&self) -> bool { false }
//! #     fn nal_unit_type(&self) -> u8 { 1 }
//! # }
//! # fn provider() -> NoNeighbors { NoNeighbors }
//!
//! let data = [0u8; 16];
//! let mut reader = BitReader::new(&data);
//! // The 9 bits preceding the first element seed codIOffset.
//! let initial_offset = {
//!     let mut v = 0u16;
//!     for _ in 0..9 {
//!         v = (v << 1) | (reader.read_bit()? as u16);
//!     }
//!     v
//! };
//! let mut decoder = CabacDecoder::new(SliceType::I, 26, provider(), initial_offset, reader);
//! let mb_type = decoder.decode_mb_type()?;
//! # Ok::<(), entrodec_h264::CabacError>(())
//! ```

mod binarization;
mod context;
mod engine;
mod error;
mod mb_type;
mod provider;
mod residual;
pub mod tables;
#[cfg(test)]
mod test_support;

pub use binarization::CabacDecoder;
pub use context::{ContextModel, ContextTable, CONTEXT_COUNT};
pub use error::{CabacError, CabacResult};
pub use mb_type::DecodedMbType;
pub use provider::{
    BlockNeighbor, MacroblockProvider, Macroblock, MbTypeClass, MbaffCoding, PartPredMode,
    PartitionNeighbor, PredictionCoding,
};
pub use residual::{CodedBlockFlagOptions, ResidualBlockKind};

/// Slice type of the slice being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceType {
    /// P slice (predictive).
    P = 0,
    /// B slice (bidirectional).
    B = 1,
    /// I slice (intra).
    I = 2,
    /// SP slice (switching P).
    Sp = 3,
    /// SI slice (switching I).
    Si = 4,
}

impl SliceType {
    /// Create from the slice_type syntax element value.
    pub fn from_value(value: u32) -> Option<Self> {
        match value % 5 {
            0 => Some(Self::P),
            1 => Some(Self::B),
            2 => Some(Self::I),
            3 => Some(Self::Sp),
            4 => Some(Self::Si),
            _ => None,
        }
    }

    /// Check if all macroblocks in this slice type are intra.
    pub fn is_intra(&self) -> bool {
        matches!(self, Self::I | Self::Si)
    }

    /// Check if this slice type predicts from list 0 only.
    pub fn is_predictive(&self) -> bool {
        matches!(self, Self::P | Self::Sp)
    }

    /// Check if this slice type uses bidirectional prediction.
    pub fn is_bidirectional(&self) -> bool {
        matches!(self, Self::B)
    }
}
