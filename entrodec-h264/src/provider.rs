//! The macroblock provider interface.
//!
//! Context selection for most CABAC syntax elements looks at the two
//! neighboring macroblocks A (left) and B (top), their partitions, or
//! individual transform blocks. Deriving those neighbors (H.264 clauses
//! 6.4.9 and 6.4.11.x) and computing prediction modes (7.4.5.x) is the
//! business of the surrounding slice parser, not the entropy decoder;
//! the decoder consumes them through [`MacroblockProvider`].
//!
//! Descriptors are read-only to the decoder. The provider must return
//! the macroblock currently being parsed as present even while its
//! syntax elements are still being filled in; default field values are
//! acceptable there.

/// Exact macroblock type tag, as far as context derivation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MbTypeClass {
    BDirect16x16,
    BSkip,
    P8x8,
    B8x8,
    PSkip,
    IPcm,
    Si,
    INxN,
    #[default]
    Other,
}

impl MbTypeClass {
    /// True for the skip tags of either predictive slice kind.
    pub fn is_skip(self) -> bool {
        matches!(self, MbTypeClass::PSkip | MbTypeClass::BSkip)
    }

    /// True for the tags that carry no ref_idx/mvd of their own.
    pub fn is_skip_or_direct(self) -> bool {
        matches!(
            self,
            MbTypeClass::PSkip | MbTypeClass::BSkip | MbTypeClass::BDirect16x16
        )
    }
}

/// How a macroblock is predicted, as far as context derivation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredictionCoding {
    Intra,
    Inter,
    Pcm,
    #[default]
    Other,
}

/// MBAFF coding state of a macroblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MbaffCoding {
    Frame,
    Field,
    /// The stream is not MBAFF-coded.
    #[default]
    Neither,
}

/// Prediction mode of one macroblock partition or sub-partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartPredMode {
    PredL0,
    PredL1,
    BiPred,
    Direct,
    Intra,
    None,
}

impl PartPredMode {
    /// Does this mode reference the given list (0 or 1)?
    pub fn uses_list(self, list: usize) -> bool {
        match self {
            PartPredMode::PredL0 => list == 0,
            PartPredMode::PredL1 => list == 1,
            PartPredMode::BiPred => true,
            PartPredMode::Direct | PartPredMode::Intra | PartPredMode::None => false,
        }
    }
}

/// A parsed (or partially parsed) macroblock descriptor.
///
/// Only the attributes the context derivations consume. Providers fill
/// what they have; `Default` gives the neutral values H.264 assigns to
/// data that is not (yet) present.
#[derive(Debug, Clone)]
pub struct Macroblock {
    /// Macroblock address in decoding order.
    pub addr: i32,
    pub mb_type: MbTypeClass,
    pub prediction: PredictionCoding,
    pub mbaff: MbaffCoding,
    /// True when the slice is MBAFF-coded at all.
    pub mbaff_frame_flag: bool,
    pub transform_size_8x8: bool,
    pub skip: bool,
    /// Coded block pattern; luma is `cbp % 16`, chroma is `cbp / 16`.
    pub coded_block_pattern: u8,
    pub mb_qp_delta: i32,
    pub intra_chroma_pred_mode: u8,
    /// Sub-macroblock type per 8x8 partition.
    pub sub_mb_type: [u8; 4],
    /// Reference indices, `[list][partition]`.
    pub ref_idx: [[u8; 16]; 2],
    /// Motion vector differences, `[list][mb_part][sub_mb_part][comp]`.
    pub mvd: [[[[i16; 2]; 4]; 4]; 2],
    /// coded_block_flag state, `[plane][block]`; index 16 is the DC
    /// block of the plane.
    pub coded_block_flag: [[bool; 17]; 3],
}

impl Default for Macroblock {
    fn default() -> Self {
        Self {
            addr: -1,
            mb_type: MbTypeClass::Other,
            prediction: PredictionCoding::Other,
            mbaff: MbaffCoding::Neither,
            mbaff_frame_flag: false,
            transform_size_8x8: false,
            skip: false,
            coded_block_pattern: 0,
            mb_qp_delta: 0,
            intra_chroma_pred_mode: 0,
            sub_mb_type: [0; 4],
            ref_idx: [[0; 16]; 2],
            mvd: [[[[0; 2]; 4]; 4]; 2],
            coded_block_flag: [[false; 17]; 3],
        }
    }
}

impl Macroblock {
    pub fn is_intra(&self) -> bool {
        matches!(
            self.prediction,
            PredictionCoding::Intra | PredictionCoding::Pcm
        )
    }

    pub fn cbp_luma(&self) -> u8 {
        if self.mb_type == MbTypeClass::IPcm {
            0xF
        } else {
            self.coded_block_pattern % 16
        }
    }

    pub fn cbp_chroma(&self) -> u8 {
        if self.mb_type == MbTypeClass::IPcm {
            2
        } else {
            self.coded_block_pattern / 16
        }
    }

    /// Is this a field macroblock of an MBAFF pair?
    pub fn is_field(&self) -> bool {
        self.mbaff == MbaffCoding::Field
    }
}

/// A neighboring partition, as derived for ref_idx and mvd contexts.
#[derive(Debug, Clone, Copy)]
pub struct PartitionNeighbor<'a> {
    /// The neighbor macroblock; `None` when unavailable.
    pub mb: Option<&'a Macroblock>,
    pub mb_part_idx: u8,
    pub sub_mb_part_idx: u8,
}

impl PartitionNeighbor<'_> {
    pub const UNAVAILABLE: PartitionNeighbor<'static> = PartitionNeighbor {
        mb: None,
        mb_part_idx: 0,
        sub_mb_part_idx: 0,
    };
}

/// A neighboring transform block, as derived for coded_block_flag and
/// coded_block_pattern contexts.
#[derive(Debug, Clone, Copy)]
pub struct BlockNeighbor<'a> {
    /// The macroblock holding the neighbor block; `None` when
    /// unavailable.
    pub mb: Option<&'a Macroblock>,
    /// Block index within that macroblock, in the granularity of the
    /// derivation that produced it.
    pub blk_idx: u8,
}

impl BlockNeighbor<'_> {
    pub const UNAVAILABLE: BlockNeighbor<'static> = BlockNeighbor {
        mb: None,
        blk_idx: 0,
    };
}

/// The slice parser's view of macroblock state, as consumed by the
/// CABAC decoder.
///
/// All methods take the address of the macroblock the derivation is
/// relative to; implementations own MBAFF pair addressing.
pub trait MacroblockProvider {
    /// Look up a macroblock by address. Must return the macroblock
    /// currently being parsed, even if incomplete.
    fn try_get_macroblock(&self, addr: i32) -> Option<&Macroblock>;

    /// Neighbors A (left) and B (top) of the given macroblock.
    fn derive_neighbors(&self, addr: i32) -> (Option<&Macroblock>, Option<&Macroblock>);

    /// Neighboring partitions A, B, C, D of the current partition.
    #[allow(clippy::type_complexity)]
    fn derive_neighbor_partitions(
        &self,
        mb_part_idx: u8,
        curr_sub_mb_type: u8,
        sub_mb_part_idx: u8,
    ) -> (
        PartitionNeighbor<'_>,
        PartitionNeighbor<'_>,
        PartitionNeighbor<'_>,
        PartitionNeighbor<'_>,
    );

    /// Neighboring 4x4 luma blocks A and B of the given block.
    fn derive_neighbor_4x4_luma(
        &self,
        addr: i32,
        blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>);

    /// Neighboring 4x4 chroma blocks A and B of the given block.
    fn derive_neighbor_4x4_chroma(
        &self,
        addr: i32,
        blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>);

    /// Neighboring 8x8 luma blocks A and B of the given block.
    fn derive_neighbor_8x8_luma(
        &self,
        addr: i32,
        blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>);

    /// 8x8 neighbor derivation for the Cb plane when ChromaArrayType
    /// is 3 (the chroma planes share luma geometry).
    fn derive_neighbor_8x8_luma_chroma_array_type3(
        &self,
        addr: i32,
        blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>);

    /// 8x8 neighbor derivation for the Cr plane when ChromaArrayType
    /// is 3.
    fn derive_neighbor_8x8_chroma_array_type3(
        &self,
        addr: i32,
        blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>);

    /// Prediction mode of one partition of a macroblock.
    fn mb_part_pred_mode(&self, mb: &Macroblock, mb_part_idx: u8) -> PartPredMode;

    /// Prediction mode implied by a sub-macroblock type.
    fn sub_mb_pred_mode(&self, addr: i32, sub_mb_type: u8) -> PartPredMode;

    /// Address of the macroblock currently being parsed.
    fn curr_mb_addr(&self) -> i32;

    /// cabac_init_idc of the active slice header (0, 1 or 2).
    fn cabac_init_idc(&self) -> u8;

    /// constrained_intra_pred_flag of the active PPS.
    fn constrained_intra_pred(&self) -> bool;

    /// NAL unit type of the slice being parsed.
    fn nal_unit_type(&self) -> u8;
}
