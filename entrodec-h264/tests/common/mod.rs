//! Provider fixture shared by the integration tests.

use entrodec_h264::{
    BlockNeighbor, Macroblock, MacroblockProvider, PartPredMode, PartitionNeighbor,
};

/// A provider with one in-flight macroblock at address 0 and no
/// neighbors anywhere.
pub struct NoNeighbors {
    pub curr: Macroblock,
}

impl Default for NoNeighbors {
    fn default() -> Self {
        Self {
            curr: Macroblock {
                addr: 0,
                ..Macroblock::default()
            },
        }
    }
}

impl MacroblockProvider for NoNeighbors {
    fn try_get_macroblock(&self, addr: i32) -> Option<&Macroblock> {
        (addr == self.curr.addr).then_some(&self.curr)
    }

    fn derive_neighbors(&self, _addr: i32) -> (Option<&Macroblock>, Option<&Macroblock>) {
        (None, None)
    }

    fn derive_neighbor_partitions(
        &self,
        _mb_part_idx: u8,
        _curr_sub_mb_type: u8,
        _sub_mb_part_idx: u8,
    ) -> (
        PartitionNeighbor<'_>,
        PartitionNeighbor<'_>,
        PartitionNeighbor<'_>,
        PartitionNeighbor<'_>,
    ) {
        (
            PartitionNeighbor::UNAVAILABLE,
            PartitionNeighbor::UNAVAILABLE,
            PartitionNeighbor::UNAVAILABLE,
            PartitionNeighbor::UNAVAILABLE,
        )
    }

    fn derive_neighbor_4x4_luma(
        &self,
        _addr: i32,
        _blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>) {
        (BlockNeighbor::UNAVAILABLE, BlockNeighbor::UNAVAILABLE)
    }

    fn derive_neighbor_4x4_chroma(
        &self,
        _addr: i32,
        _blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>) {
        (BlockNeighbor::UNAVAILABLE, BlockNeighbor::UNAVAILABLE)
    }

    fn derive_neighbor_8x8_luma(
        &self,
        _addr: i32,
        _blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>) {
        (BlockNeighbor::UNAVAILABLE, BlockNeighbor::UNAVAILABLE)
    }

    fn derive_neighbor_8x8_luma_chroma_array_type3(
        &self,
        _addr: i32,
        _blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>) {
        (BlockNeighbor::UNAVAILABLE, BlockNeighbor::UNAVAILABLE)
    }

    fn derive_neighbor_8x8_chroma_array_type3(
        &self,
        _addr: i32,
        _blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>) {
        (BlockNeighbor::UNAVAILABLE, BlockNeighbor::UNAVAILABLE)
    }

    fn mb_part_pred_mode(&self, _mb: &Macroblock, _mb_part_idx: u8) -> PartPredMode {
        PartPredMode::PredL0
    }

    fn sub_mb_pred_mode(&self, _addr: i32, _sub_mb_type: u8) -> PartPredMode {
        PartPredMode::PredL0
    }

    fn curr_mb_addr(&self) -> i32 {
        0
    }

    fn cabac_init_idc(&self) -> u8 {
        0
    }

    fn constrained_intra_pred(&self) -> bool {
        false
    }

    fn nal_unit_type(&self) -> u8 {
        1
    }
}
