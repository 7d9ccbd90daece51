//! Shared fixtures for the unit tests: a configurable in-memory
//! macroblock provider and decoder constructors over leaked byte
//! buffers.

use entrodec_core::{BitReader, BitSource, BitWriter};

use crate::binarization::CabacDecoder;
use crate::provider::{
    BlockNeighbor, Macroblock, MacroblockProvider, PartPredMode, PartitionNeighbor,
};
use crate::SliceType;

/// A provider over one current macroblock (address 0) and optional
/// left/top neighbors, with real 8x8 luma block geometry for the CBP
/// derivations.
pub(crate) struct MockProvider {
    pub curr: Macroblock,
    pub left: Option<Macroblock>,
    pub top: Option<Macroblock>,
    pub pred_mode: PartPredMode,
    pub cabac_init_idc: u8,
    pub constrained_intra_pred: bool,
    pub nal_unit_type: u8,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            curr: Macroblock {
                addr: 0,
                ..Macroblock::default()
            },
            left: None,
            top: None,
            pred_mode: PartPredMode::PredL0,
            cabac_init_idc: 0,
            constrained_intra_pred: false,
            nal_unit_type: 1,
        }
    }
}

impl MockProvider {
    fn ext<'a>(mb: Option<&'a Macroblock>, blk_idx: u8) -> BlockNeighbor<'a> {
        BlockNeighbor { mb, blk_idx }
    }

    fn cur(&self, blk_idx: u8) -> BlockNeighbor<'_> {
        BlockNeighbor {
            mb: Some(&self.curr),
            blk_idx,
        }
    }

    fn part<'a>(mb: Option<&'a Macroblock>) -> PartitionNeighbor<'a> {
        match mb {
            Some(mb) => PartitionNeighbor {
                mb: Some(mb),
                mb_part_idx: 0,
                sub_mb_part_idx: 0,
            },
            None => PartitionNeighbor::UNAVAILABLE,
        }
    }
}

impl MacroblockProvider for MockProvider {
    fn try_get_macroblock(&self, addr: i32) -> Option<&Macroblock> {
        if self.curr.addr == addr {
            Some(&self.curr)
        } else if self.left.as_ref().is_some_and(|mb| mb.addr == addr) {
            self.left.as_ref()
        } else if self.top.as_ref().is_some_and(|mb| mb.addr == addr) {
            self.top.as_ref()
        } else {
            None
        }
    }

    fn derive_neighbors(&self, _addr: i32) -> (Option<&Macroblock>, Option<&Macroblock>) {
        (self.left.as_ref(), self.top.as_ref())
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
            Self::part(self.left.as_ref()),
            Self::part(self.top.as_ref()),
            PartitionNeighbor::UNAVAILABLE,
            PartitionNeighbor::UNAVAILABLE,
        )
    }

    fn derive_neighbor_4x4_luma(
        &self,
        _addr: i32,
        blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>) {
        (
            Self::ext(self.left.as_ref(), blk_idx),
            Self::ext(self.top.as_ref(), blk_idx),
        )
    }

    fn derive_neighbor_4x4_chroma(
        &self,
        addr: i32,
        blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>) {
        self.derive_neighbor_4x4_luma(addr, blk_idx)
    }

    fn derive_neighbor_8x8_luma(
        &self,
        _addr: i32,
        blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>) {
        // 2x2 block geometry: A is the block to the left, B the block
        // above, crossing into the left/top macroblocks at the edges.
        match blk_idx {
            0 => (Self::ext(self.left.as_ref(), 1), Self::ext(self.top.as_ref(), 2)),
            1 => (self.cur(0), Self::ext(self.top.as_ref(), 3)),
            2 => (Self::ext(self.left.as_ref(), 3), self.cur(0)),
            _ => (self.cur(2), self.cur(1)),
        }
    }

    fn derive_neighbor_8x8_luma_chroma_array_type3(
        &self,
        addr: i32,
        blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>) {
        self.derive_neighbor_8x8_luma(addr, blk_idx)
    }

    fn derive_neighbor_8x8_chroma_array_type3(
        &self,
        addr: i32,
        blk_idx: u8,
    ) -> (BlockNeighbor<'_>, BlockNeighbor<'_>) {
        self.derive_neighbor_8x8_luma(addr, blk_idx)
    }

    fn mb_part_pred_mode(&self, _mb: &Macroblock, _mb_part_idx: u8) -> PartPredMode {
        self.pred_mode
    }

    fn sub_mb_pred_mode(&self, _addr: i32, _sub_mb_type: u8) -> PartPredMode {
        self.pred_mode
    }

    fn curr_mb_addr(&self) -> i32 {
        0
    }

    fn cabac_init_idc(&self) -> u8 {
        self.cabac_init_idc
    }

    fn constrained_intra_pred(&self) -> bool {
        self.constrained_intra_pred
    }

    fn nal_unit_type(&self) -> u8 {
        self.nal_unit_type
    }
}

fn leak(bytes: &[u8]) -> &'static [u8] {
    Box::leak(bytes.to_vec().into_boxed_slice())
}

/// Decoder over the given stream with codIOffset 0 and QP 26.
pub(crate) fn decoder_with_stream(
    slice_type: SliceType,
    provider: MockProvider,
    bytes: &[u8],
) -> CabacDecoder<BitReader<'static>, MockProvider> {
    CabacDecoder::new(slice_type, 26, provider, 0, BitReader::new(leak(bytes)))
}

/// Decoder over the given stream with an explicit initial codIOffset.
pub(crate) fn decoder_with_offset(
    slice_type: SliceType,
    provider: MockProvider,
    initial_offset: u16,
    bytes: &[u8],
) -> CabacDecoder<BitReader<'static>, MockProvider> {
    CabacDecoder::new(
        slice_type,
        26,
        provider,
        initial_offset,
        BitReader::new(leak(bytes)),
    )
}

/// A decoder whose bypass bins reproduce `bins` exactly.
///
/// With codIRange forced to 512 the bypass primitive is a 9-bit delay
/// line: each decoded bin is the bit shifted out of the top of
/// codIOffset. Seeding the offset with the first 9 stream bits makes
/// the bin sequence equal the stream bit sequence.
pub(crate) fn bypass_decoder(bins: &[bool]) -> CabacDecoder<BitReader<'static>, MockProvider> {
    let mut writer = BitWriter::new();
    for &bin in bins {
        writer.write_bit(bin);
    }
    // Padding drains the delay line past the last meaningful bin.
    for _ in 0..16 {
        writer.write_bit(false);
    }
    writer.align_to_byte();

    let data = leak(writer.data());
    let mut reader = BitReader::new(data);
    let mut offset = 0u16;
    for _ in 0..9 {
        offset = (offset << 1) | (reader.read_bit().unwrap() as u16);
    }

    let mut decoder = CabacDecoder::new(SliceType::I, 26, MockProvider::default(), offset, reader);
    decoder.force_registers(512, offset);
    decoder
}
