//! CABAC decode throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use entrodec_core::{BitReader, BitSource};
use entrodec_h264::{
    BlockNeighbor, CabacDecoder, Macroblock, MacroblockProvider, PartPredMode, PartitionNeighbor,
    SliceType,
};

struct BenchProvider {
    curr: Macroblock,
}

impl Default for BenchProvider {
    fn default() -> Self {
        Self {
            curr: Macroblock {
                addr: 0,
                ..Macroblock::default()
            },
        }
    }
}

impl MacroblockProvider for BenchProvider {
    fn try_get_macroblock(&self, addr: i32) -> Option<&Macroblock> {
        (addr == 0).then_some(&self.curr)
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

fn stream(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 151 + 43) as u8).collect()
}

fn bench_decision_bins(c: &mut Criterion) {
    let data = stream(64 * 1024);
    let mut group = c.benchmark_group("cabac");
    group.throughput(Throughput::Elements(10_000));

    group.bench_function("decision_bins", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(&data);
            let mut offset = 0u16;
            for _ in 0..9 {
                offset = (offset << 1) | (reader.read_bit().unwrap() as u16);
            }
            let mut decoder =
                CabacDecoder::new(SliceType::I, 26, BenchProvider::default(), offset, reader);
            let mut acc = 0u32;
            for _ in 0..10_000 {
                acc += decoder.decode_prev_intra_pred_mode_flag().unwrap() as u32;
            }
            black_box(acc)
        })
    });

    group.bench_function("bypass_bins", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(&data);
            let mut offset = 0u16;
            for _ in 0..9 {
                offset = (offset << 1) | (reader.read_bit().unwrap() as u16);
            }
            let mut decoder =
                CabacDecoder::new(SliceType::I, 26, BenchProvider::default(), offset, reader);
            let mut acc = 0u32;
            for _ in 0..10_000 {
                acc += decoder.decode_coeff_sign_flag().unwrap() as u32;
            }
            black_box(acc)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_decision_bins);
criterion_main!(benches);
