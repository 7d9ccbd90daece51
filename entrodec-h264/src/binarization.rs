//! The CABAC decoder and its binarization schemes.
//!
//! Each syntax element is a short program over the three engine
//! primitives: pick a context index (often from neighbor state),
//! request bins, assemble the value. The generic schemes live here
//! (unary, truncated unary, UEGk, fixed-length) together with the
//! non-residual elements; the mb_type trees and the residual elements
//! are in their own modules.

use std::ops::Index;

use entrodec_core::BitSource;

use crate::context::{ContextModel, ContextTable};
use crate::engine::ArithState;
use crate::error::{CabacError, CabacResult};
use crate::provider::{
    BlockNeighbor, Macroblock, MacroblockProvider, MbTypeClass, PartitionNeighbor,
};
use crate::residual::ResidualBlockKind;
use crate::tables;
use crate::SliceType;

/// Hard cap on unary binarizations without an explicit cMax.
pub(crate) const UNARY_BIN_CAP: u32 = 24;

/// The H.264 CABAC decoder for one slice.
///
/// Owns the arithmetic registers, the 1024-entry context table, the bit
/// source and the macroblock provider. Not safe for concurrent use; a
/// decoder is discarded after any error. No decode path allocates.
pub struct CabacDecoder<R, P> {
    pub(crate) slice_type: SliceType,
    pub(crate) arith: ArithState,
    pub(crate) contexts: ContextTable,
    pub(crate) reader: R,
    pub(crate) provider: P,

    // Per-element setup state, adjusted by the caller before the
    // operations that need it.
    /// Macroblock partition being parsed (mvd, ref_idx).
    pub mb_part_idx: u8,
    /// Sub-partition being parsed (mvd).
    pub sub_mb_part_idx: u8,
    /// Which residual transform block is being parsed.
    pub residual_block_kind: ResidualBlockKind,
    /// Scan position within the residual block (significance flags).
    pub level_list_idx: u8,
    /// NumC8x8 of the chroma DC block being parsed.
    pub num_c8x8: u8,
    /// Coefficients greater than one decoded so far in this block.
    pub num_decod_abs_level_gt1: u8,
    /// Coefficients equal to one decoded so far in this block.
    pub num_decod_abs_level_eq1: u8,
}

impl<R: BitSource, P: MacroblockProvider> CabacDecoder<R, P> {
    /// Create a decoder for one slice.
    ///
    /// `initial_offset` is the value of the 9 raw bits the caller read
    /// from the source immediately before the first coded element;
    /// `slice_qp` is SliceQPy. Context initialization is a pure
    /// function of the slice type, QP and the provider's
    /// cabac_init_idc.
    pub fn new(
        slice_type: SliceType,
        slice_qp: i32,
        provider: P,
        initial_offset: u16,
        reader: R,
    ) -> Self {
        let cabac_init_idc = provider.cabac_init_idc();
        let contexts = ContextTable::new(slice_type, slice_qp, cabac_init_idc);
        tracing::debug!(
            ?slice_type,
            slice_qp,
            cabac_init_idc,
            initial_offset,
            "initialized CABAC decoder"
        );

        Self {
            slice_type,
            arith: ArithState::new(initial_offset),
            contexts,
            reader,
            provider,
            mb_part_idx: 0,
            sub_mb_part_idx: 0,
            residual_block_kind: ResidualBlockKind::LumaDc,
            level_list_idx: 0,
            num_c8x8: 1,
            num_decod_abs_level_gt1: 0,
            num_decod_abs_level_eq1: 0,
        }
    }

    /// Slice type this decoder was built for.
    pub fn slice_type(&self) -> SliceType {
        self.slice_type
    }

    /// The macroblock provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Mutable access to the macroblock provider, for callers that own
    /// their parse state through it.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Current codIRange register value.
    pub fn cod_i_range(&self) -> u16 {
        self.arith.range()
    }

    /// Current codIOffset register value.
    pub fn cod_i_offset(&self) -> u16 {
        self.arith.offset()
    }

    /// Mutable access to a raw context model.
    ///
    /// Exists for conformance testing; production callers never touch
    /// context state directly.
    pub fn context_mut(&mut self, ctx_idx: usize) -> &mut ContextModel {
        self.contexts.get_mut(ctx_idx)
    }

    #[cfg(test)]
    pub(crate) fn force_registers(&mut self, range: u16, offset: u16) {
        self.arith.force_registers(range, offset);
    }

    // ------------------------------------------------------------------
    // Engine primitives
    // ------------------------------------------------------------------

    pub(crate) fn decision(&mut self, ctx_idx: usize) -> CabacResult<bool> {
        let bin = self
            .arith
            .decision(self.contexts.get_mut(ctx_idx), &mut self.reader)?;
        Ok(bin)
    }

    pub(crate) fn bypass(&mut self) -> CabacResult<bool> {
        Ok(self.arith.bypass(&mut self.reader)?)
    }

    pub(crate) fn terminate(&mut self) -> CabacResult<bool> {
        Ok(self.arith.terminate(&mut self.reader)?)
    }

    // ------------------------------------------------------------------
    // Generic binarization schemes
    // ------------------------------------------------------------------

    /// Unary: count 1-bins until a 0-bin. The context for bin i is
    /// `ctxs[min(i, ctxs.len() - 1)]`. Streams that never terminate
    /// within [`UNARY_BIN_CAP`] bins are malformed.
    pub(crate) fn unary(&mut self, ctxs: &[usize], element: &'static str) -> CabacResult<u32> {
        for i in 0..UNARY_BIN_CAP {
            let ctx = ctxs[(i as usize).min(ctxs.len() - 1)];
            if !self.decision(ctx)? {
                return Ok(i);
            }
        }
        Err(CabacError::MalformedStream {
            element,
            limit: UNARY_BIN_CAP,
        })
    }

    /// Truncated unary: unary, but a run of `c_max` 1-bins means
    /// `c_max` with no terminating 0-bin.
    pub(crate) fn truncated_unary(&mut self, ctxs: &[usize], c_max: u32) -> CabacResult<u32> {
        for i in 0..c_max {
            let ctx = ctxs[(i as usize).min(ctxs.len() - 1)];
            if !self.decision(ctx)? {
                return Ok(i);
            }
        }
        Ok(c_max)
    }

    /// Exp-Golomb order-k suffix, decoded entirely in bypass.
    pub(crate) fn exp_golomb_bypass(&mut self, mut k: u32, element: &'static str) -> CabacResult<u32> {
        let mut value: u32 = 0;
        while self.bypass()? {
            value += 1 << k;
            k += 1;
            if k > 31 {
                return Err(CabacError::MalformedStream { element, limit: 32 });
            }
        }
        while k > 0 {
            k -= 1;
            value += (self.bypass()? as u32) << k;
        }
        Ok(value)
    }

    /// UEGk: truncated unary prefix with contexts, Exp-Golomb-k bypass
    /// suffix once the prefix saturates at `u_coff`, optional bypass
    /// sign bit.
    pub(crate) fn ueg(
        &mut self,
        ctxs: &[usize],
        k: u32,
        signed: bool,
        u_coff: u32,
        element: &'static str,
    ) -> CabacResult<i32> {
        let prefix = self.truncated_unary(ctxs, u_coff)?;
        let mut value = prefix;
        if prefix >= u_coff {
            value += self.exp_golomb_bypass(k, element)?;
        }

        if signed && value != 0 && self.bypass()? {
            Ok(-(value as i32))
        } else {
            Ok(value as i32)
        }
    }

    // ------------------------------------------------------------------
    // Shared lookups
    // ------------------------------------------------------------------

    /// The macroblock currently being parsed. The provider contract
    /// requires it to exist; absence is a caller logic error.
    pub(crate) fn current_mb(&self) -> CabacResult<&Macroblock> {
        let addr = self.provider.curr_mb_addr();
        self.provider
            .try_get_macroblock(addr)
            .ok_or(CabacError::MissingNeighbor { addr })
    }

    // ------------------------------------------------------------------
    // Syntax elements
    // ------------------------------------------------------------------

    /// Decode mb_skip_flag (P/SP and B slices only).
    pub fn decode_mb_skip_flag(&mut self) -> CabacResult<bool> {
        let offset = if self.slice_type.is_predictive() {
            tables::CTX_MB_SKIP_FLAG_P
        } else if self.slice_type.is_bidirectional() {
            tables::CTX_MB_SKIP_FLAG_B
        } else {
            return Err(CabacError::InvalidSliceType {
                element: "mb_skip_flag",
                slice_type: self.slice_type,
            });
        };

        let addr = self.provider.curr_mb_addr();
        let (a, b) = self.provider.derive_neighbors(addr);
        let cond = |n: Option<&Macroblock>| usize::from(n.is_some_and(|mb| !mb.skip));
        let inc = cond(a) + cond(b);
        self.decision(offset + inc)
    }

    /// Decode mb_field_decoding_flag (MBAFF streams).
    pub fn decode_mb_field_decoding_flag(&mut self) -> CabacResult<bool> {
        let addr = self.provider.curr_mb_addr();
        let (a, b) = self.provider.derive_neighbors(addr);
        let cond = |n: Option<&Macroblock>| usize::from(n.is_some_and(|mb| mb.is_field()));
        let inc = cond(a) + cond(b);
        self.decision(tables::CTX_MB_FIELD_DECODING_FLAG + inc)
    }

    /// Decode transform_size_8x8_flag.
    pub fn decode_transform_size_8x8_flag(&mut self) -> CabacResult<bool> {
        let addr = self.provider.curr_mb_addr();
        let (a, b) = self.provider.derive_neighbors(addr);
        let cond = |n: Option<&Macroblock>| usize::from(n.is_some_and(|mb| mb.transform_size_8x8));
        let inc = cond(a) + cond(b);
        self.decision(tables::CTX_TRANSFORM_SIZE_8X8_FLAG + inc)
    }

    /// Decode mb_qp_delta.
    pub fn decode_mb_qp_delta(&mut self) -> CabacResult<i32> {
        // Bin 0 conditions on the previous macroblock in decoding
        // order having sent a non-zero delta of its own.
        let prev = self
            .provider
            .try_get_macroblock(self.provider.curr_mb_addr() - 1);
        let inc = usize::from(prev.is_some_and(|mb| {
            !mb.mb_type.is_skip() && mb.mb_type != MbTypeClass::IPcm && mb.mb_qp_delta != 0
        }));

        let ctxs = [
            tables::CTX_MB_QP_DELTA + inc,
            tables::CTX_MB_QP_DELTA + 2,
            tables::CTX_MB_QP_DELTA + 3,
        ];
        let u = self.unary(&ctxs, "mb_qp_delta")?;
        Ok(se_map(u))
    }

    /// Decode intra_chroma_pred_mode.
    pub fn decode_intra_chroma_pred_mode(&mut self) -> CabacResult<u8> {
        let addr = self.provider.curr_mb_addr();
        let (a, b) = self.provider.derive_neighbors(addr);
        let cond = |n: Option<&Macroblock>| {
            usize::from(n.is_some_and(|mb| {
                mb.is_intra() && mb.mb_type != MbTypeClass::IPcm && mb.intra_chroma_pred_mode != 0
            }))
        };
        let inc = cond(a) + cond(b);

        let ctxs = [
            tables::CTX_INTRA_CHROMA_PRED_MODE + inc,
            tables::CTX_INTRA_CHROMA_PRED_MODE + 3,
        ];
        Ok(self.truncated_unary(&ctxs, 3)? as u8)
    }

    /// Decode prev_intra4x4_pred_mode_flag / prev_intra8x8_pred_mode_flag.
    pub fn decode_prev_intra_pred_mode_flag(&mut self) -> CabacResult<bool> {
        self.decision(tables::CTX_PREV_INTRA_PRED_MODE_FLAG)
    }

    /// Decode rem_intra4x4_pred_mode / rem_intra8x8_pred_mode.
    ///
    /// Three fixed-length bins sharing one context, least significant
    /// bin first.
    pub fn decode_rem_intra_pred_mode(&mut self) -> CabacResult<u8> {
        let mut mode = 0u8;
        for bit in 0..3 {
            mode |= (self.decision(tables::CTX_REM_INTRA_PRED_MODE)? as u8) << bit;
        }
        Ok(mode)
    }

    /// Decode ref_idx_l0.
    pub fn decode_ref_idx_l0(&mut self) -> CabacResult<u8> {
        self.decode_ref_idx(0)
    }

    /// Decode ref_idx_l1.
    pub fn decode_ref_idx_l1(&mut self) -> CabacResult<u8> {
        self.decode_ref_idx(1)
    }

    /// Decode ref_idx_lX for the given list. Uses the `mb_part_idx`
    /// setup field.
    pub fn decode_ref_idx(&mut self, list: usize) -> CabacResult<u8> {
        if self.slice_type.is_intra() {
            return Err(CabacError::InvalidSliceType {
                element: "ref_idx",
                slice_type: self.slice_type,
            });
        }

        let curr = self.current_mb()?;
        let curr_field = curr.is_field();
        let curr_sub_mb_type = curr.sub_mb_type[usize::from(self.mb_part_idx.min(3))];

        let (pa, pb, _, _) = self.provider.derive_neighbor_partitions(
            self.mb_part_idx,
            curr_sub_mb_type,
            self.sub_mb_part_idx,
        );
        let inc = ref_idx_cond_term(&self.provider, pa, list, curr_field)
            + 2 * ref_idx_cond_term(&self.provider, pb, list, curr_field);

        let ctxs = [
            tables::CTX_REF_IDX + inc,
            tables::CTX_REF_IDX + 4,
            tables::CTX_REF_IDX + 5,
        ];
        Ok(self.unary(&ctxs, "ref_idx")? as u8)
    }

    /// Decode mvd_l0 for one vector component (0 horizontal, 1
    /// vertical).
    pub fn decode_mvd_l0(&mut self, comp: usize) -> CabacResult<i32> {
        self.decode_mvd(0, comp)
    }

    /// Decode mvd_l1 for one vector component.
    pub fn decode_mvd_l1(&mut self, comp: usize) -> CabacResult<i32> {
        self.decode_mvd(1, comp)
    }

    /// Decode mvd_lX. Uses the `mb_part_idx` and `sub_mb_part_idx`
    /// setup fields; the context bank is selected by component.
    pub fn decode_mvd(&mut self, list: usize, comp: usize) -> CabacResult<i32> {
        if self.slice_type.is_intra() {
            return Err(CabacError::InvalidSliceType {
                element: "mvd",
                slice_type: self.slice_type,
            });
        }
        let comp = comp & 1;
        let list = list & 1;

        let curr = self.current_mb()?;
        let curr_field = curr.is_field();
        let curr_sub_mb_type = curr.sub_mb_type[usize::from(self.mb_part_idx.min(3))];

        let (pa, pb, _, _) = self.provider.derive_neighbor_partitions(
            self.mb_part_idx,
            curr_sub_mb_type,
            self.sub_mb_part_idx,
        );
        let sum = mvd_neighbor_abs(pa, list, comp, curr_field)
            + mvd_neighbor_abs(pb, list, comp, curr_field);

        let inc = if sum <= 2 {
            0
        } else if sum <= 32 {
            1
        } else {
            2
        };

        let base = if comp == 0 {
            tables::CTX_MVD_HOR
        } else {
            tables::CTX_MVD_VER
        };
        let ctxs = [base + inc, base + 3, base + 4, base + 5, base + 6];
        self.ueg(&ctxs, 3, true, 9, "mvd")
    }

    /// Decode coded_block_pattern. The result packs luma in the low
    /// four bits and chroma as `16 * cbp_chroma`.
    pub fn decode_coded_block_pattern(&mut self, has_chroma: bool) -> CabacResult<u8> {
        let addr = self.provider.curr_mb_addr();

        // Luma prefix: one bin per 8x8 block. When a neighbor block
        // falls inside the current macroblock, the bins decoded so far
        // stand in for its CBP bits.
        let mut luma_bits = [false; 4];
        for i in 0..4u8 {
            let (a, b) = self.provider.derive_neighbor_8x8_luma(addr, i);
            let cond_a = cbp_luma_cond_term(a, &luma_bits, addr);
            let cond_b = cbp_luma_cond_term(b, &luma_bits, addr);
            let bin = self.decision(tables::CTX_CBP_LUMA + cond_a + 2 * cond_b)?;
            luma_bits[usize::from(i)] = bin;
        }
        let luma = luma_bits
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &bit)| acc | (u8::from(bit) << i));

        let mut chroma = 0u8;
        if has_chroma {
            let inc = {
                let (a, b) = self.provider.derive_neighbors(addr);
                let cond =
                    |n: Option<&Macroblock>| usize::from(n.is_some_and(|mb| mb.cbp_chroma() != 0));
                cond(a) + 2 * cond(b)
            };
            if self.decision(tables::CTX_CBP_CHROMA + inc)? {
                let inc2 = {
                    let (a, b) = self.provider.derive_neighbors(addr);
                    let cond2 = |n: Option<&Macroblock>| {
                        usize::from(n.is_some_and(|mb| mb.cbp_chroma() == 2))
                    };
                    cond2(a) + 2 * cond2(b)
                };
                chroma = if self.decision(tables::CTX_CBP_CHROMA + 4 + inc2)? {
                    2
                } else {
                    1
                };
            }
        }

        Ok(luma + 16 * chroma)
    }

    /// Decode end_of_slice_flag. True means the slice data is over and
    /// the engine stops advancing.
    pub fn decode_end_of_slice_flag(&mut self) -> CabacResult<bool> {
        self.terminate()
    }
}

impl<R, P> Index<usize> for CabacDecoder<R, P> {
    type Output = ContextModel;

    fn index(&self, ctx_idx: usize) -> &ContextModel {
        self.contexts.get(ctx_idx)
    }
}

/// The signed binarization map: 1 -> 1, 2 -> -1, 3 -> 2, 4 -> -2, ...
pub(crate) fn se_map(x: u32) -> i32 {
    if x & 1 != 0 {
        ((x + 1) >> 1) as i32
    } else {
        -((x >> 1) as i32)
    }
}

/// Inverse of [`se_map`].
#[cfg(test)]
pub(crate) fn se_unmap(v: i32) -> u32 {
    if v > 0 {
        (2 * v - 1) as u32
    } else {
        (-2 * v) as u32
    }
}

fn ref_idx_cond_term<P: MacroblockProvider>(
    provider: &P,
    n: PartitionNeighbor<'_>,
    list: usize,
    curr_field: bool,
) -> usize {
    let Some(mb) = n.mb else { return 0 };
    if mb.is_intra() || mb.mb_type.is_skip_or_direct() {
        return 0;
    }

    let mode = if matches!(mb.mb_type, MbTypeClass::P8x8 | MbTypeClass::B8x8) {
        provider.sub_mb_pred_mode(mb.addr, mb.sub_mb_type[usize::from(n.mb_part_idx.min(3))])
    } else {
        provider.mb_part_pred_mode(mb, n.mb_part_idx)
    };
    if !mode.uses_list(list) {
        return 0;
    }

    // A frame macroblock looking at a field neighbor compares against a
    // doubled threshold.
    let threshold = u8::from(!curr_field && mb.is_field());
    usize::from(mb.ref_idx[list][usize::from(n.mb_part_idx.min(15))] > threshold)
}

fn mvd_neighbor_abs(n: PartitionNeighbor<'_>, list: usize, comp: usize, curr_field: bool) -> u32 {
    let Some(mb) = n.mb else { return 0 };
    if mb.is_intra() || mb.mb_type.is_skip_or_direct() {
        return 0;
    }

    let part = usize::from(n.mb_part_idx.min(3));
    let sub = usize::from(n.sub_mb_part_idx.min(3));
    let mut abs = u32::from(mb.mvd[list][part][sub][comp].unsigned_abs());

    // Vertical components scale across MBAFF frame/field boundaries.
    if comp == 1 {
        if curr_field && !mb.is_field() {
            abs /= 2;
        } else if !curr_field && mb.is_field() {
            abs *= 2;
        }
    }
    abs
}

fn cbp_luma_cond_term(n: BlockNeighbor<'_>, luma_bits: &[bool; 4], curr_addr: i32) -> usize {
    match n.mb {
        None => 0,
        Some(mb) if mb.addr == curr_addr => {
            usize::from(!luma_bits[usize::from(n.blk_idx.min(3))])
        }
        Some(mb) => usize::from((mb.cbp_luma() >> n.blk_idx.min(3)) & 1 == 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bypass_decoder, decoder_with_stream, MockProvider};

    #[test]
    fn se_map_roundtrip() {
        for x in 0..1000u32 {
            assert_eq!(se_unmap(se_map(x)), x);
        }
        for v in -500i32..=500 {
            assert_eq!(se_map(se_unmap(v)), v);
        }
    }

    #[test]
    fn se_map_small_values() {
        assert_eq!(se_map(0), 0);
        assert_eq!(se_map(1), 1);
        assert_eq!(se_map(2), -1);
        assert_eq!(se_map(3), 2);
        assert_eq!(se_map(4), -2);
    }

    fn encode_exp_golomb_k(value: u32, k: u32) -> Vec<bool> {
        // Inverse of exp_golomb_bypass: a run of 1s growing the order,
        // a 0 stop bit, then the k remainder bits MSB-first.
        let mut bins = Vec::new();
        let mut value = value;
        let mut k = k;
        while value >= (1 << k) {
            bins.push(true);
            value -= 1 << k;
            k += 1;
        }
        bins.push(false);
        for i in (0..k).rev() {
            bins.push((value >> i) & 1 != 0);
        }
        bins
    }

    #[test]
    fn exp_golomb_bypass_roundtrip() {
        // With codIRange forced to 512, bypass bins reproduce the
        // stream bits after the 9-bit register delay, so the decoder
        // reads exactly the encoded bin string.
        for k in 0..=10u32 {
            for &value in &[0u32, 1, 2, 3, 7, 14, 100, 4095, 1 << 20, (1 << 31) - 1] {
                let bins = encode_exp_golomb_k(value, k);
                let mut decoder = bypass_decoder(&bins);
                assert_eq!(
                    decoder.exp_golomb_bypass(k, "test").unwrap(),
                    value,
                    "k={k} value={value}"
                );
            }
        }
    }

    #[test]
    fn unary_cap_raises_malformed_stream() {
        // All-zero stream with offset 0: every decision returns the
        // context MPS. Forcing MPS to 1 yields an endless unary run.
        let mut decoder = decoder_with_stream(SliceType::P, MockProvider::default(), &[0u8; 16]);
        decoder.context_mut(60).mps = true;
        decoder.context_mut(62).mps = true;
        decoder.context_mut(63).mps = true;

        let err = decoder.decode_mb_qp_delta().unwrap_err();
        assert!(matches!(
            err,
            CabacError::MalformedStream {
                element: "mb_qp_delta",
                limit: 24,
            }
        ));
    }

    #[test]
    fn ref_idx_cap_raises_malformed_stream() {
        let mut decoder = decoder_with_stream(SliceType::P, MockProvider::default(), &[0u8; 16]);
        for ctx in [54, 58, 59] {
            decoder.context_mut(ctx).mps = true;
        }

        let err = decoder.decode_ref_idx_l0().unwrap_err();
        assert!(matches!(
            err,
            CabacError::MalformedStream {
                element: "ref_idx",
                limit: 24,
            }
        ));
    }

    #[test]
    fn ref_idx_zero_with_mps_zero_contexts() {
        // MPS 0 at the first bin terminates the unary immediately.
        let mut decoder = decoder_with_stream(SliceType::P, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(54).mps = false;
        assert_eq!(decoder.decode_ref_idx_l0().unwrap(), 0);
    }

    #[test]
    fn mb_qp_delta_signed_mapping() {
        // MPS-driven bins 1 1 0 decode unary 2, which maps to -1.
        let mut decoder = decoder_with_stream(SliceType::I, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(60).mps = true;
        decoder.context_mut(62).mps = true;
        decoder.context_mut(63).mps = false;
        assert_eq!(decoder.decode_mb_qp_delta().unwrap(), -1);
    }

    #[test]
    fn cbp_packs_luma_plus_16_chroma() {
        // Neighbors unavailable. Zero stream, so each bin equals the
        // MPS of its context. Target luma 0b0110, chroma 2:
        //   bin 0 (blk 0): inc 0          -> ctx 73, want 0
        //   bin 1 (blk 1): A is blk 0 (bit 0 clear -> cond 1) -> ctx 74, want 1
        //   bin 2 (blk 2): B is blk 0 (cond 1), inc 2 -> ctx 75, want 1
        //   bin 3 (blk 3): A blk 2 set, B blk 1 set -> inc 0 -> ctx 73, want 0
        //   chroma bin 0: inc 0 -> ctx 77, want 1
        //   chroma bin 1: inc 4 -> ctx 81, want 1
        let mut decoder = decoder_with_stream(SliceType::I, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(73).mps = false;
        decoder.context_mut(74).mps = true;
        decoder.context_mut(75).mps = true;
        decoder.context_mut(77).mps = true;
        decoder.context_mut(81).mps = true;

        let cbp = decoder.decode_coded_block_pattern(true).unwrap();
        assert_eq!(cbp, 0x6 + 16 * 2);
    }

    #[test]
    fn mb_skip_flag_rejects_intra_slices() {
        let mut decoder = decoder_with_stream(SliceType::I, MockProvider::default(), &[0u8; 8]);
        assert!(matches!(
            decoder.decode_mb_skip_flag(),
            Err(CabacError::InvalidSliceType { .. })
        ));
    }

    #[test]
    fn rem_intra_pred_mode_reads_three_bins() {
        // All three bins share context 69 and an MPS-driven stream
        // keeps the MPS value stable, so the result is 0b111 or 0.
        let mut decoder = decoder_with_stream(SliceType::I, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(69).mps = true;
        let mode = decoder.decode_rem_intra_pred_mode().unwrap();
        assert_eq!(mode, 0b111);

        let mut decoder = decoder_with_stream(SliceType::I, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(69).mps = false;
        assert_eq!(decoder.decode_rem_intra_pred_mode().unwrap(), 0);
    }
}
