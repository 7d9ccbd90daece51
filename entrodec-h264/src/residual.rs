//! Residual block syntax elements.
//!
//! coded_block_flag, the significance map, coefficient magnitudes and
//! signs. Context selection runs through the block-kind factor: the 14
//! residual block kinds and the macroblock's MBAFF mode collapse into
//! an index picking the per-element base offset, plus a per-category
//! offset inside the group.

use entrodec_core::BitSource;

use crate::binarization::CabacDecoder;
use crate::error::CabacResult;
use crate::provider::{BlockNeighbor, Macroblock, MacroblockProvider, MbTypeClass, PredictionCoding};
use crate::tables;

/// Which residual transform-coefficient block is being parsed.
///
/// The discriminants are the ctxBlockCat values of H.264 table 9-42.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResidualBlockKind {
    /// Intra16x16DCLevel.
    #[default]
    LumaDc = 0,
    /// Intra16x16ACLevel.
    LumaAc = 1,
    /// LumaLevel4x4.
    Luma4x4 = 2,
    /// ChromaDCLevel.
    ChromaDc = 3,
    /// ChromaACLevel.
    ChromaAc = 4,
    /// LumaLevel8x8.
    Luma8x8 = 5,
    /// CbIntra16x16DCLevel.
    CbDc = 6,
    /// CbIntra16x16ACLevel.
    CbAc = 7,
    /// CbLevel4x4.
    Cb4x4 = 8,
    /// CbLevel8x8.
    Cb8x8 = 9,
    /// CrIntra16x16DCLevel.
    CrDc = 10,
    /// CrIntra16x16ACLevel.
    CrAc = 11,
    /// CrLevel4x4.
    Cr4x4 = 12,
    /// CrLevel8x8.
    Cr8x8 = 13,
}

impl ResidualBlockKind {
    /// The ctxBlockCat value.
    pub fn ctx_block_cat(self) -> usize {
        self as usize
    }

    fn is_dc(self) -> bool {
        matches!(
            self,
            ResidualBlockKind::LumaDc
                | ResidualBlockKind::ChromaDc
                | ResidualBlockKind::CbDc
                | ResidualBlockKind::CrDc
        )
    }

    fn is_8x8(self) -> bool {
        matches!(
            self,
            ResidualBlockKind::Luma8x8 | ResidualBlockKind::Cb8x8 | ResidualBlockKind::Cr8x8
        )
    }
}

/// Parameters for one coded_block_flag read.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodedBlockFlagOptions {
    /// Transform block index within the macroblock, in the granularity
    /// of the block kind (4x4 or 8x8 index). Ignored by DC kinds.
    pub blk_idx: u8,
    /// Chroma plane for the shared chroma kinds (0 = Cb, 1 = Cr).
    pub icbcr: u8,
}

/// A coded_block_flag neighbor after availability classification.
enum CbfNeighbor<'a> {
    MbUnavailable,
    BlockUnavailable,
    Block(&'a Macroblock, usize),
}

impl<R: BitSource, P: MacroblockProvider> CabacDecoder<R, P> {
    /// Decode coded_block_flag for the block identified by the
    /// `residual_block_kind` setup field and `opts`.
    pub fn decode_coded_block_flag(&mut self, opts: CodedBlockFlagOptions) -> CabacResult<bool> {
        let kind = self.residual_block_kind;
        let cat = kind.ctx_block_cat();
        let factor = self.residual_factor()?;
        let base =
            tables::CODED_BLOCK_FLAG_BASE[factor] + tables::CODED_BLOCK_FLAG_CAT_OFFSET[cat];

        let curr_intra = self.current_mb()?.is_intra();
        let addr = self.provider.curr_mb_addr();

        let (a, b) = match kind {
            _ if kind.is_dc() => {
                let (a, b) = self.provider.derive_neighbors(addr);
                (
                    BlockNeighbor { mb: a, blk_idx: 16 },
                    BlockNeighbor { mb: b, blk_idx: 16 },
                )
            }
            ResidualBlockKind::ChromaAc => {
                self.provider.derive_neighbor_4x4_chroma(addr, opts.blk_idx)
            }
            ResidualBlockKind::Luma8x8 => self.provider.derive_neighbor_8x8_luma(addr, opts.blk_idx),
            ResidualBlockKind::Cb8x8 => self
                .provider
                .derive_neighbor_8x8_luma_chroma_array_type3(addr, opts.blk_idx),
            ResidualBlockKind::Cr8x8 => self
                .provider
                .derive_neighbor_8x8_chroma_array_type3(addr, opts.blk_idx),
            // The AC and 4x4 kinds of every plane share the luma 4x4
            // geometry (the Cb/Cr kinds exist only with ChromaArrayType
            // 3, where the planes are full size).
            _ => self.provider.derive_neighbor_4x4_luma(addr, opts.blk_idx),
        };

        let plane = match kind {
            ResidualBlockKind::ChromaDc | ResidualBlockKind::ChromaAc => {
                1 + usize::from(opts.icbcr.min(1))
            }
            _ => match cat {
                0..=2 | 5 => 0,
                6..=9 => 1,
                _ => 2,
            },
        };

        let is_8x8 = kind.is_8x8();
        let cond_a = self.cbf_cond_term(classify_cbf_neighbor(a, is_8x8), plane, curr_intra);
        let cond_b = self.cbf_cond_term(classify_cbf_neighbor(b, is_8x8), plane, curr_intra);

        self.decision(base + cond_a + 2 * cond_b)
    }

    /// Decode significant_coeff_flag at the `level_list_idx` setup
    /// position.
    pub fn decode_significant_coeff_flag(&mut self) -> CabacResult<bool> {
        let ctx = self.sig_last_ctx(false)?;
        self.decision(ctx)
    }

    /// Decode last_significant_coeff_flag at the `level_list_idx`
    /// setup position.
    pub fn decode_last_significant_coeff_flag(&mut self) -> CabacResult<bool> {
        let ctx = self.sig_last_ctx(true)?;
        self.decision(ctx)
    }

    /// Decode coeff_abs_level_minus1.
    ///
    /// UEG0 with uCoff 14; the prefix contexts follow the
    /// `num_decod_abs_level_gt1` / `num_decod_abs_level_eq1` setup
    /// counters. The sign is a separate element.
    pub fn decode_coeff_abs_level_minus1(&mut self) -> CabacResult<u32> {
        let cat = self.residual_block_kind.ctx_block_cat();
        let factor = self.residual_factor()?;
        let base = tables::ABS_LEVEL_BASE[factor] + tables::ABS_LEVEL_CAT_OFFSET[cat];

        let gt1 = u32::from(self.num_decod_abs_level_gt1);
        let eq1 = u32::from(self.num_decod_abs_level_eq1);
        let inc0 = if gt1 > 0 { 0 } else { (1 + eq1).min(4) };
        // Chroma DC clamps the escalation one step earlier.
        let clamp = if cat == 3 { 3 } else { 4 };
        let inc1 = 5 + gt1.min(clamp);

        let ctxs = [base + inc0 as usize, base + inc1 as usize];
        let value = self.ueg(&ctxs, 0, false, 14, "coeff_abs_level_minus1")?;
        Ok(value as u32)
    }

    /// Decode coeff_sign_flag (pure bypass).
    pub fn decode_coeff_sign_flag(&mut self) -> CabacResult<bool> {
        self.bypass()
    }

    /// Block-kind factor for the current macroblock: the kind's base
    /// factor, shifted into the MBAFF frame or field column.
    fn residual_factor(&self) -> CabacResult<usize> {
        let cat = self.residual_block_kind.ctx_block_cat();
        let curr = self.current_mb()?;
        let base = tables::BLOCK_KIND_FACTOR[cat];
        Ok(if !curr.mbaff_frame_flag {
            base
        } else if curr.is_field() {
            base + 12
        } else {
            base + 6
        })
    }

    fn sig_last_ctx(&self, last: bool) -> CabacResult<usize> {
        let cat = self.residual_block_kind.ctx_block_cat();
        let factor = self.residual_factor()?;
        let table = if last {
            &tables::LAST_COEFF_BASE
        } else {
            &tables::SIG_COEFF_BASE
        };
        let base = table[factor] + tables::SIG_LAST_CAT_OFFSET[cat];

        let idx = usize::from(self.level_list_idx);
        let inc = match cat {
            // Chroma DC positions compress by NumC8x8.
            3 => (idx / usize::from(self.num_c8x8.max(1))).min(2),
            5 | 9 | 13 => {
                let pos = idx.min(62);
                if last {
                    usize::from(tables::LAST_COEFF_POS_8X8[pos])
                } else {
                    let field = factor >= 13;
                    usize::from(tables::SIG_COEFF_POS_8X8[usize::from(field)][pos])
                }
            }
            _ => idx,
        };
        Ok(base + inc)
    }

    fn cbf_cond_term(&self, n: CbfNeighbor<'_>, plane: usize, curr_intra: bool) -> usize {
        match n {
            // A missing neighbor counts as coded for intra macroblocks
            // and as uncoded for inter ones.
            CbfNeighbor::MbUnavailable => usize::from(curr_intra),
            CbfNeighbor::BlockUnavailable => 0,
            CbfNeighbor::Block(mb, idx) => {
                if mb.mb_type == MbTypeClass::IPcm {
                    1
                } else if curr_intra
                    && self.provider.constrained_intra_pred()
                    && mb.prediction == PredictionCoding::Inter
                    && (2..=4).contains(&self.provider.nal_unit_type())
                {
                    // Slice data partitioning: inter neighbors are not
                    // readable under constrained intra prediction.
                    0
                } else {
                    usize::from(mb.coded_block_flag[plane][idx.min(16)])
                }
            }
        }
    }
}

/// Classify a derived neighbor for coded_block_flag. 8x8 kinds see a
/// neighbor's block as unavailable when the neighbor was not
/// 8x8-transformed; the block index scales to 4x4 granularity.
fn classify_cbf_neighbor(n: BlockNeighbor<'_>, is_8x8: bool) -> CbfNeighbor<'_> {
    match n.mb {
        None => CbfNeighbor::MbUnavailable,
        Some(mb) if is_8x8 && !mb.transform_size_8x8 && mb.mb_type != MbTypeClass::IPcm => {
            CbfNeighbor::BlockUnavailable
        }
        Some(mb) => {
            let idx = if is_8x8 {
                usize::from(n.blk_idx) * 4
            } else {
                usize::from(n.blk_idx)
            };
            CbfNeighbor::Block(mb, idx)
        }
    }
}
