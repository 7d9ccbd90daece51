//! mb_type and sub_mb_type decision trees.
//!
//! Each slice type binarizes mb_type with its own small tree; P and B
//! slices route an escape through the intra tree at a shifted context
//! base. The trees are written bin by bin so the context sequence is
//! explicit.

use entrodec_core::BitSource;

use crate::binarization::CabacDecoder;
use crate::error::{CabacError, CabacResult};
use crate::provider::{Macroblock, MacroblockProvider, MbTypeClass};
use crate::tables;
use crate::SliceType;

/// A decoded mb_type.
///
/// `value` is numbered within `slice_type`'s own mb_type table; the
/// slice type is the *effective* one for the macroblock, so an intra
/// escape inside a P or B slice comes back as `I` with an I-slice
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedMbType {
    pub slice_type: SliceType,
    pub value: u8,
}

impl DecodedMbType {
    /// True for the I_PCM escape.
    pub fn is_i_pcm(&self) -> bool {
        self.slice_type == SliceType::I && self.value == 25
    }
}

impl<R: BitSource, P: MacroblockProvider> CabacDecoder<R, P> {
    /// Decode mb_type for the current macroblock.
    ///
    /// SP slices binarize exactly like P slices; SI slices spend one
    /// selector bin and fall through to the full I tree.
    pub fn decode_mb_type(&mut self) -> CabacResult<DecodedMbType> {
        match self.slice_type {
            SliceType::I => {
                let inc = self.mb_type_neighbor_inc(|mb| mb.mb_type != MbTypeClass::INxN);
                let value = self.intra_mb_type(tables::CTX_MB_TYPE_I, Some(inc))?;
                Ok(DecodedMbType {
                    slice_type: SliceType::I,
                    value,
                })
            }
            SliceType::Si => {
                let inc = self.mb_type_neighbor_inc(|mb| mb.mb_type != MbTypeClass::Si);
                if self.decision(tables::CTX_MB_TYPE_SI_PREFIX + inc)? {
                    Ok(DecodedMbType {
                        slice_type: SliceType::Si,
                        value: 0,
                    })
                } else {
                    let inc = self.mb_type_neighbor_inc(|mb| mb.mb_type != MbTypeClass::INxN);
                    let value = self.intra_mb_type(tables::CTX_MB_TYPE_I, Some(inc))?;
                    Ok(DecodedMbType {
                        slice_type: SliceType::I,
                        value,
                    })
                }
            }
            SliceType::P | SliceType::Sp => self.p_mb_type(),
            SliceType::B => self.b_mb_type(),
        }
    }

    /// Decode sub_mb_type for the current 8x8 partition.
    pub fn decode_sub_mb_type(&mut self) -> CabacResult<u8> {
        if self.slice_type.is_predictive() {
            let base = tables::CTX_SUB_MB_TYPE_P;
            if self.decision(base)? {
                return Ok(0);
            }
            if !self.decision(base + 1)? {
                return Ok(1);
            }
            if self.decision(base + 2)? {
                Ok(2)
            } else {
                Ok(3)
            }
        } else if self.slice_type.is_bidirectional() {
            let base = tables::CTX_SUB_MB_TYPE_B;
            if !self.decision(base)? {
                return Ok(0);
            }
            if !self.decision(base + 1)? {
                return Ok(1 + self.decision(base + 3)? as u8);
            }
            let mut value = 3u8;
            if self.decision(base + 2)? {
                if self.decision(base + 3)? {
                    return Ok(11 + self.decision(base + 3)? as u8);
                }
                value += 4;
            }
            value += 2 * self.decision(base + 3)? as u8;
            value += self.decision(base + 3)? as u8;
            Ok(value)
        } else {
            Err(CabacError::InvalidSliceType {
                element: "sub_mb_type",
                slice_type: self.slice_type,
            })
        }
    }

    /// ctxIdxInc from the A/B neighbors: 1 per neighbor that is
    /// available and passes `distinct`.
    fn mb_type_neighbor_inc(&self, distinct: impl Fn(&Macroblock) -> bool) -> usize {
        let addr = self.provider.curr_mb_addr();
        let (a, b) = self.provider.derive_neighbors(addr);
        let cond = |n: Option<&Macroblock>| usize::from(n.is_some_and(&distinct));
        cond(a) + cond(b)
    }

    /// The intra mb_type tree shared by I slices and the P/B escapes.
    ///
    /// `first_inc` is `Some` in I and SI slices, where the first bin is
    /// neighbor-conditioned and the suffix contexts shift up by two.
    fn intra_mb_type(&mut self, base: usize, first_inc: Option<usize>) -> CabacResult<u8> {
        let intra_slice = first_inc.is_some();
        if !self.decision(base + first_inc.unwrap_or(0))? {
            return Ok(0); // I_NxN
        }
        if self.terminate()? {
            return Ok(25); // I_PCM
        }

        // I_16x16: luma CBP bin, chroma CBP pair, two prediction bins.
        let (cbp_luma, chroma0, chroma1, pred1, pred0) = if intra_slice {
            (base + 3, base + 4, base + 5, base + 6, base + 7)
        } else {
            (base + 1, base + 2, base + 2, base + 3, base + 3)
        };

        let mut value = 1u8;
        if self.decision(cbp_luma)? {
            value += 12;
        }
        if self.decision(chroma0)? {
            value += if self.decision(chroma1)? { 8 } else { 4 };
        }
        value += 2 * self.decision(pred1)? as u8;
        value += self.decision(pred0)? as u8;
        Ok(value)
    }

    fn p_mb_type(&mut self) -> CabacResult<DecodedMbType> {
        if self.decision(tables::CTX_MB_TYPE_P_PREFIX)? {
            let value = self.intra_mb_type(tables::CTX_MB_TYPE_P_SUFFIX, None)?;
            return Ok(DecodedMbType {
                slice_type: SliceType::I,
                value,
            });
        }

        let value = if !self.decision(tables::CTX_MB_TYPE_P_PREFIX + 1)? {
            if !self.decision(tables::CTX_MB_TYPE_P_PREFIX + 2)? {
                0 // P_L0_16x16
            } else {
                3 // P_8x8
            }
        } else if !self.decision(tables::CTX_MB_TYPE_P_PREFIX + 3)? {
            2 // P_L0_L0_8x16
        } else {
            1 // P_L0_L0_16x8
        };
        Ok(DecodedMbType {
            slice_type: self.slice_type,
            value,
        })
    }

    fn b_mb_type(&mut self) -> CabacResult<DecodedMbType> {
        let base = tables::CTX_MB_TYPE_B;
        let inc = self.mb_type_neighbor_inc(|mb| {
            !matches!(mb.mb_type, MbTypeClass::BSkip | MbTypeClass::BDirect16x16)
        });

        if !self.decision(base + inc)? {
            return Ok(DecodedMbType {
                slice_type: SliceType::B,
                value: 0, // B_Direct_16x16
            });
        }
        if !self.decision(base + 3)? {
            let bin = self.decision(base + 5)? as u8;
            return Ok(DecodedMbType {
                slice_type: SliceType::B,
                value: 1 + bin, // B_L0_16x16 / B_L1_16x16
            });
        }

        let mut bits = (self.decision(base + 4)? as u8) << 3;
        bits |= (self.decision(base + 5)? as u8) << 2;
        bits |= (self.decision(base + 5)? as u8) << 1;
        bits |= self.decision(base + 5)? as u8;

        let value = match bits {
            0..=7 => bits + 3,
            13 => {
                // The 111101 prefix routes into the intra tree.
                let value = self.intra_mb_type(tables::CTX_MB_TYPE_B_SUFFIX, None)?;
                return Ok(DecodedMbType {
                    slice_type: SliceType::I,
                    value,
                });
            }
            14 => 11, // B_L1_L0_8x16
            15 => 22, // B_8x8
            _ => ((bits << 1) | self.decision(base + 5)? as u8) - 4,
        };
        Ok(DecodedMbType {
            slice_type: SliceType::B,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{decoder_with_offset, decoder_with_stream, MockProvider};

    #[test]
    fn i_slice_leading_zero_is_i_nxn() {
        // ctx 3 initializes with MPS 0 at QP 26; a zero stream decodes
        // the MPS, so the first bin is 0.
        let mut decoder = decoder_with_stream(SliceType::I, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(3).mps = false;
        let mb_type = decoder.decode_mb_type().unwrap();
        assert_eq!(
            mb_type,
            DecodedMbType {
                slice_type: SliceType::I,
                value: 0
            }
        );
    }

    #[test]
    fn i_slice_pcm_path() {
        // codIOffset 509 forces an LPS on the first decision (bin 1),
        // leaving range 22 which renormalizes to 352 on four 1-bits;
        // the terminate probe then sees 351 >= 350.
        let mut decoder =
            decoder_with_offset(SliceType::I, MockProvider::default(), 509, &[0b1111_0000]);
        let mb_type = decoder.decode_mb_type().unwrap();
        assert_eq!(mb_type.slice_type, SliceType::I);
        assert_eq!(mb_type.value, 25);
        assert!(mb_type.is_i_pcm());
    }

    #[test]
    fn i_slice_i16x16_value_assembly() {
        // MPS-driven bins: prefix 1, terminate 0, cbp_luma 0,
        // chroma 0, pred bins 0 -> I_16x16_0_0_0 (value 1).
        let mut decoder = decoder_with_stream(SliceType::I, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(3).mps = true;
        for ctx in [6, 7, 9, 10] {
            decoder.context_mut(ctx).mps = false;
        }
        let mb_type = decoder.decode_mb_type().unwrap();
        assert_eq!(mb_type.slice_type, SliceType::I);
        assert_eq!(mb_type.value, 1);
    }

    #[test]
    fn i_slice_neighbor_inc_selects_context() {
        // Both neighbors present and not I_NxN: the first bin reads
        // ctx 5 instead of ctx 3.
        let mut provider = MockProvider::default();
        let mut neighbor = crate::provider::Macroblock {
            addr: -2,
            ..Default::default()
        };
        neighbor.mb_type = MbTypeClass::Other;
        provider.left = Some(neighbor.clone());
        provider.top = Some(neighbor);

        let mut decoder = decoder_with_stream(SliceType::I, provider, &[0u8; 8]);
        decoder.context_mut(3).mps = true; // would yield I_16x16 if consulted
        decoder.context_mut(5).mps = false;
        let mb_type = decoder.decode_mb_type().unwrap();
        assert_eq!(mb_type.value, 0);
    }

    #[test]
    fn p_slice_inter_types() {
        let cases = [
            // (ctx15, ctx16/17 MPS) -> value
            (false, false, 0u8),
            (false, true, 3u8),
            (true, false, 2u8),
            (true, true, 1u8),
        ];
        for (b1, b2, expect) in cases {
            let mut decoder = decoder_with_stream(SliceType::P, MockProvider::default(), &[0u8; 8]);
            decoder.context_mut(14).mps = false;
            decoder.context_mut(15).mps = b1;
            decoder.context_mut(16).mps = b2;
            decoder.context_mut(17).mps = b2;
            let mb_type = decoder.decode_mb_type().unwrap();
            assert_eq!(mb_type.slice_type, SliceType::P);
            assert_eq!(mb_type.value, expect, "b1={b1} b2={b2}");
        }
    }

    #[test]
    fn sp_slice_reuses_p_tree() {
        let mut decoder = decoder_with_stream(SliceType::Sp, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(14).mps = false;
        decoder.context_mut(15).mps = false;
        decoder.context_mut(16).mps = false;
        let mb_type = decoder.decode_mb_type().unwrap();
        assert_eq!(mb_type.slice_type, SliceType::Sp);
        assert_eq!(mb_type.value, 0);
    }

    #[test]
    fn p_slice_intra_escape() {
        // Prefix 1 enters the intra tree at base 17; a 0 there is
        // I_NxN reported under the effective slice type I.
        let mut decoder = decoder_with_stream(SliceType::P, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(14).mps = true;
        decoder.context_mut(17).mps = false;
        let mb_type = decoder.decode_mb_type().unwrap();
        assert_eq!(
            mb_type,
            DecodedMbType {
                slice_type: SliceType::I,
                value: 0
            }
        );
    }

    #[test]
    fn b_slice_direct_and_16x16() {
        let mut decoder = decoder_with_stream(SliceType::B, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(27).mps = false;
        assert_eq!(
            decoder.decode_mb_type().unwrap(),
            DecodedMbType {
                slice_type: SliceType::B,
                value: 0
            }
        );

        // 1 then 0 then one suffix bin: B_L0_16x16 / B_L1_16x16.
        for (suffix, expect) in [(false, 1u8), (true, 2u8)] {
            let mut decoder = decoder_with_stream(SliceType::B, MockProvider::default(), &[0u8; 8]);
            decoder.context_mut(27).mps = true;
            decoder.context_mut(30).mps = false;
            decoder.context_mut(32).mps = suffix;
            let mb_type = decoder.decode_mb_type().unwrap();
            assert_eq!(mb_type.slice_type, SliceType::B);
            assert_eq!(mb_type.value, expect);
        }
    }

    #[test]
    fn b_slice_neighbor_inc_counts_non_direct() {
        let mut provider = MockProvider::default();
        let mut left = crate::provider::Macroblock {
            addr: -2,
            ..Default::default()
        };
        left.mb_type = MbTypeClass::BSkip;
        provider.left = Some(left); // skip neighbors do not count
        let mut decoder = decoder_with_stream(SliceType::B, provider, &[0u8; 8]);
        decoder.context_mut(27).mps = false;
        assert_eq!(decoder.decode_mb_type().unwrap().value, 0);
    }

    #[test]
    fn sub_mb_type_p_tree() {
        let mut decoder = decoder_with_stream(SliceType::P, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(21).mps = true;
        assert_eq!(decoder.decode_sub_mb_type().unwrap(), 0);

        let mut decoder = decoder_with_stream(SliceType::P, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(21).mps = false;
        decoder.context_mut(22).mps = false;
        assert_eq!(decoder.decode_sub_mb_type().unwrap(), 1);

        let mut decoder = decoder_with_stream(SliceType::P, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(21).mps = false;
        decoder.context_mut(22).mps = true;
        decoder.context_mut(23).mps = true;
        assert_eq!(decoder.decode_sub_mb_type().unwrap(), 2);
    }

    #[test]
    fn sub_mb_type_b_tree() {
        let mut decoder = decoder_with_stream(SliceType::B, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(36).mps = false;
        assert_eq!(decoder.decode_sub_mb_type().unwrap(), 0);

        let mut decoder = decoder_with_stream(SliceType::B, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(36).mps = true;
        decoder.context_mut(37).mps = false;
        decoder.context_mut(39).mps = true;
        assert_eq!(decoder.decode_sub_mb_type().unwrap(), 2);
    }

    #[test]
    fn sub_mb_type_rejects_intra_slices() {
        let mut decoder = decoder_with_stream(SliceType::I, MockProvider::default(), &[0u8; 8]);
        assert!(matches!(
            decoder.decode_sub_mb_type(),
            Err(CabacError::InvalidSliceType { .. })
        ));
    }

    #[test]
    fn si_slice_selector() {
        let mut decoder = decoder_with_stream(SliceType::Si, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(0).mps = true;
        assert_eq!(
            decoder.decode_mb_type().unwrap(),
            DecodedMbType {
                slice_type: SliceType::Si,
                value: 0
            }
        );

        let mut decoder = decoder_with_stream(SliceType::Si, MockProvider::default(), &[0u8; 8]);
        decoder.context_mut(0).mps = false;
        decoder.context_mut(3).mps = false;
        assert_eq!(
            decoder.decode_mb_type().unwrap(),
            DecodedMbType {
                slice_type: SliceType::I,
                value: 0
            }
        );
    }
}
