//! Context models and the per-slice context table.

use crate::tables::{CONTEXT_INIT_I, CONTEXT_INIT_PB};
use crate::SliceType;

/// Number of context models in a CABAC decoder.
pub const CONTEXT_COUNT: usize = 1024;

/// A single adaptive context model.
///
/// The pair of a probability state index in `0..=63` and the current
/// most probable symbol. Mutated in place by every context-coded
/// decision that targets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextModel {
    /// Probability state index (0..=63).
    pub p_state_idx: u8,
    /// Most probable symbol.
    pub mps: bool,
}

impl ContextModel {
    /// Initialize a model from its (m, n) coefficients and the slice QP.
    ///
    /// `preCtxState = Clip3(1, 126, ((m * Clip3(0, 51, qp)) >> 4) + n)`,
    /// then split into state index and MPS around the midpoint.
    pub fn from_init(m: i8, n: i8, qp: i32) -> Self {
        let qp = qp.clamp(0, 51);
        let pre_ctx_state = (((m as i32 * qp) >> 4) + n as i32).clamp(1, 126);

        if pre_ctx_state <= 63 {
            Self {
                p_state_idx: (63 - pre_ctx_state) as u8,
                mps: false,
            }
        } else {
            Self {
                p_state_idx: (pre_ctx_state - 64) as u8,
                mps: true,
            }
        }
    }
}

/// The fixed-size table of context models owned by one decoder.
///
/// Lives inline in the decoder; initialization is a pure function of
/// (slice type, QP, cabac_init_idc) and allocates nothing.
#[derive(Debug, Clone)]
pub struct ContextTable {
    models: [ContextModel; CONTEXT_COUNT],
}

impl ContextTable {
    /// Build the table for a slice.
    ///
    /// I and SI slices use the intra coefficient column; P, SP and B
    /// slices select one of three columns by `cabac_init_idc`.
    pub fn new(slice_type: SliceType, qp: i32, cabac_init_idc: u8) -> Self {
        let init: &[(i8, i8); CONTEXT_COUNT] = match slice_type {
            SliceType::I | SliceType::Si => &CONTEXT_INIT_I,
            SliceType::P | SliceType::Sp | SliceType::B => {
                &CONTEXT_INIT_PB[usize::from(cabac_init_idc.min(2))]
            }
        };

        let mut models = [ContextModel {
            p_state_idx: 0,
            mps: false,
        }; CONTEXT_COUNT];
        for (model, &(m, n)) in models.iter_mut().zip(init.iter()) {
            *model = ContextModel::from_init(m, n, qp);
        }

        Self { models }
    }

    pub fn get(&self, ctx_idx: usize) -> &ContextModel {
        &self.models[ctx_idx]
    }

    pub fn get_mut(&mut self, ctx_idx: usize) -> &mut ContextModel {
        &mut self.models[ctx_idx]
    }
}
