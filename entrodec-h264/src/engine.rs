//! The binary arithmetic engine.
//!
//! A codIRange/codIOffset register pair with the three primitive reads
//! of H.264 clause 9.3.3.2: context-driven decisions, equiprobable
//! bypass bins, and the end-of-slice terminate probe. Renormalization
//! pulls bits from the source one at a time, in stream order.

use entrodec_core::{BitSource, Result};

use crate::context::ContextModel;
use crate::tables::{RANGE_TAB_LPS, TRANS_IDX_LPS, TRANS_IDX_MPS};

/// Arithmetic register state.
///
/// After any renormalizing primitive, `256 <= range <= 1023` and
/// `offset < range` for conforming streams. `offset` exceeds 9 bits
/// only transiently inside bypass decoding.
#[derive(Debug, Clone)]
pub(crate) struct ArithState {
    range: u16,
    offset: u16,
}

impl ArithState {
    /// Registers at slice start: range 510, offset from the 9 raw bits
    /// the caller read just before the first decoded element.
    pub(crate) fn new(initial_offset: u16) -> Self {
        Self {
            range: 510,
            offset: initial_offset & 0x1FF,
        }
    }

    pub(crate) fn range(&self) -> u16 {
        self.range
    }

    pub(crate) fn offset(&self) -> u16 {
        self.offset
    }

    /// Decode one context-coded bin and adapt the model.
    pub(crate) fn decision<R: BitSource>(
        &mut self,
        ctx: &mut ContextModel,
        reader: &mut R,
    ) -> Result<bool> {
        let q = usize::from((self.range >> 6) & 3);
        let state = usize::from(ctx.p_state_idx);
        let range_lps = u16::from(RANGE_TAB_LPS[state][q]);

        self.range -= range_lps;
        let bin = if self.offset >= self.range {
            // LPS path: the new range *is* the LPS sub-interval.
            self.offset -= self.range;
            self.range = range_lps;
            let bin = !ctx.mps;
            if ctx.p_state_idx == 0 {
                ctx.mps = !ctx.mps;
            }
            ctx.p_state_idx = TRANS_IDX_LPS[state];
            bin
        } else {
            ctx.p_state_idx = TRANS_IDX_MPS[state];
            ctx.mps
        };

        self.renormalize(reader)?;
        Ok(bin)
    }

    /// Decode one equiprobable bin. No renormalization.
    pub(crate) fn bypass<R: BitSource>(&mut self, reader: &mut R) -> Result<bool> {
        self.offset = (self.offset << 1) | (reader.read_bit()? as u16);
        if self.offset >= self.range {
            self.offset -= self.range;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Probe for end of slice. Returns true when the stream signals
    /// termination; the registers stop advancing in that case.
    pub(crate) fn terminate<R: BitSource>(&mut self, reader: &mut R) -> Result<bool> {
        self.range -= 2;
        if self.offset >= self.range {
            Ok(true)
        } else {
            self.renormalize(reader)?;
            Ok(false)
        }
    }

    fn renormalize<R: BitSource>(&mut self, reader: &mut R) -> Result<()> {
        while self.range < 256 {
            self.range <<= 1;
            self.offset = (self.offset << 1) | (reader.read_bit()? as u16);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn force_registers(&mut self, range: u16, offset: u16) {
        self.range = range;
        self.offset = offset;
    }
}
