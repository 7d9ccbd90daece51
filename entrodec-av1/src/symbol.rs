//! The AV1 symbol decoding process (AOM AV1 spec, section 8.2).

use entrodec_core::BitSource;

use crate::error::{Av1Error, Result};

const EC_PROB_SHIFT: u32 = 6;
const EC_MIN_PROB: u32 = 4;
const PROB_TOP: u32 = 1 << 15;

/// A cumulative distribution function over N symbols.
///
/// `cdf[0..N]` are 15-bit cumulative probabilities with `cdf[N - 1]`
/// equal to `1 << 15`; `cdf[N]` is the adaptation counter that steers
/// the update rate. Slices are `N + 1` long.
pub type Cdf = [u16];

/// The AV1 multi-symbol range decoder.
///
/// State is the 15-bit `symbol_range` / `symbol_value` pair of the AV1
/// specification, plus the bit budget that stops refills at the end of
/// the coded buffer. One decoder per tile group; not safe for
/// concurrent use.
pub struct Av1SymbolDecoder<R> {
    reader: R,
    /// Bits consumed by initialization.
    #[allow(dead_code)]
    num_bits: u32,
    /// Raw initialization window.
    #[allow(dead_code)]
    buf: u32,
    /// Initialization window left-aligned to 15 bits.
    #[allow(dead_code)]
    padded_buf: u32,
    symbol_value: u32,
    symbol_range: u32,
    /// Bits still readable from the source; negative once the tail
    /// padding is in play.
    symbol_max_bits: i32,
    disable_cdf_update: bool,
}

impl<R: BitSource> Av1SymbolDecoder<R> {
    /// Initialize over a coded buffer of `sz` bytes.
    ///
    /// Reads `min(sz * 8, 15)` bits to seed the value register. With
    /// `disable_cdf_update` set, `read_symbol` leaves every CDF
    /// untouched.
    pub fn new(mut reader: R, sz: usize, disable_cdf_update: bool) -> Result<Self> {
        let num_bits = (sz * 8).min(15) as u32;
        let mut buf = 0u32;
        for _ in 0..num_bits {
            buf = (buf << 1) | reader.read_bit()? as u32;
        }
        let padded_buf = buf << (15 - num_bits);

        tracing::trace!(sz, disable_cdf_update, "initialized AV1 symbol decoder");
        Ok(Self {
            reader,
            num_bits,
            buf,
            padded_buf,
            symbol_value: (PROB_TOP - 1) ^ padded_buf,
            symbol_range: PROB_TOP,
            symbol_max_bits: sz as i32 * 8 - 15,
            disable_cdf_update,
        })
    }

    /// Current range register. Stays in `[1 << 15, 1 << 16)` between
    /// symbols.
    pub fn symbol_range(&self) -> u32 {
        self.symbol_range
    }

    /// Current value register.
    pub fn symbol_value(&self) -> u32 {
        self.symbol_value
    }

    /// Decode one symbol against `cdf`, adapting it in place unless
    /// updates are disabled.
    pub fn read_symbol(&mut self, cdf: &mut Cdf) -> Result<u8> {
        if cdf.len() < 3 {
            return Err(Av1Error::InvalidCdf("fewer than two symbols"));
        }
        let n = cdf.len() - 1;
        if u32::from(cdf[n - 1]) != PROB_TOP {
            return Err(Av1Error::InvalidCdf("last probability must be 1 << 15"));
        }

        let symbol = self.partition(cdf, n)?;
        if !self.disable_cdf_update {
            update_cdf(cdf, symbol, n);
        }
        Ok(symbol as u8)
    }

    /// Decode one equiprobable boolean.
    pub fn read_bool(&mut self) -> Result<bool> {
        // A fixed half-split CDF; never adapted.
        let cdf = [(1 << 14) as u16, PROB_TOP as u16, 0];
        let symbol = self.partition(&cdf, 2)?;
        Ok(symbol == 1)
    }

    /// Decode an `n`-bit unsigned literal, most significant bit first.
    pub fn read_literal(&mut self, n: u32) -> Result<u32> {
        let mut x = 0u32;
        for _ in 0..n {
            x = (x << 1) | self.read_bool()? as u32;
        }
        Ok(x)
    }

    /// Find the symbol whose partition contains the value register and
    /// rescale. The walk never consults the counter entry `cdf[N]`:
    /// the last probability forces the final partition bound to zero.
    fn partition(&mut self, cdf: &Cdf, n: usize) -> Result<usize> {
        let mut symbol = 0usize;
        let mut prev;
        let mut cur = self.symbol_range;
        loop {
            prev = cur;
            let f = PROB_TOP - u32::from(cdf[symbol]);
            cur = (((self.symbol_range >> 8) * (f >> EC_PROB_SHIFT)) >> (7 - EC_PROB_SHIFT))
                + EC_MIN_PROB * (n - symbol - 1) as u32;
            if self.symbol_value >= cur {
                break;
            }
            symbol += 1;
        }

        self.symbol_range = prev - cur;
        self.symbol_value -= cur;
        self.renormalize()?;
        Ok(symbol)
    }

    /// Shift the range back into the top half, pulling fresh bits while
    /// the budget lasts; past the buffer end the value register pads
    /// with one-bits as the specification prescribes.
    fn renormalize(&mut self) -> Result<()> {
        let bits = 15 - self.symbol_range.ilog2();
        self.symbol_range <<= bits;

        let readable = bits.min(self.symbol_max_bits.max(0) as u32);
        let mut new_data = 0u32;
        for _ in 0..readable {
            new_data = (new_data << 1) | self.reader.read_bit()? as u32;
        }

        let padded_data = new_data << (bits - readable);
        self.symbol_value = padded_data ^ (((self.symbol_value + 1) << bits) - 1);
        self.symbol_max_bits -= bits as i32;
        Ok(())
    }
}

/// Pull the decoded symbol's partition toward certainty and the rest
/// toward zero, at a rate steered by the adaptation counter and the
/// alphabet size.
fn update_cdf(cdf: &mut Cdf, symbol: usize, n: usize) {
    let count = cdf[n];
    let rate = 3
        + u32::from(count > 15)
        + u32::from(count > 31)
        + (n as u32).ilog2().min(2);

    for i in 0..n - 1 {
        let target = if i >= symbol { PROB_TOP } else { 0 };
        let prob = u32::from(cdf[i]);
        let next = if target > prob {
            prob + ((target - prob) >> rate)
        } else {
            prob - ((prob - target) >> rate)
        };
        cdf[i] = next as u16;
    }
    cdf[n] = count + u16::from(count < 32);
}
