//! AV1 multi-symbol entropy decoder.
//!
//! A 15-bit range coder decoding symbols against caller-supplied
//! cumulative distribution functions, adapting the CDFs in place unless
//! disabled. Independent of the CABAC stack; shares only the bit
//! source abstraction.
//!
//! # Example
//!
//! ```
//! use entrodec_av1::Av1SymbolDecoder;
//! use entrodec_core::BitReader;
//!
//! let data = [0b1000_0000];
//! let reader = BitReader::new(&data);
//! let mut decoder = Av1SymbolDecoder::new(reader, data.len(), true)?;
//! let bit = decoder.read_bool()?;
//! # let _ = bit;
//! # Ok::<(), entrodec_av1::Av1Error>(())
//! ```

mod error;
mod symbol;

pub use error::{Av1Error, Result};
pub use symbol::{Av1SymbolDecoder, Cdf};
