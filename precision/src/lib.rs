#![forbid(unsafe_code)]

//! The numeric precision layer (C1).
//!
//! Defines a single capability set — complex add, multiply, magnitude
//! squared, assign-from-literal, compare-to-scalar — and three
//! realisations of it: [`StandardRealm`] (hardware `f64`), [`ExtendedRealm`]
//! (compensated double-double arithmetic), and [`ArbitraryRealm`] (software
//! arbitrary-precision via `dashu`). No component outside this crate knows
//! which realisation is in use; callers select one [`PrecisionMode`] at
//! render start and monomorphize over it.

mod double_double;
mod realm;

pub use double_double::DoubleDouble;
pub use realm::{ArbitraryRealm, Complex, ExtendedRealm, PrecisionRealm, StandardRealm};

use thiserror::Error;

/// Smallest and largest permitted arbitrary-precision significand widths (§3).
pub const MP_BITS_MIN: u32 = 1;
pub const MP_BITS_MAX: u32 = 16_384;
pub const MP_BITS_DEFAULT: u32 = 128;

/// Selects which [`PrecisionRealm`] a render uses. Carried on the plot
/// context rather than stored globally, per the design note in spec §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionMode {
    Standard,
    Extended,
    Arbitrary { significand_bits: u32 },
}

impl PrecisionMode {
    /// Validates an arbitrary-precision bit width against the §3 bounds.
    pub fn arbitrary(significand_bits: u32) -> Result<Self, PrecisionError> {
        if !(MP_BITS_MIN..=MP_BITS_MAX).contains(&significand_bits) {
            return Err(PrecisionError::BitsOutOfRange(significand_bits));
        }
        Ok(Self::Arbitrary { significand_bits })
    }
}

#[derive(Debug, Error)]
pub enum PrecisionError {
    #[error("significand bit width {0} is outside the permitted range [{MP_BITS_MIN}, {MP_BITS_MAX}]")]
    BitsOutOfRange(u32),
    #[error("the requested precision is not supported in this build")]
    Unsupported,
}
