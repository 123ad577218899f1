//! Currency codes and major/minor-unit conversion.
//!
//! Balances are stored as integers in the smallest currency unit ("cents")
//! to avoid floating-point drift. Amounts crossing the engine boundary are
//! expressed in major units; the conversion happens here and nowhere else.

use serde::{Deserialize, Serialize};

/// Minor units per major unit for all supported (two-decimal) currencies.
pub const MINOR_UNITS_PER_MAJOR: u64 = 100;

/// Supported currency codes (closed enumeration).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Ngn,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Ngn => "NGN",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Convert a major-unit amount to minor units.
///
/// Returns `None` on overflow; callers surface that as a domain error
/// rather than wrapping.
pub fn to_minor_units(major: u64) -> Option<u64> {
    major.checked_mul(MINOR_UNITS_PER_MAJOR)
}

/// Convert a minor-unit amount back to major units for display.
///
/// All mutations move whole major units, so stored balances stay exact
/// multiples of [`MINOR_UNITS_PER_MAJOR`] and this division never loses
/// value.
pub fn to_major_units(minor: u64) -> u64 {
    minor / MINOR_UNITS_PER_MAJOR
}
