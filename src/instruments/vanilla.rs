//! Canonical plain-vanilla option contract definition used throughout the
//! library.
//!
//! [`VanillaOption`] stores side, strike, expiry, and exercise rights
//! ([`crate::core::ExerciseStyle`]: European/American). Validation accepts
//! `expiry == 0` (immediate-expiry intrinsic-value edge case) and is the
//! single place where strike/expiry bounds are enforced; every engine calls
//! it before pricing.

use serde::{Deserialize, Serialize};

use crate::core::{ExerciseStyle, Instrument, OptionType, PricingError};

/// Vanilla option contract.
///
/// The canonical input for the lattice, Monte Carlo, and Black-Scholes
/// engines: strike `K`, expiry `T` in year fractions, option side, and
/// exercise rights.
///
/// # Examples
/// ```
/// use openlattice::core::{ExerciseStyle, OptionType};
/// use openlattice::instruments::VanillaOption;
///
/// let option = VanillaOption {
///     option_type: OptionType::Call,
///     strike: 100.0,
///     expiry: 1.0,
///     exercise: ExerciseStyle::European,
/// };
/// assert!(option.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VanillaOption {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike level.
    pub strike: f64,
    /// Expiry in years.
    pub expiry: f64,
    /// Exercise style.
    pub exercise: ExerciseStyle,
}

impl VanillaOption {
    /// Builds a European call option.
    pub fn european_call(strike: f64, expiry: f64) -> Self {
        Self {
            option_type: OptionType::Call,
            strike,
            expiry,
            exercise: ExerciseStyle::European,
        }
    }

    /// Builds a European put option.
    pub fn european_put(strike: f64, expiry: f64) -> Self {
        Self {
            option_type: OptionType::Put,
            strike,
            expiry,
            exercise: ExerciseStyle::European,
        }
    }

    /// Builds an American call option.
    pub fn american_call(strike: f64, expiry: f64) -> Self {
        Self {
            option_type: OptionType::Call,
            strike,
            expiry,
            exercise: ExerciseStyle::American,
        }
    }

    /// Builds an American put option.
    pub fn american_put(strike: f64, expiry: f64) -> Self {
        Self {
            option_type: OptionType::Put,
            strike,
            expiry,
            exercise: ExerciseStyle::American,
        }
    }

    /// Validates instrument fields.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] when `strike <= 0` or
    /// `expiry < 0`. `expiry == 0` is accepted to support immediate-expiry
    /// intrinsic-value pricing.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.strike <= 0.0 {
            return Err(PricingError::InvalidInput(
                "vanilla strike must be > 0".to_string(),
            ));
        }
        if self.expiry < 0.0 {
            return Err(PricingError::InvalidInput(
                "vanilla expiry must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Instrument for VanillaOption {
    fn instrument_type(&self) -> &str {
        "VanillaOption"
    }
}
