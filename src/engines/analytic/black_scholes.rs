//! Analytic Black-Scholes pricing for European vanilla options.
//!
//! Zero-dividend closed forms. The numerical engines use this module as
//! their convergence reference: the lattice price approaches [`bs_price`]
//! as the step count grows, and the Monte Carlo estimate approaches it as
//! the path count grows.

use std::collections::HashMap;

use crate::core::{
    ExerciseStyle, Greeks, OptionType, PricingEngine, PricingError, PricingResult, SpotSensitivity,
};
use crate::instruments::vanilla::VanillaOption;
use crate::market::Market;
use crate::math::{normal_cdf, normal_pdf};

#[inline]
fn d1_d2(spot: f64, strike: f64, rate: f64, vol: f64, expiry: f64) -> (f64, f64) {
    let sig_sqrt_t = vol * expiry.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * expiry) / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

/// Black-Scholes present value.
///
/// `expiry <= 0` returns the immediate payoff; `vol <= 0` returns the
/// discounted payoff of the deterministic forward.
#[inline]
pub fn bs_price(option_type: OptionType, spot: f64, strike: f64, rate: f64, vol: f64, expiry: f64) -> f64 {
    if expiry <= 0.0 {
        return option_type.payoff(spot, strike);
    }
    let df = (-rate * expiry).exp();
    if vol <= 0.0 {
        return match option_type {
            OptionType::Call => (spot - strike * df).max(0.0),
            OptionType::Put => (strike * df - spot).max(0.0),
        };
    }

    let (d1, d2) = d1_d2(spot, strike, rate, vol, expiry);
    match option_type {
        OptionType::Call => spot * normal_cdf(d1) - strike * df * normal_cdf(d2),
        OptionType::Put => strike * df * normal_cdf(-d2) - spot * normal_cdf(-d1),
    }
}

/// Black-Scholes spot delta.
#[inline]
pub fn bs_delta(option_type: OptionType, spot: f64, strike: f64, rate: f64, vol: f64, expiry: f64) -> f64 {
    if expiry <= 0.0 || vol <= 0.0 {
        return 0.0;
    }
    let (d1, _) = d1_d2(spot, strike, rate, vol, expiry);
    match option_type {
        OptionType::Call => normal_cdf(d1),
        OptionType::Put => normal_cdf(d1) - 1.0,
    }
}

/// Black-Scholes spot gamma (identical for calls and puts).
#[inline]
pub fn bs_gamma(spot: f64, strike: f64, rate: f64, vol: f64, expiry: f64) -> f64 {
    if expiry <= 0.0 || vol <= 0.0 || spot <= 0.0 {
        return 0.0;
    }
    let (d1, _) = d1_d2(spot, strike, rate, vol, expiry);
    normal_pdf(d1) / (spot * vol * expiry.sqrt())
}

/// Analytic Black-Scholes engine for European vanilla options.
#[derive(Debug, Clone, Default)]
pub struct BlackScholesEngine;

impl BlackScholesEngine {
    /// Creates a Black-Scholes engine instance.
    pub fn new() -> Self {
        Self
    }

    fn require_european(instrument: &VanillaOption) -> Result<(), PricingError> {
        if instrument.exercise != ExerciseStyle::European {
            return Err(PricingError::InvalidInput(
                "black-scholes engine supports European exercise only".to_string(),
            ));
        }
        Ok(())
    }

    /// Closed-form spot gamma.
    pub fn gamma(&self, instrument: &VanillaOption, market: &Market) -> Result<f64, PricingError> {
        instrument.validate()?;
        Self::require_european(instrument)?;
        Ok(bs_gamma(
            market.spot,
            instrument.strike,
            market.rate,
            market.vol,
            instrument.expiry,
        ))
    }
}

impl PricingEngine<VanillaOption> for BlackScholesEngine {
    fn price(
        &self,
        instrument: &VanillaOption,
        market: &Market,
    ) -> Result<PricingResult, PricingError> {
        instrument.validate()?;
        Self::require_european(instrument)?;

        let price = bs_price(
            instrument.option_type,
            market.spot,
            instrument.strike,
            market.rate,
            market.vol,
            instrument.expiry,
        );
        let greeks = Greeks {
            delta: bs_delta(
                instrument.option_type,
                market.spot,
                instrument.strike,
                market.rate,
                market.vol,
                instrument.expiry,
            ),
            gamma: bs_gamma(
                market.spot,
                instrument.strike,
                market.rate,
                market.vol,
                instrument.expiry,
            ),
        };

        Ok(PricingResult {
            price,
            stderr: None,
            greeks: Some(greeks),
            diagnostics: HashMap::new(),
        })
    }
}

impl SpotSensitivity<VanillaOption> for BlackScholesEngine {
    fn delta(&self, instrument: &VanillaOption, market: &Market) -> Result<f64, PricingError> {
        instrument.validate()?;
        Self::require_european(instrument)?;
        Ok(bs_delta(
            instrument.option_type,
            market.spot,
            instrument.strike,
            market.rate,
            market.vol,
            instrument.expiry,
        ))
    }
}
