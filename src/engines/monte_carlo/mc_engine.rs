//! Monte Carlo pricing for European vanilla options under GBM.
//!
//! References: Glasserman (2004), Hull (11th ed.) Ch. 25.
//!
//! A vanilla payoff depends only on the terminal spot, so each path is a
//! single exact GBM draw `S_T = S * exp((r - sigma^2/2) T + sigma sqrt(T) Z)`
//! rather than a time-stepped trajectory. Every path owns an independent
//! RNG stream keyed off the engine seed, so a fixed seed reproduces the
//! price bit-for-bit whether or not the `parallel` feature fans the paths
//! out across threads.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{
    ExerciseStyle, PricingEngine, PricingError, PricingResult, SpotSensitivity,
};
use crate::instruments::vanilla::VanillaOption;
use crate::market::Market;

/// SplitMix64 finalizer; keeps per-path streams decorrelated.
#[inline]
fn stream_seed(base: u64, index: u64) -> u64 {
    let mut z = base ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Monte Carlo pricing engine for European vanilla options.
#[derive(Debug, Clone)]
pub struct MonteCarloPricingEngine {
    /// Number of simulated paths.
    pub num_paths: usize,
    /// RNG seed.
    pub seed: u64,
    /// Enables antithetic variates for lower estimator variance.
    pub antithetic: bool,
    /// Relative spot bump used by the finite-difference delta.
    pub spot_bump_rel: f64,
}

impl MonteCarloPricingEngine {
    /// Creates an engine with the given path count and seed.
    pub fn new(num_paths: usize, seed: u64) -> Self {
        Self {
            num_paths,
            seed,
            antithetic: false,
            spot_bump_rel: 1.0e-2,
        }
    }

    /// Enables/disables antithetic variates.
    pub fn with_antithetic(mut self, antithetic: bool) -> Self {
        self.antithetic = antithetic;
        self
    }

    /// Sets the relative bump used in delta estimation.
    pub fn with_spot_bump_rel(mut self, spot_bump_rel: f64) -> Self {
        self.spot_bump_rel = spot_bump_rel.max(1.0e-6);
        self
    }

    fn validate(&self, instrument: &VanillaOption) -> Result<(), PricingError> {
        instrument.validate()?;
        if instrument.exercise != ExerciseStyle::European {
            return Err(PricingError::InvalidInput(
                "monte carlo engine supports European exercise only".to_string(),
            ));
        }
        if self.num_paths == 0 {
            return Err(PricingError::InvalidInput(
                "num_paths must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Estimates delta by central finite difference with common random
    /// numbers: both bumped prices reuse the engine seed, so the sampling
    /// noise cancels in the difference and only the bump bias remains.
    pub fn delta(&self, instrument: &VanillaOption, market: &Market) -> Result<f64, PricingError> {
        self.validate(instrument)?;

        let bump = self.spot_bump_rel.max(1.0e-6) * market.spot;
        let up = self.price(instrument, &market.with_spot_bump(bump)?)?.price;
        let down = self.price(instrument, &market.with_spot_bump(-bump)?)?.price;
        Ok((up - down) / (2.0 * bump))
    }
}

impl PricingEngine<VanillaOption> for MonteCarloPricingEngine {
    fn price(
        &self,
        instrument: &VanillaOption,
        market: &Market,
    ) -> Result<PricingResult, PricingError> {
        self.validate(instrument)?;

        let expiry = instrument.expiry;
        if expiry == 0.0 {
            return Ok(PricingResult {
                price: instrument.option_type.payoff(market.spot, instrument.strike),
                stderr: Some(0.0),
                greeks: None,
                diagnostics: HashMap::new(),
            });
        }

        let spot = market.spot;
        let strike = instrument.strike;
        let kind = instrument.option_type;
        let drift = (market.rate - 0.5 * market.vol * market.vol) * expiry;
        let vol_term = market.vol * expiry.sqrt();
        let antithetic = self.antithetic;
        let seed = self.seed;

        let samples = if antithetic {
            self.num_paths.div_ceil(2)
        } else {
            self.num_paths
        } as u64;

        // Per-sample contribution: (payoff, payoff^2) for the running
        // mean/variance accumulators.
        let draw = move |i: u64| -> (f64, f64) {
            let mut rng = StdRng::seed_from_u64(stream_seed(seed, i));
            let z: f64 = StandardNormal.sample(&mut rng);

            let x = kind.payoff(spot * (drift + vol_term * z).exp(), strike);
            let x = if antithetic {
                let xa = kind.payoff(spot * (drift - vol_term * z).exp(), strike);
                0.5 * (x + xa)
            } else {
                x
            };
            (x, x * x)
        };

        #[cfg(feature = "parallel")]
        let (sum, sum_sq) = (0..samples)
            .into_par_iter()
            .map(draw)
            .reduce(|| (0.0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1));

        #[cfg(not(feature = "parallel"))]
        let (sum, sum_sq) = (0..samples)
            .map(draw)
            .fold((0.0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1));

        let n = samples as f64;
        let mean = sum / n;
        let var = if n > 1.0 {
            ((sum_sq - sum * sum / n) / (n - 1.0)).max(0.0)
        } else {
            0.0
        };

        let discount = (-market.rate * expiry).exp();
        let price = discount * mean;
        let stderr = discount * (var / n).sqrt();

        let mut diagnostics = HashMap::new();
        diagnostics.insert("num_paths".to_string(), self.num_paths as f64);
        diagnostics.insert(
            "antithetic".to_string(),
            if antithetic { 1.0 } else { 0.0 },
        );
        diagnostics.insert("discount_factor".to_string(), discount);

        Ok(PricingResult {
            price,
            stderr: Some(stderr),
            greeks: None,
            diagnostics,
        })
    }
}

impl SpotSensitivity<VanillaOption> for MonteCarloPricingEngine {
    fn delta(&self, instrument: &VanillaOption, market: &Market) -> Result<f64, PricingError> {
        MonteCarloPricingEngine::delta(self, instrument, market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::analytic::black_scholes::{bs_delta, bs_price};
    use crate::core::OptionType;
    use approx::assert_abs_diff_eq;

    fn market() -> Market {
        Market::builder()
            .spot(100.0)
            .rate(0.05)
            .flat_vol(0.2)
            .build()
            .expect("valid market")
    }

    #[test]
    fn mc_call_converges_to_black_scholes() {
        let option = VanillaOption::european_call(100.0, 1.0);
        let result = MonteCarloPricingEngine::new(100_000, 42)
            .price(&option, &market())
            .expect("mc pricing succeeds");

        let analytic = bs_price(OptionType::Call, 100.0, 100.0, 0.05, 0.2, 1.0);
        let stderr = result.stderr.expect("stderr present");
        assert!(stderr > 0.0);
        assert!(
            (result.price - analytic).abs() <= 4.0 * stderr + 0.05,
            "mc={} bs={} stderr={}",
            result.price,
            analytic,
            stderr
        );
    }

    #[test]
    fn mc_is_reproducible_for_a_fixed_seed() {
        let option = VanillaOption::european_put(95.0, 0.75);
        let engine = MonteCarloPricingEngine::new(20_000, 7);

        let a = engine.price(&option, &market()).unwrap().price;
        let b = engine.price(&option, &market()).unwrap().price;
        assert_eq!(a, b);

        let c = MonteCarloPricingEngine::new(20_000, 8)
            .price(&option, &market())
            .unwrap()
            .price;
        assert_ne!(a, c);
    }

    #[test]
    fn antithetic_reduces_standard_error() {
        let option = VanillaOption::european_call(100.0, 1.0);

        let plain = MonteCarloPricingEngine::new(100_000, 42)
            .price(&option, &market())
            .unwrap();
        let antithetic = MonteCarloPricingEngine::new(100_000, 42)
            .with_antithetic(true)
            .price(&option, &market())
            .unwrap();

        assert!(antithetic.stderr.unwrap() < plain.stderr.unwrap());
    }

    #[test]
    fn mc_delta_tracks_black_scholes_delta() {
        let option = VanillaOption::european_call(100.0, 1.0);
        let delta = MonteCarloPricingEngine::new(100_000, 42)
            .delta(&option, &market())
            .expect("delta succeeds");

        let analytic = bs_delta(OptionType::Call, 100.0, 100.0, 0.05, 0.2, 1.0);
        assert!(delta > 0.0 && delta < 1.0);
        assert_abs_diff_eq!(delta, analytic, epsilon = 0.05);
    }

    #[test]
    fn zero_expiry_returns_immediate_payoff() {
        let option = VanillaOption::european_call(95.0, 0.0);
        let result = MonteCarloPricingEngine::new(1_000, 1)
            .price(&option, &market())
            .unwrap();
        assert_eq!(result.price, 5.0);
        assert_eq!(result.stderr, Some(0.0));
    }

    #[test]
    fn american_exercise_is_rejected() {
        let option = VanillaOption::american_put(100.0, 1.0);
        assert!(matches!(
            MonteCarloPricingEngine::new(1_000, 1).price(&option, &market()),
            Err(PricingError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_paths_are_rejected() {
        let option = VanillaOption::european_call(100.0, 1.0);
        assert!(
            MonteCarloPricingEngine::new(0, 1)
                .price(&option, &market())
                .is_err()
        );
    }
}
