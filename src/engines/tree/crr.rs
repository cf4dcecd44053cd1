//! Cox-Ross-Rubinstein binomial lattice engine.
//!
//! References: Hull (11th ed.) Ch. 13, Cox-Ross-Rubinstein (1979), and the
//! backward-induction recursion around Eq. (13.10).
//!
//! The lattice is recombining: with `u * d = 1`, a node reached by `j`
//! up-moves and `i - j` down-moves has the single spot value
//! `S * u^j * d^(i-j)` regardless of path, which bounds the induction to
//! O(steps^2) work over one `Vec<f64>` buffer of length `steps + 1`.
//!
//! Spot sensitivities are finite differences over neighboring lattice
//! nodes: the backward induction already passes through the depth-1 and
//! depth-2 value rows, so delta and gamma cost nothing beyond the price.
//! Node values carry full remaining-life dynamics (they are induction
//! values, not bare payoffs), so the same estimator serves European and
//! American styles. No sibling-lattice reconstruction is offered.

use std::collections::HashMap;

use crate::core::{
    ExerciseStyle, Greeks, PricingEngine, PricingError, PricingResult, SpotSensitivity,
};
use crate::instruments::vanilla::VanillaOption;
use crate::market::Market;

/// Threshold below which `u - d` is treated as zero when deriving the
/// risk-neutral probability.
pub const PROBABILITY_EPS: f64 = 1e-12;

/// Derived lattice constants for one pricing pass.
///
/// Fixed at derivation; every engine call re-derives from the market and
/// instrument so parameters can never drift from their inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrrParams {
    /// Time step in years.
    pub dt: f64,
    /// Up multiplier `exp(vol * sqrt(dt))`.
    pub u: f64,
    /// Down multiplier `1 / u`.
    pub d: f64,
    /// Risk-neutral up probability, clamped to [0, 1].
    pub p: f64,
    /// Per-step discount factor `exp(-rate * dt)`.
    pub discount: f64,
}

impl CrrParams {
    /// Derives lattice constants from market inputs.
    ///
    /// `dt == 0` (zero expiry) parameterizes a flat lattice: `u = d = 1`,
    /// `p = 0.5`, so the induction collapses to the immediate payoff
    /// instead of producing NaN from `sqrt(0)` pathologies. The same
    /// `p = 0.5` fallback applies whenever `|u - d|` falls below
    /// [`PROBABILITY_EPS`]; at that point every node in a level carries the
    /// same spot value and the induction is insensitive to `p`.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] when `steps == 0`, `vol < 0`,
    /// or `expiry < 0`.
    pub fn derive(rate: f64, vol: f64, expiry: f64, steps: usize) -> Result<Self, PricingError> {
        if steps == 0 {
            return Err(PricingError::InvalidInput(
                "lattice steps must be > 0".to_string(),
            ));
        }
        if vol < 0.0 {
            return Err(PricingError::InvalidInput(
                "volatility must be >= 0".to_string(),
            ));
        }
        if expiry < 0.0 {
            return Err(PricingError::InvalidInput(
                "expiry must be >= 0".to_string(),
            ));
        }

        let dt = expiry / steps as f64;
        let discount = (-rate * dt).exp();

        if dt == 0.0 {
            return Ok(Self {
                dt,
                u: 1.0,
                d: 1.0,
                p: 0.5,
                discount,
            });
        }

        let u = (vol * dt.sqrt()).exp();
        let d = 1.0 / u;
        let denom = u - d;
        let p = if denom.abs() < PROBABILITY_EPS {
            0.5
        } else {
            // Extreme drift can push the raw ratio outside [0, 1].
            (((rate * dt).exp() - d) / denom).clamp(0.0, 1.0)
        };

        Ok(Self { dt, u, d, p, discount })
    }

    /// True when the lattice has no node spread (`u == d` within
    /// [`PROBABILITY_EPS`]): zero expiry or zero volatility.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        (self.u - self.d).abs() < PROBABILITY_EPS
    }
}

/// Cox-Ross-Rubinstein binomial tree engine.
#[derive(Debug, Clone)]
pub struct BinomialTreeEngine {
    /// Number of tree steps.
    pub steps: usize,
}

/// Lattice values retained from one backward-induction pass.
///
/// `first` holds the depth-1 pair `[down, up]`; `second` the depth-2
/// triple `[dd, ud, uu]` (absent when the tree has a single step).
struct LatticeSolution {
    params: CrrParams,
    spot: f64,
    root: f64,
    first: [f64; 2],
    second: Option<[f64; 3]>,
}

impl LatticeSolution {
    fn delta(&self) -> Result<f64, PricingError> {
        if self.params.is_degenerate() {
            return Err(PricingError::NumericalError(
                "lattice node spread is zero; delta is undefined".to_string(),
            ));
        }
        let spread = self.spot * (self.params.u - self.params.d);
        Ok((self.first[1] - self.first[0]) / spread)
    }

    fn gamma(&self) -> Result<f64, PricingError> {
        let [v_dd, v_ud, v_uu] = self.second.ok_or_else(|| {
            PricingError::InvalidInput("gamma requires at least 2 lattice steps".to_string())
        })?;
        if self.params.is_degenerate() {
            return Err(PricingError::NumericalError(
                "lattice node spread is zero; gamma is undefined".to_string(),
            ));
        }

        let (u, d) = (self.params.u, self.params.d);
        let s_uu = self.spot * u * u;
        let s_ud = self.spot * u * d;
        let s_dd = self.spot * d * d;

        let delta_up = (v_uu - v_ud) / (s_uu - s_ud);
        let delta_down = (v_ud - v_dd) / (s_ud - s_dd);
        Ok((delta_up - delta_down) / (self.spot * (u - d)))
    }

    fn greeks(&self) -> Option<Greeks> {
        match (self.delta(), self.gamma()) {
            (Ok(delta), Ok(gamma)) => Some(Greeks { delta, gamma }),
            _ => None,
        }
    }
}

impl BinomialTreeEngine {
    /// Creates a tree engine with the given number of steps.
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }

    /// Runs terminal-payoff construction plus backward induction, retaining
    /// the first two value rows for the sensitivity estimators.
    fn solve(
        &self,
        instrument: &VanillaOption,
        market: &Market,
    ) -> Result<LatticeSolution, PricingError> {
        instrument.validate()?;
        let params = CrrParams::derive(market.rate, market.vol, instrument.expiry, self.steps)?;

        let n = self.steps;
        let spot = market.spot;
        let strike = instrument.strike;
        let kind = instrument.option_type;
        let american = instrument.exercise == ExerciseStyle::American;

        // Multiplicative recurrence replaces per-node powf calls:
        // spot * u^j * d^(n-j) = spot * d^n * (u/d)^j.
        let ratio = params.u / params.d;
        let disc_up = params.discount * params.p;
        let disc_down = params.discount * (1.0 - params.p);

        let mut values = vec![0.0_f64; n + 1];
        {
            let mut st = spot * params.d.powi(n as i32);
            for value in values.iter_mut() {
                *value = kind.payoff(st, strike);
                st *= ratio;
            }
        }

        // Correct as-is for n == 1 / n == 2 (the terminal row is the
        // depth-1 / depth-2 row); overwritten during induction otherwise.
        let mut first = [values[0], values[1]];
        let mut second = (n == 2).then(|| [values[0], values[1], values[2]]);

        let mut base = spot * params.d.powi(n as i32 - 1);
        for i in (0..n).rev() {
            if american {
                let mut st = base;
                for j in 0..=i {
                    let hold = disc_up.mul_add(values[j + 1], disc_down * values[j]);
                    values[j] = hold.max(kind.payoff(st, strike));
                    st *= ratio;
                }
            } else {
                for j in 0..=i {
                    values[j] = disc_up.mul_add(values[j + 1], disc_down * values[j]);
                }
            }

            if i == 2 {
                second = Some([values[0], values[1], values[2]]);
            } else if i == 1 {
                first = [values[0], values[1]];
            }
            base *= params.u;
        }

        Ok(LatticeSolution {
            params,
            spot,
            root: values[0],
            first,
            second,
        })
    }

    /// Lattice delta from the depth-1 node pair:
    /// `(V_up - V_down) / (S*u - S*d)`.
    ///
    /// # Errors
    /// Construction-time validation failures, plus
    /// [`PricingError::NumericalError`] on a degenerate lattice
    /// (zero expiry or zero volatility).
    pub fn delta(&self, instrument: &VanillaOption, market: &Market) -> Result<f64, PricingError> {
        self.solve(instrument, market)?.delta()
    }

    /// Lattice gamma from the depth-2 node triple: the change in one-step
    /// delta across the up and down subtrees divided by the depth-1 spot
    /// spread.
    ///
    /// # Errors
    /// As [`BinomialTreeEngine::delta`], plus
    /// [`PricingError::InvalidInput`] when the engine has fewer than 2
    /// steps.
    pub fn gamma(&self, instrument: &VanillaOption, market: &Market) -> Result<f64, PricingError> {
        self.solve(instrument, market)?.gamma()
    }
}

impl PricingEngine<VanillaOption> for BinomialTreeEngine {
    fn price(
        &self,
        instrument: &VanillaOption,
        market: &Market,
    ) -> Result<PricingResult, PricingError> {
        let solution = self.solve(instrument, market)?;
        let greeks = solution.greeks();

        let mut diagnostics = HashMap::new();
        diagnostics.insert("num_steps".to_string(), self.steps as f64);
        diagnostics.insert("dt".to_string(), solution.params.dt);
        diagnostics.insert("u".to_string(), solution.params.u);
        diagnostics.insert("d".to_string(), solution.params.d);
        diagnostics.insert("p".to_string(), solution.params.p);
        diagnostics.insert("discount_factor".to_string(), solution.params.discount);

        Ok(PricingResult {
            price: solution.root,
            stderr: None,
            greeks,
            diagnostics,
        })
    }
}

impl SpotSensitivity<VanillaOption> for BinomialTreeEngine {
    fn delta(&self, instrument: &VanillaOption, market: &Market) -> Result<f64, PricingError> {
        BinomialTreeEngine::delta(self, instrument, market)
    }
}
