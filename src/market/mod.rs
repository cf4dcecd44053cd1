//! Market data container used by all pricing engines.

use serde::{Deserialize, Serialize};

use crate::core::PricingError;

/// Market snapshot: spot, flat risk-free rate, and flat volatility.
///
/// Built through [`Market::builder`], which validates once so engines can
/// treat the fields as well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Spot price.
    pub spot: f64,
    /// Continuously compounded risk-free rate.
    pub rate: f64,
    /// Annualized volatility.
    pub vol: f64,
}

impl Market {
    /// Starts a market builder.
    ///
    /// # Examples
    /// ```
    /// use openlattice::market::Market;
    ///
    /// let market = Market::builder()
    ///     .spot(100.0)
    ///     .rate(0.03)
    ///     .flat_vol(0.20)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(market.spot(), 100.0);
    /// ```
    #[inline]
    pub fn builder() -> MarketBuilder {
        MarketBuilder::default()
    }

    /// Returns spot price.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Returns risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns volatility.
    #[inline]
    pub fn vol(&self) -> f64 {
        self.vol
    }

    /// Returns a copy of this snapshot with the spot shifted by `bump`.
    ///
    /// Used by finite-difference sensitivity estimators; the shifted spot
    /// must remain positive.
    pub fn with_spot_bump(&self, bump: f64) -> Result<Self, PricingError> {
        let spot = self.spot + bump;
        if spot <= 0.0 {
            return Err(PricingError::InvalidInput(
                "bumped market spot must be > 0".to_string(),
            ));
        }
        Ok(Self { spot, ..*self })
    }
}

/// Builder for [`Market`].
#[derive(Debug, Clone, Default)]
pub struct MarketBuilder {
    spot: Option<f64>,
    rate: Option<f64>,
    flat_vol: Option<f64>,
}

impl MarketBuilder {
    /// Sets the spot price.
    #[inline]
    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = Some(spot);
        self
    }

    /// Sets the flat risk-free rate.
    #[inline]
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Sets the flat volatility.
    #[inline]
    pub fn flat_vol(mut self, vol: f64) -> Self {
        self.flat_vol = Some(vol);
        self
    }

    /// Validates and builds a [`Market`].
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] when spot is missing or
    /// non-positive, when volatility is missing or negative, or when any
    /// field is non-finite. Zero volatility is accepted: it parameterizes a
    /// deterministic (degenerate) lattice rather than an invalid one.
    pub fn build(self) -> Result<Market, PricingError> {
        let spot = self
            .spot
            .ok_or_else(|| PricingError::InvalidInput("market spot is required".to_string()))?;
        if !spot.is_finite() || spot <= 0.0 {
            return Err(PricingError::InvalidInput(
                "market spot must be > 0".to_string(),
            ));
        }

        let rate = self.rate.unwrap_or(0.0);
        if !rate.is_finite() {
            return Err(PricingError::InvalidInput(
                "market rate must be finite".to_string(),
            ));
        }

        let vol = self
            .flat_vol
            .ok_or_else(|| PricingError::InvalidInput("market flat_vol is required".to_string()))?;
        if !vol.is_finite() || vol < 0.0 {
            return Err(PricingError::InvalidInput(
                "market flat_vol must be >= 0".to_string(),
            ));
        }

        Ok(Market { spot, rate, vol })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_spot_and_vol() {
        assert!(Market::builder().rate(0.05).flat_vol(0.2).build().is_err());
        assert!(Market::builder().spot(100.0).rate(0.05).build().is_err());
    }

    #[test]
    fn builder_rejects_non_positive_spot() {
        for spot in [0.0, -1.0, f64::NAN] {
            assert!(
                Market::builder()
                    .spot(spot)
                    .rate(0.05)
                    .flat_vol(0.2)
                    .build()
                    .is_err()
            );
        }
    }

    #[test]
    fn builder_rejects_negative_vol_but_accepts_zero() {
        assert!(
            Market::builder()
                .spot(100.0)
                .flat_vol(-0.1)
                .build()
                .is_err()
        );
        let market = Market::builder().spot(100.0).flat_vol(0.0).build().unwrap();
        assert_eq!(market.vol(), 0.0);
        assert_eq!(market.rate(), 0.0);
    }

    #[test]
    fn spot_bump_preserves_rate_and_vol() {
        let market = Market::builder()
            .spot(100.0)
            .rate(0.05)
            .flat_vol(0.2)
            .build()
            .unwrap();
        let bumped = market.with_spot_bump(1.0).unwrap();
        assert_eq!(bumped.spot, 101.0);
        assert_eq!(bumped.rate, market.rate);
        assert_eq!(bumped.vol, market.vol);

        assert!(market.with_spot_bump(-100.0).is_err());
    }
}
