//! OpenLattice prices vanilla equity options with a Cox-Ross-Rubinstein
//! binomial lattice (European and American exercise) and a Monte Carlo
//! simulation engine (European exercise), sharing one instrument/market
//! vocabulary and one validation policy.
//!
//! The lattice engine is the core of the crate: a recombining tree built
//! from per-step up/down multipliers with `u * d = 1`, collapsed by
//! backward induction in O(steps^2), with spot sensitivities (delta and
//! gamma) read off neighboring lattice nodes. A closed-form Black-Scholes
//! engine is included as the convergence reference for both numerical
//! methods.
//!
//! References: Hull, *Options, Futures, and Other Derivatives* (11th ed.),
//! Ch. 13 for the lattice recursion and Ch. 25 for the Monte Carlo
//! estimator; Cox, Ross and Rubinstein (1979) for the parameterization.
//!
//! # Feature Flags
//! - `parallel`: enables Rayon-powered path fan-out in the Monte Carlo
//!   engine. Results are identical with and without it.
//!
//! # Quick Start
//! Price a European call on a 1000-step lattice:
//! ```rust
//! use openlattice::core::PricingEngine;
//! use openlattice::engines::tree::BinomialTreeEngine;
//! use openlattice::instruments::VanillaOption;
//! use openlattice::market::Market;
//!
//! let market = Market::builder()
//!     .spot(50.0)
//!     .rate(0.05)
//!     .flat_vol(0.30)
//!     .build()
//!     .unwrap();
//! let option = VanillaOption::european_call(52.0, 2.0);
//!
//! let result = BinomialTreeEngine::new(1000).price(&option, &market).unwrap();
//! assert!((result.price - 9.71).abs() < 0.2);
//! ```
//!
//! Lattice Greeks come from the same backward induction:
//! ```rust
//! use openlattice::engines::tree::BinomialTreeEngine;
//! use openlattice::instruments::VanillaOption;
//! use openlattice::market::Market;
//!
//! let market = Market::builder()
//!     .spot(100.0)
//!     .rate(0.05)
//!     .flat_vol(0.20)
//!     .build()
//!     .unwrap();
//! let option = VanillaOption::european_call(100.0, 1.0);
//! let engine = BinomialTreeEngine::new(500);
//!
//! let delta = engine.delta(&option, &market).unwrap();
//! let gamma = engine.gamma(&option, &market).unwrap();
//! assert!(delta > 0.0 && delta < 1.0 && gamma > 0.0);
//! ```

pub mod core;
pub mod engines;
pub mod instruments;
pub mod market;
pub mod math;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::engines::analytic::*;
    pub use crate::engines::monte_carlo::*;
    pub use crate::engines::tree::*;
    pub use crate::instruments::*;
    pub use crate::market::*;
}
