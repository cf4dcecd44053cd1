//! Tree-based pricing engines.

pub mod crr;

pub use crr::{BinomialTreeEngine, CrrParams};
