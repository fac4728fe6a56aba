//! Pricing calculations for the margin calculator form.
//!
//! The solver deduces the missing pricing quantities from whatever the
//! operator typed, then formats everything back into display strings.

pub mod common;
pub mod parse;
pub mod solver;

pub use solver::{PricingSolver, Quantities, Resolution, SolveError, SolverConfig, solve};
