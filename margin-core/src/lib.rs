pub mod calculations;
pub mod models;

pub use calculations::{PricingSolver, Resolution, SolveError, SolverConfig, solve};
pub use models::*;
