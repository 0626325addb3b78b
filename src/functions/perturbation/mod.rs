//! Perturbation-series pipeline.
//!
//! Series builder, power collector, triangular coefficient solver and the
//! end-to-end problem driver.

mod collect;
mod problem;
mod series;
mod solve;

pub use collect::*;
pub use problem::*;
pub use series::*;
pub use solve::*;
