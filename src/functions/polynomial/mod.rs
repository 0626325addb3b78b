//! Polynomial layer of the expression model.
//!
//! Expand, Power, Substitute, Evaluate, D, FindRoot.

mod calculus;
mod evaluate;
mod expand;
mod substitute;

pub use calculus::*;
pub use evaluate::*;
pub use expand::*;
pub use substitute::*;
