// Functions are organized by categories
pub mod perturbation;
pub mod polynomial;

// Re-export all function implementations
pub use perturbation::*;
pub use polynomial::*;
