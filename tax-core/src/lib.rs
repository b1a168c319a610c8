pub mod calculations;
pub mod format;
pub mod models;
pub mod sanitize;
pub mod state;

pub use calculations::{GrossNetConverter, InsuranceCalculator, ReverseSolution, TaxCalculator};
pub use models::*;
