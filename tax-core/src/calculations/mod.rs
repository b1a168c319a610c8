//! PIT and insurance calculations.
//!
//! Leaves first: [`brackets`] evaluates a progressive schedule,
//! [`deductions`] and [`insurance`] produce the amounts subtracted before
//! tax, and [`gross_net`] composes them in both directions.

pub mod allowances;
pub mod brackets;
pub mod common;
pub mod comparison;
pub mod deductions;
pub mod gross_net;
pub mod insurance;

pub use brackets::{BracketTax, TaxBracketEngine};
pub use comparison::{LawComparison, compare_laws};
pub use deductions::DeductionResolver;
pub use gross_net::{GrossNetConverter, ReverseSolution, SolverSettings, TaxCalculator};
pub use insurance::{FundRates, InsuranceCalculator, InsuranceRates};
