//! CSV loaders for the dated tables the calculator runs on: regional wage
//! periods and PIT bracket schedules.

mod error;
mod loader;

pub use error::TableLoaderError;
pub use loader::{BracketRecord, BracketScheduleLoader, WagePeriodRecord, WageTableLoader};
