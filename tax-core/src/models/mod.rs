mod allowances;
mod insurance;
mod law;
mod region;
mod shared_state;
mod tax_bracket;
mod tax_input;
mod tax_result;
mod wage_table;

pub use allowances::Allowances;
pub use insurance::{FundContributions, InsuranceDetail, InsuranceOptions};
pub use law::{DeductionConfig, LawVersion, TaxLaw};
pub use region::RegionType;
pub use shared_state::SharedTaxState;
pub use tax_bracket::{BracketTable, BracketTableError, TaxBracket};
pub use tax_input::{OtherDeductions, TaxInput};
pub use tax_result::{DeductionBreakdown, GrossNetResult, TaxBreakdownItem, TaxResult};
pub use wage_table::{WagePeriod, WageTable, WageTableError};
