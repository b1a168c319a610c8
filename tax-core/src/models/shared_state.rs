use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allowances::Allowances;
use super::insurance::InsuranceOptions;
use super::law::LawVersion;
use super::region::RegionType;
use super::tax_input::{OtherDeductions, TaxInput};

/// Inputs shared by every calculator view in a session. GROSS is the
/// authoritative figure; views that work from NET convert back to GROSS
/// before publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedTaxState {
    pub law: LawVersion,
    pub gross_income: Decimal,
    pub dependents: u32,
    pub has_insurance: bool,
    pub region: RegionType,
    pub declared_salary: Option<Decimal>,
    pub allowances: Allowances,
    pub insurance_options: InsuranceOptions,
}

impl Default for SharedTaxState {
    fn default() -> Self {
        Self {
            law: LawVersion::default(),
            gross_income: Decimal::ZERO,
            dependents: 0,
            has_insurance: true,
            region: RegionType::I,
            declared_salary: None,
            allowances: Allowances::default(),
            insurance_options: InsuranceOptions::all(),
        }
    }
}

impl SharedTaxState {
    /// Calculation input for this state. Ad-hoc deductions are per-view and
    /// not part of the shared state.
    pub fn to_input(
        &self,
        other_deductions: OtherDeductions,
    ) -> TaxInput {
        TaxInput {
            gross_income: self.gross_income,
            dependents: self.dependents,
            has_insurance: self.has_insurance,
            insurance_options: Some(self.insurance_options),
            region: self.region,
            other_deductions,
            declared_salary: self.declared_salary,
            allowances: (!self.allowances.is_empty()).then_some(self.allowances),
        }
    }
}
