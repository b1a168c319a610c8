use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::insurance::InsuranceDetail;

/// Income taxed within one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdownItem {
    /// 1-based bracket number.
    pub level: usize,
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
    pub taxable_amount: Decimal,
    pub tax: Decimal,
}

/// Itemised deductions from assessable income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    pub personal: Decimal,
    pub dependent: Decimal,
    pub insurance: Decimal,
    /// Voluntary pension (after its ceiling) plus charity.
    pub other: Decimal,
    pub total: Decimal,
}

/// Complete outcome of one monthly PIT calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub gross_income: Decimal,
    /// Allowance amounts excluded from taxable income.
    pub exempt_income: Decimal,
    pub deductions: DeductionBreakdown,
    pub total_deductions: Decimal,
    pub taxable_income: Decimal,
    pub tax_amount: Decimal,
    pub net_income: Decimal,
    /// Tax as a percentage of gross, two decimal places.
    pub effective_rate: Decimal,
    pub tax_breakdown: Vec<TaxBreakdownItem>,
    /// `None` when the employee is uninsured.
    pub insurance_detail: Option<InsuranceDetail>,
}

impl TaxResult {
    /// Employee-side insurance withheld from pay.
    pub fn insurance_amount(&self) -> Decimal {
        self.insurance_detail
            .as_ref()
            .map_or(Decimal::ZERO, InsuranceDetail::employee_total)
    }

    /// What the employer pays in total: gross plus employer contributions.
    pub fn employer_cost(&self) -> Decimal {
        self.gross_income
            + self
                .insurance_detail
                .as_ref()
                .map_or(Decimal::ZERO, InsuranceDetail::employer_total)
    }
}

/// Condensed GROSS/NET summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossNetResult {
    pub gross: Decimal,
    pub net: Decimal,
    pub insurance: Decimal,
    pub tax: Decimal,
    pub deductions: Decimal,
    pub taxable_income: Decimal,
}

impl From<&TaxResult> for GrossNetResult {
    fn from(result: &TaxResult) -> Self {
        Self {
            gross: result.gross_income,
            net: result.net_income,
            insurance: result.insurance_amount(),
            tax: result.tax_amount,
            deductions: result.total_deductions,
            taxable_income: result.taxable_income,
        }
    }
}
