//! Side-by-side evaluation of the old and new regimes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::gross_net::TaxCalculator;
use crate::calculations::insurance::InsuranceCalculator;
use crate::models::{TaxInput, TaxLaw, TaxResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawComparison {
    pub old: TaxResult,
    pub new: TaxResult,
    /// Old tax minus new tax; positive when the new law taxes less.
    pub tax_saving: Decimal,
    /// New net minus old net.
    pub net_gain: Decimal,
}

/// Runs `input` under both laws against the same wage period.
pub fn compare_laws(
    input: &TaxInput,
    old_law: &TaxLaw,
    new_law: &TaxLaw,
    insurance: &InsuranceCalculator,
) -> LawComparison {
    let old = TaxCalculator::new(old_law, insurance).calculate(input);
    let new = TaxCalculator::new(new_law, insurance).calculate(input);

    LawComparison {
        tax_saving: old.tax_amount - new.tax_amount,
        net_gain: new.net_income - old.net_income,
        old,
        new,
    }
}
