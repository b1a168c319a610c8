//! Tax-exempt portion of allowances.

use rust_decimal::Decimal;

use crate::calculations::common::{non_negative, round_vnd};
use crate::models::Allowances;

/// Monthly meal allowance that is exempt from PIT.
pub fn meal_exemption_cap() -> Decimal {
    Decimal::from(730_000)
}

/// Monthly share of the 5,000,000 VND annual uniform exemption.
pub fn uniform_exemption_cap() -> Decimal {
    round_vnd(Decimal::from(5_000_000) / Decimal::from(12))
}

/// Allowance income excluded from taxable income.
pub fn exempt_amount(allowances: &Allowances) -> Decimal {
    non_negative(allowances.meal).min(meal_exemption_cap())
        + non_negative(allowances.uniform).min(uniform_exemption_cap())
        + non_negative(allowances.phone)
        + non_negative(allowances.hazardous)
}
