use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monthly allowances paid on top of base salary. They are part of gross
/// income; some are partially or fully exempt from PIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Allowances {
    /// Meal allowance, exempt up to a monthly ceiling.
    pub meal: Decimal,
    /// Uniform allowance, exempt up to an annual ceiling.
    pub uniform: Decimal,
    /// Phone allowance paid under company policy, fully exempt.
    pub phone: Decimal,
    /// Hazardous-work allowance, fully exempt.
    pub hazardous: Decimal,
    /// Any other allowance, fully taxable.
    pub other: Decimal,
}

impl Allowances {
    pub fn total(&self) -> Decimal {
        self.meal + self.uniform + self.phone + self.hazardous + self.other
    }

    pub fn is_empty(&self) -> bool {
        self.total() == Decimal::ZERO
    }
}
