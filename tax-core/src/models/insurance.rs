use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-fund switches for the three mandatory insurance funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceOptions {
    /// Social insurance.
    pub bhxh: bool,
    /// Health insurance.
    pub bhyt: bool,
    /// Unemployment insurance.
    pub bhtn: bool,
}

impl InsuranceOptions {
    pub fn all() -> Self {
        Self {
            bhxh: true,
            bhyt: true,
            bhtn: true,
        }
    }
}

impl Default for InsuranceOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Contribution per fund for one side (employee or employer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FundContributions {
    pub bhxh: Decimal,
    pub bhyt: Decimal,
    pub bhtn: Decimal,
    pub total: Decimal,
}

impl FundContributions {
    pub fn new(
        bhxh: Decimal,
        bhyt: Decimal,
        bhtn: Decimal,
    ) -> Self {
        Self {
            bhxh,
            bhyt,
            bhtn,
            total: bhxh + bhyt + bhtn,
        }
    }
}

/// Insurance breakdown for one wage base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceDetail {
    /// Salary the contributions were computed on (actual or declared).
    pub wage_base: Decimal,
    /// Base after the 20× statutory base salary cap (BHXH, BHYT).
    pub social_health_base: Decimal,
    /// Base after the 20× regional minimum wage cap (BHTN).
    pub unemployment_base: Decimal,
    pub options: InsuranceOptions,
    pub employee: FundContributions,
    pub employer: FundContributions,
}

impl InsuranceDetail {
    /// Employee-side total, the amount deducted from pay.
    pub fn employee_total(&self) -> Decimal {
        self.employee.total
    }

    pub fn employer_total(&self) -> Decimal {
        self.employer.total
    }
}
