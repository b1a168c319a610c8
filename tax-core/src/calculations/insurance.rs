//! Mandatory social (BHXH), health (BHYT) and unemployment (BHTN) insurance.
//!
//! BHXH and BHYT are charged on salary up to 20× the statutory base salary;
//! BHTN on salary up to 20× the regional minimum wage. Both figures come
//! from a date-keyed [`WageTable`]; a calculator resolves the date once at
//! construction so every figure it produces uses the same period.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use tax_core::{InsuranceOptions, RegionType, WageTable};
//! use tax_core::calculations::InsuranceCalculator;
//!
//! let as_of = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
//! let calculator = InsuranceCalculator::new(&WageTable::builtin(), as_of);
//! let detail = calculator.calculate(dec!(30000000), RegionType::I, InsuranceOptions::all());
//!
//! assert_eq!(detail.employee.total, dec!(3150000));
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_vnd};
use crate::models::{FundContributions, InsuranceDetail, InsuranceOptions, RegionType, WagePeriod, WageTable};

/// Contribution rate per fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRates {
    pub bhxh: Decimal,
    pub bhyt: Decimal,
    pub bhtn: Decimal,
}

/// Employee and employer rates plus the cap multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceRates {
    pub employee: FundRates,
    pub employer: FundRates,
    /// Contribution bases are capped at this multiple of the reference wage.
    pub cap_multiplier: Decimal,
}

impl InsuranceRates {
    /// Employee 8% / 1.5% / 1%; employer 17.5% (incl. occupational accident
    /// fund) / 3% / 1%; caps at 20×.
    pub fn statutory() -> Self {
        Self {
            employee: FundRates {
                bhxh: Decimal::new(8, 2),
                bhyt: Decimal::new(15, 3),
                bhtn: Decimal::new(1, 2),
            },
            employer: FundRates {
                bhxh: Decimal::new(175, 3),
                bhyt: Decimal::new(3, 2),
                bhtn: Decimal::new(1, 2),
            },
            cap_multiplier: Decimal::from(20),
        }
    }
}

/// Computes contributions against one resolved wage period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsuranceCalculator {
    period: WagePeriod,
    rates: InsuranceRates,
}

impl InsuranceCalculator {
    /// Resolves the wage period in force on `as_of`.
    pub fn new(
        table: &WageTable,
        as_of: NaiveDate,
    ) -> Self {
        let period = table.lookup(as_of).clone();
        debug!(%as_of, effective_from = %period.effective_from, "resolved wage period");

        Self {
            period,
            rates: InsuranceRates::statutory(),
        }
    }

    pub fn period(&self) -> &WagePeriod {
        &self.period
    }

    /// Ceiling on the BHXH/BHYT contribution base.
    pub fn social_health_cap(&self) -> Decimal {
        self.period.base_salary * self.rates.cap_multiplier
    }

    /// Ceiling on the BHTN contribution base for `region`.
    pub fn unemployment_cap(
        &self,
        region: RegionType,
    ) -> Decimal {
        self.period.minimum_wage(region) * self.rates.cap_multiplier
    }

    /// Contributions on `wage_base` for the enabled funds. Disabled funds
    /// contribute zero on both sides.
    pub fn calculate(
        &self,
        wage_base: Decimal,
        region: RegionType,
        options: InsuranceOptions,
    ) -> InsuranceDetail {
        let wage_base = non_negative(wage_base);
        let social_health_base = wage_base.min(self.social_health_cap());
        let unemployment_base = wage_base.min(self.unemployment_cap(region));

        let charge = |enabled: bool, base: Decimal, rate: Decimal| {
            if enabled {
                round_vnd(base * rate)
            } else {
                Decimal::ZERO
            }
        };
        let side = |rates: &FundRates| {
            FundContributions::new(
                charge(options.bhxh, social_health_base, rates.bhxh),
                charge(options.bhyt, social_health_base, rates.bhyt),
                charge(options.bhtn, unemployment_base, rates.bhtn),
            )
        };

        InsuranceDetail {
            wage_base,
            social_health_base,
            unemployment_base,
            options,
            employee: side(&self.rates.employee),
            employer: side(&self.rates.employer),
        }
    }
}
