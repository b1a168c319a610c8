use std::sync::LazyLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::law::ymd;
use super::region::RegionType;

/// Statutory wage figures in force from `effective_from` until the next period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagePeriod {
    pub effective_from: NaiveDate,
    /// Statutory base salary; the BHXH/BHYT cap is 20× this.
    pub base_salary: Decimal,
    /// Regional minimum wage indexed by [`RegionType::index`]; the BHTN cap
    /// is 20× the region's figure.
    pub regional_minimum: [Decimal; 4],
}

impl WagePeriod {
    pub fn minimum_wage(
        &self,
        region: RegionType,
    ) -> Decimal {
        self.regional_minimum[region.index()]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WageTableError {
    #[error("wage table has no periods")]
    Empty,

    #[error("two wage periods start on {0}")]
    DuplicatePeriod(NaiveDate),

    #[error("wage period {0} has a non-positive amount")]
    NonPositiveAmount(NaiveDate),
}

/// Used by [`WageTable::lookup`] only if a table somehow holds no periods.
static LATEST_DECREE: LazyLock<WagePeriod> = LazyLock::new(|| {
    let [.., latest] = builtin_periods();
    latest
});

fn builtin_periods() -> [WagePeriod; 4] {
    let period = |date: NaiveDate, base: i64, regions: [i64; 4]| WagePeriod {
        effective_from: date,
        base_salary: Decimal::from(base),
        regional_minimum: regions.map(Decimal::from),
    };

    [
        period(
            ymd(2022, 7, 1),
            1_490_000,
            [4_680_000, 4_160_000, 3_640_000, 3_250_000],
        ),
        period(
            ymd(2023, 7, 1),
            1_800_000,
            [4_680_000, 4_160_000, 3_640_000, 3_250_000],
        ),
        period(
            ymd(2024, 7, 1),
            2_340_000,
            [4_960_000, 4_410_000, 3_860_000, 3_450_000],
        ),
        period(
            ymd(2026, 1, 1),
            2_340_000,
            [5_310_000, 4_730_000, 4_140_000, 3_700_000],
        ),
    ]
}

/// Date-keyed history of base salary and regional minimum wages. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WagePeriod>", into = "Vec<WagePeriod>")]
pub struct WageTable {
    periods: Vec<WagePeriod>,
}

impl WageTable {
    /// Builds a table, ordering periods by start date.
    ///
    /// # Errors
    ///
    /// Returns [`WageTableError`] if there are no periods, two periods share a
    /// start date, or any amount is zero or negative.
    pub fn new(mut periods: Vec<WagePeriod>) -> Result<Self, WageTableError> {
        if periods.is_empty() {
            return Err(WageTableError::Empty);
        }
        periods.sort_by_key(|p| p.effective_from);

        for pair in periods.windows(2) {
            if pair[0].effective_from == pair[1].effective_from {
                return Err(WageTableError::DuplicatePeriod(pair[1].effective_from));
            }
        }
        for period in &periods {
            let amounts = std::iter::once(&period.base_salary).chain(&period.regional_minimum);
            if amounts.into_iter().any(|a| *a <= Decimal::ZERO) {
                return Err(WageTableError::NonPositiveAmount(period.effective_from));
            }
        }

        Ok(Self { periods })
    }

    /// Decrees in force from mid-2022 through 2026.
    pub fn builtin() -> Self {
        Self {
            periods: builtin_periods().into(),
        }
    }

    pub fn periods(&self) -> &[WagePeriod] {
        &self.periods
    }

    /// The period in force on `as_of`. Dates before the first period resolve
    /// to the first period.
    pub fn lookup(
        &self,
        as_of: NaiveDate,
    ) -> &WagePeriod {
        let in_force = self.periods.partition_point(|p| p.effective_from <= as_of);
        self.periods
            .get(in_force.saturating_sub(1))
            .unwrap_or(&*LATEST_DECREE)
    }
}

impl TryFrom<Vec<WagePeriod>> for WageTable {
    type Error = WageTableError;

    fn try_from(periods: Vec<WagePeriod>) -> Result<Self, Self::Error> {
        Self::new(periods)
    }
}

impl From<WageTable> for Vec<WagePeriod> {
    fn from(table: WageTable) -> Self {
        table.periods
    }
}

impl Default for WageTable {
    fn default() -> Self {
        Self::builtin()
    }
}
