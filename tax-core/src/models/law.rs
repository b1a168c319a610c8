use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tax_bracket::{BracketTable, TaxBracket};

/// Which personal income tax regime a calculation runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawVersion {
    /// Seven-bracket schedule with the 11M / 4.4M family deductions.
    Old,
    /// Five-bracket schedule effective 2026 with the 15.5M / 6.2M deductions.
    #[default]
    New,
}

impl LawVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" | "2025" => Some(Self::Old),
            "new" | "2026" => Some(Self::New),
            _ => None,
        }
    }
}

impl fmt::Display for LawVersion {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LawVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown law version '{s}' (expected old or new)"))
    }
}

/// Monthly family-circumstance deductions for one law version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionConfig {
    pub personal_per_month: Decimal,
    pub dependent_per_month: Decimal,
}

/// A complete tax regime: its tag, bracket schedule and deduction constants.
///
/// Every calculation receives a `&TaxLaw` explicitly instead of branching
/// on a year flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLaw {
    pub version: LawVersion,
    pub effective_from: NaiveDate,
    pub brackets: BracketTable,
    pub deductions: DeductionConfig,
}

impl TaxLaw {
    /// Built-in regime for `version`.
    pub fn for_version(version: LawVersion) -> Self {
        match version {
            LawVersion::Old => Self::old(),
            LawVersion::New => Self::new_2026(),
        }
    }

    /// Regime with a caller-supplied schedule, e.g. one loaded from CSV.
    pub fn custom(
        version: LawVersion,
        effective_from: NaiveDate,
        brackets: BracketTable,
        deductions: DeductionConfig,
    ) -> Self {
        Self {
            version,
            effective_from,
            brackets,
            deductions,
        }
    }

    /// Seven-bracket monthly schedule (5% .. 35%).
    pub fn old() -> Self {
        let million = Decimal::from(1_000_000);
        let bands: [(i64, Option<i64>, i64); 7] = [
            (0, Some(5), 5),
            (5, Some(10), 10),
            (10, Some(18), 15),
            (18, Some(32), 20),
            (32, Some(52), 25),
            (52, Some(80), 30),
            (80, None, 35),
        ];

        Self {
            version: LawVersion::Old,
            effective_from: ymd(2020, 7, 1),
            brackets: builtin_table(&bands, million),
            deductions: DeductionConfig {
                personal_per_month: Decimal::from(11_000_000),
                dependent_per_month: Decimal::from(4_400_000),
            },
        }
    }

    /// Five-bracket monthly schedule effective 1 January 2026 (5% .. 35%).
    pub fn new_2026() -> Self {
        let million = Decimal::from(1_000_000);
        let bands: [(i64, Option<i64>, i64); 5] = [
            (0, Some(10), 5),
            (10, Some(30), 10),
            (30, Some(60), 20),
            (60, Some(100), 30),
            (100, None, 35),
        ];

        Self {
            version: LawVersion::New,
            effective_from: ymd(2026, 1, 1),
            brackets: builtin_table(&bands, million),
            deductions: DeductionConfig {
                personal_per_month: Decimal::from(15_500_000),
                dependent_per_month: Decimal::from(6_200_000),
            },
        }
    }
}

/// (min, max, rate percent) triples scaled by `unit`.
fn builtin_table(
    bands: &[(i64, Option<i64>, i64)],
    unit: Decimal,
) -> BracketTable {
    let brackets = bands
        .iter()
        .map(|&(min, max, percent)| {
            TaxBracket::new(
                Decimal::from(min) * unit,
                max.map(|m| Decimal::from(m) * unit),
                Decimal::new(percent, 2),
            )
        })
        .collect();

    BracketTable::from_trusted(brackets)
}

pub(crate) fn ymd(
    year: i32,
    month: u32,
    day: u32,
) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
