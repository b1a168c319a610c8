use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{BracketTable, LawVersion, TaxBracket, TaxLaw, WagePeriod, WageTable};
use tracing::{debug, info};

use crate::error::TableLoaderError;

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader)
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Bracket schedules
// ---------------------------------------------------------------------------

/// A single record from a bracket schedule CSV file.
///
/// - `law`: `old` or `new` (`2025` / `2026` are accepted too)
/// - `min_income`: lower bound of the band, monthly VND
/// - `max_income`: upper bound of the band (empty for the top band)
/// - `rate`: marginal rate as a fraction (e.g. `0.05`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub law: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// Loader for PIT bracket schedules.
///
/// A file may hold schedules for several laws; rows are grouped by the
/// `law` column in file order. Deductions and the effective date are taken
/// from the built-in law of the same version.
pub struct BracketScheduleLoader;

impl BracketScheduleLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, TableLoaderError> {
        let mut records = Vec::new();
        for result in csv_reader(reader).deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    /// Build the law for `version` from parsed records.
    ///
    /// # Errors
    ///
    /// Fails when a row names an unknown law, when no row names `version`,
    /// or when the rows for `version` do not form a valid schedule.
    pub fn build(
        records: &[BracketRecord],
        version: LawVersion,
    ) -> Result<TaxLaw, TableLoaderError> {
        let mut brackets = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            let law = LawVersion::parse(&record.law).ok_or_else(|| TableLoaderError::UnknownLaw {
                law: record.law.clone(),
                row: idx + 1,
            })?;
            if law == version {
                brackets.push(TaxBracket::new(record.min_income, record.max_income, record.rate));
            }
        }
        if brackets.is_empty() {
            return Err(TableLoaderError::MissingSchedule(version));
        }

        let table = BracketTable::new(brackets).map_err(|source| TableLoaderError::InvalidSchedule {
            law: version,
            source,
        })?;
        debug!(law = %version, brackets = table.len(), "built bracket schedule");

        let builtin = TaxLaw::for_version(version);
        Ok(TaxLaw::custom(version, builtin.effective_from, table, builtin.deductions))
    }

    /// Read the schedule for `version` from a CSV file.
    pub fn load_file(
        path: &Path,
        version: LawVersion,
    ) -> Result<TaxLaw, TableLoaderError> {
        let records = Self::parse(File::open(path)?)?;
        info!(path = %path.display(), records = records.len(), "loaded bracket schedule file");
        Self::build(&records, version)
    }
}

// ---------------------------------------------------------------------------
// Wage tables
// ---------------------------------------------------------------------------

/// A single record from a wage table CSV file.
///
/// - `effective_from`: first day the figures apply (`YYYY-MM-DD`)
/// - `base_salary`: statutory base salary
/// - `region_1` .. `region_4`: regional minimum wages
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WagePeriodRecord {
    pub effective_from: NaiveDate,
    pub base_salary: Decimal,
    pub region_1: Decimal,
    pub region_2: Decimal,
    pub region_3: Decimal,
    pub region_4: Decimal,
}

impl From<WagePeriodRecord> for WagePeriod {
    fn from(record: WagePeriodRecord) -> Self {
        WagePeriod {
            effective_from: record.effective_from,
            base_salary: record.base_salary,
            regional_minimum: [record.region_1, record.region_2, record.region_3, record.region_4],
        }
    }
}

/// Loader for base salary and regional minimum wage history.
pub struct WageTableLoader;

impl WageTableLoader {
    /// Parse wage period records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<WagePeriodRecord>, TableLoaderError> {
        let mut records = Vec::new();
        for result in csv_reader(reader).deserialize() {
            let record: WagePeriodRecord = result?;
            records.push(record);
        }
        Ok(records)
    }

    /// Build a validated table. Rows may appear in any order.
    pub fn build(records: Vec<WagePeriodRecord>) -> Result<WageTable, TableLoaderError> {
        let periods = records.into_iter().map(WagePeriod::from).collect();
        Ok(WageTable::new(periods)?)
    }

    pub fn load<R: Read>(reader: R) -> Result<WageTable, TableLoaderError> {
        Self::build(Self::parse(reader)?)
    }

    /// Read a wage table from a CSV file.
    pub fn load_file(path: &Path) -> Result<WageTable, TableLoaderError> {
        let table = Self::load(File::open(path)?)?;
        info!(path = %path.display(), periods = table.periods().len(), "loaded wage table file");
        Ok(table)
    }
}
