//! CSV batch evaluation.
//!
//! ## CSV Format
//!
//! Headers are matched by name; column order does not matter.
//!
//! | Column            | Required | Type    | Notes                                     |
//! |-------------------|----------|---------|-------------------------------------------|
//! | `label`           | no       | string  | Echoed in the report                      |
//! | `mode`            | yes      | string  | `gross` (amount is gross) or `net`        |
//! | `amount`          | yes      | amount  | Monthly VND; `30.000.000` is accepted     |
//! | `dependents`      | no       | integer | Defaults to 0; negatives become 0         |
//! | `region`          | no       | integer | 1..4; defaults to the `--region` setting  |
//! | `insurance`       | no       | bool    | Defaults to `true`                        |
//! | `declared_salary` | no       | amount  | Insurance wage base                       |
//!
//!
//! Amounts and counts are sanitized like command-line input; the warnings
//! travel with each entry.
//!
//! ```csv
//! label,mode,amount,dependents,region
//! dev,gross,30000000,0,1
//! lead,net,45000000,2,
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::calculations::GrossNetConverter;
use tax_core::sanitize::{AmountKind, InputWarning, sanitize_amount, sanitize_count};
use tax_core::{GrossNetResult, RegionType, TaxInput};
use tracing::info;

// ---------------------------------------------------------------------------
// CSV row
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    label: Option<String>,
    mode: String,
    amount: String,
    dependents: Option<String>,
    region: Option<u8>,
    insurance: Option<bool>,
    declared_salary: Option<String>,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BatchLoadError {
    /// Structurally invalid CSV, missing required column or type mismatch.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("unrecognised mode '{mode}' on row {row} (expected 'gross' or 'net')")]
    InvalidMode { mode: String, row: usize },

    #[error("invalid amount '{input}' on row {row}")]
    InvalidAmount { input: String, row: usize },

    #[error("region {region} on row {row} is not between 1 and 4")]
    InvalidRegion { region: u8, row: usize },

    #[error("cannot read batch file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    Gross,
    Net,
}

impl BatchMode {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gross" => Some(Self::Gross),
            "net" => Some(Self::Net),
            _ => None,
        }
    }
}

/// One validated batch row. `input.gross_income` holds the amount for
/// `Gross` rows and zero for `Net` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// 1-based data row number.
    pub row: usize,
    pub label: String,
    pub mode: BatchMode,
    pub amount: Decimal,
    pub input: TaxInput,
    /// Sanitization warnings for this row's fields.
    pub warnings: Vec<InputWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub row: usize,
    pub label: String,
    pub mode: BatchMode,
    pub amount: Decimal,
    pub result: GrossNetResult,
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

fn convert_row(
    row: CsvRow,
    row_number: usize,
    default_region: RegionType,
) -> Result<BatchEntry, BatchLoadError> {
    let mode = BatchMode::parse(&row.mode).ok_or_else(|| BatchLoadError::InvalidMode {
        mode: row.mode.clone(),
        row: row_number,
    })?;
    let region = match row.region {
        Some(number) => RegionType::from_number(number).ok_or(BatchLoadError::InvalidRegion {
            region: number,
            row: row_number,
        })?,
        None => default_region,
    };

    let mut warnings = Vec::new();
    let amount = sanitize_amount(&format!("row {row_number} amount"), &row.amount, AmountKind::MonthlySalary);
    if amount.warnings.iter().any(|w| matches!(w, InputWarning::NotANumber { .. })) {
        return Err(BatchLoadError::InvalidAmount {
            input: row.amount,
            row: row_number,
        });
    }
    warnings.extend(amount.warnings);
    let amount = amount.value;

    let dependents = match row.dependents.as_deref() {
        Some(raw) => {
            let count = sanitize_count(&format!("row {row_number} dependents"), raw);
            warnings.extend(count.warnings);
            count.value
        }
        None => 0,
    };
    let declared = row.declared_salary.as_deref().map(|raw| {
        let declared = sanitize_amount(&format!("row {row_number} declared_salary"), raw, AmountKind::MonthlySalary);
        warnings.extend(declared.warnings);
        declared.value
    });

    let mut input = TaxInput::new(match mode {
        BatchMode::Gross => amount,
        BatchMode::Net => Decimal::ZERO,
    })
    .with_dependents(dependents)
    .with_region(region)
    .with_insurance(row.insurance.unwrap_or(true));
    if let Some(declared) = declared.filter(|d| *d > Decimal::ZERO) {
        input = input.with_declared_salary(declared);
    }

    Ok(BatchEntry {
        row: row_number,
        label: row.label.unwrap_or_else(|| format!("row {row_number}")),
        mode,
        amount,
        input,
        warnings,
    })
}

/// Parses batch CSV text. Rows are returned in file order.
///
/// # Errors
///
/// * [BatchLoadError::Parse] if the CSV is malformed.
/// * [BatchLoadError::InvalidMode] / [BatchLoadError::InvalidRegion] with
///   the offending row number.
pub fn load_from_str(
    input: &str,
    default_region: RegionType,
) -> Result<Vec<BatchEntry>, BatchLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1, default_region))
        .collect()
}

pub fn load_from_file(
    path: &Path,
    default_region: RegionType,
) -> Result<Vec<BatchEntry>, BatchLoadError> {
    let contents = std::fs::read_to_string(path)?;
    let entries = load_from_str(&contents, default_region)?;
    info!(path = %path.display(), rows = entries.len(), "loaded batch file");
    Ok(entries)
}

/// Runs every entry through the converter.
pub fn evaluate(
    entries: &[BatchEntry],
    converter: &GrossNetConverter<'_>,
) -> Vec<BatchOutcome> {
    entries
        .iter()
        .map(|entry| {
            let (result, converged) = match entry.mode {
                BatchMode::Gross => (converter.gross_to_net(&entry.input), true),
                BatchMode::Net => {
                    let solution = converter.net_to_gross(entry.amount, &entry.input);
                    (solution.result, solution.converged)
                }
            };
            BatchOutcome {
                row: entry.row,
                label: entry.label.clone(),
                mode: entry.mode,
                amount: entry.amount,
                result,
                converged,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
