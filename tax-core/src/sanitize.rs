//! Clean-up of untrusted numeric form input before it reaches the core.
//!
//! Problems are reported as advisory [`InputWarning`]s alongside a usable
//! value; sanitization itself never fails.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::truncate_vnd;

/// Ceiling for generic money fields (100 billion VND).
pub fn max_amount() -> Decimal {
    Decimal::from(100_000_000_000i64)
}

/// Ceiling for monthly salary fields (10 billion VND).
pub fn max_monthly_salary() -> Decimal {
    Decimal::from(10_000_000_000i64)
}

/// `1.234.567` or `1.234.567,5`: dots group thousands, comma marks decimals.
static DOT_GROUPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d{1,3}(\.\d{3})+(,\d+)?$").expect("dot-grouped pattern is valid")
});

/// Digits with an optional sign and decimal point, after normalization.
static PLAIN_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("plain number pattern is valid"));

/// Which ceiling applies to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountKind {
    MonthlySalary,
    Generic,
}

impl AmountKind {
    pub fn ceiling(&self) -> Decimal {
        match self {
            Self::MonthlySalary => max_monthly_salary(),
            Self::Generic => max_amount(),
        }
    }
}

/// Advisory messages shown next to a form field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputWarning {
    #[error("{field}: '{input}' is not a number, using 0")]
    NotANumber { field: String, input: String },

    #[error("{field}: negative values are not supported, using 0")]
    Negative { field: String },

    #[error("{field}: decimals are not supported, dropped")]
    Truncated { field: String },

    #[error("{field}: value too large, clamped to {max}")]
    TooLarge { field: String, max: Decimal },

    #[error("{field}: '{input}' is not recognised, using the default")]
    Unrecognized { field: String, input: String },
}

/// A cleaned value plus whatever was wrong with the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized<T> {
    pub value: T,
    pub warnings: Vec<InputWarning>,
}

impl<T> Sanitized<T> {
    fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Error returned when a string cannot be read as an amount.
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseAmountError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Strips currency markers and whitespace, and rewrites Vietnamese
/// dot-grouped numbers into plain form. Commas elsewhere are treated as
/// thousands separators.
fn normalize_amount_input(s: &str) -> String {
    let stripped: String = s
        .trim()
        .trim_end_matches(['₫', 'đ'])
        .trim_end_matches("VND")
        .trim_end_matches("vnd")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();

    if DOT_GROUPED.is_match(&stripped) {
        stripped.replace('.', "").replace(',', ".")
    } else {
        stripped.replace(',', "")
    }
}

/// Parses an amount string. Empty input is zero.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| ParseAmountError {
        input: s.to_string(),
        source: e,
    })
}

/// Parses an optional amount; empty input is `None`.
pub fn parse_optional_amount(s: &str) -> Option<Decimal> {
    if normalize_amount_input(s).is_empty() {
        return None;
    }
    match parse_amount(s) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(input = %s, "invalid optional amount: {}", e);
            None
        }
    }
}

/// Clamps negatives to zero, drops decimals and applies the field ceiling.
pub fn clamp_amount(
    field: &str,
    value: Decimal,
    kind: AmountKind,
) -> Sanitized<Decimal> {
    let mut result = Sanitized::clean(value);

    if result.value < Decimal::ZERO {
        result.warnings.push(InputWarning::Negative {
            field: field.to_string(),
        });
        result.value = Decimal::ZERO;
    }
    if !result.value.fract().is_zero() {
        result.warnings.push(InputWarning::Truncated {
            field: field.to_string(),
        });
        result.value = truncate_vnd(result.value);
    }
    let max = kind.ceiling();
    if result.value > max {
        result.warnings.push(InputWarning::TooLarge {
            field: field.to_string(),
            max,
        });
        result.value = max;
    }

    for warning in &result.warnings {
        warn!(%warning, "input sanitized");
    }
    result
}

/// Parses and clamps a raw form value.
pub fn sanitize_amount(
    field: &str,
    raw: &str,
    kind: AmountKind,
) -> Sanitized<Decimal> {
    match parse_amount(raw) {
        Ok(value) => clamp_amount(field, value, kind),
        Err(e) => {
            warn!(field, "{}", e);
            let normalized = normalize_amount_input(raw);
            if PLAIN_NUMBER.is_match(&normalized) {
                // Well-formed but beyond what a Decimal holds.
                let out_of_range = if normalized.starts_with('-') {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                };
                return clamp_amount(field, out_of_range, kind);
            }
            Sanitized {
                value: Decimal::ZERO,
                warnings: vec![InputWarning::NotANumber {
                    field: field.to_string(),
                    input: raw.to_string(),
                }],
            }
        }
    }
}

/// Parses a count such as the number of dependents. Negative counts become
/// zero and fractions are dropped.
pub fn sanitize_count(
    field: &str,
    raw: &str,
) -> Sanitized<u32> {
    let amount = sanitize_amount(field, raw, AmountKind::Generic);
    let value = amount.value.to_u32().unwrap_or(u32::MAX);

    Sanitized {
        value,
        warnings: amount.warnings,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // parse_amount tests
    // =========================================================================

    #[test]
    fn parse_amount_accepts_comma_thousands_separator() {
        assert_eq!(parse_amount("30,000,000").unwrap(), dec!(30000000));
    }

    #[test]
    fn parse_amount_accepts_dot_thousands_separator() {
        assert_eq!(parse_amount("30.000.000").unwrap(), dec!(30000000));
        assert_eq!(parse_amount("1.500,5").unwrap(), dec!(1500.5));
    }

    #[test]
    fn parse_amount_keeps_plain_decimal_point() {
        assert_eq!(parse_amount("1500.75").unwrap(), dec!(1500.75));
    }

    #[test]
    fn parse_amount_strips_currency_and_whitespace() {
        assert_eq!(parse_amount(" 25 000 000 ₫ ").unwrap(), dec!(25000000));
        assert_eq!(parse_amount("12,000,000 VND").unwrap(), dec!(12000000));
    }

    #[test]
    fn parse_amount_empty_is_zero() {
        assert_eq!(parse_amount("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_rejects_text() {
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn parse_optional_amount_handles_empty_and_invalid() {
        assert_eq!(parse_optional_amount(""), None);
        assert_eq!(parse_optional_amount("x1"), None);
        assert_eq!(parse_optional_amount("10.000.000"), Some(dec!(10000000)));
    }

    // =========================================================================
    // sanitize tests
    // =========================================================================

    #[test]
    fn clean_input_has_no_warnings() {
        let result = sanitize_amount("gross", "30000000", AmountKind::MonthlySalary);

        assert_eq!(result.value, dec!(30000000));
        assert!(result.is_clean());
    }

    #[test]
    fn negative_input_becomes_zero() {
        let result = sanitize_amount("gross", "-5000", AmountKind::MonthlySalary);

        assert_eq!(result.value, dec!(0));
        assert_eq!(
            result.warnings,
            vec![InputWarning::Negative {
                field: "gross".to_string()
            }]
        );
    }

    #[test]
    fn decimals_are_truncated() {
        let result = sanitize_amount("gross", "1500.99", AmountKind::Generic);

        assert_eq!(result.value, dec!(1500));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn salary_above_ceiling_is_clamped() {
        let result = sanitize_amount("gross", "20000000000", AmountKind::MonthlySalary);

        assert_eq!(result.value, max_monthly_salary());
        assert_eq!(
            result.warnings[0].to_string(),
            "gross: value too large, clamped to 10000000000"
        );
    }

    #[test]
    fn generic_ceiling_is_higher_than_salary_ceiling() {
        let result = sanitize_amount("charity", "20000000000", AmountKind::Generic);

        assert_eq!(result.value, dec!(20000000000));
        assert!(result.is_clean());
    }

    #[test]
    fn number_beyond_decimal_range_is_clamped_to_ceiling() {
        let result = sanitize_amount("gross", "100000000000000000000000000000", AmountKind::MonthlySalary);

        assert_eq!(result.value, max_monthly_salary());
        assert_eq!(
            result.warnings,
            vec![InputWarning::TooLarge {
                field: "gross".to_string(),
                max: max_monthly_salary(),
            }]
        );
    }

    #[test]
    fn grouped_number_beyond_decimal_range_is_clamped_to_ceiling() {
        let result = sanitize_amount("charity", "999.999.999.999.999.999.999.999.999.999", AmountKind::Generic);

        assert_eq!(result.value, max_amount());
        assert!(matches!(result.warnings[..], [InputWarning::TooLarge { .. }]));
    }

    #[test]
    fn negative_number_beyond_decimal_range_becomes_zero() {
        let result = sanitize_amount("gross", "-100000000000000000000000000000", AmountKind::MonthlySalary);

        assert_eq!(result.value, dec!(0));
        assert_eq!(
            result.warnings,
            vec![InputWarning::Negative {
                field: "gross".to_string()
            }]
        );
    }

    #[test]
    fn invalid_input_warns_and_uses_zero() {
        let result = sanitize_amount("gross", "lots", AmountKind::MonthlySalary);

        assert_eq!(result.value, dec!(0));
        assert!(matches!(result.warnings[0], InputWarning::NotANumber { .. }));
    }

    #[test]
    fn count_clamps_negative_and_fraction() {
        assert_eq!(sanitize_count("dependents", "-2").value, 0);
        assert_eq!(sanitize_count("dependents", "2.7").value, 2);
        assert_eq!(sanitize_count("dependents", "3").value, 3);
    }
}
