//! Display formatting for VND amounts and rates.

use rust_decimal::Decimal;

use crate::calculations::common::{round_half_up, round_vnd};

/// Formats an amount as whole dong grouped with `.`, e.g. `30.000.000`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::format::format_vnd;
///
/// assert_eq!(format_vnd(dec!(26215000)), "26.215.000");
/// assert_eq!(format_vnd(dec!(-1234.6)), "-1.235");
/// ```
pub fn format_vnd(amount: Decimal) -> String {
    let rounded = round_vnd(amount);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

/// Formats an amount followed by the currency code.
pub fn format_vnd_with_unit(amount: Decimal) -> String {
    format!("{} VND", format_vnd(amount))
}

/// Formats a fractional rate (`0.05`) as a percentage (`5%`).
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// Formats a value that is already a percentage with two decimals.
pub fn format_percent(percent: Decimal) -> String {
    format!("{:.2}%", round_half_up(percent))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(format_vnd(dec!(0)), "0");
        assert_eq!(format_vnd(dec!(999)), "999");
        assert_eq!(format_vnd(dec!(1000)), "1.000");
        assert_eq!(format_vnd(dec!(100000000000)), "100.000.000.000");
    }

    #[test]
    fn rounds_fractional_dong() {
        assert_eq!(format_vnd(dec!(1234.5)), "1.235");
        assert_eq!(format_vnd(dec!(-0.4)), "0");
    }

    #[test]
    fn unit_suffix() {
        assert_eq!(format_vnd_with_unit(dec!(3150000)), "3.150.000 VND");
    }

    #[test]
    fn rates_and_percentages() {
        assert_eq!(format_rate(dec!(0.05)), "5%");
        assert_eq!(format_rate(dec!(0.175)), "17.5%");
        assert_eq!(format_percent(dec!(2.1)), "2.10%");
    }
}
