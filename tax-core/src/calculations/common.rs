//! Shared rounding and comparison helpers for the PIT calculations.
//!
//! VND has no minor unit in practice, so money is quantized to whole dong.
//! Percentages are kept at two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a money amount to whole dong, half away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_vnd;
///
/// assert_eq!(round_vnd(dec!(1234.49)), dec!(1234));
/// assert_eq!(round_vnd(dec!(1234.5)), dec!(1235));
/// ```
pub fn round_vnd(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to two decimal places, half away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(2.115)), dec!(2.12));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Drops any fractional dong without rounding.
pub fn truncate_vnd(value: Decimal) -> Decimal {
    value.trunc()
}

/// Returns the larger of two amounts.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Clamps negative amounts to zero.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// `part / whole` as a percentage with two decimals; zero when `whole` is
/// not positive.
pub fn percentage(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_half_up(part * Decimal::ONE_HUNDRED / whole)
}
