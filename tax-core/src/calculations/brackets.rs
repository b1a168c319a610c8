//! Progressive bracket evaluation.
//!
//! Income is split across the schedule from the lowest band upward and each
//! slice is taxed at its band's rate. Only bands that receive income appear
//! in the breakdown.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::TaxLaw;
//! use tax_core::calculations::TaxBracketEngine;
//!
//! let law = TaxLaw::new_2026();
//! let tax = TaxBracketEngine::new(&law.brackets).calculate(dec!(11350000));
//!
//! assert_eq!(tax.total, dec!(635000));
//! assert_eq!(tax.breakdown.len(), 2);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::calculations::common::round_vnd;
use crate::models::{BracketTable, TaxBracket, TaxBreakdownItem};

/// Tax due on a taxable amount, with the per-bracket split.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BracketTax {
    pub total: Decimal,
    pub breakdown: Vec<TaxBreakdownItem>,
}

/// Evaluates a validated bracket schedule.
#[derive(Debug, Clone, Copy)]
pub struct TaxBracketEngine<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> TaxBracketEngine<'a> {
    pub fn new(table: &'a BracketTable) -> Self {
        Self {
            brackets: table.brackets(),
        }
    }

    /// Tax on `taxable_income`. Zero or negative income yields zero tax and
    /// an empty breakdown.
    ///
    /// Each bracket's tax is rounded to whole dong and the total is the sum
    /// of the rounded amounts, so the breakdown always adds up.
    pub fn calculate(
        &self,
        taxable_income: Decimal,
    ) -> BracketTax {
        if taxable_income <= Decimal::ZERO {
            return BracketTax::default();
        }

        let mut remaining = taxable_income;
        let mut result = BracketTax::default();

        for (index, bracket) in self.brackets.iter().enumerate() {
            if remaining <= Decimal::ZERO {
                break;
            }

            let in_bracket = match bracket.width() {
                Some(width) => remaining.min(width),
                None => remaining,
            };
            let tax = round_vnd(in_bracket * bracket.tax_rate);
            trace!(level = index + 1, %in_bracket, %tax, "bracket slice");

            result.total += tax;
            result.breakdown.push(TaxBreakdownItem {
                level: index + 1,
                min_income: bracket.min_income,
                max_income: bracket.max_income,
                tax_rate: bracket.tax_rate,
                taxable_amount: in_bracket,
                tax,
            });
            remaining -= in_bracket;
        }

        result
    }

    /// Rate applied to the next dong above `taxable_income`.
    pub fn marginal_rate(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        self.brackets
            .iter()
            .find(|b| b.max_income.is_none_or(|max| taxable_income < max))
            .map_or(Decimal::ZERO, |b| b.tax_rate)
    }
}
