use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One band of a progressive monthly tax schedule.
///
/// `max_income` is `None` for the top band, which is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
        }
    }

    /// Width of the band, or `None` for the unbounded top band.
    pub fn width(&self) -> Option<Decimal> {
        self.max_income.map(|max| max - self.min_income)
    }
}

/// Reasons a bracket schedule is rejected by [`BracketTable::new`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table is empty")]
    Empty,

    #[error("first bracket must start at 0, starts at {0}")]
    FirstBracketNotZero(Decimal),

    #[error("bracket {index} starts at {found}, expected {expected}")]
    Gap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} has max {max} not above its min {min}")]
    EmptyBand {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd(usize),

    #[error("last bracket must be unbounded")]
    LastBracketBounded,

    #[error("bracket {index} has rate {rate} outside [0, 1]")]
    InvalidRate { index: usize, rate: Decimal },
}

/// A validated progressive schedule: ordered, contiguous, starting at zero
/// and ending with an unbounded band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Validates and wraps a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] if the schedule is empty, does not start
    /// at zero, has gaps or overlaps, has an empty band, has a rate outside
    /// `[0, 1]`, or does not end with an unbounded band.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketTableError> {
        let first = brackets.first().ok_or(BracketTableError::Empty)?;
        if first.min_income != Decimal::ZERO {
            return Err(BracketTableError::FirstBracketNotZero(first.min_income));
        }

        let last_index = brackets.len() - 1;
        let mut expected_min = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.min_income != expected_min {
                return Err(BracketTableError::Gap {
                    index,
                    expected: expected_min,
                    found: bracket.min_income,
                });
            }
            if bracket.tax_rate < Decimal::ZERO || bracket.tax_rate > Decimal::ONE {
                return Err(BracketTableError::InvalidRate {
                    index,
                    rate: bracket.tax_rate,
                });
            }
            match bracket.max_income {
                Some(max) if max <= bracket.min_income => {
                    return Err(BracketTableError::EmptyBand {
                        index,
                        min: bracket.min_income,
                        max,
                    });
                }
                Some(max) => expected_min = max,
                None if index != last_index => {
                    return Err(BracketTableError::UnboundedBeforeEnd(index));
                }
                None => {}
            }
        }

        if brackets[last_index].max_income.is_some() {
            return Err(BracketTableError::LastBracketBounded);
        }

        Ok(Self { brackets })
    }

    /// Wraps a schedule that is known to be valid (the built-in tables).
    pub(crate) fn from_trusted(brackets: Vec<TaxBracket>) -> Self {
        debug_assert!(Self::new(brackets.clone()).is_ok());
        Self { brackets }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Highest marginal rate in the schedule.
    pub fn top_rate(&self) -> Decimal {
        self.brackets
            .iter()
            .map(|b| b.tax_rate)
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = BracketTableError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}
