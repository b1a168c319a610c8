//! Family-circumstance and ad-hoc deductions.

use rust_decimal::Decimal;

use crate::calculations::common::{non_negative, round_vnd};
use crate::models::{DeductionBreakdown, DeductionConfig, OtherDeductions, TaxLaw};

/// Monthly ceiling on deductible voluntary pension contributions
/// (12,000,000 VND per year).
pub fn voluntary_pension_cap() -> Decimal {
    Decimal::from(1_000_000)
}

/// Combines every deduction for one law version.
///
/// The resolver does not decide whether insurance applies; it is handed the
/// employee insurance amount already computed by the insurance calculator.
#[derive(Debug, Clone, Copy)]
pub struct DeductionResolver<'a> {
    config: &'a DeductionConfig,
}

impl<'a> DeductionResolver<'a> {
    pub fn new(law: &'a TaxLaw) -> Self {
        Self {
            config: &law.deductions,
        }
    }

    pub fn resolve(
        &self,
        dependents: u32,
        insurance: Decimal,
        other: &OtherDeductions,
    ) -> DeductionBreakdown {
        let personal = self.config.personal_per_month;
        let dependent = self.dependent_deduction(dependents);
        let insurance = non_negative(insurance);
        let other = self.other_deduction(other);

        DeductionBreakdown {
            personal,
            dependent,
            insurance,
            other,
            total: personal + dependent + insurance + other,
        }
    }

    fn dependent_deduction(
        &self,
        dependents: u32,
    ) -> Decimal {
        Decimal::from(dependents) * self.config.dependent_per_month
    }

    /// Voluntary pension up to its ceiling plus charity in full.
    fn other_deduction(
        &self,
        other: &OtherDeductions,
    ) -> Decimal {
        let pension = non_negative(other.voluntary_pension).min(voluntary_pension_cap());
        let charity = non_negative(other.charity);
        round_vnd(pension + charity)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn new_law_personal_deduction_only() {
        let law = TaxLaw::new_2026();
        let deductions = DeductionResolver::new(&law).resolve(0, dec!(0), &OtherDeductions::default());

        assert_eq!(
            deductions,
            DeductionBreakdown {
                personal: dec!(15500000),
                dependent: dec!(0),
                insurance: dec!(0),
                other: dec!(0),
                total: dec!(15500000),
            }
        );
    }

    #[test]
    fn dependents_multiply_per_dependent_amount() {
        let old = TaxLaw::old();
        let new = TaxLaw::new_2026();

        let old_deductions = DeductionResolver::new(&old).resolve(2, dec!(0), &OtherDeductions::default());
        let new_deductions = DeductionResolver::new(&new).resolve(2, dec!(0), &OtherDeductions::default());

        assert_eq!(old_deductions.dependent, dec!(8800000));
        assert_eq!(new_deductions.dependent, dec!(12400000));
    }

    #[test]
    fn insurance_amount_is_passed_through() {
        let law = TaxLaw::old();
        let deductions = DeductionResolver::new(&law).resolve(1, dec!(3150000), &OtherDeductions::default());

        assert_eq!(deductions.insurance, dec!(3150000));
        assert_eq!(deductions.total, dec!(18550000));
    }

    #[test]
    fn voluntary_pension_is_capped() {
        let law = TaxLaw::new_2026();
        let other = OtherDeductions {
            voluntary_pension: dec!(3000000),
            charity: dec!(0),
        };

        let deductions = DeductionResolver::new(&law).resolve(0, dec!(0), &other);

        assert_eq!(deductions.other, dec!(1000000));
    }

    #[test]
    fn charity_is_deducted_in_full_with_pension_below_cap() {
        let law = TaxLaw::new_2026();
        let other = OtherDeductions {
            voluntary_pension: dec!(400000),
            charity: dec!(2500000),
        };

        let deductions = DeductionResolver::new(&law).resolve(0, dec!(0), &other);

        assert_eq!(deductions.other, dec!(2900000));
        assert_eq!(deductions.total, dec!(18400000));
    }

    #[test]
    fn negative_amounts_are_ignored() {
        let law = TaxLaw::new_2026();
        let other = OtherDeductions {
            voluntary_pension: dec!(-500000),
            charity: dec!(-1),
        };

        let deductions = DeductionResolver::new(&law).resolve(0, dec!(-10), &other);

        assert_eq!(deductions.insurance, dec!(0));
        assert_eq!(deductions.other, dec!(0));
        assert_eq!(deductions.total, dec!(15500000));
    }
}
