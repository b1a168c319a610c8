use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allowances::Allowances;
use super::insurance::InsuranceOptions;
use super::region::RegionType;

/// Deductions outside the family and insurance deductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherDeductions {
    /// Voluntary pension contributions; deductible up to a monthly ceiling.
    pub voluntary_pension: Decimal,
    /// Charitable and humanitarian contributions; deductible in full.
    pub charity: Decimal,
}

/// Everything one monthly calculation needs besides the law and the wage
/// table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxInput {
    /// Monthly gross income in VND, allowances included.
    pub gross_income: Decimal,
    pub dependents: u32,
    pub has_insurance: bool,
    /// `None` means every fund is enabled.
    pub insurance_options: Option<InsuranceOptions>,
    pub region: RegionType,
    pub other_deductions: OtherDeductions,
    /// Insurance wage base when it differs from actual pay.
    pub declared_salary: Option<Decimal>,
    pub allowances: Option<Allowances>,
}

impl TaxInput {
    /// Insured employee in region I with no dependents.
    pub fn new(gross_income: Decimal) -> Self {
        Self {
            gross_income,
            dependents: 0,
            has_insurance: true,
            insurance_options: None,
            region: RegionType::I,
            other_deductions: OtherDeductions::default(),
            declared_salary: None,
            allowances: None,
        }
    }

    pub fn with_dependents(
        mut self,
        dependents: u32,
    ) -> Self {
        self.dependents = dependents;
        self
    }

    pub fn with_region(
        mut self,
        region: RegionType,
    ) -> Self {
        self.region = region;
        self
    }

    pub fn with_insurance(
        mut self,
        has_insurance: bool,
    ) -> Self {
        self.has_insurance = has_insurance;
        self
    }

    pub fn with_insurance_options(
        mut self,
        options: InsuranceOptions,
    ) -> Self {
        self.insurance_options = Some(options);
        self
    }

    pub fn with_declared_salary(
        mut self,
        declared_salary: Decimal,
    ) -> Self {
        self.declared_salary = Some(declared_salary);
        self
    }

    pub fn with_allowances(
        mut self,
        allowances: Allowances,
    ) -> Self {
        self.allowances = Some(allowances);
        self
    }

    pub fn with_other_deductions(
        mut self,
        other_deductions: OtherDeductions,
    ) -> Self {
        self.other_deductions = other_deductions;
        self
    }

    /// Same context with a different gross figure.
    pub fn with_gross(
        &self,
        gross_income: Decimal,
    ) -> Self {
        Self {
            gross_income,
            ..self.clone()
        }
    }

    /// Funds to charge, or `None` when the employee is uninsured.
    pub fn enabled_funds(&self) -> Option<InsuranceOptions> {
        if self.has_insurance {
            Some(self.insurance_options.unwrap_or_default())
        } else {
            None
        }
    }

    /// Salary insurance is computed on: the declared salary when one is set
    /// and positive, otherwise actual gross.
    pub fn insurance_wage_base(&self) -> Decimal {
        match self.declared_salary {
            Some(declared) if declared > Decimal::ZERO => declared,
            _ => self.gross_income,
        }
    }
}
