use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tax_core::sanitize::{AmountKind, InputWarning, sanitize_amount, sanitize_count};
use tax_core::{Allowances, InsuranceOptions, LawVersion, OtherDeductions, RegionType, TaxInput};

/// Vietnamese salary calculator: PIT, mandatory insurance and GROSS ⇄ NET.
///
/// Amounts accept plain (`30000000`), comma-grouped (`30,000,000`) or
/// dot-grouped (`30.000.000`) notation.
#[derive(Debug, Parser)]
#[command(name = "salary-calc", version, about)]
pub struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Tax law: `old` (7 brackets) or `new` (5 brackets, 2026).
    #[arg(long, global = true, value_parser = parse_law)]
    pub law: Option<LawVersion>,

    /// Minimum-wage region, 1 to 4.
    #[arg(long, global = true, value_parser = parse_region)]
    pub region: Option<RegionType>,

    /// Date whose wage table applies (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    pub as_of: Option<NaiveDate>,

    /// Print JSON instead of a text report.
    #[arg(long, global = true)]
    pub json: bool,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// CSV of wage periods replacing the built-in table.
    #[arg(long, global = true)]
    pub wage_table: Option<PathBuf>,

    /// CSV of bracket schedules replacing the built-in brackets.
    #[arg(long, global = true)]
    pub brackets: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Net salary, insurance and PIT for a gross salary.
    GrossToNet {
        /// Monthly gross salary in VND.
        #[arg(allow_negative_numbers = true)]
        gross: String,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Gross salary needed for a target net salary.
    NetToGross {
        /// Target monthly net salary in VND.
        #[arg(allow_negative_numbers = true)]
        net: String,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Same gross salary under the old and the new law.
    Compare {
        /// Monthly gross salary in VND.
        #[arg(allow_negative_numbers = true)]
        gross: String,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print a share link query string for these inputs.
    Share {
        /// Monthly gross salary in VND.
        #[arg(allow_negative_numbers = true)]
        gross: String,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Evaluate a share link query string.
    Open {
        /// Query string printed by `share`, with or without the leading `?`.
        query: String,
    },
    /// Evaluate every row of a CSV file.
    Batch {
        /// CSV with `mode` and `amount` columns.
        file: PathBuf,
    },
}

/// Per-employee inputs shared by the calculation commands.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Number of registered dependents. Negative counts are treated as 0.
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub dependents: String,

    /// Employee does not pay mandatory insurance.
    #[arg(long)]
    pub no_insurance: bool,

    /// Skip social insurance (BHXH).
    #[arg(long)]
    pub no_bhxh: bool,

    /// Skip health insurance (BHYT).
    #[arg(long)]
    pub no_bhyt: bool,

    /// Skip unemployment insurance (BHTN).
    #[arg(long)]
    pub no_bhtn: bool,

    /// Salary declared for insurance, when it differs from gross.
    #[arg(long)]
    pub declared: Option<String>,

    /// Meal allowance included in gross.
    #[arg(long)]
    pub meal: Option<String>,

    /// Uniform allowance included in gross.
    #[arg(long)]
    pub uniform: Option<String>,

    /// Phone allowance included in gross.
    #[arg(long)]
    pub phone: Option<String>,

    /// Hazardous-work allowance included in gross.
    #[arg(long)]
    pub hazardous: Option<String>,

    /// Other taxable allowances included in gross.
    #[arg(long)]
    pub other_allowance: Option<String>,

    /// Voluntary pension contribution.
    #[arg(long)]
    pub pension: Option<String>,

    /// Charitable contributions.
    #[arg(long)]
    pub charity: Option<String>,
}

fn parse_law(s: &str) -> Result<LawVersion, String> {
    s.parse()
}

fn parse_region(s: &str) -> Result<RegionType, String> {
    s.trim()
        .parse::<u8>()
        .ok()
        .and_then(RegionType::from_number)
        .ok_or_else(|| format!("region must be 1, 2, 3 or 4, got '{s}'"))
}

/// Collects sanitized amounts and the warnings raised while reading them.
#[derive(Debug, Default)]
pub struct AmountReader {
    pub warnings: Vec<InputWarning>,
}

impl AmountReader {
    pub fn amount(
        &mut self,
        field: &str,
        raw: &str,
        kind: AmountKind,
    ) -> Decimal {
        let sanitized = sanitize_amount(field, raw, kind);
        self.warnings.extend(sanitized.warnings);
        sanitized.value
    }

    pub fn count(
        &mut self,
        field: &str,
        raw: &str,
    ) -> u32 {
        let sanitized = sanitize_count(field, raw);
        self.warnings.extend(sanitized.warnings);
        sanitized.value
    }

    fn optional(
        &mut self,
        field: &str,
        raw: Option<&str>,
    ) -> Decimal {
        raw.map_or(Decimal::ZERO, |raw| self.amount(field, raw, AmountKind::Generic))
    }
}

impl InputArgs {
    /// Builds the calculation context; `gross_income` is set by the caller.
    pub fn to_input(
        &self,
        gross_income: Decimal,
        region: RegionType,
        reader: &mut AmountReader,
    ) -> TaxInput {
        let allowances = Allowances {
            meal: reader.optional("meal", self.meal.as_deref()),
            uniform: reader.optional("uniform", self.uniform.as_deref()),
            phone: reader.optional("phone", self.phone.as_deref()),
            hazardous: reader.optional("hazardous", self.hazardous.as_deref()),
            other: reader.optional("other_allowance", self.other_allowance.as_deref()),
        };
        let other_deductions = OtherDeductions {
            voluntary_pension: reader.optional("pension", self.pension.as_deref()),
            charity: reader.optional("charity", self.charity.as_deref()),
        };
        let declared = self
            .declared
            .as_deref()
            .map(|raw| reader.amount("declared", raw, AmountKind::MonthlySalary))
            .filter(|declared| *declared > Decimal::ZERO);

        let dependents = reader.count("dependents", &self.dependents);

        let mut input = TaxInput::new(gross_income)
            .with_dependents(dependents)
            .with_region(region)
            .with_insurance(!self.no_insurance)
            .with_insurance_options(InsuranceOptions {
                bhxh: !self.no_bhxh,
                bhyt: !self.no_bhyt,
                bhtn: !self.no_bhtn,
            })
            .with_other_deductions(other_deductions);
        if let Some(declared) = declared {
            input = input.with_declared_salary(declared);
        }
        if !allowances.is_empty() {
            input = input.with_allowances(allowances);
        }
        input
    }
}
