use std::path::Path;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use tax_core::calculations::{GrossNetConverter, InsuranceCalculator, SolverSettings, compare_laws};
use tax_core::sanitize::{AmountKind, InputWarning};
use tax_core::{LawVersion, OtherDeductions, RegionType, SharedTaxState, TaxInput, TaxLaw, WageTable};
use tax_data::{BracketRecord, BracketScheduleLoader, TableLoaderError, WageTableLoader};
use tracing::{debug, info};

use crate::batch;
use crate::cli::{AmountReader, Cli, Command, InputArgs};
use crate::config::AppConfig;
use crate::report;

/// Tables and settings after merging flags, config file and built-ins.
#[derive(Debug, Clone)]
pub struct Settings {
    pub law: LawVersion,
    pub region: RegionType,
    pub as_of: NaiveDate,
    pub json: bool,
    pub solver: SolverSettings,
    pub wage_table: WageTable,
    old_law: TaxLaw,
    new_law: TaxLaw,
}

/// What a command printed, plus advisory input warnings for stderr.
#[derive(Debug, Default)]
pub struct Output {
    pub stdout: String,
    pub warnings: Vec<InputWarning>,
}

impl Settings {
    /// Flags win over the config file, which wins over built-in defaults.
    pub fn resolve(
        cli: &Cli,
        config: &AppConfig,
        today: NaiveDate,
    ) -> Result<Self> {
        let wage_table = match cli.wage_table.as_ref().or(config.wage_table.as_ref()) {
            Some(path) => WageTableLoader::load_file(path)
                .with_context(|| format!("failed to load wage table: {}", path.display()))?,
            None => WageTable::builtin(),
        };

        let bracket_file = cli.brackets.as_ref().or(config.brackets.as_ref());
        let records = bracket_file
            .map(|path| load_bracket_records(path))
            .transpose()?;
        let old_law = law_from(records.as_deref(), LawVersion::Old)?;
        let new_law = law_from(records.as_deref(), LawVersion::New)?;

        let settings = Self {
            law: cli.law.or(config.law).unwrap_or_default(),
            region: cli.region.or(config.region).unwrap_or_default(),
            as_of: cli.as_of.or(config.as_of).unwrap_or(today),
            json: cli.json,
            solver: config.solver,
            wage_table,
            old_law,
            new_law,
        };
        debug!(law = %settings.law, region = %settings.region, as_of = %settings.as_of, "resolved settings");
        Ok(settings)
    }

    pub fn tax_law(
        &self,
        version: LawVersion,
    ) -> &TaxLaw {
        match version {
            LawVersion::Old => &self.old_law,
            LawVersion::New => &self.new_law,
        }
    }

    pub fn insurance(&self) -> InsuranceCalculator {
        InsuranceCalculator::new(&self.wage_table, self.as_of)
    }
}

fn load_bracket_records(path: &Path) -> Result<Vec<BracketRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open bracket schedule: {}", path.display()))?;
    let records = BracketScheduleLoader::parse(file)
        .with_context(|| format!("failed to parse bracket schedule: {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "loaded bracket schedule file");
    Ok(records)
}

/// Law from the bracket file when it has a schedule for `version`,
/// otherwise the built-in law.
fn law_from(
    records: Option<&[BracketRecord]>,
    version: LawVersion,
) -> Result<TaxLaw> {
    let Some(records) = records else {
        return Ok(TaxLaw::for_version(version));
    };
    match BracketScheduleLoader::build(records, version) {
        Ok(law) => Ok(law),
        Err(TableLoaderError::MissingSchedule(_)) => Ok(TaxLaw::for_version(version)),
        Err(e) => Err(e).with_context(|| format!("invalid {version} law schedule")),
    }
}

fn read_input(
    raw_amount: &str,
    field: &str,
    args: &InputArgs,
    settings: &Settings,
    reader: &mut AmountReader,
) -> (Decimal, TaxInput) {
    let amount = reader.amount(field, raw_amount, AmountKind::MonthlySalary);
    let input = args.to_input(amount, settings.region, reader);
    (amount, input)
}

fn share_state(
    input: &TaxInput,
    law: LawVersion,
) -> SharedTaxState {
    SharedTaxState {
        law,
        gross_income: input.gross_income,
        dependents: input.dependents,
        has_insurance: input.has_insurance,
        region: input.region,
        declared_salary: input.declared_salary,
        allowances: input.allowances.unwrap_or_default(),
        insurance_options: input.insurance_options.unwrap_or_default(),
    }
}

/// Runs one subcommand and renders its output.
pub fn execute(
    command: &Command,
    settings: &Settings,
) -> Result<Output> {
    let insurance = settings.insurance();
    let law = settings.tax_law(settings.law);
    let converter = GrossNetConverter::new(law, &insurance).with_settings(settings.solver);
    let mut reader = AmountReader::default();

    let stdout = match command {
        Command::GrossToNet { gross, input } => {
            let (_, input) = read_input(gross, "gross", input, settings, &mut reader);
            let result = converter.calculate(&input);
            if settings.json {
                report::to_json(&result)?
            } else {
                report::render_result(&result, law)
            }
        }
        Command::NetToGross { net, input } => {
            let (target, input) = read_input(net, "net", input, settings, &mut reader);
            let solution = converter.net_to_gross(target, &input);
            if settings.json {
                report::to_json(&solution)?
            } else {
                report::render_reverse(&solution, target)
            }
        }
        Command::Compare { gross, input } => {
            let (_, input) = read_input(gross, "gross", input, settings, &mut reader);
            let comparison = compare_laws(
                &input,
                settings.tax_law(LawVersion::Old),
                settings.tax_law(LawVersion::New),
                &insurance,
            );
            if settings.json {
                report::to_json(&comparison)?
            } else {
                report::render_comparison(&comparison)
            }
        }
        Command::Share { gross, input } => {
            let (_, input) = read_input(gross, "gross", input, settings, &mut reader);
            let query = share_state(&input, settings.law).to_query_string();
            if settings.json {
                report::to_json(&json!({ "query": query }))?
            } else {
                format!("{query}\n")
            }
        }
        Command::Open { query } => {
            let decoded = SharedTaxState::from_query_string(query);
            reader.warnings.extend(decoded.warnings);
            let state = decoded.value;
            let law = settings.tax_law(state.law);
            let result = GrossNetConverter::new(law, &insurance)
                .with_settings(settings.solver)
                .calculate(&state.to_input(OtherDeductions::default()));
            if settings.json {
                report::to_json(&json!({ "state": state, "result": result }))?
            } else {
                report::render_result(&result, law)
            }
        }
        Command::Batch { file } => {
            let entries = batch::load_from_file(file, settings.region)
                .with_context(|| format!("failed to load batch file: {}", file.display()))?;
            reader
                .warnings
                .extend(entries.iter().flat_map(|entry| entry.warnings.iter().cloned()));
            let outcomes = batch::evaluate(&entries, &converter);
            if settings.json {
                report::to_json(&outcomes)?
            } else {
                report::render_batch(&outcomes)
            }
        }
    };

    Ok(Output {
        stdout,
        warnings: reader.warnings,
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from(["salary-calc", "--law", "new", "compare", "1"]).unwrap();
        let config = AppConfig {
            law: Some(LawVersion::Old),
            region: Some(RegionType::IV),
            ..AppConfig::default()
        };

        let settings = Settings::resolve(&cli, &config, today()).unwrap();

        assert_eq!(settings.law, LawVersion::New);
        assert_eq!(settings.region, RegionType::IV);
        assert_eq!(settings.as_of, today());
    }

    #[test]
    fn defaults_use_builtin_tables() {
        let cli = Cli::try_parse_from(["salary-calc", "compare", "1"]).unwrap();

        let settings = Settings::resolve(&cli, &AppConfig::default(), today()).unwrap();

        assert_eq!(settings.tax_law(LawVersion::Old), &TaxLaw::old());
        assert_eq!(settings.tax_law(LawVersion::New), &TaxLaw::new_2026());
        assert_eq!(settings.wage_table, WageTable::builtin());
    }

    #[test]
    fn law_from_falls_back_when_schedule_missing() {
        let records = vec![BracketRecord {
            law: "old".to_string(),
            min_income: dec!(0),
            max_income: None,
            rate: dec!(0.1),
        }];

        let new = law_from(Some(&records), LawVersion::New).unwrap();
        let old = law_from(Some(&records), LawVersion::Old).unwrap();

        assert_eq!(new, TaxLaw::new_2026());
        assert_eq!(old.brackets.len(), 1);
    }

    #[test]
    fn share_state_keeps_inputs() {
        let input = TaxInput::new(dec!(40000000)).with_dependents(1).with_region(RegionType::II);

        let state = share_state(&input, LawVersion::Old);

        assert_eq!(state.law, LawVersion::Old);
        assert_eq!(state.gross_income, dec!(40000000));
        assert_eq!(state.dependents, 1);
        assert_eq!(state.region, RegionType::II);
        assert_eq!(state.allowances, Default::default());
    }
}
