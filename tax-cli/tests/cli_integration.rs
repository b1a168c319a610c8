//! End-to-end runs of `salary-calc` subcommands through the library API.

use chrono::NaiveDate;
use clap::Parser;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tax_cli::app::{Output, Settings, execute};
use tax_cli::cli::Cli;
use tax_cli::config::AppConfig;

const BATCH_CSV: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/test-data/batch.csv");
const BRACKETS_CSV: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../tax-data/test-data/pit_brackets.csv");

fn run(args: &[&str]) -> Output {
    let cli = Cli::try_parse_from(std::iter::once("salary-calc").chain(args.iter().copied()))
        .expect("Failed to parse arguments");
    let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let settings = Settings::resolve(&cli, &AppConfig::default(), today).expect("Failed to resolve settings");
    execute(&cli.command, &settings).expect("Command failed")
}

fn run_json(args: &[&str]) -> Value {
    let mut args = args.to_vec();
    args.push("--json");
    serde_json::from_str(&run(&args).stdout).expect("Output is not JSON")
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().expect("expected a string amount").parse().expect("expected a decimal")
}

#[test]
fn test_gross_to_net_text_report() {
    let output = run(&["gross-to-net", "30.000.000"]);

    assert!(output.warnings.is_empty());
    assert!(output.stdout.contains("26.215.000"));
}

#[test]
fn test_gross_to_net_json() {
    let json = run_json(&["gross-to-net", "30000000"]);

    assert_eq!(decimal(&json["net_income"]), dec!(26215000));
    assert_eq!(decimal(&json["tax_amount"]), dec!(635000));
    assert_eq!(json["tax_breakdown"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_old_law_flag() {
    let json = run_json(&["--law", "old", "gross-to-net", "30000000"]);

    assert_eq!(decimal(&json["tax_amount"]), dec!(1627500));
}

#[test]
fn test_net_to_gross_round_trip() {
    let json = run_json(&["net-to-gross", "25000000", "-d", "1"]);

    assert_eq!(json["converged"], Value::Bool(true));
    let net = decimal(&json["result"]["net"]);
    assert!((net - dec!(25000000)).abs() <= dec!(1000), "net was {net}");
}

#[test]
fn test_compare_reports_saving() {
    let json = run_json(&["compare", "30000000"]);

    assert_eq!(decimal(&json["tax_saving"]), dec!(992500));
}

#[test]
fn test_share_then_open() {
    let share = run(&["--region", "2", "share", "40000000", "-d", "1", "--meal", "730000"]);
    let query = share.stdout.trim().to_string();
    assert!(query.contains("region=2"));

    let direct = run_json(&["--region", "2", "gross-to-net", "40000000", "-d", "1", "--meal", "730000"]);
    let opened = run_json(&["open", &query]);

    assert_eq!(opened["result"], direct);
}

#[test]
fn test_open_reports_bad_fields() {
    let output = run(&["open", "gross=30000000&region=9"]);

    assert_eq!(output.warnings.len(), 1);
    assert!(output.stdout.contains("26.215.000"));
}

#[test]
fn test_negative_gross_warns() {
    let output = run(&["gross-to-net", "-5000000"]);

    assert_eq!(output.warnings.len(), 1);
}

#[test]
fn test_oversized_gross_is_clamped_to_ceiling() {
    let output = run(&["gross-to-net", "100000000000000000000000000000", "--json"]);
    let json: Value = serde_json::from_str(&output.stdout).expect("Output is not JSON");

    assert_eq!(decimal(&json["gross_income"]), dec!(10000000000));
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(
        output.warnings[0].to_string(),
        "gross: value too large, clamped to 10000000000"
    );
}

#[test]
fn test_batch_row_warnings_are_reported() {
    let path = std::env::temp_dir().join(format!("salary-calc-batch-{}.csv", std::process::id()));
    std::fs::write(&path, "mode,amount,dependents\ngross,-100,-2\ngross,30000000,0\n").expect("Failed to write batch file");

    let output = run(&["batch", path.to_str().expect("temp path is UTF-8")]);
    std::fs::remove_file(&path).ok();

    let fields: Vec<String> = output.warnings.iter().map(ToString::to_string).collect();
    assert_eq!(
        fields,
        vec![
            "row 1 amount: negative values are not supported, using 0".to_string(),
            "row 1 dependents: negative values are not supported, using 0".to_string(),
        ]
    );
}

#[test]
fn test_batch_file() {
    let output = run(&["batch", BATCH_CSV]);
    assert!(output.warnings.is_empty());

    let json = run_json(&["batch", BATCH_CSV]);
    let rows = json.as_array().expect("expected an array of outcomes");

    assert_eq!(rows.len(), 5);
    assert_eq!(decimal(&rows[0]["result"]["net"]), dec!(26215000));
    assert_eq!(rows[1]["converged"], Value::Bool(true));
    assert_eq!(decimal(&rows[2]["result"]["net"]), dec!(10740000));
    assert_eq!(decimal(&rows[3]["result"]["net"]), dec!(8000000));
    assert_eq!(decimal(&rows[4]["result"]["tax"]), dec!(3190000));
    assert_eq!(decimal(&rows[4]["result"]["net"]), dec!(45760000));
}

#[test]
fn test_custom_bracket_file_matches_builtin() {
    let builtin = run_json(&["gross-to-net", "30000000"]);
    let loaded = run_json(&["--brackets", BRACKETS_CSV, "gross-to-net", "30000000"]);

    for field in ["insurance_detail", "taxable_income", "tax_amount", "net_income"] {
        assert_eq!(loaded[field], builtin[field], "{field} differs");
    }
}
