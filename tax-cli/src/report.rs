//! Text and JSON rendering of calculation results.

use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::calculations::{LawComparison, ReverseSolution};
use tax_core::format::{format_percent, format_rate, format_vnd};
use tax_core::sanitize::InputWarning;
use tax_core::{TaxLaw, TaxResult};

use crate::batch::{BatchMode, BatchOutcome};

const LABEL_WIDTH: usize = 30;
const VALUE_WIDTH: usize = 18;

/// Line-oriented text report with right-aligned amounts.
#[derive(Debug, Default)]
struct Report {
    lines: Vec<String>,
}

impl Report {
    fn heading(
        &mut self,
        title: &str,
    ) {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(title.to_string());
        self.lines.push("-".repeat(LABEL_WIDTH + VALUE_WIDTH));
    }

    fn text(
        &mut self,
        label: &str,
        value: impl AsRef<str>,
    ) {
        self.lines
            .push(format!("{label:<LABEL_WIDTH$}{:>VALUE_WIDTH$}", value.as_ref()));
    }

    fn amount(
        &mut self,
        label: &str,
        amount: Decimal,
    ) {
        self.text(label, format_vnd(amount));
    }

    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

fn write_result(
    report: &mut Report,
    result: &TaxResult,
) {
    report.amount("Gross income", result.gross_income);
    if let Some(detail) = &result.insurance_detail {
        report.amount("  BHXH (8%)", detail.employee.bhxh);
        report.amount("  BHYT (1.5%)", detail.employee.bhyt);
        report.amount("  BHTN (1%)", detail.employee.bhtn);
    }
    report.amount("Insurance", result.insurance_amount());
    if !result.exempt_income.is_zero() {
        report.amount("Exempt allowances", result.exempt_income);
    }
    report.amount("Personal deduction", result.deductions.personal);
    report.amount("Dependent deduction", result.deductions.dependent);
    if !result.deductions.other.is_zero() {
        report.amount("Other deductions", result.deductions.other);
    }
    report.amount("Taxable income", result.taxable_income);
    report.amount("Personal income tax", result.tax_amount);
    report.amount("Net income", result.net_income);
    report.text("Effective rate", format_percent(result.effective_rate));
}

/// Full GROSS → NET report: summary, bracket breakdown and employer cost.
pub fn render_result(
    result: &TaxResult,
    law: &TaxLaw,
) -> String {
    let mut report = Report::default();
    report.heading(&format!("Salary breakdown ({} law)", law.version));
    write_result(&mut report, result);

    if !result.tax_breakdown.is_empty() {
        report.heading("Tax by bracket");
        for item in &result.tax_breakdown {
            let band = match item.max_income {
                Some(max) => format!("{} - {}", format_vnd(item.min_income), format_vnd(max)),
                None => format!("over {}", format_vnd(item.min_income)),
            };
            report.text(
                &format!("  {}. {} @ {}", item.level, band, format_rate(item.tax_rate)),
                format_vnd(item.tax),
            );
        }
    }

    if let Some(detail) = &result.insurance_detail {
        report.heading("Employer cost");
        report.amount("  BHXH (17.5%)", detail.employer.bhxh);
        report.amount("  BHYT (3%)", detail.employer.bhyt);
        report.amount("  BHTN (1%)", detail.employer.bhtn);
        report.amount("Total employer cost", result.employer_cost());
    }
    report.finish()
}

/// NET → GROSS report.
pub fn render_reverse(
    solution: &ReverseSolution,
    target_net: Decimal,
) -> String {
    let mut report = Report::default();
    report.heading("Required gross salary");
    report.amount("Target net", target_net);
    report.amount("Gross income", solution.gross);
    report.amount("Insurance", solution.result.insurance);
    report.amount("Taxable income", solution.result.taxable_income);
    report.amount("Personal income tax", solution.result.tax);
    report.amount("Net income", solution.result.net);
    report.text("Iterations", solution.iterations.to_string());
    if !solution.converged {
        report.text("Converged", "no (closest estimate)");
    }
    report.finish()
}

/// Old and new law side by side.
pub fn render_comparison(comparison: &LawComparison) -> String {
    let mut lines = vec![
        format!("{:<24}{:>18}{:>18}", "", "Old law", "New law"),
        "-".repeat(60),
    ];
    let mut row = |label: &str, old: Decimal, new: Decimal| {
        lines.push(format!("{label:<24}{:>18}{:>18}", format_vnd(old), format_vnd(new)));
    };
    let (old, new) = (&comparison.old, &comparison.new);
    row("Gross income", old.gross_income, new.gross_income);
    row("Insurance", old.insurance_amount(), new.insurance_amount());
    row("Deductions", old.total_deductions, new.total_deductions);
    row("Taxable income", old.taxable_income, new.taxable_income);
    row("Personal income tax", old.tax_amount, new.tax_amount);
    row("Net income", old.net_income, new.net_income);
    lines.push(format!(
        "{:<24}{:>18}{:>18}",
        "Effective rate",
        format_percent(old.effective_rate),
        format_percent(new.effective_rate)
    ));
    lines.push(String::new());
    lines.push(format!("{:<24}{:>36}", "Tax saving", format_vnd(comparison.tax_saving)));
    lines.push(format!("{:<24}{:>36}", "Net gain", format_vnd(comparison.net_gain)));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// One line per batch row.
pub fn render_batch(outcomes: &[BatchOutcome]) -> String {
    let mut lines = vec![
        format!(
            "{:<16}{:>6}{:>16}{:>16}{:>14}{:>14}",
            "Label", "Mode", "Gross", "Net", "Insurance", "Tax"
        ),
        "-".repeat(82),
    ];
    for outcome in outcomes {
        let mode = match outcome.mode {
            BatchMode::Gross => "gross",
            BatchMode::Net => "net",
        };
        let marker = if outcome.converged { "" } else { " *" };
        lines.push(format!(
            "{:<16}{:>6}{:>16}{:>16}{:>14}{:>14}{}",
            outcome.label,
            mode,
            format_vnd(outcome.result.gross),
            format_vnd(outcome.result.net),
            format_vnd(outcome.result.insurance),
            format_vnd(outcome.result.tax),
            marker
        ));
    }
    if outcomes.iter().any(|o| !o.converged) {
        lines.push("* search did not converge; closest estimate shown".to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn render_warnings(warnings: &[InputWarning]) -> String {
    warnings.iter().map(|w| format!("warning: {w}\n")).collect()
}

pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
