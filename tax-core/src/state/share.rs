//! Share links: the shared state as a URL query string.
//!
//! Parsing is lenient. Bad values fall back to defaults with an
//! [`InputWarning`], and unknown keys are ignored so older links keep
//! working.

use std::borrow::Cow;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{LawVersion, RegionType, SharedTaxState};
use crate::sanitize::{AmountKind, InputWarning, Sanitized, sanitize_amount, sanitize_count};

const KEY_LAW: &str = "law";
const KEY_GROSS: &str = "gross";
const KEY_DEPENDENTS: &str = "dependents";
const KEY_REGION: &str = "region";
const KEY_INSURANCE: &str = "insurance";
const KEY_DECLARED: &str = "declared";
const KEY_BHXH: &str = "bhxh";
const KEY_BHYT: &str = "bhyt";
const KEY_BHTN: &str = "bhtn";
const KEY_MEAL: &str = "meal";
const KEY_UNIFORM: &str = "uniform";
const KEY_PHONE: &str = "phone";
const KEY_HAZARDOUS: &str = "hazardous";
const KEY_OTHER: &str = "other_allowance";

impl SharedTaxState {
    /// Encodes the state. Optional fields are written only when they differ
    /// from their defaults.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = vec![
            (KEY_LAW, self.law.as_str().to_string()),
            (KEY_GROSS, self.gross_income.normalize().to_string()),
            (KEY_DEPENDENTS, self.dependents.to_string()),
            (KEY_REGION, self.region.number().to_string()),
            (KEY_INSURANCE, flag(self.has_insurance).to_string()),
        ];

        if let Some(declared) = self.declared_salary {
            pairs.push((KEY_DECLARED, declared.normalize().to_string()));
        }

        let options = self.insurance_options;
        if options != Default::default() {
            pairs.push((KEY_BHXH, flag(options.bhxh).to_string()));
            pairs.push((KEY_BHYT, flag(options.bhyt).to_string()));
            pairs.push((KEY_BHTN, flag(options.bhtn).to_string()));
        }

        let allowances = self.allowances;
        for (key, amount) in [
            (KEY_MEAL, allowances.meal),
            (KEY_UNIFORM, allowances.uniform),
            (KEY_PHONE, allowances.phone),
            (KEY_HAZARDOUS, allowances.hazardous),
            (KEY_OTHER, allowances.other),
        ] {
            if !amount.is_zero() {
                pairs.push((key, amount.normalize().to_string()));
            }
        }

        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Decodes a query string, with or without the leading `?`. Missing
    /// keys keep their default values.
    pub fn from_query_string(query: &str) -> Sanitized<SharedTaxState> {
        let mut state = SharedTaxState::default();
        let mut warnings = Vec::new();

        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(raw_key);
            let value = decode(raw_value);

            match key.as_ref() {
                KEY_LAW => match LawVersion::parse(&value) {
                    Some(law) => state.law = law,
                    None => warnings.push(unrecognized(KEY_LAW, &value)),
                },
                KEY_GROSS => {
                    state.gross_income =
                        take_amount(KEY_GROSS, &value, AmountKind::MonthlySalary, &mut warnings)
                }
                KEY_DEPENDENTS => {
                    let count = sanitize_count(KEY_DEPENDENTS, &value);
                    warnings.extend(count.warnings);
                    state.dependents = count.value;
                }
                KEY_REGION => match value.trim().parse::<u8>().ok().and_then(RegionType::from_number) {
                    Some(region) => state.region = region,
                    None => warnings.push(unrecognized(KEY_REGION, &value)),
                },
                KEY_INSURANCE => set_flag(&mut state.has_insurance, KEY_INSURANCE, &value, &mut warnings),
                KEY_DECLARED => {
                    let declared =
                        take_amount(KEY_DECLARED, &value, AmountKind::MonthlySalary, &mut warnings);
                    state.declared_salary = (declared > Decimal::ZERO).then_some(declared);
                }
                KEY_BHXH => set_flag(&mut state.insurance_options.bhxh, KEY_BHXH, &value, &mut warnings),
                KEY_BHYT => set_flag(&mut state.insurance_options.bhyt, KEY_BHYT, &value, &mut warnings),
                KEY_BHTN => set_flag(&mut state.insurance_options.bhtn, KEY_BHTN, &value, &mut warnings),
                KEY_MEAL => state.allowances.meal = take_amount(KEY_MEAL, &value, AmountKind::Generic, &mut warnings),
                KEY_UNIFORM => {
                    state.allowances.uniform = take_amount(KEY_UNIFORM, &value, AmountKind::Generic, &mut warnings)
                }
                KEY_PHONE => state.allowances.phone = take_amount(KEY_PHONE, &value, AmountKind::Generic, &mut warnings),
                KEY_HAZARDOUS => {
                    state.allowances.hazardous =
                        take_amount(KEY_HAZARDOUS, &value, AmountKind::Generic, &mut warnings)
                }
                KEY_OTHER => state.allowances.other = take_amount(KEY_OTHER, &value, AmountKind::Generic, &mut warnings),
                other => debug!(key = other, "ignoring unknown share key"),
            }
        }

        Sanitized { value: state, warnings }
    }
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

fn decode(raw: &str) -> Cow<'_, str> {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Borrowed(raw),
    }
}

fn unrecognized(
    field: &str,
    input: &str,
) -> InputWarning {
    InputWarning::Unrecognized {
        field: field.to_string(),
        input: input.to_string(),
    }
}

fn take_amount(
    field: &str,
    raw: &str,
    kind: AmountKind,
    warnings: &mut Vec<InputWarning>,
) -> Decimal {
    let amount = sanitize_amount(field, raw, kind);
    warnings.extend(amount.warnings);
    amount.value
}

fn set_flag(
    target: &mut bool,
    field: &str,
    raw: &str,
    warnings: &mut Vec<InputWarning>,
) {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => *target = true,
        "0" | "false" | "no" | "off" => *target = false,
        _ => warnings.push(unrecognized(field, raw)),
    }
}
