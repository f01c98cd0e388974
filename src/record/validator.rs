//! Record validator for lab-check form input
//!
//! Validation semantics:
//! - Every field is checked independently and all failures are collected
//! - Required fields must be present and non-blank
//! - Numeric fields must parse and fall inside their inclusive range
//! - median_height must lie within [min_height, max_height], checked only
//!   once both bounds parsed and passed their own range checks
//! - Undeclared input keys are rejected
//!
//! The validator never produces a partial record.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;

use super::errors::ValidationError;
use super::fields::{Field, FieldKind, FieldSpec, FIELD_SPECS, LAB_IDS};
use super::types::{LabCheck, PlotCheck, RawRecord, ValidatedRecord};

const REQUIRED: &str = "A value is required";

/// A field value after parsing, before the record is assembled
#[derive(Debug, Clone, PartialEq)]
enum Parsed {
    Date(NaiveDate),
    Time(NaiveTime),
    Text(String),
    Lab(char),
    Int(i64),
    Dec(Decimal),
    Bool(bool),
}

/// Table-driven validator for one plot check.
///
/// Stateless and deterministic: the same input always yields the same
/// outcome.
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator {
    specs: &'static [FieldSpec],
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordValidator {
    pub fn new() -> Self {
        Self {
            specs: &FIELD_SPECS,
        }
    }

    /// Validates raw form input.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` listing every failing field with one or
    /// more messages.
    pub fn validate(&self, raw: &RawRecord) -> Result<ValidatedRecord, ValidationError> {
        let mut errors = ValidationError::new();

        for key in raw.keys() {
            if Field::from_name(key).is_none() {
                errors.push_key(key, "Unknown field");
            }
        }

        let mut parsed: BTreeMap<Field, Parsed> = BTreeMap::new();
        for spec in self.specs {
            match check_field(spec, raw.get(spec.field.name())) {
                Ok(Some(value)) => {
                    parsed.insert(spec.field, value);
                }
                Ok(None) => {}
                Err(message) => errors.push(spec.field, message),
            }
        }

        check_median(&parsed, &mut errors);

        errors.into_result()?;
        assemble(parsed)
    }
}

/// Parses and range-checks one field. `Ok(None)` means an optional field
/// was left blank.
fn check_field(spec: &FieldSpec, value: Option<&Value>) -> Result<Option<Parsed>, String> {
    if spec.kind == FieldKind::LongText {
        return Ok(Some(Parsed::Text(long_text(value))));
    }

    let text = match value.and_then(raw_text) {
        Some(text) => text,
        None if spec.required => return Err(REQUIRED.to_string()),
        None => return Ok(None),
    };

    let parsed = match spec.kind {
        FieldKind::IsoDate => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Parsed::Date)
            .map_err(|_| "Invalid date (expected YYYY-MM-DD)".to_string())?,
        FieldKind::ClockTime => parse_clock(&text)
            .map(Parsed::Time)
            .ok_or_else(|| "Invalid time (expected HH:MM)".to_string())?,
        FieldKind::Text => Parsed::Text(text),
        FieldKind::LabCode => parse_lab(&text)
            .map(Parsed::Lab)
            .ok_or_else(|| format!("Lab must be one of {}", lab_list()))?,
        FieldKind::FixedText(len) => {
            let count = text.chars().count();
            if count != len {
                return Err(format!("Must be exactly {} characters (got {})", len, count));
            }
            Parsed::Text(text)
        }
        FieldKind::Integer => {
            let number = parse_number(&text, 0)?;
            check_range(spec, number)?;
            let whole = number
                .to_i64()
                .ok_or_else(|| format!("Invalid number string: {}", text))?;
            Parsed::Int(whole)
        }
        FieldKind::Decimal(scale) => {
            let mut number = parse_number(&text, scale)?;
            check_range(spec, number)?;
            number.rescale(scale);
            Parsed::Dec(number)
        }
        FieldKind::Boolean => parse_bool(value, &text)
            .map(Parsed::Bool)
            .ok_or_else(|| format!("Invalid boolean value: {}", text))?,
        FieldKind::LongText => Parsed::Text(text),
    };

    Ok(Some(parsed))
}

fn check_median(parsed: &BTreeMap<Field, Parsed>, errors: &mut ValidationError) {
    let (Some(min), Some(max)) = (decimal(parsed, Field::MinHeight), decimal(parsed, Field::MaxHeight))
    else {
        return;
    };
    let Some(median) = decimal(parsed, Field::MedianHeight) else {
        return;
    };
    if median < min || median > max {
        errors.push(
            Field::MedianHeight,
            format!(
                "Median height must be between min height ({}) and max height ({})",
                min, max
            ),
        );
    }
}

fn decimal(parsed: &BTreeMap<Field, Parsed>, field: Field) -> Option<Decimal> {
    match parsed.get(&field) {
        Some(Parsed::Dec(value)) => Some(*value),
        _ => None,
    }
}

/// Builds the record from a fully validated field map.
fn assemble(mut parsed: BTreeMap<Field, Parsed>) -> Result<ValidatedRecord, ValidationError> {
    let mut take = |field: Field| parsed.remove(&field);

    let date = take(Field::Date);
    let time = take(Field::Time);
    let technician = take(Field::Technician);
    let lab_id = take(Field::LabId);
    let plot = take(Field::Plot);
    let seed_sample = take(Field::SeedSample);
    let humidity = take(Field::Humidity);
    let light = take(Field::Light);
    let temperature = take(Field::Temperature);
    let equipment_fault = take(Field::EquipmentFault);
    let plants = take(Field::Plants);
    let blossoms = take(Field::Blossoms);
    let fruit = take(Field::Fruit);
    let max_height = take(Field::MaxHeight);
    let min_height = take(Field::MinHeight);
    let median_height = take(Field::MedianHeight);
    let notes = take(Field::Notes);

    let lab_check = LabCheck {
        date: match date {
            Some(Parsed::Date(d)) => d,
            _ => return Err(missing(Field::Date)),
        },
        time: match time {
            Some(Parsed::Time(t)) => t,
            _ => return Err(missing(Field::Time)),
        },
        lab_id: match lab_id {
            Some(Parsed::Lab(c)) => c,
            _ => return Err(missing(Field::LabId)),
        },
        technician: text(technician, Field::Technician)?,
    };

    let plot_check = PlotCheck {
        plot: small(plot, Field::Plot)?,
        seed_sample: text(seed_sample, Field::SeedSample)?,
        humidity: optional_decimal(humidity),
        light: optional_decimal(light),
        temperature: optional_decimal(temperature),
        equipment_fault: match equipment_fault {
            Some(Parsed::Bool(b)) => b,
            _ => return Err(missing(Field::EquipmentFault)),
        },
        plants: small(plants, Field::Plants)?,
        blossoms: small(blossoms, Field::Blossoms)?,
        fruit: small(fruit, Field::Fruit)?,
        max_height: required_decimal(max_height, Field::MaxHeight)?,
        min_height: required_decimal(min_height, Field::MinHeight)?,
        median_height: required_decimal(median_height, Field::MedianHeight)?,
        notes: match notes {
            Some(Parsed::Text(s)) => s,
            _ => String::new(),
        },
    };

    Ok(ValidatedRecord::new(lab_check, plot_check))
}

fn missing(field: Field) -> ValidationError {
    let mut err = ValidationError::new();
    err.push(field, REQUIRED);
    err
}

fn text(value: Option<Parsed>, field: Field) -> Result<String, ValidationError> {
    match value {
        Some(Parsed::Text(s)) => Ok(s),
        _ => Err(missing(field)),
    }
}

fn small<T: TryFrom<i64>>(value: Option<Parsed>, field: Field) -> Result<T, ValidationError> {
    match value {
        Some(Parsed::Int(n)) => T::try_from(n).map_err(|_| {
            let mut err = ValidationError::new();
            err.push(field, format!("Value out of range: {}", n));
            err
        }),
        _ => Err(missing(field)),
    }
}

fn required_decimal(value: Option<Parsed>, field: Field) -> Result<Decimal, ValidationError> {
    optional_decimal(value).ok_or_else(|| missing(field))
}

fn optional_decimal(value: Option<Parsed>) -> Option<Decimal> {
    match value {
        Some(Parsed::Dec(d)) => Some(d),
        _ => None,
    }
}

/// Trimmed text of a raw value; `None` when null or blank.
fn raw_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn long_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim_end().to_string(),
        Some(other) => other.to_string(),
    }
}

/// Parses a plain decimal literal with at most `scale` fractional digits.
///
/// Only an optional sign, digits, and one `.` are accepted. Precision is
/// checked on the text, before `Decimal` gets a chance to round it.
fn parse_number(text: &str, scale: u32) -> Result<Decimal, String> {
    let invalid = || format!("Invalid number string: {}", text);

    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) || whole.len() + fraction.len() == 0 {
        return Err(invalid());
    }

    let significant = fraction.trim_end_matches('0');
    if significant.len() > scale as usize {
        return Err(if scale == 0 {
            "Value must be a whole number".to_string()
        } else {
            format!("Value must have at most {} decimal places", scale)
        });
    }

    let sign = if text.starts_with('-') { "-" } else { "" };
    let whole = if whole.is_empty() { "0" } else { whole };
    let exact = if significant.is_empty() {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{}", sign, whole, significant)
    };
    Decimal::from_str_exact(&exact).map_err(|_| invalid())
}

fn check_range(spec: &FieldSpec, value: Decimal) -> Result<(), String> {
    if let Some(min) = spec.min {
        if value < min.value() {
            return Err(format!("Value is too low (min {})", min.value()));
        }
    }
    if let Some(max) = spec.max {
        if value > max.value() {
            return Err(format!("Value is too high (max {})", max.value()));
        }
    }
    Ok(())
}

fn lab_list() -> String {
    LAB_IDS
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses `H:MM` or `HH:MM` on a 24-hour clock.
fn parse_clock(text: &str) -> Option<NaiveTime> {
    let (hours, minutes) = text.split_once(':')?;
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !digits(hours) || hours.len() > 2 || !digits(minutes) || minutes.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

fn parse_lab(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c.to_ascii_uppercase()).filter(|c| LAB_IDS.contains(c)),
        _ => None,
    }
}

fn parse_bool(value: Option<&Value>, text: &str) -> Option<bool> {
    if let Some(Value::Bool(b)) = value {
        return Some(*b);
    }
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_raw() -> RawRecord {
        RawRecord::from_json(json!({
            "date": "2021-03-01",
            "time": "09:00",
            "technician": "J Simms",
            "lab_id": "A",
            "plot": 5,
            "seed_sample": "AB12CD",
            "humidity": 30.00,
            "light": 50.00,
            "temperature": 22.00,
            "equipment_fault": false,
            "blossoms": 10,
            "plants": 8,
            "fruit": 2,
            "max_height": 50.00,
            "min_height": 10.00,
            "median_height": 25.00,
            "notes": ""
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_record_normalizes_to_two_places() {
        let record = RecordValidator::new().validate(&valid_raw()).unwrap();
        let plot = record.plot_check();

        assert_eq!(plot.humidity.unwrap().to_string(), "30.00");
        assert_eq!(plot.light.unwrap().to_string(), "50.00");
        assert_eq!(plot.temperature.unwrap().to_string(), "22.00");
        assert_eq!(plot.max_height.to_string(), "50.00");
        assert_eq!(plot.min_height.to_string(), "10.00");
        assert_eq!(plot.median_height.to_string(), "25.00");
        assert_eq!(plot.plot, 5);
        assert_eq!(record.lab_check().lab_id, 'A');
    }

    #[test]
    fn test_collects_all_failures() {
        let raw = valid_raw()
            .with("plot", 21)
            .with("seed_sample", "ABC")
            .with("fruit", -1);

        let err = RecordValidator::new().validate(&raw).unwrap_err();
        assert!(err.has(Field::Plot));
        assert!(err.has(Field::SeedSample));
        assert!(err.has(Field::Fruit));
        assert_eq!(err.field_names().count(), 3);
    }

    #[test]
    fn test_blank_required_field() {
        let raw = valid_raw().with("seed_sample", "   ");
        let err = RecordValidator::new().validate(&raw).unwrap_err();
        assert_eq!(err.messages(Field::SeedSample), &["A value is required".to_string()]);
    }

    #[test]
    fn test_optional_environment_fields_may_be_blank() {
        let mut raw = valid_raw().with("humidity", "");
        raw.remove("light");
        raw.set("temperature", Value::Null);

        let record = RecordValidator::new().validate(&raw).unwrap();
        assert_eq!(record.plot_check().humidity, None);
        assert_eq!(record.plot_check().light, None);
        assert_eq!(record.plot_check().temperature, None);
    }

    #[test]
    fn test_string_input_is_accepted() {
        let raw = valid_raw()
            .with("plot", "7")
            .with("humidity", "12.5")
            .with("equipment_fault", "yes")
            .with("lab_id", "c")
            .with("time", "8:00");

        let record = RecordValidator::new().validate(&raw).unwrap();
        assert_eq!(record.plot_check().plot, 7);
        assert_eq!(record.plot_check().humidity.unwrap().to_string(), "12.50");
        assert!(record.plot_check().equipment_fault);
        assert_eq!(record.lab_check().lab_id, 'C');
        assert_eq!(record.lab_check().time.format("%H:%M").to_string(), "08:00");
    }

    #[test]
    fn test_median_skipped_when_bound_invalid() {
        let raw = valid_raw().with("min_height", "abc").with("median_height", 5);
        let err = RecordValidator::new().validate(&raw).unwrap_err();
        assert!(err.has(Field::MinHeight));
        assert!(!err.has(Field::MedianHeight));
    }

    #[test]
    fn test_fractional_integer_rejected() {
        let raw = valid_raw().with("plants", "3.5");
        let err = RecordValidator::new().validate(&raw).unwrap_err();
        assert_eq!(err.messages(Field::Plants), &["Value must be a whole number".to_string()]);
    }

    #[test]
    fn test_too_many_decimal_places_rejected() {
        let raw = valid_raw().with("light", "10.125");
        let err = RecordValidator::new().validate(&raw).unwrap_err();
        assert!(err.messages(Field::Light)[0].contains("2 decimal places"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let raw = valid_raw().with("colour", "green");
        let err = RecordValidator::new().validate(&raw).unwrap_err();
        assert_eq!(err.messages_for("colour"), &["Unknown field".to_string()]);
    }

    #[test]
    fn test_equipment_fault_keeps_measurements() {
        let raw = valid_raw().with("equipment_fault", true);
        let record = RecordValidator::new().validate(&raw).unwrap();
        assert!(record.plot_check().equipment_fault);
        assert_eq!(record.plot_check().humidity.unwrap().to_string(), "30.00");
    }

    #[test]
    fn test_unknown_lab_rejected() {
        let raw = valid_raw().with("lab_id", "z");
        let err = RecordValidator::new().validate(&raw).unwrap_err();
        assert_eq!(err.messages(Field::LabId), &["Lab must be one of A, B, C, D, E".to_string()]);
    }

    #[test]
    fn test_number_syntax() {
        assert_eq!(parse_number("+12.50", 2), Ok(Decimal::new(125, 1)));
        assert_eq!(parse_number(".5", 2), Ok(Decimal::new(5, 1)));
        assert_eq!(parse_number("-3", 0), Ok(Decimal::new(-3, 0)));
        assert_eq!(parse_number("7.000000000000000000000000000000000", 0), Ok(Decimal::new(7, 0)));
        for bad in ["1_0", "1e1", "1.2.3", "", ".", "-", "0x10", " 5", "five"] {
            assert_eq!(parse_number(bad, 2), Err(format!("Invalid number string: {}", bad)));
        }
        assert_eq!(parse_number("2.5", 0), Err("Value must be a whole number".to_string()));
    }

    #[test]
    fn test_long_mantissa_is_never_rounded() {
        let err = parse_number("0.4999999999999999999999999999999", 2).unwrap_err();
        assert!(err.contains("2 decimal places"));
    }

    #[test]
    fn test_clock_parsing() {
        assert!(parse_clock("23:59").is_some());
        assert!(parse_clock("24:00").is_none());
        assert!(parse_clock("12:5").is_none());
        assert!(parse_clock("noon").is_none());
    }
}
