//! Raw and validated lab-check records

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::errors::ValidationError;

/// Unvalidated form input, one JSON value per field key.
///
/// Values may be strings (as typed into a form), numbers, or booleans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    values: BTreeMap<String, Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Converts a parsed JSON document into a raw record.
    ///
    /// The document must be an object.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            other => {
                let mut err = ValidationError::new();
                err.push_key(
                    "$root",
                    format!("expected a JSON object, got {}", json_type_name(&other)),
                );
                Err(err)
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Primary key of one plot measurement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlotCheckKey {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub lab_id: char,
    pub plot: u8,
}

impl fmt::Display for PlotCheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} lab {} plot {}",
            self.date.format("%Y-%m-%d"),
            self.time.format("%H:%M"),
            self.lab_id,
            self.plot
        )
    }
}

/// One lab visit: who checked which lab, and when
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabCheck {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub lab_id: char,
    pub technician: String,
}


/// Measurements taken for one plot during a lab visit.
///
/// Decimal fields carry exactly two fractional digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotCheck {
    pub plot: u8,
    pub seed_sample: String,
    pub humidity: Option<Decimal>,
    pub light: Option<Decimal>,
    pub temperature: Option<Decimal>,
    pub equipment_fault: bool,
    pub plants: u16,
    pub blossoms: u16,
    pub fruit: u16,
    pub max_height: Decimal,
    pub min_height: Decimal,
    pub median_height: Decimal,
    pub notes: String,
}

/// A plot check together with its lab visit, as produced by the validator.
///
/// Only [`super::RecordValidator`] constructs this type, so every instance
/// satisfies the field and cross-field rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecord {
    lab_check: LabCheck,
    plot_check: PlotCheck,
}

impl ValidatedRecord {
    pub(crate) fn new(lab_check: LabCheck, plot_check: PlotCheck) -> Self {
        Self {
            lab_check,
            plot_check,
        }
    }

    pub fn lab_check(&self) -> &LabCheck {
        &self.lab_check
    }

    pub fn plot_check(&self) -> &PlotCheck {
        &self.plot_check
    }

    pub fn key(&self) -> PlotCheckKey {
        PlotCheckKey {
            date: self.lab_check.date,
            time: self.lab_check.time,
            lab_id: self.lab_check.lab_id,
            plot: self.plot_check.plot,
        }
    }
}
