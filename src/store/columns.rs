//! Tabular column layout shared by the file sink and `data_record_view`

use serde_json::{Map, Value};
use std::fmt;

use crate::record::ValidatedRecord;

/// One column of the human-readable record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    Time,
    Technician,
    Lab,
    Plot,
    SeedSample,
    Humidity,
    Light,
    Temperature,
    Plants,
    Blossoms,
    Fruit,
    MaxHeight,
    MinHeight,
    MedianHeight,
    Notes,
}

impl Column {
    /// Default column order
    pub const ALL: [Column; 16] = [
        Column::Date,
        Column::Time,
        Column::Technician,
        Column::Lab,
        Column::Plot,
        Column::SeedSample,
        Column::Humidity,
        Column::Light,
        Column::Temperature,
        Column::Plants,
        Column::Blossoms,
        Column::Fruit,
        Column::MaxHeight,
        Column::MinHeight,
        Column::MedianHeight,
        Column::Notes,
    ];

    /// Header text
    pub fn header(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Time => "Time",
            Column::Technician => "Technician",
            Column::Lab => "Lab",
            Column::Plot => "Plot",
            Column::SeedSample => "Seed sample",
            Column::Humidity => "Humidity",
            Column::Light => "Light",
            Column::Temperature => "Temperature",
            Column::Plants => "Plants",
            Column::Blossoms => "Blossoms",
            Column::Fruit => "Fruit",
            Column::MaxHeight => "Max Height",
            Column::MinHeight => "Min Height",
            Column::MedianHeight => "Median Height",
            Column::Notes => "Notes",
        }
    }

    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.header() == header)
    }

    /// Renders this column's cell for a record
    pub fn render(&self, record: &ValidatedRecord) -> String {
        let lab = record.lab_check();
        let plot = record.plot_check();
        let optional = |v: Option<rust_decimal::Decimal>| v.map(|d| d.to_string()).unwrap_or_default();

        match self {
            Column::Date => lab.date.format("%Y-%m-%d").to_string(),
            Column::Time => lab.time.format("%H:%M").to_string(),
            Column::Technician => lab.technician.clone(),
            Column::Lab => lab.lab_id.to_string(),
            Column::Plot => plot.plot.to_string(),
            Column::SeedSample => plot.seed_sample.clone(),
            Column::Humidity => optional(plot.humidity),
            Column::Light => optional(plot.light),
            Column::Temperature => optional(plot.temperature),
            Column::Plants => plot.plants.to_string(),
            Column::Blossoms => plot.blossoms.to_string(),
            Column::Fruit => plot.fruit.to_string(),
            Column::MaxHeight => plot.max_height.to_string(),
            Column::MinHeight => plot.min_height.to_string(),
            Column::MedianHeight => plot.median_height.to_string(),
            Column::Notes => plot.notes.clone(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// A stored record as text cells, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    cells: Vec<(Column, String)>,
}

impl RecordRow {
    pub fn new(cells: Vec<(Column, String)>) -> Self {
        Self { cells }
    }

    /// Renders a validated record using the given layout
    pub fn from_record(record: &ValidatedRecord, columns: &[Column]) -> Self {
        Self {
            cells: columns.iter().map(|c| (*c, c.render(record))).collect(),
        }
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn cells(&self) -> &[(Column, String)] {
        &self.cells
    }

    /// JSON object keyed by header text
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .cells
            .iter()
            .map(|(c, v)| (c.header().to_string(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}
