//! Defaults for the next entry form after a record is saved
//!
//! Technicians walk a lab plot by plot, so after each save the form can
//! carry the sheet data (time, lab, technician) forward and move to the
//! next plot. After the last plot of a lab nothing is carried.

use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::record::{Field, RawRecord, ValidatedRecord, MAX_PLOT};
use crate::settings::Settings;
use crate::store::{Column, RecordRow};

/// Where the previous record sat on the lab sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPosition {
    pub time: NaiveTime,
    pub lab_id: char,
    pub technician: String,
    pub plot: u8,
}

impl SheetPosition {
    pub fn from_record(record: &ValidatedRecord) -> Self {
        let lab = record.lab_check();
        Self {
            time: lab.time,
            lab_id: lab.lab_id,
            technician: lab.technician.clone(),
            plot: record.plot_check().plot,
        }
    }

    /// Reads the position back from a stored row.
    ///
    /// Returns `None` if any of the sheet cells cannot be parsed.
    pub fn from_row(row: &RecordRow) -> Option<Self> {
        let time = NaiveTime::parse_from_str(row.get(Column::Time)?, "%H:%M").ok()?;
        let mut lab = row.get(Column::Lab)?.chars();
        let lab_id = lab.next()?;
        if lab.next().is_some() {
            return None;
        }
        let technician = row.get(Column::Technician)?.to_string();
        let plot = row.get(Column::Plot)?.parse().ok()?;
        Some(Self {
            time,
            lab_id,
            technician,
            plot,
        })
    }
}

/// Proposed values for the next form. `None` leaves a field blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDefaults {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub lab_id: Option<char>,
    pub technician: Option<String>,
    pub plot: Option<u8>,
}

impl FormDefaults {
    /// Computes the next form's defaults from the settings and the last
    /// saved position, if any.
    pub fn next(settings: &Settings, today: NaiveDate, last: Option<&SheetPosition>) -> Self {
        let mut defaults = Self::default();

        if settings.autofill_date {
            defaults.date = Some(today);
        }

        if settings.autofill_sheet_data {
            if let Some(last) = last.filter(|p| p.plot < MAX_PLOT) {
                defaults.time = Some(last.time);
                defaults.lab_id = Some(last.lab_id);
                defaults.technician = Some(last.technician.clone());
                defaults.plot = Some(last.plot + 1);
            }
        }

        defaults
    }

    /// Form values in the same shape the validator accepts
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord::new();
        if let Some(date) = self.date {
            raw.set(Field::Date.name(), date.format("%Y-%m-%d").to_string());
        }
        if let Some(time) = self.time {
            raw.set(Field::Time.name(), time.format("%H:%M").to_string());
        }
        if let Some(lab_id) = self.lab_id {
            raw.set(Field::LabId.name(), lab_id.to_string());
        }
        if let Some(technician) = &self.technician {
            raw.set(Field::Technician.name(), technician.as_str());
        }
        if let Some(plot) = self.plot {
            raw.set(Field::Plot.name(), Value::from(plot));
        }
        raw
    }
}
