//! A data-entry session: validate, persist, propose the next form
//!
//! The session owns the store it writes to. Nothing is shared between
//! sessions except the files the sinks write.

use thiserror::Error;

use crate::autofill::{FormDefaults, SheetPosition};
use crate::clock::{Clock, SystemClock};
use crate::observability::{log_event, Event};
use crate::record::{RawRecord, RecordValidator, ValidatedRecord, ValidationError};
use crate::settings::Settings;
use crate::store::{Store, StoreError};

/// Why a submission was not saved
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SubmitError {
    pub fn code(&self) -> &'static str {
        match self {
            SubmitError::Validation(e) => e.code(),
            SubmitError::Store(e) => e.code(),
        }
    }

    /// The user can fix the input and submit again
    pub fn is_recoverable(&self) -> bool {
        match self {
            SubmitError::Validation(_) => true,
            SubmitError::Store(e) => e.is_recoverable(),
        }
    }
}

pub struct DataEntrySession {
    validator: RecordValidator,
    store: Store,
    settings: Settings,
    clock: Box<dyn Clock>,
    last_saved: Option<ValidatedRecord>,
    records_saved: usize,
}

impl DataEntrySession {
    pub fn new(store: Store, settings: Settings) -> Self {
        Self {
            validator: RecordValidator::new(),
            store,
            settings,
            clock: Box::new(SystemClock),
            last_saved: None,
            records_saved: 0,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Validates and persists one form submission.
    ///
    /// # Errors
    ///
    /// - `Validation` if any field fails; nothing is written
    /// - `Store` if a sink rejects or cannot write the record; the record is
    ///   not saved
    pub fn submit(&mut self, raw: &RawRecord) -> Result<&ValidatedRecord, SubmitError> {
        let record = match self.validator.validate(raw) {
            Ok(record) => record,
            Err(e) => {
                let fields = e.field_names().collect::<Vec<_>>().join(",");
                log_event(Event::RecordRejected, &[("code", e.code()), ("fields", &fields)]);
                return Err(e.into());
            }
        };

        let key = record.key().to_string();
        if let Err(e) = self.store.append(&record) {
            log_event(
                Event::RecordSaveFailed,
                &[("code", e.code()), ("key", &key)],
            );
            return Err(e.into());
        }

        self.records_saved += 1;
        log_event(Event::RecordSaved, &[("key", &key)]);
        Ok(&*self.last_saved.insert(record))
    }

    /// Defaults for the form following the last saved record
    pub fn next_defaults(&self) -> FormDefaults {
        let last = self.last_saved.as_ref().map(SheetPosition::from_record);
        FormDefaults::next(&self.settings, self.clock.today(), last.as_ref())
    }

    pub fn last_saved(&self) -> Option<&ValidatedRecord> {
        self.last_saved.as_ref()
    }

    /// Records saved by this session
    pub fn records_saved(&self) -> usize {
        self.records_saved
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::{RecordSink, SqliteSink};
    use crate::record::ReferenceData;
    use chrono::NaiveDate;
    use serde_json::json;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
    }

    fn raw(plot: u8) -> RawRecord {
        RawRecord::from_json(json!({
            "date": "2021-03-01", "time": "8:00", "technician": "J Simms",
            "lab_id": "a", "plot": plot, "seed_sample": "AX478B",
            "equipment_fault": "no", "blossoms": "21", "plants": "9", "fruit": "3",
            "max_height": "32.1", "min_height": "7.55", "median_height": "18"
        }))
        .unwrap()
    }

    fn session() -> DataEntrySession {
        let mut db = SqliteSink::open_in_memory().unwrap();
        db.seed_reference_data(&ReferenceData::abq_facility()).unwrap();
        DataEntrySession::new(Store::new().with_sink(db), Settings::default())
            .with_clock(FixedClock(day()))
    }

    #[test]
    fn test_submit_then_next_plot() {
        let mut session = session();
        session.submit(&raw(1)).unwrap();

        let next = session.next_defaults();
        assert_eq!(next.plot, Some(2));
        assert_eq!(next.lab_id, Some('A'));
        assert_eq!(next.date, Some(day()));
        assert_eq!(session.records_saved(), 1);
    }

    #[test]
    fn test_validation_error_writes_nothing() {
        let mut session = session();
        let mut bad = raw(1);
        bad.set("plants", "21");

        let err = session.submit(&bad).unwrap_err();
        assert_eq!(err.code(), "ABQ_VALIDATION_FAILED");
        assert!(err.is_recoverable());
        assert_eq!(session.records_saved(), 0);
        assert!(session.last_saved().is_none());

        let sink = session.store().sink("database").unwrap();
        assert!(sink.records_on(day()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_is_store_error() {
        let mut session = session();
        session.submit(&raw(4)).unwrap();

        let err = session.submit(&raw(4)).unwrap_err();
        assert_eq!(err.code(), "ABQ_DUPLICATE_RECORD");
        assert_eq!(session.records_saved(), 1);
    }
}
