//! Record Store subsystem
//!
//! Persists validated records to one or more sinks. The store is insert-only:
//! there is no update or delete path.
//!
//! # Sinks
//!
//! - [`CsvFileSink`]: dated CSV file, header on first write, locked append
//! - [`SqliteSink`]: relational schema, one transaction per record
//!
//! A [`Store`] fans each record out to its sinks in order and stops at the
//! first failure. Place the relational sink first so a constraint failure
//! is reported before anything reaches the file.

mod columns;
mod csv_file;
mod errors;
mod schema;
mod sqlite;

pub use columns::{Column, RecordRow};
pub use csv_file::{CsvFileSink, DEFAULT_PREFIX};
pub use errors::{StoreError, StoreResult};
pub use schema::{
    FK_LAB_CHECK_LAB, FK_LAB_CHECK_TECH, FK_PLOT_CHECK_LAB_CHECK, FK_PLOT_CHECK_PLOT, SCHEMA_SQL,
};
pub use sqlite::SqliteSink;

use chrono::NaiveDate;

use crate::observability::Logger;
use crate::record::ValidatedRecord;

/// A persistence destination for validated records
pub trait RecordSink {
    /// Short name used in logs and CLI options
    fn name(&self) -> &'static str;

    /// Durably appends one record.
    ///
    /// On error the record must not be considered saved and the sink must be
    /// left as it was before the call.
    fn append(&mut self, record: &ValidatedRecord) -> StoreResult<()>;

    /// Lists the records stored for one date, in storage order.
    fn records_on(&self, date: NaiveDate) -> StoreResult<Vec<RecordRow>>;
}

/// The set of sinks a data-entry session writes to
#[derive(Default)]
pub struct Store {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink after the existing ones
    pub fn with_sink(mut self, sink: impl RecordSink + 'static) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn add_sink(&mut self, sink: impl RecordSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Looks up a sink by name
    pub fn sink(&self, name: &str) -> Option<&dyn RecordSink> {
        self.sinks
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Appends a record to every sink in order.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure. Sinks after the failing one are not
    /// written.
    pub fn append(&mut self, record: &ValidatedRecord) -> StoreResult<()> {
        let key = record.key().to_string();
        for sink in &mut self.sinks {
            if let Err(e) = sink.append(record) {
                let fields = [
                    ("code", e.code()),
                    ("key", key.as_str()),
                    ("sink", sink.name()),
                    ("error", &e.to_string()),
                ];
                if e.is_recoverable() {
                    Logger::warn("RECORD_APPEND_FAILED", &fields);
                } else {
                    Logger::error("RECORD_APPEND_FAILED", &fields);
                }
                return Err(e);
            }
            Logger::trace("RECORD_APPENDED", &[("key", &key), ("sink", sink.name())]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawRecord, RecordValidator};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingSink {
        name: &'static str,
        fail: bool,
        seen: Rc<RefCell<Vec<&'static str>>>,
    }

    impl RecordSink for RecordingSink {
        fn name(&self) -> &'static str {
            self.name
        }

        fn append(&mut self, _record: &ValidatedRecord) -> StoreResult<()> {
            self.seen.borrow_mut().push(self.name);
            if self.fail {
                Err(StoreError::constraint("test", "forced"))
            } else {
                Ok(())
            }
        }

        fn records_on(&self, _date: NaiveDate) -> StoreResult<Vec<RecordRow>> {
            Ok(Vec::new())
        }
    }

    fn record() -> ValidatedRecord {
        let raw = RawRecord::from_json(json!({
            "date": "2021-03-01", "time": "09:00", "technician": "J Simms",
            "lab_id": "A", "plot": 5, "seed_sample": "AB12CD",
            "equipment_fault": false, "blossoms": 10, "plants": 8, "fruit": 2,
            "max_height": 50, "min_height": 10, "median_height": 25
        }))
        .unwrap();
        RecordValidator::new().validate(&raw).unwrap()
    }

    #[test]
    fn test_stops_at_first_failure() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = Store::new()
            .with_sink(RecordingSink { name: "first", fail: true, seen: seen.clone() })
            .with_sink(RecordingSink { name: "second", fail: false, seen: seen.clone() });

        assert!(store.append(&record()).is_err());
        assert_eq!(*seen.borrow(), vec!["first"]);
    }

    #[test]
    fn test_writes_all_sinks_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = Store::new()
            .with_sink(RecordingSink { name: "first", fail: false, seen: seen.clone() })
            .with_sink(RecordingSink { name: "second", fail: false, seen: seen.clone() });

        store.append(&record()).unwrap();
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
        assert_eq!(store.sink_names(), vec!["first", "second"]);
        assert!(store.sink("second").is_some());
    }
}
