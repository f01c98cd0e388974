//! Flat file sink: one CSV file per calendar day
//!
//! - File name is `<prefix>_<YYYY-MM-DD>.csv` inside the data directory
//! - A header row is written only when the file is new or empty
//! - Rows are only ever appended
//! - Each append holds an exclusive lock on the file, writes the row with a
//!   single `write_all`, and fsyncs before returning
//! - A failed write truncates the file back to its length before the append

use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::columns::{Column, RecordRow};
use super::errors::{StoreError, StoreResult};
use super::RecordSink;
use crate::clock::{Clock, SystemClock};
use crate::record::ValidatedRecord;

/// Default file-name prefix
pub const DEFAULT_PREFIX: &str = "abq_data_record";

/// Appends validated records to a dated CSV file
pub struct CsvFileSink {
    dir: PathBuf,
    prefix: String,
    clock: Box<dyn Clock>,
}

impl CsvFileSink {
    /// Creates a sink writing into `dir`.
    ///
    /// Nothing is touched on disk until the first append.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            clock: Box::new(SystemClock),
        }
    }

    /// Replaces the date source used for file names
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Path of the file holding records for `date`
    pub fn file_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.csv", self.prefix, date.format("%Y-%m-%d")))
    }

    /// Path of today's file
    pub fn current_file(&self) -> PathBuf {
        self.file_for(self.clock.today())
    }

    fn encode(&self, record: &ValidatedRecord, with_header: bool, path: &Path) -> StoreResult<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        if with_header {
            writer
                .write_record(Column::ALL.iter().map(Column::header))
                .map_err(|e| csv_error(path, e))?;
        }
        writer
            .write_record(Column::ALL.iter().map(|c| c.render(record)))
            .map_err(|e| csv_error(path, e))?;

        writer
            .into_inner()
            .map_err(|e| StoreError::io(path, io::Error::new(e.error().kind(), e.error().to_string())))
    }

    fn append_locked(&self, file: &mut File, path: &Path, record: &ValidatedRecord) -> StoreResult<()> {
        let start = file
            .metadata()
            .map_err(|e| StoreError::io(path, e))?
            .len();

        let bytes = self.encode(record, start == 0, path)?;

        if let Err(e) = file.write_all(&bytes).and_then(|_| file.sync_all()) {
            // Best effort: drop the partial row so the file stays well-formed.
            let _ = file.set_len(start);
            return Err(StoreError::io(path, e));
        }

        Ok(())
    }
}

impl RecordSink for CsvFileSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn append(&mut self, record: &ValidatedRecord) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        let path = self.current_file();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        file.lock().map_err(|e| StoreError::io(&path, e))?;
        let result = self.append_locked(&mut file, &path, record);
        let unlocked = file.unlock();

        result?;
        unlocked.map_err(|e| StoreError::io(&path, e))
    }

    fn records_on(&self, date: NaiveDate) -> StoreResult<Vec<RecordRow>> {
        let path = self.file_for(date);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        file.lock_shared().map_err(|e| StoreError::io(&path, e))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        let headers = reader.headers().map_err(|e| csv_error(&path, e))?.clone();
        let columns = headers
            .iter()
            .map(|h| {
                Column::from_header(h).ok_or_else(|| StoreError::MalformedFile {
                    path: path.clone(),
                    reason: format!("unknown column '{}'", h),
                })
            })
            .collect::<StoreResult<Vec<Column>>>()?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| csv_error(&path, e))?;
            let cells = columns
                .iter()
                .copied()
                .zip(record.iter().map(str::to_string))
                .collect();
            rows.push(RecordRow::new(cells));
        }

        Ok(rows)
    }
}

fn csv_error(path: &Path, err: csv::Error) -> StoreError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => StoreError::io(path, e),
        _ => StoreError::MalformedFile {
            path: path.to_path_buf(),
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use tempfile::TempDir;

    fn march_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
    }

    #[test]
    fn test_file_name_uses_iso_date() {
        let sink = CsvFileSink::new("/data", DEFAULT_PREFIX).with_clock(FixedClock(march_first()));
        assert_eq!(
            sink.current_file(),
            PathBuf::from("/data/abq_data_record_2021-03-01.csv")
        );
    }

    #[test]
    fn test_missing_file_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        let sink = CsvFileSink::new(tmp.path(), DEFAULT_PREFIX);
        assert!(sink.records_on(march_first()).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_header_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let sink = CsvFileSink::new(tmp.path(), DEFAULT_PREFIX);
        fs::write(sink.file_for(march_first()), "Date,Colour\n2021-03-01,green\n").unwrap();

        let err = sink.records_on(march_first()).unwrap_err();
        assert_eq!(err.code(), "ABQ_MALFORMED_FILE");
    }
}
