//! Relational sink backed by SQLite
//!
//! Each append runs in one transaction:
//! 1. resolve the technician and check the lab and plot exist
//! 2. insert the lab_checks row if (date, time, lab_id) is absent
//! 3. insert the plot_checks row
//!
//! Any failure drops the transaction, which rolls it back. A primary-key
//! collision on plot_checks is reported as `DuplicateRecord`.
//!
//! Measurements are bound as their exact decimal text; NUMERIC affinity
//! stores them as numbers so the CHECK ranges still apply.

use chrono::NaiveDate;
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Transaction};
use std::path::{Path, PathBuf};

use super::columns::{Column, RecordRow};
use super::errors::{StoreError, StoreResult};
use super::schema::{
    FK_LAB_CHECK_LAB, FK_LAB_CHECK_TECH, FK_PLOT_CHECK_LAB_CHECK, FK_PLOT_CHECK_PLOT, SCHEMA_SQL,
    SELECT_RECORDS_ON_DATE,
};
use super::RecordSink;
use crate::record::{PlotCheckKey, ReferenceData, ValidatedRecord};

/// Appends validated records to the relational schema
#[derive(Debug)]
pub struct SqliteSink {
    path: Option<PathBuf>,
    conn: Connection,
}

impl SqliteSink {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(Some(path.to_path_buf()), conn)
    }

    /// Opens a private in-memory database with the schema applied.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(None, conn)
    }

    fn init(path: Option<PathBuf>, conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { path, conn })
    }

    /// Database file path, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Inserts reference rows, leaving rows that already exist untouched.
    pub fn seed_reference_data(&mut self, data: &ReferenceData) -> StoreResult<()> {
        data.check()
            .map_err(|reason| StoreError::constraint("reference_data", reason))?;

        let tx = self.conn.transaction()?;
        for lab in &data.labs {
            tx.execute(
                "INSERT OR IGNORE INTO labs (id) VALUES (?1)",
                params![lab.id.to_string()],
            )?;
        }
        for tech in &data.lab_techs {
            tx.execute(
                "INSERT OR IGNORE INTO lab_techs (id, name) VALUES (?1, ?2)",
                params![tech.id, tech.name],
            )?;
        }
        for plot in &data.plots {
            tx.execute(
                "INSERT OR IGNORE INTO plots (lab_id, plot, current_seed_sample) VALUES (?1, ?2, ?3)",
                params![plot.lab_id.to_string(), plot.plot, plot.current_seed_sample],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Number of rows in plot_checks
    pub fn plot_check_count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM plot_checks", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of rows in lab_checks
    pub fn lab_check_count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM lab_checks", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn insert(tx: &Transaction<'_>, record: &ValidatedRecord) -> StoreResult<()> {
        let lab = record.lab_check();
        let plot = record.plot_check();
        let key = record.key();
        let date = lab.date.format("%Y-%m-%d").to_string();
        let time = lab.time.format("%H:%M").to_string();
        let lab_id = lab.lab_id.to_string();

        let lab_exists: bool = tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM labs WHERE id = ?1)",
            params![lab_id],
            |row| row.get(0),
        )?;
        if !lab_exists {
            return Err(StoreError::constraint(
                FK_LAB_CHECK_LAB,
                format!("unknown lab '{}'", lab.lab_id),
            ));
        }

        let tech_id: Option<i64> = tx
            .query_row(
                "SELECT id FROM lab_techs WHERE name = ?1",
                params![lab.technician],
                |row| row.get(0),
            )
            .optional()?;
        let tech_id = tech_id.ok_or_else(|| {
            StoreError::constraint(
                FK_LAB_CHECK_TECH,
                format!("unknown technician '{}'", lab.technician),
            )
        })?;

        let plot_exists: bool = tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM plots WHERE lab_id = ?1 AND plot = ?2)",
            params![lab_id, plot.plot],
            |row| row.get(0),
        )?;
        if !plot_exists {
            return Err(StoreError::constraint(
                FK_PLOT_CHECK_PLOT,
                format!("unknown plot {} in lab '{}'", plot.plot, lab.lab_id),
            ));
        }

        tx.execute(
            "INSERT OR IGNORE INTO lab_checks (date, time, lab_id, lab_tech_id) VALUES (?1, ?2, ?3, ?4)",
            params![date, time, lab_id, tech_id],
        )
        .map_err(|e| classify(e, &key))?;

        tx.execute(
            "INSERT INTO plot_checks (
                date, time, lab_id, plot, seed_sample,
                humidity, light, temperature, equipment_fault,
                blossoms, plants, fruit,
                max_height, min_height, median_height, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                date,
                time,
                lab_id,
                plot.plot,
                plot.seed_sample,
                plot.humidity.map(|d| d.to_string()),
                plot.light.map(|d| d.to_string()),
                plot.temperature.map(|d| d.to_string()),
                plot.equipment_fault,
                plot.blossoms,
                plot.plants,
                plot.fruit,
                plot.max_height.to_string(),
                plot.min_height.to_string(),
                plot.median_height.to_string(),
                plot.notes,
            ],
        )
        .map_err(|e| classify(e, &key))?;

        Ok(())
    }
}

impl RecordSink for SqliteSink {
    fn name(&self) -> &'static str {
        "database"
    }

    fn append(&mut self, record: &ValidatedRecord) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        Self::insert(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    fn records_on(&self, date: NaiveDate) -> StoreResult<Vec<RecordRow>> {
        let mut stmt = self.conn.prepare(SELECT_RECORDS_ON_DATE)?;
        let rows = stmt.query_map(params![date.format("%Y-%m-%d").to_string()], |row| {
            let mut cells = Vec::with_capacity(Column::ALL.len());
            for (i, column) in Column::ALL.iter().enumerate() {
                cells.push((*column, row.get::<_, String>(i)?));
            }
            Ok(RecordRow::new(cells))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

/// Maps SQLite constraint failures onto store errors.
fn classify(err: rusqlite::Error, key: &PlotCheckKey) -> StoreError {
    let (code, message) = match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            (failure.extended_code, message.clone().unwrap_or_default())
        }
        _ => return StoreError::Database(err),
    };

    match code {
        ffi::SQLITE_CONSTRAINT_PRIMARYKEY => StoreError::DuplicateRecord(key.clone()),
        ffi::SQLITE_CONSTRAINT_UNIQUE if message.contains("plot_checks.") => {
            StoreError::DuplicateRecord(key.clone())
        }
        ffi::SQLITE_CONSTRAINT_CHECK => {
            let name = message
                .strip_prefix("CHECK constraint failed: ")
                .unwrap_or(&message)
                .to_string();
            StoreError::constraint(name, message)
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => StoreError::constraint(FK_PLOT_CHECK_LAB_CHECK, message),
        _ => StoreError::constraint("unknown", message),
    }
}
