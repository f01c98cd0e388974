//! CLI command implementations
//!
//! Each command loads the configuration, does its work, and prints exactly
//! one JSON response line. The response-building halves are public so they
//! can be driven without stdin/stdout.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::autofill::{FormDefaults, SheetPosition};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::observability::{log_event, Event};
use crate::record::{RawRecord, ReferenceData};
use crate::session::{DataEntrySession, SubmitError};
use crate::settings::Settings;
use crate::store::{Column, RecordRow, RecordSink, StoreResult};

use super::args::{Command, Source};
use super::errors::{CliError, CliResult};
use super::io::{error_response, ok_response, read_request, validation_response, write_json};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Save { config } => save(&config),
        Command::List {
            config,
            date,
            source,
        } => list(&config, date, source),
        Command::Next { config } => next(&config),
        Command::Settings {
            config,
            autofill_date,
            autofill_sheet_data,
        } => settings(&config, autofill_date, autofill_sheet_data),
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    log_event(Event::ConfigLoaded, &[("data_dir", &config.data_dir)]);
    Ok(config)
}

fn is_initialized(config: &Config) -> bool {
    let data_dir = config.data_path();
    data_dir.is_dir()
        && Settings::path(data_dir).exists()
        && (!config.database_enabled || config.database_path().exists())
}

fn ensure_initialized(config: &Config) -> CliResult<()> {
    if is_initialized(config) {
        Ok(())
    } else {
        Err(CliError::not_initialized())
    }
}

/// Initialize a data directory
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    write_json(&ok_response(init_data_dir(&config)?))
}

/// Creates the data directory and settings file, and the database when the
/// relational sink is enabled. Safe to run again: existing settings and
/// reference rows are kept.
pub fn init_data_dir(config: &Config) -> CliResult<Value> {
    let data_dir = config.data_path();
    fs::create_dir_all(data_dir).map_err(|e| {
        CliError::config_error(format!("Failed to create directory {:?}: {}", data_dir, e))
    })?;

    if !Settings::path(data_dir).exists() {
        Settings::default().save(data_dir)?;
        log_event(Event::SettingsSaved, &[("data_dir", &config.data_dir)]);
    }

    if config.database_enabled {
        let mut db = config.open_database()?;
        db.seed_reference_data(&ReferenceData::abq_facility())?;
        log_event(
            Event::ReferenceDataSeeded,
            &[("database", &config.database_path().display().to_string())],
        );
    }

    log_event(Event::DataDirInitialized, &[("data_dir", &config.data_dir)]);

    let mut sinks = Vec::new();
    if config.database_enabled {
        sinks.push(Source::Database.as_str());
    }
    if config.csv_enabled {
        sinks.push(Source::Csv.as_str());
    }

    Ok(json!({
        "initialized": true,
        "data_dir": config.data_dir,
        "sinks": sinks
    }))
}

/// Validate and save the record read from stdin
pub fn save(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    ensure_initialized(&config)?;

    let request = read_request()?;
    let response = save_record(&config, request, SystemClock)?;
    write_json(&response)
}

/// Saves one request document and builds the response.
///
/// Record-level failures become error responses; only problems opening the
/// sinks or reading settings are returned as `Err`.
pub fn save_record(
    config: &Config,
    request: Value,
    clock: impl Clock + Clone + 'static,
) -> CliResult<Value> {
    let raw = match RawRecord::from_json(request) {
        Ok(raw) => raw,
        Err(e) => return Ok(validation_response(&e)),
    };

    let settings = Settings::load(config.data_path())?;
    log_event(Event::SettingsLoaded, &[("data_dir", &config.data_dir)]);

    let store = config.build_store(clock.clone())?;
    let mut session = DataEntrySession::new(store, settings).with_clock(clock);

    let saved = match session.submit(&raw) {
        Ok(record) => RecordRow::from_record(record, &Column::ALL),
        Err(SubmitError::Validation(e)) => return Ok(validation_response(&e)),
        Err(SubmitError::Store(e)) => return Ok(error_response(e.code(), &e.to_string())),
    };

    Ok(ok_response(json!({
        "saved": saved.to_json(),
        "next": session.next_defaults().to_raw()
    })))
}

/// List the records saved on a date
pub fn list(config_path: &Path, date: Option<NaiveDate>, source: Source) -> CliResult<()> {
    let config = load_config(config_path)?;
    ensure_initialized(&config)?;

    let date = date.unwrap_or_else(|| SystemClock.today());
    write_json(&ok_response(list_records(&config, date, source)?))
}

pub fn list_records(config: &Config, date: NaiveDate, source: Source) -> CliResult<Value> {
    let rows = records_from(config, date, source)?;
    Ok(json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "source": source.as_str(),
        "records": rows.iter().map(RecordRow::to_json).collect::<Vec<_>>()
    }))
}

fn records_from(config: &Config, date: NaiveDate, source: Source) -> CliResult<Vec<RecordRow>> {
    let rows: StoreResult<Vec<RecordRow>> = match source {
        Source::Csv if config.csv_enabled => {
            config.csv_sink(SystemClock).records_on(date)
        }
        Source::Database if config.database_enabled => {
            config.open_database().and_then(|db| db.records_on(date))
        }
        _ => return Err(CliError::sink_disabled(source.as_str())),
    };
    Ok(rows?)
}

/// Print the defaults for the next entry form
pub fn next(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    ensure_initialized(&config)?;
    write_json(&ok_response(next_form(&config, SystemClock.today())?))
}

/// Defaults derived from the last record saved today.
///
/// Reads the CSV file when that sink is enabled, the database otherwise.
pub fn next_form(config: &Config, today: NaiveDate) -> CliResult<Value> {
    let settings = Settings::load(config.data_path())?;
    let source = if config.csv_enabled {
        Source::Csv
    } else {
        Source::Database
    };

    let rows = records_from(config, today, source)?;
    let last = rows.last().and_then(SheetPosition::from_row);
    let defaults = FormDefaults::next(&settings, today, last.as_ref());
    Ok(serde_json::to_value(defaults.to_raw())?)
}

/// Show or change the autofill settings
pub fn settings(
    config_path: &Path,
    autofill_date: Option<bool>,
    autofill_sheet_data: Option<bool>,
) -> CliResult<()> {
    let config = load_config(config_path)?;
    ensure_initialized(&config)?;
    let updated = update_settings(&config, autofill_date, autofill_sheet_data)?;
    write_json(&ok_response(serde_json::to_value(updated)?))
}

/// Applies the given changes and saves when anything changed
pub fn update_settings(
    config: &Config,
    autofill_date: Option<bool>,
    autofill_sheet_data: Option<bool>,
) -> CliResult<Settings> {
    let data_dir = config.data_path();
    let mut settings = Settings::load(data_dir)?;
    let before = settings;

    if let Some(value) = autofill_date {
        settings.autofill_date = value;
    }
    if let Some(value) = autofill_sheet_data {
        settings.autofill_sheet_data = value;
    }

    if settings != before {
        settings.save(data_dir)?;
        log_event(Event::SettingsSaved, &[("data_dir", &config.data_dir)]);
    }
    Ok(settings)
}
