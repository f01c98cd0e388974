//! End-to-end Data Entry Tests
//!
//! Drives the command layer the way `abq init`, `abq save`, `abq list`,
//! `abq next`, and `abq settings` do, minus stdin/stdout.

use abq_data_entry::cli::{
    init_data_dir, list_records, next_form, save_record, update_settings, Source,
};
use abq_data_entry::clock::FixedClock;
use abq_data_entry::config::Config;
use abq_data_entry::settings::Settings;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn march_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
}

fn config(tmp: &TempDir, database: bool) -> Config {
    let mut config = Config::new(tmp.path().join("data").to_string_lossy());
    config.database_enabled = database;
    config.validate().unwrap();
    config
}

fn request(plot: u8) -> Value {
    json!({
        "date": "2021-03-01", "time": "16:00", "technician": "Q Murphy",
        "lab_id": "C", "plot": plot, "seed_sample": "RQ2231",
        "equipment_fault": "no", "blossoms": "4", "plants": "3", "fruit": "0",
        "max_height": "9.5", "min_height": "1.25", "median_height": "4"
    })
}

fn save(config: &Config, request: Value) -> Value {
    save_record(config, request, FixedClock(march_first())).unwrap()
}

// =============================================================================
// Init
// =============================================================================

#[test]
fn test_init_creates_settings_and_database() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp, true);

    let data = init_data_dir(&config).unwrap();
    assert_eq!(data["initialized"], true);
    assert_eq!(data["sinks"], json!(["database", "csv"]));
    assert!(Settings::path(config.data_path()).exists());
    assert!(config.database_path().exists());

    // Running again keeps existing settings.
    update_settings(&config, Some(false), None).unwrap();
    init_data_dir(&config).unwrap();
    assert!(!Settings::load(config.data_path()).unwrap().autofill_date);
}

// =============================================================================
// Save
// =============================================================================

#[test]
fn test_save_returns_row_and_next_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp, true);
    init_data_dir(&config).unwrap();

    let response = save(&config, request(19));
    assert_eq!(response["status"], "ok");
    assert_eq!(response["data"]["saved"]["Min Height"], "1.25");
    assert_eq!(response["data"]["saved"]["Time"], "16:00");
    assert_eq!(response["data"]["next"]["plot"], 20);
    assert_eq!(response["data"]["next"]["lab_id"], "C");
    assert_eq!(response["data"]["next"]["date"], "2021-03-01");

    let response = save(&config, request(20));
    assert_eq!(response["status"], "ok");
    assert!(response["data"]["next"].get("plot").is_none());
}

#[test]
fn test_save_validation_failure_lists_fields() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp, false);
    init_data_dir(&config).unwrap();

    let mut bad = request(1);
    bad["plot"] = json!(0);
    bad["median_height"] = json!("12");
    let response = save(&config, bad);

    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "ABQ_VALIDATION_FAILED");
    assert_eq!(response["fields"]["plot"][0], "Value is too low (min 1)");
    assert!(response["fields"]["median_height"].is_array());

    let listed = list_records(&config, march_first(), Source::Csv).unwrap();
    assert_eq!(listed["records"], json!([]));
}

#[test]
fn test_save_non_object_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp, false);
    init_data_dir(&config).unwrap();

    let response = save(&config, json!([1, 2, 3]));
    assert_eq!(response["code"], "ABQ_VALIDATION_FAILED");
    assert!(response["fields"]["$root"].is_array());
}

#[test]
fn test_save_duplicate_reported() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp, true);
    init_data_dir(&config).unwrap();

    assert_eq!(save(&config, request(3))["status"], "ok");
    let response = save(&config, request(3));
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "ABQ_DUPLICATE_RECORD");

    // The duplicate never reached the file either.
    let listed = list_records(&config, march_first(), Source::Csv).unwrap();
    assert_eq!(listed["records"].as_array().unwrap().len(), 1);
}

// =============================================================================
// List and Next
// =============================================================================

#[test]
fn test_list_from_both_sources() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp, true);
    init_data_dir(&config).unwrap();
    save(&config, request(2));
    save(&config, request(1));

    let csv = list_records(&config, march_first(), Source::Csv).unwrap();
    let db = list_records(&config, march_first(), Source::Database).unwrap();

    // The file keeps append order; the view is ordered by plot.
    assert_eq!(csv["records"][0]["Plot"], "2");
    assert_eq!(db["records"][0]["Plot"], "1");
    assert_eq!(db["source"], "database");
    assert_eq!(db["date"], "2021-03-01");
}

#[test]
fn test_list_disabled_source_is_error() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp, false);
    init_data_dir(&config).unwrap();

    let err = list_records(&config, march_first(), Source::Database).unwrap_err();
    assert_eq!(err.code_str(), "ABQ_CLI_SINK_DISABLED");
}

#[test]
fn test_next_follows_last_csv_row() {
    let tmp = TempDir::new().unwrap();
    let config = config(&tmp, false);
    init_data_dir(&config).unwrap();

    let empty = next_form(&config, march_first()).unwrap();
    assert_eq!(empty, json!({"date": "2021-03-01"}));

    save(&config, request(7));
    let next = next_form(&config, march_first()).unwrap();
    assert_eq!(next["plot"], 8);
    assert_eq!(next["technician"], "Q Murphy");
    assert_eq!(next["time"], "16:00");

    update_settings(&config, Some(false), Some(false)).unwrap();
    assert_eq!(next_form(&config, march_first()).unwrap(), json!({}));
}
