//! Command-line interface
//!
//! - init: create the data directory, settings, and database
//! - save: validate and persist one record from stdin
//! - list: print the records saved on a date
//! - next: print the defaults for the next form
//! - settings: show or change autofill settings

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, Source};
pub use commands::{
    init, init_data_dir, list, list_records, next, next_form, run, run_command, save,
    save_record, settings, update_settings,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, ok_response, read_request, validation_response, write_json};
