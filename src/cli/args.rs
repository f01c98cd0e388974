//! CLI argument definitions using clap
//!
//! Commands:
//! - abq init --config <path>
//! - abq save --config <path>
//! - abq list --config <path> [--date YYYY-MM-DD] [--source csv|database]
//! - abq next --config <path>
//! - abq settings --config <path> [--autofill-date BOOL] [--autofill-sheet-data BOOL]

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ABQ Agrilabs plant-growth data entry
#[derive(Parser, Debug)]
#[command(name = "abq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Which sink to read records back from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    Csv,
    Database,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Csv => "csv",
            Source::Database => "database",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory, default settings, and database
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./abq.json")]
        config: PathBuf,
    },

    /// Validate and save one record read as JSON from stdin
    Save {
        /// Path to configuration file
        #[arg(long, default_value = "./abq.json")]
        config: PathBuf,
    },

    /// List the records saved on a date
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./abq.json")]
        config: PathBuf,

        /// Date to list (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, value_enum, default_value_t = Source::Csv)]
        source: Source,
    },

    /// Print the defaults for the next entry form
    Next {
        /// Path to configuration file
        #[arg(long, default_value = "./abq.json")]
        config: PathBuf,
    },

    /// Show or change the autofill settings
    Settings {
        /// Path to configuration file
        #[arg(long, default_value = "./abq.json")]
        config: PathBuf,

        #[arg(long)]
        autofill_date: Option<bool>,

        #[arg(long)]
        autofill_sheet_data: Option<bool>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_arguments() {
        let cli = Cli::try_parse_from([
            "abq", "list", "--config", "lab.json", "--date", "2021-03-01", "--source", "database",
        ])
        .unwrap();

        match cli.command {
            Command::List {
                config,
                date,
                source,
            } => {
                assert_eq!(config, PathBuf::from("lab.json"));
                assert_eq!(date, NaiveDate::from_ymd_opt(2021, 3, 1));
                assert_eq!(source, Source::Database);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_settings_flags_take_values() {
        let cli = Cli::try_parse_from(["abq", "settings", "--autofill-date", "false"]).unwrap();
        match cli.command {
            Command::Settings {
                config,
                autofill_date,
                autofill_sheet_data,
            } => {
                assert_eq!(config, PathBuf::from("./abq.json"));
                assert_eq!(autofill_date, Some(false));
                assert_eq!(autofill_sheet_data, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(Cli::try_parse_from(["abq", "list", "--date", "03/01/2021"]).is_err());
    }
}
