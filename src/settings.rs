//! Per-installation form settings, stored as `settings.json` in the data
//! directory.
//!
//! A missing file means defaults. Unknown keys are ignored so older
//! binaries can read newer files.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed settings file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SettingsError {
    pub fn code(&self) -> &'static str {
        "ABQ_SETTINGS_ERROR"
    }
}

/// Autofill behaviour of the entry form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fill the date field with today's date
    pub autofill_date: bool,
    /// Carry time, lab and technician forward and advance the plot
    pub autofill_sheet_data: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autofill_date: true,
            autofill_sheet_data: true,
        }
    }
}

impl Settings {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    pub fn load(data_dir: &Path) -> Result<Self, SettingsError> {
        let path = Self::path(data_dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|source| SettingsError::Malformed { path, source })
    }

    /// Writes the settings, replacing the previous file atomically.
    pub fn save(&self, data_dir: &Path) -> Result<(), SettingsError> {
        let path = Self::path(data_dir);
        let tmp = data_dir.join(format!("{}.tmp", SETTINGS_FILE));
        let io_err = |source| SettingsError::Io {
            path: path.clone(),
            source,
        };

        let mut bytes = serde_json::to_vec_pretty(self).map_err(|source| {
            SettingsError::Malformed {
                path: path.clone(),
                source,
            }
        })?;
        bytes.push(b'\n');

        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        Ok(())
    }
}
