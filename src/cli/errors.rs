//! CLI-specific error types
//!
//! These abort the command. Record-level failures during `save` are not CLI
//! errors; they are reported in the JSON response.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::settings::SettingsError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Settings file error
    SettingsError,
    /// A sink could not be opened or read
    StoreError,
    /// Data directory missing
    NotInitialized,
    /// The requested sink is disabled in the configuration
    SinkDisabled,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "ABQ_CLI_CONFIG_ERROR",
            Self::IoError => "ABQ_CLI_IO_ERROR",
            Self::SettingsError => "ABQ_CLI_SETTINGS_ERROR",
            Self::StoreError => "ABQ_CLI_STORE_ERROR",
            Self::NotInitialized => "ABQ_CLI_NOT_INITIALIZED",
            Self::SinkDisabled => "ABQ_CLI_SINK_DISABLED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'abq init' first.",
        )
    }

    pub fn sink_disabled(sink: &str) -> Self {
        Self::new(
            CliErrorCode::SinkDisabled,
            format!("The {} sink is disabled in the configuration", sink),
        )
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<SettingsError> for CliError {
    fn from(e: SettingsError) -> Self {
        Self::new(CliErrorCode::SettingsError, e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::StoreError, format!("{} ({})", e, e.code()))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
