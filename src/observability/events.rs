//! Lifecycle events of a data-entry session

use std::fmt;

/// Observable events, one per log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ConfigLoaded,
    SettingsLoaded,
    SettingsSaved,
    DataDirInitialized,
    ReferenceDataSeeded,
    RecordRejected,
    RecordSaved,
    RecordSaveFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SettingsLoaded => "SETTINGS_LOADED",
            Event::SettingsSaved => "SETTINGS_SAVED",
            Event::DataDirInitialized => "DATA_DIR_INITIALIZED",
            Event::ReferenceDataSeeded => "REFERENCE_DATA_SEEDED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::RecordSaved => "RECORD_SAVED",
            Event::RecordSaveFailed => "RECORD_SAVE_FAILED",
        }
    }

    /// Events that report a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::RecordRejected | Event::RecordSaveFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        let events = [
            Event::ConfigLoaded,
            Event::SettingsLoaded,
            Event::SettingsSaved,
            Event::DataDirInitialized,
            Event::ReferenceDataSeeded,
            Event::RecordRejected,
            Event::RecordSaved,
            Event::RecordSaveFailed,
        ];
        for event in events {
            assert!(event
                .as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
        assert!(Event::RecordSaveFailed.is_failure());
        assert!(!Event::RecordSaved.is_failure());
    }
}
