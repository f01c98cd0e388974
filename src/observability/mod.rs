//! Observability for data-entry sessions
//!
//! Structured JSON log lines on stderr and a typed set of lifecycle events.
//! Logging is synchronous and never affects the outcome of an operation.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
///
/// Failure events are logged at WARN, everything else at INFO.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    if event.is_failure() {
        Logger::warn(event.as_str(), fields);
    } else {
        Logger::info(event.as_str(), fields);
    }
}
