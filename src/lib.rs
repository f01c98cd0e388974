//! abq_data_entry - plant-growth data entry for ABQ Agrilabs
//!
//! A technician's form submission is validated field by field
//! ([`record::RecordValidator`]) and appended to one or more sinks
//! ([`store::Store`]): a dated CSV file and, optionally, a SQLite database
//! with referential integrity between labs, technicians, plots, and checks.

pub mod autofill;
pub mod cli;
pub mod clock;
pub mod config;
pub mod observability;
pub mod record;
pub mod session;
pub mod settings;
pub mod store;
