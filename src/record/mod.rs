//! Lab-check records and their validation
//!
//! A form submission arrives as a [`RawRecord`] and leaves the
//! [`RecordValidator`] either as a [`ValidatedRecord`] or as a
//! [`ValidationError`] naming every failing field.
//!
//! # Rules
//!
//! - Field kinds, required flags, and ranges are data ([`FIELD_SPECS`])
//! - All failures are collected, not just the first
//! - Numeric measurements are normalized to two decimal places
//! - Validation has no side effects

mod entities;
mod errors;
mod fields;
mod types;
mod validator;

pub use entities::{Lab, LabTech, Plot, ReferenceData};
pub use errors::{ValidationError, VALIDATION_FAILED};
pub use fields::{Field, FieldKind, FieldSpec, Limit, FIELD_SPECS, LAB_IDS, MAX_PLOT, MEASUREMENT_SCALE, SEED_SAMPLE_LEN};
pub use types::{LabCheck, PlotCheck, PlotCheckKey, RawRecord, ValidatedRecord};
pub use validator::RecordValidator;
