//! Field-level validation errors
//!
//! A rejected form produces one [`ValidationError`] holding every failing
//! field and all of its messages. Nothing is persisted when this is returned.

use std::collections::BTreeMap;
use std::fmt;

use super::fields::Field;

/// Error code reported for rejected forms
pub const VALIDATION_FAILED: &str = "ABQ_VALIDATION_FAILED";

/// Collected validation failures, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure against a known field
    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.push_key(field.name(), message);
    }

    /// Records a failure against an arbitrary input key
    pub fn push_key(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(key.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if the given field has at least one failure
    pub fn has(&self, field: Field) -> bool {
        self.fields.contains_key(field.name())
    }

    /// Messages for one field, empty if it passed
    pub fn messages(&self, field: Field) -> &[String] {
        self.messages_for(field.name())
    }

    pub fn messages_for(&self, key: &str) -> &[String] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Failing field names in sorted order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The full field -> messages map
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    pub fn code(&self) -> &'static str {
        VALIDATION_FAILED
    }

    /// Returns `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.field_names().collect();
        write!(
            f,
            "{}: Cannot save, error in fields: {}",
            VALIDATION_FAILED,
            names.join(", ")
        )
    }
}

impl std::error::Error for ValidationError {}
