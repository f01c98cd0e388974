//! JSON I/O handling for CLI
//!
//! - Input: one JSON object on stdin
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};
use crate::record::ValidationError;

/// Read a JSON request from stdin.
///
/// The document may span several lines.
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    Ok(serde_json::from_str(&input)?)
}

pub fn ok_response(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

pub fn error_response(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Error response listing every failing field
pub fn validation_response(err: &ValidationError) -> Value {
    json!({
        "status": "error",
        "code": err.code(),
        "message": err.to_string(),
        "fields": err.fields()
    })
}

/// Write one response line to stdout
pub fn write_json(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;

    #[test]
    fn test_validation_response_carries_fields() {
        let mut err = ValidationError::new();
        err.push(Field::Plot, "Value is too high (max 20)");

        let response = validation_response(&err);
        assert_eq!(response["status"], "error");
        assert_eq!(response["code"], "ABQ_VALIDATION_FAILED");
        assert_eq!(response["fields"]["plot"][0], "Value is too high (max 20)");
    }
}
