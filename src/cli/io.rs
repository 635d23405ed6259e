//! JSON I/O handling for CLI
//!
//! Input is a single JSON object on one line of stdin; output is a
//! single JSON document on stdout. Log lines go to stderr, so stdout
//! stays machine-parseable.

use std::io::{BufRead, Write};

use crate::reconcile::ReconcileRequest;

use super::errors::{CliError, CliResult};

/// Read a JSON reconciliation request from one line of `reader`
pub fn read_request<R: BufRead>(reader: &mut R) -> CliResult<ReconcileRequest> {
    let mut line = String::new();
    reader.read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    serde_json::from_str(&line)
        .map_err(|e| CliError::config_error(format!("Invalid request JSON: {}", e)))
}

/// Write a report (or any serializable value) as one JSON document
pub fn write_report<W: Write, T: serde::Serialize>(writer: &mut W, report: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, report)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

/// Write an error document to the writer
pub fn write_error<W: Write>(writer: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::DesiredState;

    #[test]
    fn test_read_request_parses_one_line() {
        let mut input = br#"{"name": "client.foo", "state": "present"}"#.as_slice();
        let request = read_request(&mut input).unwrap();

        assert_eq!(request.name.as_deref(), Some("client.foo"));
        assert_eq!(request.state, DesiredState::Present);
    }

    #[test]
    fn test_read_request_rejects_empty_input() {
        let mut input = b"\n".as_slice();
        let err = read_request(&mut input).unwrap_err();
        assert_eq!(err.code_str(), "CEPHX_CLI_IO_ERROR");
    }

    #[test]
    fn test_read_request_rejects_bad_json() {
        let mut input = b"{not json}\n".as_slice();
        let err = read_request(&mut input).unwrap_err();
        assert_eq!(err.code_str(), "CEPHX_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_write_error_shape() {
        let mut buffer = Vec::new();
        write_error(&mut buffer, "CEPHX_CLI_CONFIG_ERROR", "bad request").unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["code"], "CEPHX_CLI_CONFIG_ERROR");
        assert_eq!(parsed["message"], "bad request");
    }
}
