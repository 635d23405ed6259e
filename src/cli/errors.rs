//! CLI-specific error types
//!
//! Everything here is fatal; the entry point prints the error and exits
//! non-zero.

use std::fmt;
use std::io;

use crate::reconcile::ReconcileError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Bad flags or request document
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// The reconciliation itself failed
    ReconcileFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CEPHX_CLI_CONFIG_ERROR",
            Self::IoError => "CEPHX_CLI_IO_ERROR",
            Self::ReconcileFailed => "CEPHX_CLI_RECONCILE_FAILED",
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
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

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

impl From<ReconcileError> for CliError {
    fn from(e: ReconcileError) -> Self {
        let code = if e.is_configuration() {
            CliErrorCode::ConfigError
        } else {
            CliErrorCode::ReconcileFailed
        };
        Self::new(code, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_errors_map_to_codes() {
        let config: CliError = ReconcileError::MissingCapabilities { state: "present" }.into();
        assert_eq!(config.code(), &CliErrorCode::ConfigError);

        let exec: CliError =
            ReconcileError::Exec(crate::exec::ExecError::EmptySequence).into();
        assert_eq!(exec.code(), &CliErrorCode::ReconcileFailed);
    }

    #[test]
    fn test_display_includes_code_string() {
        let err = CliError::config_error("bad flag");
        assert_eq!(err.to_string(), "CEPHX_CLI_CONFIG_ERROR: bad flag");
    }
}
