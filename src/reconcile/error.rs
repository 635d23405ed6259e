//! Reconciliation error types
//!
//! Two fatal kinds: configuration errors raised before anything is
//! composed or executed, and external command failures carrying the
//! exact failing command with its captured streams. Skips are not
//! errors; they surface as successful no-change reports.

use thiserror::Error;

use crate::exec::{ExecError, ExecutionOutcome};

/// Result type for reconciliation
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Fatal reconciliation errors
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// present/update submitted without a capability set
    #[error("capabilities must be provided when state is '{state}'")]
    MissingCapabilities { state: &'static str },

    /// A keyed state submitted without a key name
    #[error("a key name must be provided when state is '{state}'")]
    MissingName { state: &'static str },

    /// An executed command exited non-zero; nothing after it ran
    #[error("command '{}' exited with rc {}: {}", .outcome.command, .outcome.return_code, .outcome.stderr_lossy())]
    CommandFailed { outcome: ExecutionOutcome },

    /// The command could not be driven at all
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl ReconcileError {
    /// Whether the attempt failed before any command was executed
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingCapabilities { .. } | Self::MissingName { .. }
        )
    }
}
