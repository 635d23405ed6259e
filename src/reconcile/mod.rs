//! Key lifecycle reconciliation
//!
//! Compares the requested lifecycle state of a CephX key against the
//! authority-observed state and issues the minimal correcting command
//! sequence. Creation of an existing key and update of a missing key are
//! skips, not errors; a non-zero exit from any executed command is fatal
//! for the attempt.

mod engine;
mod error;
mod request;

pub use engine::reconcile;
pub use error::{ReconcileError, ReconcileResult};
pub use request::{DesiredState, ReconcileReport, ReconcileRequest, UnknownState, DEFAULT_CLUSTER};
