//! Observability for cephx-key
//!
//! Structured one-line JSON logging only; metrics and tracing layers are
//! out of scope here. Reconciliation decisions are logged so an operator
//! can reconstruct why a key was created, skipped, or left alone.

mod logger;

pub use logger::{Logger, Severity};
