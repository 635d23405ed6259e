//! cephx-key - idempotent CephX key reconciliation against a Ceph cluster
//!
//! Given a requested lifecycle state (present, absent, update, info,
//! list) and the authority-observed existence of the key, the engine
//! decides what, if anything, to run against the `ceph` /
//! `ceph-authtool` toolchain and maps the result into a normalized
//! report. Existing keys are never recreated; missing keys are never
//! updated.

pub mod caps;
pub mod cli;
pub mod command;
pub mod exec;
pub mod observability;
pub mod reconcile;
pub mod secret;
