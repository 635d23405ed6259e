//! Reconciliation request and report types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::caps::CapabilitySet;

/// Cluster targeted when the request names none
pub const DEFAULT_CLUSTER: &str = "ceph";

/// Requested lifecycle state for a key
///
/// Supplied per invocation, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    /// Key exists with the given capabilities (idempotent create)
    Present,
    /// Key does not exist (delete, delegated to authority semantics)
    Absent,
    /// Replace capabilities of an existing key
    Update,
    /// Fetch structured detail for one key
    Info,
    /// Enumerate all keys
    List,
}

impl DesiredState {
    /// Returns the wire/CLI spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Update => "update",
            Self::Info => "info",
            Self::List => "list",
        }
    }

}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized desired state; fatal configuration error
#[derive(Debug, Clone, Error)]
#[error("unrecognized state '{0}', must be one of 'present', 'absent', 'update', 'info', 'list'")]
pub struct UnknownState(pub String);

impl FromStr for DesiredState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "update" => Ok(Self::Update),
            "info" => Ok(Self::Info),
            "list" => Ok(Self::List),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// One reconciliation request, as supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// Target cluster name
    #[serde(default = "default_cluster")]
    pub cluster: String,

    /// Key name, e.g. `client.foo`; required for every state but `list`
    #[serde(default)]
    pub name: Option<String>,

    /// Requested lifecycle state
    pub state: DesiredState,

    /// Capability set; required non-empty for `present` and `update`
    #[serde(default)]
    pub caps: Option<CapabilitySet>,

    /// Caller-supplied secret; empty or absent means generate one
    #[serde(default)]
    pub secret: Option<String>,

    /// Containerization wrapper, split on whitespace and prepended
    #[serde(default)]
    pub containerized: Option<String>,
}

fn default_cluster() -> String {
    DEFAULT_CLUSTER.to_string()
}

impl ReconcileRequest {
    /// Request with defaults for everything but name and state
    pub fn new(name: impl Into<String>, state: DesiredState) -> Self {
        Self {
            cluster: default_cluster(),
            name: Some(name.into()),
            state,
            caps: None,
            secret: None,
            containerized: None,
        }
    }
}

/// Normalized outcome of one reconciliation attempt
///
/// `cmd` is empty for a skip decision; otherwise it is the argv of the
/// last executed command.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub changed: bool,
    pub rc: i32,
    pub cmd: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trips_through_str() {
        for state in [
            DesiredState::Present,
            DesiredState::Absent,
            DesiredState::Update,
            DesiredState::Info,
            DesiredState::List,
        ] {
            assert_eq!(state.as_str().parse::<DesiredState>().unwrap(), state);
        }
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        let err = "created".parse::<DesiredState>().unwrap_err();
        assert!(err.to_string().contains("created"));
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: ReconcileRequest =
            serde_json::from_str(r#"{"name": "client.foo", "state": "present"}"#).unwrap();

        assert_eq!(request.cluster, "ceph");
        assert_eq!(request.name.as_deref(), Some("client.foo"));
        assert_eq!(request.state, DesiredState::Present);
        assert!(request.caps.is_none());
        assert!(request.secret.is_none());
        assert!(request.containerized.is_none());
    }

    #[test]
    fn test_request_rejects_unknown_state_json() {
        let result = serde_json::from_str::<ReconcileRequest>(
            r#"{"name": "client.foo", "state": "recreate"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_caps_deserialize_as_mapping() {
        let request: ReconcileRequest = serde_json::from_str(
            r#"{"name": "client.foo", "state": "update",
                "caps": {"mon": "allow r", "osd": "allow rw pool=foo"}}"#,
        )
        .unwrap();

        let caps = request.caps.unwrap();
        assert_eq!(caps.get("mon").unwrap(), "allow r");
        assert_eq!(caps.get("osd").unwrap(), "allow rw pool=foo");
    }
}
