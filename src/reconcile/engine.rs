//! The reconciliation state machine
//!
//! Current state is observed once per attempt by probing the authority
//! with the info command; the probe outcome is memoized, so `info`
//! requests reuse it instead of issuing the identical command twice.

use chrono::Utc;

use crate::caps::CapabilitySet;
use crate::command::{CommandSpec, Composer};
use crate::exec::{run_sequence, CommandRunner, ExecutionOutcome};
use crate::observability::Logger;
use crate::secret::{generate_secret, Secret};

use super::error::{ReconcileError, ReconcileResult};
use super::request::{DesiredState, ReconcileReport, ReconcileRequest};

/// What one reconciliation attempt ended up doing
enum Applied {
    /// Preconditions made the transition a no-op
    Skipped { reason: String },
    /// A sequence ran to completion
    Ran {
        outcome: ExecutionOutcome,
        changed: bool,
    },
}

/// Drives a single reconciliation attempt
struct Reconciler<'r, R: CommandRunner + ?Sized> {
    runner: &'r mut R,
    composer: Composer,
    /// Existence probe outcome, memoized for the duration of the attempt
    probe: Option<ExecutionOutcome>,
}

/// Reconcile the requested state against the authority
///
/// Issues at most one existence probe and one correcting sequence,
/// synchronously and in order. Skips report success with `changed=false`
/// and a marker naming the key; executed sequences that exit non-zero
/// are fatal and carry the failing command.
pub fn reconcile<R>(request: &ReconcileRequest, runner: &mut R) -> ReconcileResult<ReconcileReport>
where
    R: CommandRunner + ?Sized,
{
    let start = Utc::now();

    Logger::info(
        "RECONCILE_START",
        &[
            ("cluster", request.cluster.as_str()),
            ("name", request.name.as_deref().unwrap_or("")),
            ("state", request.state.as_str()),
        ],
    );

    let mut reconciler = Reconciler {
        runner,
        composer: Composer::new(request.cluster.as_str(), request.containerized.as_deref()),
        probe: None,
    };

    let applied = match reconciler.dispatch(request) {
        Ok(applied) => applied,
        Err(err) => {
            let detail = err.to_string();
            Logger::error("RECONCILE_FAILED", &[("error", detail.as_str())]);
            return Err(err);
        }
    };

    let end = Utc::now();
    let duration_ms = (end - start).num_milliseconds();

    Ok(match applied {
        Applied::Skipped { reason } => {
            Logger::info("KEY_SKIPPED", &[("reason", reason.as_str())]);
            ReconcileReport {
                changed: false,
                rc: 0,
                cmd: Vec::new(),
                stdout: reason,
                stderr: String::new(),
                start,
                end,
                duration_ms,
            }
        }
        Applied::Ran { outcome, changed } => ReconcileReport {
            changed,
            rc: outcome.return_code,
            stdout: outcome.stdout_lossy(),
            stderr: outcome.stderr_lossy(),
            cmd: outcome.command.into_argv(),
            start,
            end,
            duration_ms,
        },
    })
}

impl<R: CommandRunner + ?Sized> Reconciler<'_, R> {
    fn dispatch(&mut self, request: &ReconcileRequest) -> ReconcileResult<Applied> {
        match request.state {
            DesiredState::Present => self.ensure_present(request),
            DesiredState::Update => self.ensure_updated(request),
            DesiredState::Absent => self.ensure_absent(request),
            DesiredState::Info => self.fetch_info(request),
            DesiredState::List => self.list_keys(),
        }
    }

    /// Create the key unless the authority already has it
    fn ensure_present(&mut self, request: &ReconcileRequest) -> ReconcileResult<Applied> {
        let caps = required_caps(request)?;
        let name = required_name(request)?;

        if self.query_exists(name)?.success() {
            return Ok(Applied::Skipped {
                reason: format!(
                    "skipped, since {} already exists, if you want to update a key use 'state: update'",
                    name
                ),
            });
        }

        let secret = resolve_secret(request.secret.as_deref());
        let outcome = self.run_to_completion(&self.composer.create(name, &secret, caps))?;
        Logger::info("KEY_CREATED", &[("name", name)]);

        Ok(Applied::Ran {
            outcome,
            changed: true,
        })
    }

    /// Replace capabilities, but only for a key that exists
    fn ensure_updated(&mut self, request: &ReconcileRequest) -> ReconcileResult<Applied> {
        let caps = required_caps(request)?;
        let name = required_name(request)?;

        if !self.query_exists(name)?.success() {
            return Ok(Applied::Skipped {
                reason: format!("skipped, since {} does not exist", name),
            });
        }

        let outcome = self.run_to_completion(&self.composer.update(name, caps))?;
        Logger::info("KEY_UPDATED", &[("name", name)]);

        Ok(Applied::Ran {
            outcome,
            changed: true,
        })
    }

    /// Delete unconditionally; missing-key semantics belong to the authority
    fn ensure_absent(&mut self, request: &ReconcileRequest) -> ReconcileResult<Applied> {
        let name = required_name(request)?;

        let outcome = self.run_to_completion(&self.composer.delete(name))?;
        Logger::info("KEY_DELETED", &[("name", name)]);

        Ok(Applied::Ran {
            outcome,
            changed: true,
        })
    }

    /// Return structured detail; the existence probe doubles as the fetch
    fn fetch_info(&mut self, request: &ReconcileRequest) -> ReconcileResult<Applied> {
        let name = required_name(request)?;

        let probe = self.query_exists(name)?;
        if !probe.success() {
            return Ok(Applied::Skipped {
                reason: format!("skipped, since {} does not exist", name),
            });
        }

        Ok(Applied::Ran {
            outcome: probe,
            changed: false,
        })
    }

    /// Enumerate all keys; no existence check applies
    fn list_keys(&mut self) -> ReconcileResult<Applied> {
        let outcome = self.run_to_completion(&self.composer.list())?;

        Ok(Applied::Ran {
            outcome,
            changed: false,
        })
    }

    /// Probe existence via the info command, memoized per attempt
    fn query_exists(&mut self, name: &str) -> ReconcileResult<ExecutionOutcome> {
        if let Some(outcome) = &self.probe {
            return Ok(outcome.clone());
        }

        let outcome = run_sequence(self.runner, &self.composer.info(name))?;
        Logger::info(
            "KEY_EXISTS_PROBE",
            &[
                ("exists", if outcome.success() { "true" } else { "false" }),
                ("name", name),
            ],
        );

        self.probe = Some(outcome.clone());
        Ok(outcome)
    }

    /// Run a correcting sequence; any non-zero exit is fatal
    fn run_to_completion(&mut self, sequence: &[CommandSpec]) -> ReconcileResult<ExecutionOutcome> {
        let outcome = run_sequence(self.runner, sequence)?;
        if !outcome.success() {
            return Err(ReconcileError::CommandFailed { outcome });
        }
        Ok(outcome)
    }
}

/// The key name, required for every state but `list`
fn required_name(request: &ReconcileRequest) -> ReconcileResult<&str> {
    match request.name.as_deref() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(ReconcileError::MissingName {
            state: request.state.as_str(),
        }),
    }
}

/// A non-empty capability set, required for present/update
fn required_caps(request: &ReconcileRequest) -> ReconcileResult<&CapabilitySet> {
    match request.caps.as_ref() {
        Some(caps) if !caps.is_empty() => Ok(caps),
        _ => Err(ReconcileError::MissingCapabilities {
            state: request.state.as_str(),
        }),
    }
}

/// Use the supplied secret when present and non-empty, else generate
fn resolve_secret(supplied: Option<&str>) -> Secret {
    match supplied {
        Some(text) if !text.is_empty() => Secret::from_base64(text),
        _ => generate_secret(),
    }
}
