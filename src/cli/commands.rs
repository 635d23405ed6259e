//! CLI command implementations
//!
//! Both subcommands converge on a `ReconcileRequest`; `apply` builds it
//! from flags, `request` reads it as JSON from stdin. Check mode reports
//! without composing or executing anything, matching the behavior of an
//! orchestrator dry run.

use std::io;

use chrono::Utc;

use crate::caps::CapabilitySet;
use crate::exec::ProcessRunner;
use crate::reconcile::{reconcile, ReconcileReport, ReconcileRequest};

use super::args::{ApplyArgs, Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_report};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args().command)
}

/// Execute a parsed command against the live toolchain
pub fn run_command(command: Command) -> CliResult<()> {
    let (request, check) = match command {
        Command::Apply(args) => {
            let check = args.check;
            (request_from_args(args)?, check)
        }
        Command::Request { check } => {
            let stdin = io::stdin();
            let request = read_request(&mut stdin.lock())?;
            (request, check)
        }
    };

    let report = if check {
        check_report(&request)
    } else {
        let mut runner = ProcessRunner;
        reconcile(&request, &mut runner)?
    };

    write_report(&mut io::stdout(), &report)
}

/// Build a request from `apply` flags
fn request_from_args(args: ApplyArgs) -> CliResult<ReconcileRequest> {
    let caps = if args.caps.is_empty() {
        None
    } else {
        Some(parse_caps(&args.caps)?)
    };

    Ok(ReconcileRequest {
        cluster: args.cluster,
        name: args.name,
        state: args.state,
        caps,
        secret: args.secret,
        containerized: args.containerized,
    })
}

/// Parse repeated `--cap scope=permissions` flags into a capability set
fn parse_caps(specs: &[String]) -> CliResult<CapabilitySet> {
    let mut caps = CapabilitySet::new();

    for spec in specs {
        let (scope, perms) = spec.split_once('=').ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid capability '{}', expected scope=permissions",
                spec
            ))
        })?;

        if scope.is_empty() || perms.is_empty() {
            return Err(CliError::config_error(format!(
                "Invalid capability '{}', scope and permissions must be non-empty",
                spec
            )));
        }

        if caps.insert(scope.to_string(), perms.to_string()).is_some() {
            return Err(CliError::config_error(format!(
                "Duplicate capability scope '{}'",
                scope
            )));
        }
    }

    Ok(caps)
}

/// No-op report for check mode; nothing is composed or executed
fn check_report(request: &ReconcileRequest) -> ReconcileReport {
    let now = Utc::now();

    ReconcileReport {
        changed: false,
        rc: 0,
        cmd: Vec::new(),
        stdout: format!(
            "check mode, no commands executed for state '{}'",
            request.state
        ),
        stderr: String::new(),
        start: now,
        end: now,
        duration_ms: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::DesiredState;

    fn specs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_caps_splits_on_first_equals() {
        let caps = parse_caps(&specs(&["mon=allow r", "osd=allow rw pool=foo"])).unwrap();

        assert_eq!(caps.get("mon").unwrap(), "allow r");
        // '=' inside the permission expression survives
        assert_eq!(caps.get("osd").unwrap(), "allow rw pool=foo");
    }

    #[test]
    fn test_parse_caps_rejects_missing_equals() {
        let err = parse_caps(&specs(&["mon allow r"])).unwrap_err();
        assert_eq!(err.code_str(), "CEPHX_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_parse_caps_rejects_empty_sides() {
        assert!(parse_caps(&specs(&["=allow r"])).is_err());
        assert!(parse_caps(&specs(&["mon="])).is_err());
    }

    #[test]
    fn test_parse_caps_rejects_duplicate_scope() {
        let err = parse_caps(&specs(&["mon=allow r", "mon=allow rw"])).unwrap_err();
        assert!(err.message().contains("Duplicate"));
    }

    #[test]
    fn test_request_from_args_maps_fields() {
        let args = ApplyArgs {
            cluster: "prod".to_string(),
            name: Some("client.foo".to_string()),
            state: DesiredState::Present,
            caps: specs(&["mon=allow r"]),
            secret: None,
            containerized: Some("docker exec ceph-mon".to_string()),
            check: false,
        };

        let request = request_from_args(args).unwrap();

        assert_eq!(request.cluster, "prod");
        assert_eq!(request.name.as_deref(), Some("client.foo"));
        assert_eq!(request.state, DesiredState::Present);
        assert_eq!(request.caps.unwrap().get("mon").unwrap(), "allow r");
        assert_eq!(request.containerized.as_deref(), Some("docker exec ceph-mon"));
    }

    #[test]
    fn test_check_report_is_a_no_op() {
        let request = ReconcileRequest::new("client.foo", DesiredState::Present);
        let report = check_report(&request);

        assert!(!report.changed);
        assert_eq!(report.rc, 0);
        assert!(report.cmd.is_empty());
        assert!(report.stdout.contains("check mode"));
    }
}
