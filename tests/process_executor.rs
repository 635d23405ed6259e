//! Real-process executor tests
//!
//! Exercises ProcessRunner against actual subprocesses: exit code
//! mapping, stream capture and trimming, spawn failures, and the
//! fail-fast guarantee proven with a marker file that must never be
//! created.

use cephx_key::command::CommandSpec;
use cephx_key::exec::{run_sequence, ExecError, ProcessRunner};
use tempfile::TempDir;

fn spec(tokens: &[&str]) -> CommandSpec {
    CommandSpec::from_argv(tokens.iter().map(|t| t.to_string()).collect())
}

#[test]
fn test_zero_exit_maps_to_success() {
    let mut runner = ProcessRunner;
    let outcome = run_sequence(&mut runner, &[spec(&["true"])]).unwrap();

    assert!(outcome.success());
    assert_eq!(outcome.return_code, 0);
}

#[test]
fn test_nonzero_exit_is_surfaced() {
    let mut runner = ProcessRunner;
    let outcome = run_sequence(&mut runner, &[spec(&["sh", "-c", "exit 3"])]).unwrap();

    assert!(!outcome.success());
    assert_eq!(outcome.return_code, 3);
}

#[test]
fn test_stdout_trailing_newline_is_trimmed() {
    let mut runner = ProcessRunner;
    let outcome = run_sequence(&mut runner, &[spec(&["echo", "hello"])]).unwrap();

    assert_eq!(outcome.stdout, b"hello");
}

#[test]
fn test_stderr_is_captured() {
    let mut runner = ProcessRunner;
    let outcome = run_sequence(
        &mut runner,
        &[spec(&["sh", "-c", "echo oops >&2; exit 7"])],
    )
    .unwrap();

    assert_eq!(outcome.return_code, 7);
    assert_eq!(outcome.stderr, b"oops");
    assert!(outcome.stdout.is_empty());
}

#[test]
fn test_fail_fast_never_runs_second_command() {
    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("must-not-exist");

    let sequence = [
        spec(&["false"]),
        spec(&["touch", marker.to_str().unwrap()]),
    ];

    let mut runner = ProcessRunner;
    let outcome = run_sequence(&mut runner, &sequence).unwrap();

    assert_eq!(outcome.return_code, 1);
    assert_eq!(outcome.command, sequence[0]);
    assert!(!marker.exists(), "second command ran after a failure");
}

#[test]
fn test_sequence_runs_strictly_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let log = temp_dir.path().join("order.log");
    let log_path = log.to_str().unwrap();

    let first = format!("echo first >> {}", log_path);
    let second = format!("echo second >> {}", log_path);
    let sequence = [
        spec(&["sh", "-c", first.as_str()]),
        spec(&["sh", "-c", second.as_str()]),
    ];

    let mut runner = ProcessRunner;
    let outcome = run_sequence(&mut runner, &sequence).unwrap();

    assert!(outcome.success());
    assert_eq!(std::fs::read_to_string(&log).unwrap(), "first\nsecond\n");
}

#[test]
fn test_missing_binary_is_a_spawn_error() {
    let mut runner = ProcessRunner;
    let err = run_sequence(
        &mut runner,
        &[spec(&["cephx-key-no-such-binary", "--version"])],
    )
    .unwrap_err();

    match err {
        ExecError::Spawn { command, .. } => {
            assert!(command.contains("cephx-key-no-such-binary"));
        }
        other => panic!("expected Spawn error, got {:?}", other),
    }
}
