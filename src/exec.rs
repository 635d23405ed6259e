//! Sequence execution and result mapping
//!
//! Runs composed command sequences strictly in order, aborting at the
//! first non-zero return code. `CommandRunner` is the seam: production
//! code shells out through [`ProcessRunner`], tests substitute scripted
//! runners. No retries happen at this layer; retry policy belongs to the
//! caller.

use std::process::Command;

use serde::Serialize;
use thiserror::Error;

use crate::command::CommandSpec;

/// Result type for execution
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors raised while driving external commands
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command could not be spawned at all (binary missing, EPERM, ...)
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A sequence with no commands was submitted
    #[error("refusing to execute an empty command sequence")]
    EmptySequence,
}

/// Raw output of a single invocation, before trimming
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Abstraction over running one external command
pub trait CommandRunner {
    fn run(&mut self, cmd: &CommandSpec) -> ExecResult<RawOutput>;
}

/// Blocking runner backed by `std::process::Command`
///
/// A process killed by a signal has no exit code; it is mapped to `-1`
/// and treated like any other failure.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, cmd: &CommandSpec) -> ExecResult<RawOutput> {
        let output = Command::new(cmd.program())
            .args(cmd.args())
            .output()
            .map_err(|source| ExecError::Spawn {
                command: cmd.to_string(),
                source,
            })?;

        Ok(RawOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Fully-populated result of a sequence run
///
/// Always refers to a real invocation: either the last command of a fully
/// successful sequence or the first failing one. Streams are trimmed of
/// trailing line terminators.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub return_code: i32,
    pub command: CommandSpec,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecutionOutcome {
    /// Whether the invocation exited zero
    pub fn success(&self) -> bool {
        self.return_code == 0
    }

    /// stdout as text, lossily decoded
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// stderr as text, lossily decoded
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// In-memory runner replaying canned outputs, for tests
///
/// Records every command it is asked to run. When the script is
/// exhausted it answers with an empty, successful output, so assertions
/// about "never executed" are made against [`ScriptedRunner::ran`].
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    script: std::collections::VecDeque<RawOutput>,
    ran: Vec<CommandSpec>,
}

impl ScriptedRunner {
    /// Runner that answers success with empty streams forever
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner replaying `script` in order
    pub fn with_script(script: Vec<RawOutput>) -> Self {
        Self {
            script: script.into(),
            ran: Vec::new(),
        }
    }

    /// Queue one canned response
    pub fn push(&mut self, code: i32, stdout: &[u8], stderr: &[u8]) {
        self.script.push_back(RawOutput {
            code,
            stdout: stdout.to_vec(),
            stderr: stderr.to_vec(),
        });
    }

    /// Every command run so far, in order
    pub fn ran(&self) -> &[CommandSpec] {
        &self.ran
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, cmd: &CommandSpec) -> ExecResult<RawOutput> {
        self.ran.push(cmd.clone());
        Ok(self.script.pop_front().unwrap_or(RawOutput {
            code: 0,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }))
    }
}

/// Strip trailing `\r` / `\n` bytes
fn trim_line_endings(mut bytes: Vec<u8>) -> Vec<u8> {
    while matches!(bytes.last(), Some(b'\n') | Some(b'\r')) {
        bytes.pop();
    }
    bytes
}

/// Run a sequence strictly in order, fail-fast
///
/// Returns the outcome of the first command that exits non-zero without
/// running the remainder, or the outcome of the final command when every
/// one succeeds.
pub fn run_sequence<R>(runner: &mut R, sequence: &[CommandSpec]) -> ExecResult<ExecutionOutcome>
where
    R: CommandRunner + ?Sized,
{
    let mut last = None;

    for cmd in sequence {
        let raw = runner.run(cmd)?;
        let outcome = ExecutionOutcome {
            return_code: raw.code,
            command: cmd.clone(),
            stdout: trim_line_endings(raw.stdout),
            stderr: trim_line_endings(raw.stderr),
        };

        if !outcome.success() {
            return Ok(outcome);
        }
        last = Some(outcome);
    }

    last.ok_or(ExecError::EmptySequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Composer;

    fn two_command_sequence() -> Vec<CommandSpec> {
        let composer = Composer::new("ceph", None);
        let caps = [("mon".to_string(), "allow r".to_string())].into();
        composer.create("client.foo", &crate::secret::generate_secret(), &caps)
    }

    #[test]
    fn test_success_returns_last_outcome() {
        let seq = two_command_sequence();
        let mut runner = ScriptedRunner::new();
        runner.push(0, b"keyring", b"");
        runner.push(0, b"imported", b"");

        let outcome = run_sequence(&mut runner, &seq).unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.command, seq[1]);
        assert_eq!(outcome.stdout, b"imported");
        assert_eq!(runner.ran().len(), 2);
    }

    #[test]
    fn test_first_failure_short_circuits() {
        let seq = two_command_sequence();
        let mut runner = ScriptedRunner::new();
        runner.push(22, b"boom", b"no such entity");

        let outcome = run_sequence(&mut runner, &seq).unwrap();

        assert_eq!(outcome.return_code, 22);
        assert_eq!(outcome.command, seq[0]);
        // The second command must never run
        assert_eq!(runner.ran(), &[seq[0].clone()]);
    }

    #[test]
    fn test_streams_are_trimmed() {
        let seq = two_command_sequence();
        let mut runner = ScriptedRunner::new();
        runner.push(0, b"out\r\n", b"");
        runner.push(0, b"detail\n\n", b"warn\r\n");

        let outcome = run_sequence(&mut runner, &seq).unwrap();

        assert_eq!(outcome.stdout, b"detail");
        assert_eq!(outcome.stderr, b"warn");
    }

    #[test]
    fn test_interior_newlines_survive() {
        let seq = two_command_sequence();
        let mut runner = ScriptedRunner::new();
        runner.push(0, b"a\nb", b"");
        runner.push(0, b"x\ny\n", b"");

        let outcome = run_sequence(&mut runner, &seq).unwrap();
        assert_eq!(outcome.stdout, b"x\ny");
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let mut runner = ScriptedRunner::new();
        let err = run_sequence(&mut runner, &[]).unwrap_err();
        assert!(matches!(err, ExecError::EmptySequence));
    }
}
