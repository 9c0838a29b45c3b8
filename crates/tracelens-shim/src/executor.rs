//! Cell execution.
//!
//! An [`Executor`] runs a block of code and reports a tagged outcome. The
//! shim only looks at the trace of a failure, never at how the code ran.

use async_trait::async_trait;
use std::io::Write;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ShimError, ShimResult};

/// Default interpreter command line; the cell is piped to its stdin.
pub const DEFAULT_INTERPRETER: &str = "python3 -";

/// Result of running one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success,
    Failure { trace: String },
}

impl ExecutionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

/// Runs untrusted cells.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, code: &str) -> ShimResult<ExecutionOutcome>;
}

/// Runs each cell in a fresh interpreter subprocess.
///
/// Cells share no state; see [`KernelExecutor`](crate::KernelExecutor) for
/// a session that keeps its variables.
///
/// The child inherits the caller's working directory, environment and
/// stdout. Its stderr is captured and becomes the trace when the exit
/// status is non-zero; on success it is passed through to our stderr.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: String,
    args: Vec<String>,
}

impl ProcessExecutor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse a whitespace-separated command line such as `python3 -`.
    pub fn from_command_line(command: &str) -> ShimResult<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| ShimError::InvalidInterpreter("command is empty".to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new("python3", vec!["-".to_string()])
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, code: &str) -> ShimResult<ExecutionOutcome> {
        debug!(program = %self.program, args = ?self.args, code_len = code.len(), "Executing cell");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ShimError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(stdin) = child.stdin.take() {
            write_cell(stdin, code).await?;
        }

        let output = child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            if !stderr.is_empty() {
                let mut err = std::io::stderr().lock();
                err.write_all(stderr.as_bytes())?;
                err.flush()?;
            }
            return Ok(ExecutionOutcome::Success);
        }

        let trace = if stderr.trim().is_empty() {
            match output.status.code() {
                Some(code) => format!("Process exited with code {} and no error output", code),
                None => "Process was terminated by a signal".to_string(),
            }
        } else {
            stderr.trim_end().to_string()
        };

        debug!(status = ?output.status.code(), trace_len = trace.len(), "Cell failed");

        Ok(ExecutionOutcome::Failure { trace })
    }
}

/// Pipe the cell to the child and close its stdin.
///
/// A child that exits before reading everything is not an error here; its
/// exit status decides the outcome.
async fn write_cell(mut stdin: tokio::process::ChildStdin, code: &str) -> std::io::Result<()> {
    let mut buf = code.to_string();
    if !buf.ends_with('\n') {
        buf.push('\n');
    }
    match stdin.write_all(buf.as_bytes()).await {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        let exec = ProcessExecutor::from_command_line("  python3   -u  - ").unwrap();
        assert_eq!(exec.program, "python3");
        assert_eq!(exec.args, vec!["-u".to_string(), "-".to_string()]);

        let default = ProcessExecutor::from_command_line(DEFAULT_INTERPRETER).unwrap();
        assert_eq!(default.program(), ProcessExecutor::default().program());
    }

    #[test]
    fn test_parse_empty_command_line() {
        let err = ProcessExecutor::from_command_line("   ").unwrap_err();
        assert!(matches!(err, ShimError::InvalidInterpreter(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_outcome() {
        let exec = ProcessExecutor::from_command_line("sh -s").unwrap();
        let outcome = exec.execute("true").await.unwrap();
        assert_eq!(outcome, ExecutionOutcome::Success);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_captures_stderr() {
        let exec = ProcessExecutor::from_command_line("sh -s").unwrap();
        let outcome = exec
            .execute("echo 'ValueError: bad input' >&2\nexit 3")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ExecutionOutcome::Failure {
                trace: "ValueError: bad input".to_string()
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_without_stderr() {
        let exec = ProcessExecutor::from_command_line("sh -s").unwrap();
        let outcome = exec.execute("exit 4").await.unwrap();
        match outcome {
            ExecutionOutcome::Failure { trace } => assert!(trace.contains("code 4")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let exec = ProcessExecutor::new("tracelens-no-such-interpreter", Vec::new());
        let err = exec.execute("1").await.unwrap_err();
        assert!(matches!(err, ShimError::Spawn { .. }));
        assert!(err.to_string().contains("tracelens-no-such-interpreter"));
    }
}
