//! Persistent Python kernel.
//!
//! [`KernelExecutor`] keeps one interpreter alive for the whole session and
//! runs every cell in the same global namespace, so names defined by one
//! cell are visible to the next. A small driver script reads length-framed
//! cells from stdin and answers each with a status frame on stdout. Anything
//! else the cell prints is passed through.

use async_trait::async_trait;
use std::io::Write;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ShimError, ShimResult};
use crate::executor::{ExecutionOutcome, Executor};

/// Starts every reply frame; never produced by ordinary output.
const FRAME_MARKER: &[u8] = b"\x1etracelens:";

const DRIVER: &str = r#"
import linecache, os, sys, traceback

MARK = b"\x1etracelens:"
source = sys.stdin.buffer
frames = sys.stdout.buffer
sys.stdin = open(os.devnull)
scope = {"__name__": "__main__", "__builtins__": __builtins__}
count = 0

def reply(status, trace):
    for stream in (sys.stdout, sys.stderr, sys.__stdout__, sys.__stderr__):
        try:
            stream.flush()
        except Exception:
            pass
    data = trace.encode("utf-8", "replace")
    frames.write(MARK + b"%s %d\n" % (status, len(data)) + data)
    frames.flush()

while True:
    header = source.readline()
    if not header:
        break
    code = source.read(int(header)).decode("utf-8", "replace")
    count += 1
    name = "<cell %d>" % count
    linecache.cache[name] = (len(code), None, code.splitlines(True), name)
    try:
        exec(compile(code, name, "exec"), scope)
    except SystemExit as stop:
        if stop.code in (None, 0):
            reply(b"ok", "")
        else:
            reply(b"error", "SystemExit: %s" % stop.code)
    except BaseException:
        kind, value, tb = sys.exc_info()
        reply(b"error", "".join(traceback.format_exception(kind, value, tb.tb_next)))
    else:
        reply(b"ok", "")
"#;

/// Runs cells in one long-lived Python interpreter.
///
/// The interpreter is started on the first cell and restarted if it dies;
/// a restart loses the session's state and the dying cell is reported as a
/// failure.
pub struct KernelExecutor {
    program: String,
    args: Vec<String>,
    kernel: Mutex<Option<Kernel>>,
}

struct Kernel {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Status of a reply frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Error,
}

impl KernelExecutor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            kernel: Mutex::new(None),
        }
    }

    /// Parse an interpreter command line such as `python3 -`.
    ///
    /// A `-` argument is dropped: the kernel feeds the driver with `-c`.
    pub fn from_command_line(command: &str) -> ShimResult<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| ShimError::InvalidInterpreter("command is empty".to_string()))?;
        Ok(Self::new(program, parts.filter(|arg| arg != "-").collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn spawn(&self) -> ShimResult<Kernel> {
        debug!(program = %self.program, args = ?self.args, "Starting kernel");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("-c")
            .arg(DRIVER)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ShimError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ShimError::Kernel("interpreter has no stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ShimError::Kernel("interpreter has no stdout".to_string()))?;

        Ok(Kernel {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

#[async_trait]
impl Executor for KernelExecutor {
    async fn execute(&self, code: &str) -> ShimResult<ExecutionOutcome> {
        let mut guard = self.kernel.lock().await;
        if guard.is_none() {
            *guard = Some(self.spawn()?);
        }
        let Some(kernel) = guard.as_mut() else {
            return Err(ShimError::Kernel("kernel is not running".to_string()));
        };

        debug!(code_len = code.len(), "Executing cell in kernel");
        kernel.send(code).await?;

        match kernel.receive().await? {
            Some((Status::Ok, _)) => Ok(ExecutionOutcome::Success),
            Some((Status::Error, trace)) => {
                debug!(trace_len = trace.len(), "Cell failed");
                Ok(ExecutionOutcome::Failure { trace })
            }
            None => {
                let mut dead = guard.take();
                let status = match dead.as_mut() {
                    Some(kernel) => kernel.child.wait().await.ok().and_then(|s| s.code()),
                    None => None,
                };
                warn!(status = ?status, "Kernel exited, session state lost");
                let trace = match status {
                    Some(code) => format!(
                        "Interpreter exited with code {} while running the cell; session state was lost",
                        code
                    ),
                    None => "Interpreter was terminated while running the cell; session state was lost"
                        .to_string(),
                };
                Ok(ExecutionOutcome::Failure { trace })
            }
        }
    }
}

impl Kernel {
    /// Write one length-framed cell.
    ///
    /// A broken pipe means the interpreter is gone; [`Kernel::receive`]
    /// reports that.
    async fn send(&mut self, code: &str) -> std::io::Result<()> {
        let mut frame = format!("{}\n", code.len()).into_bytes();
        frame.extend_from_slice(code.as_bytes());

        let written = match self.stdin.write_all(&frame).await {
            Ok(()) => self.stdin.flush().await,
            Err(e) => Err(e),
        };
        match written {
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    }

    /// Pass output through until the cell's reply frame. `None` on EOF.
    async fn receive(&mut self) -> ShimResult<Option<(Status, String)>> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.stdout.read_until(b'\n', &mut line).await? == 0 {
                return Ok(None);
            }

            let Some(at) = find_marker(&line) else {
                pass_through(&line)?;
                continue;
            };
            pass_through(&line[..at])?;

            let header = String::from_utf8_lossy(&line[at + FRAME_MARKER.len()..]).into_owned();
            let (status, len) = parse_header(header.trim_end())?;
            let mut body = vec![0; len];
            self.stdout.read_exact(&mut body).await?;

            let trace = String::from_utf8_lossy(&body).trim_end().to_string();
            return Ok(Some((status, trace)));
        }
    }
}

fn find_marker(line: &[u8]) -> Option<usize> {
    line.windows(FRAME_MARKER.len())
        .position(|window| window == FRAME_MARKER)
}

fn parse_header(header: &str) -> ShimResult<(Status, usize)> {
    let malformed = || ShimError::Kernel(format!("malformed reply frame: {:?}", header));
    let (status, len) = header.split_once(' ').ok_or_else(malformed)?;
    let len: usize = len.parse().map_err(|_| malformed())?;
    match status {
        "ok" => Ok((Status::Ok, len)),
        "error" => Ok((Status::Error, len)),
        _ => Err(malformed()),
    }
}

fn pass_through(bytes: &[u8]) -> std::io::Result<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    let mut out = std::io::stdout().lock();
    out.write_all(bytes)?;
    out.flush()
}
