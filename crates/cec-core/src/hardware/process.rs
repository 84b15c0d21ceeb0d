//! Adapter boundary backed by an external command-line tool.
//!
//! [`ProcessAdapter`] spawns the configured tool once per command, writes a
//! single request line to its stdin, collects stdout lines until EOF and then
//! interprets the exit status. The reply deadline covers both reading and
//! waiting; on expiry the child is killed.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{HardwareBoundary, HardwareResponse};
use crate::error::CecError;
use crate::queue::NativeCommand;

/// Tracing target for adapter process operations.
const PROCESS_TARGET: &str = "cec_core::hardware::process";

/// Exit status the adapter uses for commands it does not implement.
const NOT_IMPLEMENTED_STATUS: i32 = 2;

/// Polling interval while waiting for the adapter to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Talks to the adapter tool over stdio, one process per command.
///
/// The per-command deadline is taken from the command's `timeout` parameter
/// (milliseconds) when present, and from the adapter's reply timeout
/// otherwise.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use cec_core::hardware::ProcessAdapter;
///
/// let adapter = ProcessAdapter::new("/usr/bin/cec-adapter", Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct ProcessAdapter {
    executable: PathBuf,
    args: Vec<String>,
    reply_timeout: Duration,
}

impl ProcessAdapter {
    /// Creates an adapter for `executable`.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>, reply_timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            reply_timeout,
        }
    }

    /// Sets fixed arguments passed to every invocation.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Path to the adapter tool.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn deadline_for(&self, command: &NativeCommand) -> Duration {
        command
            .param("timeout")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|millis| *millis > 0)
            .map_or(self.reply_timeout, Duration::from_millis)
    }

    fn spawn(&self, command: &NativeCommand) -> Result<Child, CecError> {
        debug!(
            target: PROCESS_TARGET,
            executable = %self.executable.display(),
            command = command.name(),
            "spawning adapter process"
        );
        Command::new(&self.executable)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| CecError::SpawnFailed {
                command: command.name().to_owned(),
                message: err.to_string(),
                source: Some(Arc::new(err)),
            })
    }
}

impl HardwareBoundary for ProcessAdapter {
    fn open(&mut self) -> Result<(), CecError> {
        if !self.executable.is_file() {
            return Err(CecError::ExecutableNotFound {
                path: self.executable.clone(),
            });
        }
        debug!(
            target: PROCESS_TARGET,
            executable = %self.executable.display(),
            "adapter opened"
        );
        Ok(())
    }

    fn execute(&mut self, command: &NativeCommand) -> Result<HardwareResponse, CecError> {
        let name = command.name();
        let timeout = self.deadline_for(command);
        let deadline = Instant::now() + timeout;
        let mut child = self.spawn(command)?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe(name, "stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| missing_pipe(name, "stdout"))?;
        let stderr = child.stderr.take().map(|pipe| drain_stderr(name, pipe));

        if let Err(error) = write_request(name, stdin, command) {
            kill(&mut child);
            return Err(error);
        }

        let reply = read_lines(name, stdout, deadline, timeout).and_then(|lines| {
            wait_for_exit(name, &mut child, deadline, timeout).map(|status| (lines, status))
        });
        let (lines, status) = match reply {
            Ok(reply) => reply,
            Err(error) => {
                kill(&mut child);
                return Err(error);
            }
        };
        if let Some(handle) = stderr {
            drop(handle.join());
        }

        debug!(
            target: PROCESS_TARGET,
            command = name,
            status,
            lines = lines.len(),
            "adapter process exited"
        );
        match status {
            0 => Ok(HardwareResponse::Lines(lines)),
            NOT_IMPLEMENTED_STATUS => Ok(HardwareResponse::NotImplemented),
            other => Err(CecError::NonZeroExit {
                command: name.to_owned(),
                status: other,
            }),
        }
    }

    fn close(&mut self) {
        debug!(target: PROCESS_TARGET, "adapter closed");
    }
}

fn missing_pipe(name: &str, pipe: &str) -> CecError {
    CecError::SpawnFailed {
        command: name.to_owned(),
        message: format!("failed to capture {pipe}"),
        source: None,
    }
}

/// Writes the request line and closes stdin.
fn write_request(
    name: &str,
    mut stdin: impl Write,
    command: &NativeCommand,
) -> Result<(), CecError> {
    let line = command.to_request_line();
    stdin
        .write_all(line.as_bytes())
        .and_then(|()| stdin.write_all(b"\n"))
        .and_then(|()| stdin.flush())
        .map_err(|err| CecError::io(name, err))
}

/// Collects stdout lines until EOF or the deadline.
fn read_lines(
    name: &str,
    stdout: impl Read + Send + 'static,
    deadline: Instant,
    timeout: Duration,
) -> Result<Vec<String>, CecError> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut reader = BufReader::new(stdout);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            let line = match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => Ok(decode_line(&buffer)),
                Err(err) => Err(err),
            };
            let failed = line.is_err();
            if sender.send(line).is_err() || failed {
                break;
            }
        }
    });

    let mut lines = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(remaining) {
            Ok(Ok(line)) => lines.push(line),
            Ok(Err(err)) => return Err(CecError::io(name, err)),
            Err(RecvTimeoutError::Disconnected) => return Ok(lines),
            Err(RecvTimeoutError::Timeout) => return Err(timed_out(name, timeout)),
        }
    }
}

/// Decodes one reply line, replacing invalid UTF-8 and dropping the line
/// terminator.
fn decode_line(raw: &[u8]) -> String {
    let without_newline = raw.strip_suffix(b"\n").unwrap_or(raw);
    let content = without_newline
        .strip_suffix(b"\r")
        .unwrap_or(without_newline);
    String::from_utf8_lossy(content).into_owned()
}

/// Waits for the child to exit, returning its status code.
fn wait_for_exit(
    name: &str,
    child: &mut Child,
    deadline: Instant,
    timeout: Duration,
) -> Result<i32, CecError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status.code().unwrap_or(-1)),
            Ok(None) if Instant::now() >= deadline => return Err(timed_out(name, timeout)),
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => return Err(CecError::io(name, err)),
        }
    }
}

fn timed_out(name: &str, timeout: Duration) -> CecError {
    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    warn!(
        target: PROCESS_TARGET,
        command = name,
        timeout_ms,
        "adapter timed out, killing process"
    );
    CecError::Timeout {
        command: name.to_owned(),
        timeout_ms,
    }
}

fn kill(child: &mut Child) {
    drop(child.kill());
    drop(child.wait());
}

/// Drains stderr on a helper thread so the child never blocks on it.
fn drain_stderr(name: &str, stderr: ChildStderr) -> thread::JoinHandle<()> {
    let command = name.to_owned();
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if BufReader::new(stderr).read_to_end(&mut buffer).is_ok() && !buffer.is_empty() {
            debug!(
                target: PROCESS_TARGET,
                %command,
                stderr = %String::from_utf8_lossy(&buffer).trim(),
                "adapter stderr output"
            );
        }
    })
}
