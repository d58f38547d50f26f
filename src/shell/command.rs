//! External command execution.
//!
//! Commands are always spawned from an explicit argv; nothing here goes
//! through a shell, so arguments reach the child verbatim.

use crate::error::{ProbeError, Result};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Result of executing a command.
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timed out).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed because it exceeded its timeout.
    pub timed_out: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
            timed_out: false,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
            timed_out: false,
        }
    }

    /// Create a result for a command killed at its deadline.
    pub fn timeout(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: None,
            stdout,
            stderr,
            duration,
            success: false,
            timed_out: true,
        }
    }

    /// Stdout and stderr joined, stderr last.
    pub fn combined_output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (true, _) => self.stderr.clone(),
            (false, true) => self.stdout.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Kill the command after this long (None = wait forever).
    pub timeout: Option<Duration>,
}

impl CommandOptions {
    /// Options with the given timeout.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

/// Extra time allowed for reading output once a bounded command is done.
const OUTPUT_GRACE: Duration = Duration::from_secs(1);

/// Execute `program` with `args`, capturing stdout and stderr.
///
/// Output is drained on background threads so a chatty child cannot block
/// on a full pipe while we wait on it. On unix the child leads its own
/// process group; a timeout kills the whole group, and with a timeout set
/// output collection is bounded too, so descendants holding the pipes open
/// cannot stall the caller.
pub fn execute(program: &str, args: &[String], options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args);

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    tracing::debug!("Executing {} {:?}", program, args);

    let mut child = cmd.spawn().map_err(|e| ProbeError::EngineUnavailable {
        engine: program.to_string(),
        message: e.to_string(),
    })?;

    let stdout_drain = drain(child.stdout.take());
    let stderr_drain = drain(child.stderr.take());

    let status = wait(&mut child, options.timeout)?;

    let read_deadline = options
        .timeout
        .map(|t| (start + t).max(Instant::now() + OUTPUT_GRACE));
    let stdout = stdout_drain.finish(read_deadline);
    let stderr = stderr_drain.finish(read_deadline);
    let duration = start.elapsed();

    match status {
        None => {
            tracing::debug!("{} timed out after {:?}", program, duration);
            Ok(CommandResult::timeout(stdout, stderr, duration))
        }
        Some(status) if status.success() => Ok(CommandResult::success(stdout, stderr, duration)),
        Some(status) => {
            tracing::debug!("{} exited with {:?}", program, status.code());
            Ok(CommandResult::failure(
                status.code(),
                stdout,
                stderr,
                duration,
            ))
        }
    }
}

/// Wait for the child, killing it if `timeout` elapses first.
///
/// Returns `None` when the child was killed.
fn wait(
    child: &mut Child,
    timeout: Option<Duration>,
) -> Result<Option<std::process::ExitStatus>> {
    let Some(timeout) = timeout else {
        return Ok(Some(child.wait()?));
    };

    match child.wait_timeout(timeout)? {
        Some(status) => Ok(Some(status)),
        None => {
            kill_process_group(child);
            let _ = child.wait();
            Ok(None)
        }
    }
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: kill() only sends a signal; the child leads group `pgid`
    // because it was spawned with process_group(0) and has not been reaped.
    let sent = unsafe { libc::kill(-pgid, libc::SIGKILL) } == 0;
    if !sent {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}

/// Output collected from one pipe by a background reader.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl Drain {
    /// Wait for end of stream (until `deadline`, if any) and return what
    /// was read so far.
    fn finish(self, deadline: Option<Instant>) -> String {
        match deadline {
            Some(deadline) => {
                let _ = self
                    .done
                    .recv_timeout(deadline.saturating_duration_since(Instant::now()));
            }
            None => {
                let _ = self.done.recv();
            }
        }
        let bytes = self.buf.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> Drain {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let (tx, done) = mpsc::channel();
    let sink = Arc::clone(&buf);

    thread::spawn(move || {
        if let Some(mut reader) = stream {
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend_from_slice(&chunk[..n]);
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        }
        let _ = tx.send(());
    });

    Drain { buf, done }
}
