//! Bounded execution of external signing tools.
//!
//! [`run_tool`] spawns a command, waits for it with a deadline, and turns
//! every failure into an error naming the pipeline step: spawn failure and
//! non-zero exit become [`Error::Signing`], an expired deadline kills the
//! child and becomes [`Error::Timeout`].

use crate::error::SigningStep;
use crate::{Error, Result};
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Default deadline for one external tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on captured stderr.
const MAX_STDERR_BYTES: u64 = 64 * 1024;

/// How long to wait for the stderr reader after the child is gone.
const READER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Run `command` to completion within `timeout`.
///
/// Stdout is discarded; stderr is captured (bounded) for the error message.
///
/// # Errors
///
/// - [`Error::Signing`] if the program cannot be spawned or exits unsuccessfully
/// - [`Error::Timeout`] if it is still running at the deadline (it is killed)
pub fn run_tool(mut command: Command, step: SigningStep, timeout: Duration) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    tracing::debug!(%program, %step, "running external tool");

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::signing(step, format!("failed to start {program}: {e}")))?;

    let (stderr_tx, stderr_rx) = mpsc::channel();
    if let Some(stderr) = child.stderr.take() {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.take(MAX_STDERR_BYTES).read_to_end(&mut buf);
            let _ = stderr_tx.send(buf);
        });
    }

    let waited = child.wait_timeout(timeout);
    let status = match waited {
        Ok(Some(status)) => status,
        Ok(None) => {
            tracing::warn!(%program, %step, timeout_secs = timeout.as_secs(), "external tool timed out");
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout {
                step,
                seconds: timeout.as_secs(),
            });
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::signing(step, format!("failed to wait for {program}: {e}")));
        }
    };

    // A descendant holding the pipe open must not stall us; give up on stderr then.
    let stderr = stderr_rx.recv_timeout(READER_JOIN_TIMEOUT).unwrap_or_default();

    if status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&stderr);
    let stderr = stderr.trim();
    let message = if stderr.is_empty() {
        format!("{program} exited with {status}")
    } else {
        format!("{program} exited with {status}: {stderr}")
    };
    Err(Error::signing(step, message))
}
