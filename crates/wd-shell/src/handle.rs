// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::ShellError;
use std::process::ExitStatus;
use tokio::process::{Child, ChildStderr, ChildStdout};

/// Exit code and/or signal observed when a child terminates. Exactly one
/// of `code`/`signal` is populated on Unix; Windows only ever populates
/// `code`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExitInfo {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl From<ExitStatus> for ExitInfo {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            ExitInfo {
                code: status.code(),
                signal: status.signal(),
            }
        }
        #[cfg(not(unix))]
        {
            ExitInfo {
                code: status.code(),
                signal: None,
            }
        }
    }
}

/// A spawned command: the child handle plus the pid it was launched
/// under. The process group id always equals `pid` on Unix, since
/// [`crate::launcher::ShellLauncher`] always spawns into a fresh group.
pub struct ShellHandle {
    pub(crate) child: Child,
    pub pid: u32,
}

impl ShellHandle {
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for the child to exit, yielding its [`ExitInfo`].
    pub async fn wait(&mut self) -> Result<ExitInfo, ShellError> {
        let status = self.child.wait().await?;
        Ok(status.into())
    }

    /// Deliver `signal` (default SIGTERM) to the child and every
    /// transitive descendant it created, via its process group.
    pub fn tree_terminate(&self, signal: &str) -> Result<(), ShellError> {
        tree_terminate_pid(self.pid, signal)
    }
}

/// Deliver `signal` to the process group led by `pid`, which
/// [`crate::launcher::ShellLauncher`] guarantees equals the group id of
/// every command it spawns. Split out from [`ShellHandle::tree_terminate`]
/// so the process registry can terminate by pid alone, once the
/// [`ShellHandle`] itself has moved into a detached wait task.
#[cfg(unix)]
pub fn tree_terminate_pid(pid: u32, signal: &str) -> Result<(), ShellError> {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    let sig = parse_signal(signal)?;
    let pgid = Pid::from_raw(pid as i32);
    killpg(pgid, sig).map_err(|e| ShellError::SignalFailed(e.to_string()))
}

#[cfg(windows)]
pub fn tree_terminate_pid(pid: u32, _signal: &str) -> Result<(), ShellError> {
    let status = std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/T", "/F"])
        .status()
        .map_err(|e| ShellError::SignalFailed(e.to_string()))?;
    if status.success() {
        Ok(())
    } else {
        Err(ShellError::SignalFailed(format!(
            "taskkill exited with {status}"
        )))
    }
}

#[cfg(unix)]
fn parse_signal(name: &str) -> Result<nix::sys::signal::Signal, ShellError> {
    use nix::sys::signal::Signal;
    use std::str::FromStr;

    let upper = name.trim().to_ascii_uppercase();
    let normalized = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{upper}")
    };
    Signal::from_str(&normalized)
        .map_err(|_| ShellError::SignalFailed(format!("unknown signal: {name}")))
}

#[cfg(all(test, unix))]
#[path = "handle_tests.rs"]
mod tests;
