// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::ShellError;
use crate::handle::ShellHandle;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Platform-aware command spawn wrapper.
///
/// On Unix the command runs under the user's login shell with an
/// interactive flag, so `.bashrc`/`.zshrc` initialization (conda/mamba
/// activation, PATH tweaks) applies. On Windows it runs through the
/// default system shell.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    /// Whether to pass the interactive flag on Unix. Default `true`;
    /// settable to `false` where dotfile banners would pollute captured
    /// logs.
    pub interactive: bool,
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self { interactive: true }
    }
}

impl ShellLauncher {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    /// Spawn `command` in `cwd` with `env` merged onto the parent
    /// process's environment (parent first, task environment wins on
    /// conflict).
    pub fn spawn(
        &self,
        command: &str,
        cwd: &Path,
        env: &HashMap<String, String>,
    ) -> Result<ShellHandle, ShellError> {
        let mut cmd = self.build_command(command);
        cmd.current_dir(cwd);
        cmd.envs(env.iter());
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Each task gets its own process group so tree_terminate can
            // signal every descendant at once, even when start_command is
            // a shell pipeline that spawns further children.
            cmd.process_group(0);
        }

        let child = cmd.spawn()?;
        let pid = child
            .id()
            .ok_or_else(|| ShellError::Spawn(std::io::Error::other("spawned child has no pid")))?;

        Ok(ShellHandle { child, pid })
    }

    #[cfg(unix)]
    fn build_command(&self, command: &str) -> Command {
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string());
        let mut cmd = Command::new(shell);
        if self.interactive {
            cmd.arg("-i");
        }
        cmd.arg("-c").arg(command);
        cmd
    }

    #[cfg(windows)]
    fn build_command(&self, command: &str) -> Command {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
