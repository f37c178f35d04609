// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The start/stop/restart state machine.

use crate::error::SupervisorError;
use crate::registry::{LiveEntry, ProcessRegistry, Status};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use wd_core::{Clock, LogBuffer, Task, TaskId, TaskPatch};
use wd_shell::{tree_terminate_pid, ExitInfo, ShellLauncher};
use wd_store::TaskStore;

/// Default startup validation window.
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    Success {
        pid: u32,
    },
    Failure {
        error: String,
        code: Option<i32>,
        signal: Option<i32>,
        stdout: Vec<String>,
        stderr: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    Success { message: Option<String> },
    Failure {
        error: String,
        stdout: Vec<String>,
        stderr: Vec<String>,
    },
}

pub struct Supervisor {
    store: Arc<TaskStore>,
    registry: Arc<ProcessRegistry>,
    launcher: ShellLauncher,
    clock: Arc<dyn Clock>,
    base_dir: PathBuf,
}

impl Supervisor {
    pub fn new(
        store: Arc<TaskStore>,
        registry: Arc<ProcessRegistry>,
        launcher: ShellLauncher,
        clock: Arc<dyn Clock>,
        base_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            registry,
            launcher,
            clock,
            base_dir,
        }
    }

    pub fn registry(&self) -> &Arc<ProcessRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    /// `{running, status, pid}` for an HTTP status response. The pid is
    /// only surfaced while the entry is actually running; a stopped
    /// entry keeps its last-known pid internally (for diagnostics) but
    /// reports `None` here, matching the HTTP contract's `pid:null`.
    pub fn status(&self, id: &str) -> (bool, &'static str, Option<u32>) {
        let (running, status, pid) = self.registry.status(&TaskId::new(id));
        (running, status.as_str(), if running { pid } else { None })
    }

    pub fn logs(&self, id: &str) -> (Vec<String>, Vec<String>) {
        self.registry.logs(&TaskId::new(id))
    }

    pub fn clear_logs(&self, id: &str) {
        self.registry.clear_logs(&TaskId::new(id));
    }

    pub async fn start(
        &self,
        id: &str,
        start_command: Option<String>,
        working_directory: Option<String>,
        environment_variables: Option<HashMap<String, String>>,
        startup_timeout_ms: Option<u64>,
    ) -> Result<StartOutcome, SupervisorError> {
        let task_id = TaskId::new(id);
        let lock = self.registry.task_lock(&task_id);
        let _guard = lock.lock().await;

        let stored = self.store.get(id);
        let command = self.resolve_command(start_command, stored.as_ref())?;
        let cwd = self.resolve_cwd(working_directory, stored.as_ref());
        let env = self.resolve_env(environment_variables, stored.as_ref());

        self.terminate_if_running(&task_id);

        let outcome = self
            .spawn_and_validate(&task_id, &command, &cwd, &env, startup_timeout_ms)
            .await?;

        if matches!(outcome, StartOutcome::Success { .. }) {
            self.mark_user_start_success(id);
        }
        Ok(outcome)
    }

    /// Started by the guardian loop: uses the task's own persisted
    /// command/cwd/environment, never request overrides, and leaves all
    /// store bookkeeping to the caller — guardian bookkeeping never
    /// advances `updated_date`.
    pub async fn start_for_guardian(&self, task: &Task) -> Result<StartOutcome, SupervisorError> {
        let lock = self.registry.task_lock(&task.id);
        let _guard = lock.lock().await;

        if self.registry.is_running(&task.id) {
            return Ok(StartOutcome::Success {
                pid: self.registry.pid(&task.id).unwrap_or(0),
            });
        }

        let cwd = wd_shell::resolve_working_dir(task.working_directory.as_deref(), &self.base_dir);
        self.spawn_and_validate(
            &task.id,
            &task.start_command,
            &cwd,
            &task.environment_variables,
            Some(DEFAULT_STARTUP_TIMEOUT_MS),
        )
        .await
    }

    pub async fn stop(
        &self,
        id: &str,
        stop_command: Option<String>,
        working_directory: Option<String>,
        environment_variables: Option<HashMap<String, String>>,
    ) -> Result<StopOutcome, SupervisorError> {
        let task_id = TaskId::new(id);
        let lock = self.registry.task_lock(&task_id);
        let _guard = lock.lock().await;

        let outcome = self
            .stop_locked(&task_id, stop_command, working_directory, environment_variables)
            .await?;
        self.mark_user_stop(id);
        Ok(outcome)
    }

    pub async fn restart(
        &self,
        id: &str,
        start_command: Option<String>,
        stop_command: Option<String>,
        working_directory: Option<String>,
        environment_variables: Option<HashMap<String, String>>,
        startup_timeout_ms: Option<u64>,
    ) -> Result<StartOutcome, SupervisorError> {
        let task_id = TaskId::new(id);
        let lock = self.registry.task_lock(&task_id);
        let _guard = lock.lock().await;

        // Capture the live entry's own invocation before stopping it, so
        // an omitted start_command can reuse it.
        let previous = self.registry.current_invocation(&task_id);

        self.stop_locked(
            &task_id,
            stop_command,
            working_directory.clone(),
            environment_variables.clone(),
        )
        .await?;

        let stored = self.store.get(id);
        let effective_start_command = start_command.or_else(|| previous.as_ref().map(|(c, _, _)| c.clone()));
        let command = self.resolve_command(effective_start_command, stored.as_ref())?;
        let cwd = self.resolve_cwd(working_directory, stored.as_ref());
        let env = self.resolve_env(environment_variables, stored.as_ref());

        let outcome = self
            .spawn_and_validate(&task_id, &command, &cwd, &env, startup_timeout_ms)
            .await?;

        if matches!(outcome, StartOutcome::Success { .. }) {
            self.mark_user_start_success(id);
        }
        Ok(outcome)
    }

    // -- internals --------------------------------------------------

    fn resolve_command(&self, explicit: Option<String>, stored: Option<&Task>) -> Result<String, SupervisorError> {
        let command = explicit.or_else(|| stored.map(|t| t.start_command.clone()));
        match command {
            Some(c) if !c.trim().is_empty() => Ok(c),
            _ => Err(SupervisorError::Validation("start_command is required".to_string())),
        }
    }

    fn resolve_cwd(&self, explicit: Option<String>, stored: Option<&Task>) -> PathBuf {
        let requested = explicit.or_else(|| stored.and_then(|t| t.working_directory.clone()));
        wd_shell::resolve_working_dir(requested.as_deref(), &self.base_dir)
    }

    fn resolve_env(
        &self,
        explicit: Option<HashMap<String, String>>,
        stored: Option<&Task>,
    ) -> HashMap<String, String> {
        let mut env = stored.map(|t| t.environment_variables.clone()).unwrap_or_default();
        if let Some(overrides) = explicit {
            env.extend(overrides);
        }
        env
    }

    fn terminate_if_running(&self, id: &TaskId) {
        if let Some(pid) = self.registry.is_running(id).then(|| self.registry.pid(id)).flatten() {
            if let Err(e) = tree_terminate_pid(pid, "SIGTERM") {
                tracing::warn!(task_id = %id, error = %e, "tree-terminate of previous live entry failed");
            }
        }
    }

    async fn stop_locked(
        &self,
        task_id: &TaskId,
        stop_command: Option<String>,
        working_directory: Option<String>,
        environment_variables: Option<HashMap<String, String>>,
    ) -> Result<StopOutcome, SupervisorError> {
        if let Some(pid) = self.registry.is_running(task_id).then(|| self.registry.pid(task_id)).flatten() {
            match tree_terminate_pid(pid, "SIGTERM") {
                Ok(()) => {
                    self.registry.mark_stopped(
                        task_id,
                        ExitInfo {
                            code: None,
                            signal: None,
                        },
                    );
                    return Ok(StopOutcome::Success { message: None });
                }
                Err(e) => {
                    tracing::warn!(task_id = %task_id, error = %e, "tree-kill failed, falling through to stop_command");
                }
            }
        }

        let Some(stop_command) = stop_command else {
            return Ok(StopOutcome::Success {
                message: Some("not running".to_string()),
            });
        };

        let stored = self.store.get(task_id.as_str());
        let cwd = self.resolve_cwd(working_directory, stored.as_ref());
        let env = self.resolve_env(environment_variables, stored.as_ref());

        let mut handle = self.launcher.spawn(&stop_command, &cwd, &env)?;
        let mut stdout_lines = Vec::new();
        let mut stderr_lines = Vec::new();
        if let Some(stdout) = handle.take_stdout() {
            stdout_lines = read_all_lines(stdout).await;
        }
        if let Some(stderr) = handle.take_stderr() {
            stderr_lines = read_all_lines(stderr).await;
        }
        let exit = handle.wait().await?;

        if exit.code.unwrap_or(0) == 0 {
            Ok(StopOutcome::Success { message: None })
        } else {
            Ok(StopOutcome::Failure {
                error: format!("stop_command exited with code {:?}", exit.code),
                stdout: stdout_lines,
                stderr: stderr_lines,
            })
        }
    }

    async fn spawn_and_validate(
        &self,
        task_id: &TaskId,
        command: &str,
        cwd: &std::path::Path,
        env: &HashMap<String, String>,
        startup_timeout_ms: Option<u64>,
    ) -> Result<StartOutcome, SupervisorError> {
        let mut handle = self.launcher.spawn(command, cwd, env)?;
        let pid = handle.pid;
        let stdout = handle.take_stdout();
        let stderr = handle.take_stderr();

        let logs = Arc::new(parking_lot::Mutex::new(LogBuffer::new()));
        if let Some(stdout) = stdout {
            spawn_drain(stdout, logs.clone(), true, task_id.clone());
        }
        if let Some(stderr) = stderr {
            spawn_drain(stderr, logs.clone(), false, task_id.clone());
        }

        self.registry.insert(
            task_id.clone(),
            LiveEntry {
                pid,
                status: Status::Running,
                command: command.to_string(),
                working_directory: cwd.to_path_buf(),
                environment: env.clone(),
                started_at: self.clock.system_now(),
                last_exit: None,
                logs: logs.clone(),
            },
        );

        let (exit_tx, exit_rx) = tokio::sync::oneshot::channel::<ExitInfo>();
        let registry = self.registry.clone();
        let waited_id = task_id.clone();
        tokio::spawn(async move {
            let info = handle.wait().await.unwrap_or(ExitInfo {
                code: None,
                signal: None,
            });
            registry.mark_stopped(&waited_id, info);
            let _ = exit_tx.send(info);
        });

        let timeout = Duration::from_millis(startup_timeout_ms.unwrap_or(DEFAULT_STARTUP_TIMEOUT_MS));
        tokio::select! {
            exit = exit_rx => {
                let info = exit.unwrap_or(ExitInfo { code: None, signal: None });
                // A just-exited child's last pipe writes may still be in
                // flight through the drain tasks; give them a brief grace
                // period so the failure response's logs are complete.
                tokio::time::sleep(Duration::from_millis(50)).await;
                let (stdout, stderr) = logs.lock().snapshot();
                Ok(StartOutcome::Failure {
                    error: format!(
                        "command exited during startup window (code={:?}, signal={:?})",
                        info.code, info.signal
                    ),
                    code: info.code,
                    signal: info.signal,
                    stdout,
                    stderr,
                })
            }
            _ = tokio::time::sleep(timeout) => {
                Ok(StartOutcome::Success { pid })
            }
        }
    }

    fn mark_user_start_success(&self, id: &str) {
        let now = self.clock.system_now().into();
        let patch = TaskPatch {
            manual_stopped: Some(false),
            was_running_before_shutdown: Some(true),
            restart_count: Some(0),
            last_started: Some(Some(now)),
            ..Default::default()
        };
        if let Err(e) = self.store.update(id, patch) {
            tracing::error!(task_id = %id, error = %e, "failed to persist start bookkeeping");
        }
    }

    fn mark_user_stop(&self, id: &str) {
        let patch = TaskPatch {
            manual_stopped: Some(true),
            ..Default::default()
        };
        if let Err(e) = self.store.update(id, patch) {
            tracing::error!(task_id = %id, error = %e, "failed to persist stop bookkeeping");
        }
    }

    /// Tree-terminate every currently running live entry with SIGTERM,
    /// then wait briefly for each to actually exit before returning.
    /// Intended to be called once from the daemon's SIGINT/SIGTERM
    /// handler.
    pub async fn shutdown_all(&self) {
        let running = self.registry.running_entries();
        for (id, pid) in &running {
            if let Err(e) = tree_terminate_pid(*pid, "SIGTERM") {
                tracing::warn!(task_id = %id, error = %e, "shutdown tree-terminate failed");
            }
        }

        let deadline = self.clock.now() + Duration::from_secs(3);
        for (id, _) in &running {
            while self.registry.is_running(id) && self.clock.now() < deadline {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
}

async fn read_all_lines(reader: impl tokio::io::AsyncRead + Unpin) -> Vec<String> {
    use tokio::io::AsyncBufReadExt;
    let mut lines = tokio::io::BufReader::new(reader).lines();
    let mut out = Vec::new();
    while let Ok(Some(line)) = lines.next_line().await {
        out.push(line);
    }
    out
}

fn spawn_drain(
    reader: impl tokio::io::AsyncRead + Unpin + Send + 'static,
    logs: Arc<parking_lot::Mutex<LogBuffer>>,
    is_stdout: bool,
    task_id: TaskId,
) {
    use tokio::io::AsyncBufReadExt;
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(reader).lines();
        let mut first = true;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if first {
                        tracing::debug!(task_id = %task_id, stream = if is_stdout { "stdout" } else { "stderr" }, %line, "first captured output line");
                        first = false;
                    }
                    let mut guard = logs.lock();
                    if is_stdout {
                        guard.stdout.push(line);
                    } else {
                        guard.stderr.push(line);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(task_id = %task_id, error = %e, "error draining child output");
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
