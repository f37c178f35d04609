// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory process registry: the source of truth for runtime state.
//! Persisted task configuration never lives here.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use wd_core::{LogBuffer, TaskId};
use wd_shell::ExitInfo;

/// Runtime status of a live entry, independent of the task's persisted
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Running,
    Stopped,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Running => "running",
            Status::Stopped => "stopped",
        }
    }
}

/// The registry's record for a task that is currently or was recently
/// spawned. Outlives the child: a stopped entry retains its last exit
/// info and log buffers until overwritten or removed.
pub struct LiveEntry {
    pub pid: u32,
    pub status: Status,
    pub command: String,
    pub working_directory: PathBuf,
    pub environment: HashMap<String, String>,
    pub started_at: SystemTime,
    pub last_exit: Option<ExitInfo>,
    pub logs: Arc<Mutex<LogBuffer>>,
}

/// Thread-safe map from task id to live entry, plus a per-id async mutex
/// used to serialize start/stop/restart so distinct ids proceed in
/// parallel while same-id operations queue.
#[derive(Default)]
pub struct ProcessRegistry {
    entries: Mutex<HashMap<TaskId, LiveEntry>>,
    locks: Mutex<HashMap<TaskId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-task-id lock, created on first use and reused afterward.
    pub fn task_lock(&self, id: &TaskId) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(id.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    pub fn insert(&self, id: TaskId, entry: LiveEntry) {
        self.entries.lock().insert(id, entry);
    }

    pub fn remove(&self, id: &TaskId) -> Option<LiveEntry> {
        self.entries.lock().remove(id)
    }

    /// Flip an entry to `stopped` and record its exit info, if the entry
    /// still exists (it may have been replaced by a newer start/restart
    /// in the meantime, in which case this is a no-op on the old entry).
    pub fn mark_stopped(&self, id: &TaskId, exit: ExitInfo) {
        if let Some(entry) = self.entries.lock().get_mut(id) {
            entry.status = Status::Stopped;
            entry.last_exit = Some(exit);
        }
    }

    pub fn is_running(&self, id: &TaskId) -> bool {
        matches!(
            self.entries.lock().get(id),
            Some(LiveEntry {
                status: Status::Running,
                ..
            })
        )
    }

    /// `(running, status, pid)` for an HTTP status response. No entry at
    /// all is reported the same as a stopped one with no pid.
    pub fn status(&self, id: &TaskId) -> (bool, Status, Option<u32>) {
        match self.entries.lock().get(id) {
            Some(entry) => (entry.status == Status::Running, entry.status, Some(entry.pid)),
            None => (false, Status::Stopped, None),
        }
    }

    pub fn pid(&self, id: &TaskId) -> Option<u32> {
        self.entries.lock().get(id).map(|e| e.pid)
    }

    /// The command/cwd/environment of the current (possibly stopped)
    /// live entry, used by `restart` to reuse a previous invocation when
    /// the caller supplies no explicit `start_command`.
    pub fn current_invocation(&self, id: &TaskId) -> Option<(String, PathBuf, HashMap<String, String>)> {
        self.entries
            .lock()
            .get(id)
            .map(|e| (e.command.clone(), e.working_directory.clone(), e.environment.clone()))
    }

    pub fn logs(&self, id: &TaskId) -> (Vec<String>, Vec<String>) {
        match self.entries.lock().get(id) {
            Some(entry) => entry.logs.lock().snapshot(),
            None => (Vec::new(), Vec::new()),
        }
    }

    pub fn clear_logs(&self, id: &TaskId) {
        if let Some(entry) = self.entries.lock().get(id) {
            entry.logs.lock().clear();
        }
    }

    /// `(id, pid)` for every entry currently running, so orderly
    /// shutdown can iterate and tree-terminate each.
    pub fn running_entries(&self) -> Vec<(TaskId, u32)> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, entry)| entry.status == Status::Running)
            .map(|(id, entry)| (id.clone(), entry.pid))
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
