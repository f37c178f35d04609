// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wd-store: durable JSON task configuration store.
//!
//! A single JSON document on disk, `<base>/task/tasks.json`. Pure
//! configuration data; no runtime fields (`status`, `runtime_pid`) are
//! ever persisted.

mod error;

pub use error::StoreError;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wd_core::{Clock, IdGen, ProjIdGen, SystemClock, Task, TaskId, TaskPatch};

/// JSON keys that must never survive a write. Defense in depth: even
/// though [`Task`] has no such fields today, a future merge of raw
/// client JSON onto a task must not leak them onto disk.
const RUNTIME_ONLY_KEYS: &[&str] = &["status", "runtime_pid"];

/// Durable store for task configuration.
pub struct TaskStore {
    path: PathBuf,
    id_gen: Arc<dyn IdGen>,
    clock: Arc<dyn Clock>,
}

impl TaskStore {
    /// Open (or create) the store rooted at `base_dir`, ensuring
    /// `<base_dir>/task/` exists.
    pub fn open(base_dir: &Path) -> Result<Self, StoreError> {
        Self::with_deps(base_dir, Arc::new(ProjIdGen), Arc::new(SystemClock))
    }

    /// Open the store with injected id generation and clock, for
    /// deterministic tests.
    pub fn with_deps(
        base_dir: &Path,
        id_gen: Arc<dyn IdGen>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let task_dir = base_dir.join("task");
        fs::create_dir_all(&task_dir)?;
        Ok(Self {
            path: task_dir.join("tasks.json"),
            id_gen,
            clock,
        })
    }

    /// Path to the underlying JSON document, for diagnostics/tests.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List all tasks. Tolerates a missing file (empty) and logs but
    /// returns empty on parse failure — the store's contract is
    /// best-effort local JSON, not a durable WAL.
    pub fn list(&self) -> Vec<Task> {
        self.read_all()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.read_all().into_iter().find(|t| t.id == *id)
    }

    /// Create a task. If `task.id` is already present in the store, the
    /// existing entry is returned unchanged (idempotent create, matching
    /// the HTTP contract "created (or existing, by id)"). Otherwise an id
    /// is generated if absent, timestamps are stamped, and the task is
    /// appended.
    pub fn create(&self, mut task: Task) -> Result<Task, StoreError> {
        let mut tasks = self.read_all();

        if !task.id.as_str().is_empty() {
            if let Some(existing) = tasks.iter().find(|t| t.id == task.id) {
                return Ok(existing.clone());
            }
        } else {
            task.id = self.id_gen.next();
        }

        task.validate_for_create()
            .map_err(StoreError::Validation)?;

        let now = self.clock.system_now().into();
        task.created_date = now;
        task.updated_date = now;

        let created = task.clone();
        tasks.push(task);
        self.write_all(&tasks)?;
        Ok(created)
    }

    /// Apply `patch` to the task with id `id`. Returns `Ok(None)` if no
    /// such task exists (caller maps this to HTTP 404).
    pub fn update(&self, id: &str, patch: TaskPatch) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.read_all();
        let Some(task) = tasks.iter_mut().find(|t| t.id == *id) else {
            return Ok(None);
        };
        let now = self.clock.system_now().into();
        patch.apply(task, now);
        let updated = task.clone();
        self.write_all(&tasks)?;
        Ok(Some(updated))
    }

    /// Remove the task with id `id` from the store. Returns whether a
    /// task was actually removed. Terminating any live process is the
    /// caller's (supervisor's) responsibility, not the store's.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut tasks = self.read_all();
        let before = tasks.len();
        tasks.retain(|t| t.id != *id);
        let removed = tasks.len() != before;
        if removed {
            self.write_all(&tasks)?;
        }
        Ok(removed)
    }

    /// Collapse duplicate ids, keeping the entry with the latest
    /// `updated_date` for each id. Returns `(removed, total_after)`.
    pub fn dedupe(&self) -> Result<(usize, usize), StoreError> {
        let tasks = self.read_all();
        let before = tasks.len();
        let deduped = dedupe_tasks(tasks);
        let removed = before - deduped.len();
        if removed > 0 {
            self.write_all(&deduped)?;
        }
        Ok((removed, deduped.len()))
    }

    /// Apply `f` to the task with id `id` in place, **without** advancing
    /// `updated_date`. Reserved for the guardian's own restart-count and
    /// eligibility bookkeeping, which never counts as a user-visible
    /// update. Returns whether a task was found.
    pub fn guardian_update(&self, id: &str, f: impl FnOnce(&mut Task)) -> Result<bool, StoreError> {
        let mut tasks = self.read_all();
        let Some(task) = tasks.iter_mut().find(|t| t.id == *id) else {
            return Ok(false);
        };
        f(task);
        self.write_all(&tasks)?;
        Ok(true)
    }

    fn read_all(&self) -> Vec<Task> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "failed to read task store");
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Vec<Task>>(&bytes) {
            Ok(tasks) => dedupe_tasks(tasks),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "failed to parse task store, treating as empty");
                Vec::new()
            }
        }
    }

    /// Atomically replace the whole file with `tasks`, stripping any
    /// runtime-only keys and writing pretty-printed UTF-8.
    fn write_all(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let mut values: Vec<serde_json::Value> = tasks
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?;
        for value in &mut values {
            if let serde_json::Value::Object(map) = value {
                for key in RUNTIME_ONLY_KEYS {
                    map.remove(*key);
                }
            }
        }
        let body = serde_json::to_vec_pretty(&values)?;

        let tmp_path = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp_path, &body) {
            tracing::error!(error = %e, "failed to write task store temp file");
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            tracing::error!(error = %e, "failed to replace task store file");
            return Err(e.into());
        }
        Ok(())
    }
}

/// Keep, per id, the entry with the maximum `updated_date`; stable order
/// of first occurrence among survivors (P3).
fn dedupe_tasks(tasks: Vec<Task>) -> Vec<Task> {
    let mut order: Vec<TaskId> = Vec::new();
    let mut best: std::collections::HashMap<TaskId, Task> = std::collections::HashMap::new();

    for task in tasks {
        match best.get(&task.id) {
            Some(existing) if existing.updated_date >= task.updated_date => {}
            Some(_) => {
                best.insert(task.id.clone(), task);
            }
            None => {
                order.push(task.id.clone());
                best.insert(task.id.clone(), task);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| best.remove(&id))
        .collect()
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
