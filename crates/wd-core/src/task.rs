// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persisted `Task` configuration and its runtime-purity guarantees.

use crate::id::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Small closed enumeration for a task's display category. Unknown strings
/// encountered while loading an older or hand-edited store deserialize to
/// [`Category::Other`] rather than failing the whole document load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Web,
    Api,
    Worker,
    Script,
    #[default]
    Other,
}

impl Category {
    /// Parse a category string tolerantly, matching the store's
    /// read-is-lenient contract.
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "web" => Category::Web,
            "api" => Category::Api,
            "worker" => Category::Worker,
            "script" => Category::Script,
            _ => Category::Other,
        }
    }
}

/// A persisted task configuration. `status` and `runtime_pid` are
/// intentionally absent from this type — they are runtime-only concepts
/// that live in the process registry, never in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub notes: String,

    pub working_directory: Option<String>,

    pub start_command: String,
    pub stop_command: Option<String>,

    pub port: Option<u16>,

    #[serde(default)]
    pub environment_variables: HashMap<String, String>,

    #[serde(default)]
    pub auto_restart: bool,
    #[serde(default)]
    pub max_restarts: u32,
    #[serde(default = "default_restart_interval")]
    pub restart_interval: u32,
    #[serde(default)]
    pub restart_count: u32,

    #[serde(default)]
    pub manual_stopped: bool,
    #[serde(default)]
    pub was_running_before_shutdown: bool,

    pub last_started: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,

    /// Inert cron-style fields: persisted so the schema matches the full
    /// original data model, never read by the core (scheduling is a
    /// Non-goal).
    #[serde(default)]
    pub scheduled_start: Option<String>,
    #[serde(default)]
    pub scheduled_stop: Option<String>,
}

fn default_restart_interval() -> u32 {
    1
}

impl Task {
    /// Validate the two fields required at creation time.
    pub fn validate_for_create(&self) -> Result<(), String> {
        if self.id.as_str().is_empty() {
            return Err("id must not be empty".to_string());
        }
        if self.start_command.trim().is_empty() {
            return Err("start_command is required".to_string());
        }
        Ok(())
    }
}

/// A partial update to a task, as received on `PUT /api/projects/:id`.
/// Every field is optional; only present fields are merged onto the
/// existing task. `status` and `runtime_pid`, if present in the raw JSON
/// body, are simply not modeled here — they never reach this type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub group: Option<String>,
    pub category: Option<Category>,
    pub notes: Option<String>,
    pub working_directory: Option<Option<String>>,
    pub start_command: Option<String>,
    pub stop_command: Option<Option<String>>,
    pub port: Option<Option<u16>>,
    pub environment_variables: Option<HashMap<String, String>>,
    pub auto_restart: Option<bool>,
    pub max_restarts: Option<u32>,
    pub restart_interval: Option<u32>,
    pub restart_count: Option<u32>,
    pub manual_stopped: Option<bool>,
    pub was_running_before_shutdown: Option<bool>,
    pub last_started: Option<Option<DateTime<Utc>>>,
    pub scheduled_start: Option<Option<String>>,
    pub scheduled_stop: Option<Option<String>>,
}

impl TaskPatch {
    /// Apply this patch onto `task`, advancing `updated_date` on every
    /// user mutation.
    pub fn apply(self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            task.name = v;
        }
        if let Some(v) = self.description {
            task.description = v;
        }
        if let Some(v) = self.group {
            task.group = v;
        }
        if let Some(v) = self.category {
            task.category = v;
        }
        if let Some(v) = self.notes {
            task.notes = v;
        }
        if let Some(v) = self.working_directory {
            task.working_directory = v;
        }
        if let Some(v) = self.start_command {
            task.start_command = v;
        }
        if let Some(v) = self.stop_command {
            task.stop_command = v;
        }
        if let Some(v) = self.port {
            task.port = v;
        }
        if let Some(v) = self.environment_variables {
            task.environment_variables = v;
        }
        if let Some(v) = self.auto_restart {
            task.auto_restart = v;
        }
        if let Some(v) = self.max_restarts {
            task.max_restarts = v;
        }
        if let Some(v) = self.restart_interval {
            task.restart_interval = v;
        }
        if let Some(v) = self.restart_count {
            task.restart_count = v;
        }
        if let Some(v) = self.manual_stopped {
            task.manual_stopped = v;
        }
        if let Some(v) = self.was_running_before_shutdown {
            task.was_running_before_shutdown = v;
        }
        if let Some(v) = self.last_started {
            task.last_started = v;
        }
        if let Some(v) = self.scheduled_start {
            task.scheduled_start = v;
        }
        if let Some(v) = self.scheduled_stop {
            task.scheduled_stop = v;
        }
        task.updated_date = now;
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
