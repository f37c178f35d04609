// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/projects` CRUD + dedupe handlers.

use crate::error::{ApiError, ValidJson};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use wd_core::{Category, Task, TaskId, TaskPatch};

/// Request body for `POST /api/projects`: a full or partial task. `id` is
/// optional — the store generates one when absent.
#[derive(Debug, Deserialize)]
pub struct CreateTaskBody {
    #[serde(default)]
    pub id: String,
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
    #[serde(default)]
    pub working_directory: Option<String>,
    pub start_command: String,
    #[serde(default)]
    pub stop_command: Option<String>,
    #[serde(default)]
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
    pub scheduled_start: Option<String>,
    #[serde(default)]
    pub scheduled_stop: Option<String>,
}

fn default_restart_interval() -> u32 {
    1
}

impl From<CreateTaskBody> for Task {
    fn from(body: CreateTaskBody) -> Self {
        // created_date/updated_date/last_started are placeholders: the
        // store stamps real timestamps on create, so only the shape
        // matters here.
        let now = chrono::Utc::now();
        Task {
            id: TaskId::new(body.id),
            name: body.name,
            description: body.description,
            group: body.group,
            category: body.category,
            notes: body.notes,
            working_directory: body.working_directory,
            start_command: body.start_command,
            stop_command: body.stop_command,
            port: body.port,
            environment_variables: body.environment_variables,
            auto_restart: body.auto_restart,
            max_restarts: body.max_restarts,
            restart_interval: body.restart_interval,
            restart_count: 0,
            manual_stopped: false,
            was_running_before_shutdown: false,
            last_started: None,
            created_date: now,
            updated_date: now,
            scheduled_start: body.scheduled_start,
            scheduled_stop: body.scheduled_stop,
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = tokio::task::spawn_blocking(move || state.store.list())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(tasks))
}

pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateTaskBody>,
) -> Result<Json<Task>, ApiError> {
    let task = tokio::task::spawn_blocking(move || state.store.create(body.into()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(task))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let updated = tokio::task::spawn_blocking(move || state.store.update(&id, patch))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    match updated {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::NotFound("no task with that id".to_string())),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    // Best-effort tree-kill of any live entry before the task is forgotten.
    let _ = state.supervisor.stop(&id, None, None, None).await;
    state.guardian.clear_state(&TaskId::new(&id));
    tokio::task::spawn_blocking(move || state.store.delete(&id))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(json!({ "ok": true })))
}

pub async fn dedupe(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let (removed, total) = tokio::task::spawn_blocking(move || state.store.dedupe())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(json!({ "ok": true, "removed": removed, "total": total })))
}

#[cfg(test)]
#[path = "handlers_projects_tests.rs"]
mod tests;
