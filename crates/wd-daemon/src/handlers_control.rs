// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/projects/{start,stop,restart,status,logs}` handlers.

use crate::error::{ApiError, ValidJson};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use wd_core::TaskId;
use wd_supervisor::{StartOutcome, StopOutcome};

#[derive(Debug, Deserialize)]
pub struct StartBody {
    pub id: String,
    #[serde(default)]
    pub start_command: Option<String>,
    #[serde(default)]
    pub working_directory: Option<String>,
    #[serde(default)]
    pub environment_variables: Option<HashMap<String, String>>,
    #[serde(default)]
    pub startup_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct StopBody {
    pub id: String,
    #[serde(default)]
    pub stop_command: Option<String>,
    #[serde(default)]
    pub working_directory: Option<String>,
    #[serde(default)]
    pub environment_variables: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct RestartBody {
    pub id: String,
    #[serde(default)]
    pub start_command: Option<String>,
    #[serde(default)]
    pub stop_command: Option<String>,
    #[serde(default)]
    pub working_directory: Option<String>,
    #[serde(default)]
    pub environment_variables: Option<HashMap<String, String>>,
    #[serde(default)]
    pub startup_timeout_ms: Option<u64>,
}

fn start_outcome_response(outcome: StartOutcome) -> Result<Json<Value>, ApiError> {
    match outcome {
        StartOutcome::Success { pid } => Ok(Json(json!({ "ok": true, "pid": pid }))),
        StartOutcome::Failure {
            error,
            code,
            signal,
            stdout,
            stderr,
        } => Err(ApiError::StartFailure {
            error,
            code,
            signal,
            stdout,
            stderr,
        }),
    }
}

pub async fn start(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<StartBody>,
) -> Result<Json<Value>, ApiError> {
    if body.id.trim().is_empty() {
        return Err(ApiError::Validation("id is required".to_string()));
    }
    let outcome = state
        .supervisor
        .start(
            &body.id,
            body.start_command,
            body.working_directory,
            body.environment_variables,
            body.startup_timeout_ms,
        )
        .await?;
    state.guardian.clear_state(&TaskId::new(&body.id));
    start_outcome_response(outcome)
}

pub async fn stop(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<StopBody>,
) -> Result<Json<Value>, ApiError> {
    if body.id.trim().is_empty() {
        return Err(ApiError::Validation("id is required".to_string()));
    }
    let outcome = state
        .supervisor
        .stop(
            &body.id,
            body.stop_command,
            body.working_directory,
            body.environment_variables,
        )
        .await?;
    state.guardian.clear_state(&TaskId::new(&body.id));
    match outcome {
        StopOutcome::Success { message: None } => Ok(Json(json!({ "ok": true }))),
        StopOutcome::Success { message: Some(m) } => Ok(Json(json!({ "ok": true, "message": m }))),
        StopOutcome::Failure { error, stdout, stderr } => Err(ApiError::StopFailure { error, stdout, stderr }),
    }
}

pub async fn restart(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RestartBody>,
) -> Result<Json<Value>, ApiError> {
    if body.id.trim().is_empty() {
        return Err(ApiError::Validation("id is required".to_string()));
    }
    let outcome = state
        .supervisor
        .restart(
            &body.id,
            body.start_command,
            body.stop_command,
            body.working_directory,
            body.environment_variables,
            body.startup_timeout_ms,
        )
        .await?;
    state.guardian.clear_state(&TaskId::new(&body.id));
    start_outcome_response(outcome)
}

pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    let (running, status, pid) = state.supervisor.status(&id);
    Json(json!({ "running": running, "status": status, "pid": pid }))
}

pub async fn logs(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    let (stdout, stderr) = state.supervisor.logs(&id);
    Json(json!({ "stdout": stdout, "stderr": stderr }))
}

pub async fn clear_logs(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    state.supervisor.clear_logs(&id);
    Json(json!({ "ok": true }))
}

/// Liveness probe. No auth, no dependency on the store or registry
/// being healthy — just "the process is up and accepting connections."
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "ok": true, "uptime_seconds": state.start_time.elapsed().as_secs() }))
}

#[cfg(test)]
#[path = "handlers_control_tests.rs"]
mod tests;
