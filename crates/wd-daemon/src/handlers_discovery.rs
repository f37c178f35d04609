// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/processes` discovery handlers.

use crate::error::{ApiError, ValidJson};
use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use wd_discovery::{list_by_port, search_by_name, kill};

pub async fn search(Query(params): Query<HashMap<String, String>>) -> Result<Json<Value>, ApiError> {
    let name = params
        .get("name")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("name query parameter is required".to_string()))?;
    let matches = search_by_name(name);
    Ok(Json(json!(matches)))
}

pub async fn by_port(Path(port): Path<String>) -> Result<Json<Value>, ApiError> {
    let port: u16 = port
        .parse()
        .map_err(|_| ApiError::Validation(format!("invalid port: {port}")))?;
    let matches = list_by_port(port);
    Ok(Json(json!(matches)))
}

#[derive(Debug, Deserialize)]
pub struct KillBody {
    pub pid: u32,
    #[serde(default)]
    pub signal: Option<String>,
}

pub async fn kill_process(ValidJson(body): ValidJson<KillBody>) -> Result<Json<Value>, ApiError> {
    let signal = body.signal.unwrap_or_else(|| "SIGTERM".to_string());
    kill(body.pid, Some(&signal))?;
    Ok(Json(json!({ "ok": true, "pid": body.pid, "signal": signal })))
}

#[cfg(test)]
#[path = "handlers_discovery_tests.rs"]
mod tests;
