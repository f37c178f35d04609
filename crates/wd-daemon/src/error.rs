// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One error type, one `IntoResponse` impl, for every handler.

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::json;
use wd_discovery::DiscoveryError;
use wd_store::StoreError;
use wd_supervisor::SupervisorError;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Internal(String),
    StartFailure {
        error: String,
        code: Option<i32>,
        signal: Option<i32>,
        stdout: Vec<String>,
        stderr: Vec<String>,
    },
    StopFailure {
        error: String,
        stdout: Vec<String>,
        stderr: Vec<String>,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(error) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response()
            }
            ApiError::NotFound(error) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": error }))).into_response()
            }
            ApiError::Internal(error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": error }))).into_response()
            }
            ApiError::StartFailure {
                error,
                code,
                signal,
                stdout,
                stderr,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "ok": false,
                    "error": error,
                    "code": code,
                    "signal": signal,
                    "logs": { "stdout": stdout, "stderr": stderr },
                })),
            )
                .into_response(),
            ApiError::StopFailure { error, stdout, stderr } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "ok": false,
                    "error": error,
                    "logs": { "stdout": stdout, "stderr": stderr },
                })),
            )
                .into_response(),
        }
    }
}

impl From<SupervisorError> for ApiError {
    fn from(e: SupervisorError) -> Self {
        match e {
            SupervisorError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::InvalidPid(_) | DiscoveryError::UnknownSignal(_) => {
                ApiError::Validation(e.to_string())
            }
            DiscoveryError::SignalFailed { .. } => ApiError::Internal(e.to_string()),
        }
    }
}

/// A `Json<T>` extractor whose rejection renders through [`ApiError`]
/// rather than axum's own plain-text body, so every endpoint's failure
/// mode is the same `{error: "<reason>"}` shape — including malformed
/// bodies and non-string environment variable values, which
/// `HashMap<String, String>` rejects as a type mismatch during
/// deserialization.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        Ok(ValidJson(value))
    }
}
