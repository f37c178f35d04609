// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for handler/route tests: a real `AppState` backed by a
//! temp dir, exercised through the actual router via `tower::ServiceExt`.

#![cfg(test)]

use crate::state::AppState;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tower::ServiceExt;
use wd_shell::ShellLauncher;
use wd_store::TaskStore;
use wd_supervisor::{Guardian, ProcessRegistry, Supervisor};

pub struct Harness {
    pub _dir: TempDir,
    pub state: AppState,
}

pub fn harness() -> Harness {
    let dir = TempDir::new().expect("tempdir");
    let store = Arc::new(TaskStore::open(dir.path()).expect("open store"));
    let registry = Arc::new(ProcessRegistry::new());
    let launcher = ShellLauncher::new(false);
    let clock: Arc<dyn wd_core::Clock> = Arc::new(wd_core::SystemClock);
    let supervisor = Arc::new(Supervisor::new(
        store.clone(),
        registry,
        launcher,
        clock.clone(),
        dir.path().to_path_buf(),
    ));
    let guardian = Arc::new(Guardian::new(supervisor.clone(), clock));
    let state = AppState {
        store,
        supervisor,
        guardian,
        start_time: Instant::now(),
    };
    Harness { _dir: dir, state }
}

impl Harness {
    pub fn router(&self) -> Router {
        crate::routes::build(self.state.clone())
    }
}

pub async fn send(router: Router, req: Request<Body>) -> Response<Body> {
    router.oneshot(req).await.expect("router call")
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn plain_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

#[allow(dead_code)]
pub fn expect_status(resp: &Response<Body>, status: StatusCode) {
    assert_eq!(resp.status(), status);
}
