// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::routes;
use crate::test_support::{body_json, harness, json_request, plain_request, send};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn search_without_name_is_rejected() {
    let h = harness();
    let router = routes::build(h.state.clone());
    let resp = send(router, plain_request("GET", "/api/processes/search")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_by_name_finds_current_process() {
    let h = harness();
    let router = routes::build(h.state.clone());
    // Our own test binary is always a running process, so searching for a
    // one-character substring is guaranteed to surface something.
    let resp = send(router, plain_request("GET", "/api/processes/search?name=a")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body.is_array());
}

#[tokio::test]
async fn by_port_rejects_non_numeric_port() {
    let h = harness();
    let router = routes::build(h.state.clone());
    let resp = send(router, plain_request("GET", "/api/processes/by-port/not-a-port")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("invalid port"));
}

#[tokio::test]
async fn by_port_with_no_listener_returns_empty_list() {
    let h = harness();
    let router = routes::build(h.state.clone());
    let resp = send(router, plain_request("GET", "/api/processes/by-port/1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn kill_of_nonexistent_pid_is_rejected() {
    let h = harness();
    let router = routes::build(h.state.clone());
    let req = json_request("POST", "/api/processes/kill", json!({ "pid": 999_999 }));
    let resp = send(router, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
