// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::test_support::{body_json, harness, json_request, plain_request, send};
use axum::http::StatusCode;
use serde_json::json;

async fn create(h: &crate::test_support::Harness, id: &str, start_command: &str) {
    let req = json_request(
        "POST",
        "/api/projects",
        json!({ "id": id, "start_command": start_command }),
    );
    let resp = send(h.router(), req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn start_then_status_then_stop() {
    let h = harness();
    create(&h, "t1", "sleep 60").await;

    let req = json_request("POST", "/api/projects/start", json!({ "id": "t1" }));
    let resp = send(h.router(), req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ok"], true);
    assert!(body["pid"].as_u64().unwrap() > 0);

    let resp = send(h.router(), plain_request("GET", "/api/projects/status/t1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["running"], true);
    assert_eq!(body["status"], "running");
    assert!(body["pid"].as_u64().unwrap() > 0);

    let req = json_request("POST", "/api/projects/stop", json!({ "id": "t1" }));
    let resp = send(h.router(), req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(h.router(), plain_request("GET", "/api/projects/status/t1")).await;
    let body = body_json(resp).await;
    assert_eq!(body["running"], false);
    assert_eq!(body["status"], "stopped");
    assert!(body["pid"].is_null());
}

#[tokio::test]
async fn start_with_missing_id_is_rejected() {
    let h = harness();
    let req = json_request("POST", "/api/projects/start", json!({ "id": "" }));
    let resp = send(h.router(), req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn start_of_immediately_failing_command_reports_failure_with_logs() {
    let h = harness();
    create(&h, "t1", "sh -c 'echo boom 1>&2; exit 7'").await;

    let req = json_request(
        "POST",
        "/api/projects/start",
        json!({ "id": "t1", "startup_timeout_ms": 200 }),
    );
    let resp = send(h.router(), req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], 7);
    assert!(body["logs"]["stderr"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l.as_str().unwrap().contains("boom")));
}

#[tokio::test]
async fn restart_reuses_last_known_start_command() {
    let h = harness();
    create(&h, "t1", "sleep 60").await;

    let req = json_request("POST", "/api/projects/start", json!({ "id": "t1" }));
    send(h.router(), req).await;

    let req = json_request("POST", "/api/projects/restart", json!({ "id": "t1" }));
    let resp = send(h.router(), req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ok"], true);
    assert!(body["pid"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn logs_then_clear_logs_empties_buffer() {
    let h = harness();
    create(&h, "t1", "sh -c 'echo hello; sleep 60'").await;
    let req = json_request("POST", "/api/projects/start", json!({ "id": "t1" }));
    send(h.router(), req).await;

    // Give the process a moment to write to stdout before reading logs.
    tokio::time::sleep(std::time::Duration::from_millis(150)).await;

    let resp = send(h.router(), plain_request("GET", "/api/projects/logs/t1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["stdout"].is_array());

    let resp = send(h.router(), plain_request("DELETE", "/api/projects/logs/t1")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(h.router(), plain_request("GET", "/api/projects/logs/t1")).await;
    let body = body_json(resp).await;
    assert!(body["stdout"].as_array().unwrap().is_empty());
    assert!(body["stderr"].as_array().unwrap().is_empty());
}
