// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Router assembly for the JSON REST control plane. No authentication;
//! CORS is permissive.

use crate::state::AppState;
use crate::{handlers_control, handlers_discovery, handlers_projects};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers_control::health))
        .route(
            "/api/projects",
            get(handlers_projects::list).post(handlers_projects::create),
        )
        .route("/api/projects/dedupe", post(handlers_projects::dedupe))
        .route("/api/projects/start", post(handlers_control::start))
        .route("/api/projects/stop", post(handlers_control::stop))
        .route("/api/projects/restart", post(handlers_control::restart))
        .route("/api/projects/status/:id", get(handlers_control::status))
        .route(
            "/api/projects/logs/:id",
            get(handlers_control::logs).delete(handlers_control::clear_logs),
        )
        .route(
            "/api/projects/:id",
            put(handlers_projects::update).delete(handlers_projects::delete),
        )
        .route("/api/processes/search", get(handlers_discovery::search))
        .route("/api/processes/by-port/:port", get(handlers_discovery::by_port))
        .route("/api/processes/kill", post(handlers_discovery::kill_process))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
