// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Instant;
use wd_store::TaskStore;
use wd_supervisor::{Guardian, Supervisor};

/// Process-wide dependencies, passed into handlers explicitly rather
/// than reached for via ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TaskStore>,
    pub supervisor: Arc<Supervisor>,
    pub guardian: Arc<Guardian>,
    pub start_time: Instant,
}
