// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::ProcessRegistry;
use crate::supervisor::Supervisor;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;
use wd_core::{Category, FakeClock};
use wd_shell::ShellLauncher;
use wd_store::TaskStore;

fn bare_task(id: &str, start_command: &str) -> Task {
    let now = chrono::Utc::now();
    Task {
        id: TaskId::new(id),
        name: String::new(),
        description: String::new(),
        group: String::new(),
        category: Category::Other,
        notes: String::new(),
        working_directory: None,
        start_command: start_command.to_string(),
        stop_command: None,
        port: None,
        environment_variables: HashMap::new(),
        auto_restart: true,
        max_restarts: 2,
        restart_interval: 1,
        restart_count: 0,
        manual_stopped: false,
        was_running_before_shutdown: true,
        last_started: None,
        created_date: now,
        updated_date: now,
        scheduled_start: None,
        scheduled_stop: None,
    }
}

fn setup() -> (TempDir, Arc<TaskStore>, FakeClock, Guardian) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(TaskStore::open(dir.path()).unwrap());
    let registry = Arc::new(ProcessRegistry::new());
    let launcher = ShellLauncher::new(false);
    let clock = FakeClock::new();
    let supervisor = Arc::new(Supervisor::new(
        store.clone(),
        registry,
        launcher,
        Arc::new(clock.clone()),
        dir.path().to_path_buf(),
    ));
    let guardian = Guardian::new(supervisor, Arc::new(clock.clone()));
    (dir, store, clock, guardian)
}

#[tokio::test]
async fn guardian_respects_manual_stop() {
    let (_dir, store, _clock, guardian) = setup();
    let mut task = bare_task("t3", "false");
    task.manual_stopped = true;
    store.create(task).unwrap();

    guardian.tick().await;

    let after = store.get("t3").unwrap();
    assert_eq!(after.restart_count, 0);
    assert!(after.manual_stopped);
}

#[tokio::test]
async fn guardian_caps_after_two_failures_and_backs_off() {
    let (_dir, store, clock, guardian) = setup();
    store.create(bare_task("t4", "false")).unwrap();

    guardian.tick().await;
    let after_first = store.get("t4").unwrap();
    assert_eq!(after_first.restart_count, 1);

    // Backoff: a tick before the interval elapses makes no further attempt.
    guardian.tick().await;
    let still_one = store.get("t4").unwrap();
    assert_eq!(still_one.restart_count, 1);

    clock.advance(Duration::from_secs(1));
    guardian.tick().await;
    let after_second = store.get("t4").unwrap();
    assert_eq!(after_second.restart_count, 2);

    // Cap reached: further ticks, even after more time, attempt nothing.
    clock.advance(Duration::from_secs(5));
    guardian.tick().await;
    let after_cap = store.get("t4").unwrap();
    assert_eq!(after_cap.restart_count, 2);
}

#[tokio::test]
async fn guardian_ignores_tasks_with_auto_restart_disabled() {
    let (_dir, store, _clock, guardian) = setup();
    let mut task = bare_task("t5", "false");
    task.auto_restart = false;
    store.create(task).unwrap();

    guardian.tick().await;

    let after = store.get("t5").unwrap();
    assert_eq!(after.restart_count, 0);
}

#[tokio::test]
async fn guardian_skips_tasks_never_running_before_shutdown() {
    let (_dir, store, _clock, guardian) = setup();
    let mut task = bare_task("t6", "false");
    task.was_running_before_shutdown = false;
    store.create(task).unwrap();

    guardian.tick().await;

    let after = store.get("t6").unwrap();
    assert_eq!(after.restart_count, 0);
}
