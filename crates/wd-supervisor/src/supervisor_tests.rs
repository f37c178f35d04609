// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;
use tempfile::TempDir;
use wd_core::{Category, SystemClock};

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
        auto_restart: false,
        max_restarts: 0,
        restart_interval: 1,
        restart_count: 0,
        manual_stopped: false,
        was_running_before_shutdown: false,
        last_started: None,
        created_date: now,
        updated_date: now,
        scheduled_start: None,
        scheduled_stop: None,
    }
}

fn setup() -> (TempDir, Arc<TaskStore>, Supervisor) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(TaskStore::open(dir.path()).unwrap());
    let registry = Arc::new(ProcessRegistry::new());
    let launcher = ShellLauncher::new(false);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let supervisor = Supervisor::new(store.clone(), registry, launcher, clock, dir.path().to_path_buf());
    (dir, store, supervisor)
}

#[tokio::test]
async fn happy_start_then_stop() {
    let (_dir, store, supervisor) = setup();
    store.create(bare_task("t1", "sleep 60")).unwrap();

    let outcome = supervisor
        .start("t1", None, None, None, Some(200))
        .await
        .unwrap();
    let pid = match outcome {
        StartOutcome::Success { pid } => pid,
        other => panic!("expected success, got {other:?}"),
    };
    assert!(pid > 0);

    let (running, status, status_pid) = supervisor.status("t1");
    assert!(running);
    assert_eq!(status, "running");
    assert_eq!(status_pid, Some(pid));

    let stopped = supervisor.stop("t1", None, None, None).await.unwrap();
    assert_eq!(stopped, StopOutcome::Success { message: None });

    let (running, status, pid) = supervisor.status("t1");
    assert!(!running);
    assert_eq!(status, "stopped");
    assert_eq!(pid, None);

    let task = store.get("t1").unwrap();
    assert!(task.manual_stopped);
}

#[tokio::test]
async fn immediate_failure_surfaces_logs() {
    let (_dir, store, supervisor) = setup();
    store
        .create(bare_task("t2", "sh -c 'echo boom 1>&2; exit 2'"))
        .unwrap();

    let outcome = supervisor
        .start("t2", None, None, None, Some(500))
        .await
        .unwrap();

    match outcome {
        StartOutcome::Failure { code, stderr, .. } => {
            assert_eq!(code, Some(2));
            assert!(stderr.iter().any(|l| l.contains("boom")), "stderr: {stderr:?}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn restart_reuses_previous_command_when_absent() {
    let (_dir, store, supervisor) = setup();
    store.create(bare_task("t3", "sleep 60")).unwrap();

    let first = supervisor.start("t3", None, None, None, Some(200)).await.unwrap();
    let first_pid = match first {
        StartOutcome::Success { pid } => pid,
        other => panic!("expected success, got {other:?}"),
    };

    let second = supervisor
        .restart("t3", None, None, None, None, Some(200))
        .await
        .unwrap();
    let second_pid = match second {
        StartOutcome::Success { pid } => pid,
        other => panic!("expected success, got {other:?}"),
    };

    assert_ne!(first_pid, second_pid);
}

#[tokio::test]
async fn start_requires_a_command_when_task_is_unknown() {
    let (_dir, _store, supervisor) = setup();
    let err = supervisor.start("missing", None, None, None, None).await.unwrap_err();
    assert!(matches!(err, SupervisorError::Validation(_)));
}

#[tokio::test]
async fn shutdown_all_terminates_every_running_entry() {
    let (_dir, store, supervisor) = setup();
    store.create(bare_task("t7", "sleep 60")).unwrap();
    store.create(bare_task("t8", "sleep 60")).unwrap();

    supervisor.start("t7", None, None, None, Some(100)).await.unwrap();
    supervisor.start("t8", None, None, None, Some(100)).await.unwrap();
    assert!(supervisor.status("t7").0);
    assert!(supervisor.status("t8").0);

    supervisor.shutdown_all().await;

    assert!(!supervisor.status("t7").0);
    assert!(!supervisor.status("t8").0);
}

#[tokio::test]
async fn stop_with_no_live_entry_and_no_stop_command_reports_not_running() {
    let (_dir, store, supervisor) = setup();
    store.create(bare_task("t4", "sleep 60")).unwrap();

    let outcome = supervisor.stop("t4", None, None, None).await.unwrap();
    assert_eq!(
        outcome,
        StopOutcome::Success {
            message: Some("not running".to_string())
        }
    );
}
