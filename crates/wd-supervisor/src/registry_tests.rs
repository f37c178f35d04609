// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

fn entry(pid: u32, status: Status) -> LiveEntry {
    LiveEntry {
        pid,
        status,
        command: "sleep 60".to_string(),
        working_directory: PathBuf::from("/tmp"),
        environment: HashMap::new(),
        started_at: SystemTime::now(),
        last_exit: None,
        logs: Arc::new(Mutex::new(LogBuffer::new())),
    }
}

#[test]
fn unknown_id_reports_not_running_with_no_pid() {
    let registry = ProcessRegistry::new();
    let id = TaskId::new("missing");
    assert_eq!(registry.status(&id), (false, Status::Stopped, None));
    assert!(registry.logs(&id).0.is_empty());
}

#[test]
fn insert_then_mark_stopped_flips_status_and_keeps_entry() {
    let registry = ProcessRegistry::new();
    let id = TaskId::new("t1");
    registry.insert(id.clone(), entry(123, Status::Running));
    assert!(registry.is_running(&id));

    registry.mark_stopped(
        &id,
        ExitInfo {
            code: Some(1),
            signal: None,
        },
    );
    assert!(!registry.is_running(&id));
    let (running, status, pid) = registry.status(&id);
    assert!(!running);
    assert_eq!(status, Status::Stopped);
    assert_eq!(pid, Some(123));
}

#[test]
fn task_lock_returns_the_same_handle_for_repeated_calls() {
    let registry = ProcessRegistry::new();
    let id = TaskId::new("t1");
    let a = registry.task_lock(&id);
    let b = registry.task_lock(&id);
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn current_invocation_reflects_the_live_entry() {
    let registry = ProcessRegistry::new();
    let id = TaskId::new("t1");
    registry.insert(id.clone(), entry(1, Status::Running));
    let (command, cwd, _env) = registry.current_invocation(&id).unwrap();
    assert_eq!(command, "sleep 60");
    assert_eq!(cwd, PathBuf::from("/tmp"));
}

#[test]
fn clear_logs_empties_without_removing_the_entry() {
    let registry = ProcessRegistry::new();
    let id = TaskId::new("t1");
    let live = entry(1, Status::Running);
    live.logs.lock().stdout.push("hello".to_string());
    registry.insert(id.clone(), live);

    registry.clear_logs(&id);
    assert_eq!(registry.logs(&id), (Vec::new(), Vec::new()));
    assert!(registry.is_running(&id));
}
