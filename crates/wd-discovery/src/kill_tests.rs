// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::process::Command as StdCommand;
use std::time::Duration;

#[test]
fn kill_tree_terminates_a_real_child() {
    let mut child = StdCommand::new("sleep").arg("30").spawn().unwrap();
    let pid = child.id();

    let mut system = System::new_all();
    system.refresh_all();
    kill_tree(&system, pid, "SIGTERM").unwrap();

    std::thread::sleep(Duration::from_millis(200));
    let status = child.try_wait().unwrap();
    assert!(status.is_some(), "child should have exited after SIGTERM");
}

#[test]
fn kill_tree_rejects_unknown_pid() {
    let mut system = System::new_all();
    system.refresh_all();
    // pid 1 belongs to init/systemd in virtually every environment this
    // test runs in, but it is never the just-spawned child under test;
    // use an implausibly large pid instead to stay robust.
    let err = kill_tree(&system, u32::MAX - 1, "SIGTERM").unwrap_err();
    assert!(matches!(err, DiscoveryError::InvalidPid(_)));
}
