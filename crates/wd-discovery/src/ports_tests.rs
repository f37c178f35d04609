// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
#[cfg(target_os = "linux")]
async fn finds_listening_process_on_a_bound_port() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    // Keep the listener alive for the duration of the lookup.
    let _guard = listener;

    let mut system = System::new_all();
    system.refresh_all();
    let matches = list_by_port(&system, port);

    assert!(matches.iter().any(|m| m.pid == std::process::id()));
}

#[test]
fn unused_high_port_has_no_matches() {
    let mut system = System::new_all();
    system.refresh_all();
    let matches = list_by_port(&system, 1);
    assert!(matches.is_empty());
}
