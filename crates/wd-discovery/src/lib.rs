// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wd-discovery: generic OS process discovery and signal delivery.
//!
//! Implemented on `sysinfo` for the cross-platform process-listing
//! primitive, the same crate the wider example pack reaches for to
//! enumerate OS processes for a management UI.

mod error;
mod kill;
mod ports;
mod process_list;

pub use error::DiscoveryError;

use serde::Serialize;
use sysinfo::System;

/// A process matched by name or holding a port.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProcessMatch {
    pub pid: u32,
    pub command: String,
}

/// A process holding a TCP/UDP port locally.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PortMatch {
    pub pid: u32,
    pub command: String,
    pub name: Option<String>,
}

/// List all OS processes whose command line contains `substring`,
/// case-insensitively.
pub fn search_by_name(substring: &str) -> Vec<ProcessMatch> {
    let mut system = System::new_all();
    system.refresh_all();
    process_list::search_by_name(&system, substring)
}

/// List processes holding `port` locally over TCP or UDP.
pub fn list_by_port(port: u16) -> Vec<PortMatch> {
    let mut system = System::new_all();
    system.refresh_all();
    ports::list_by_port(&system, port)
}

/// Deliver `signal` (default `SIGTERM`) to `pid` and its transitive
/// descendants. Succeeds only when the OS-level call reports no error
/// for every targeted pid.
pub fn kill(pid: u32, signal: Option<&str>) -> Result<(), DiscoveryError> {
    let mut system = System::new_all();
    system.refresh_all();
    kill::kill_tree(&system, pid, signal.unwrap_or("SIGTERM"))
}
