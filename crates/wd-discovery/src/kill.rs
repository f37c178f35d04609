// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::DiscoveryError;
use std::collections::HashMap;
use sysinfo::{Pid, System};

/// Deliver `signal` to `pid` and every transitive descendant, descendants
/// first (leaves before the root), since a parent exiting can orphan or
/// reparent children before they are individually signaled.
pub fn kill_tree(system: &System, pid: u32, signal: &str) -> Result<(), DiscoveryError> {
    let sig = parse_signal(signal)?;
    let targets = descendants_then_self(system, pid);

    if targets.is_empty() {
        return Err(DiscoveryError::InvalidPid(pid));
    }

    for target in targets {
        signal_pid(target, sig).map_err(|source| DiscoveryError::SignalFailed {
            pid: target,
            source,
        })?;
    }
    Ok(())
}

/// Build the signal order: every descendant of `pid` (deepest first),
/// followed by `pid` itself.
fn descendants_then_self(system: &System, pid: u32) -> Vec<u32> {
    let mut children_of: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut known = false;

    for (candidate_pid, process) in system.processes() {
        if candidate_pid.as_u32() == pid {
            known = true;
        }
        if let Some(parent) = process.parent() {
            children_of.entry(parent.as_u32()).or_default().push(candidate_pid.as_u32());
        }
    }

    if !known {
        return Vec::new();
    }

    let mut order = Vec::new();
    let mut stack = vec![pid];
    let mut descendants = Vec::new();
    while let Some(current) = stack.pop() {
        if let Some(children) = children_of.get(&current) {
            for &child in children {
                descendants.push(child);
                stack.push(child);
            }
        }
    }
    // Reverse so the most-recently-discovered (deepest) descendants come
    // first; the exact order beyond "descendants before pid" is not
    // load-bearing since each signal targets a distinct pid.
    descendants.reverse();
    order.extend(descendants);
    order.push(pid);
    order
}

#[cfg(unix)]
fn parse_signal(name: &str) -> Result<nix::sys::signal::Signal, DiscoveryError> {
    use nix::sys::signal::Signal;
    use std::str::FromStr;

    let upper = name.trim().to_ascii_uppercase();
    let normalized = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{upper}")
    };
    Signal::from_str(&normalized).map_err(|_| DiscoveryError::UnknownSignal(name.to_string()))
}

#[cfg(unix)]
fn signal_pid(pid: u32, signal: nix::sys::signal::Signal) -> Result<(), String> {
    use nix::sys::signal::kill;
    use nix::unistd::Pid as NixPid;

    kill(NixPid::from_raw(pid as i32), signal).map_err(|e| e.to_string())
}

#[cfg(windows)]
fn parse_signal(_name: &str) -> Result<(), DiscoveryError> {
    Ok(())
}

#[cfg(windows)]
fn signal_pid(pid: u32, _signal: ()) -> Result<(), String> {
    let status = std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .status()
        .map_err(|e| e.to_string())?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("taskkill exited with {status}"))
    }
}

#[cfg(test)]
#[path = "kill_tests.rs"]
mod tests;
