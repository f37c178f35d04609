// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon binary.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve the server's base run directory: `WARDEN_STATE_DIR` env var,
/// else the packaged binary's own directory, else the process's current
/// working directory.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("WARDEN_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            return parent.to_path_buf();
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Preferred listening port; `PORT` env var, default 3001.
pub fn preferred_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001)
}

/// Number of adjacent ports to try after `preferred_port()` on `EADDRINUSE`.
pub const PORT_SEARCH_WIDTH: u16 = 9;

/// Guardian tick interval override, for integration tests that cannot
/// afford to wait 5 real seconds per tick.
pub fn guardian_tick() -> Duration {
    std::env::var("WARDEN_GUARDIAN_TICK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(wd_supervisor::DEFAULT_TICK)
}

/// Whether the Unix shell launcher should omit the interactive flag,
/// for environments where dotfile banners would pollute captured logs.
pub fn noninteractive_shell() -> bool {
    std::env::var("WARDEN_NONINTERACTIVE_SHELL")
        .map(|v| v == "1")
        .unwrap_or(false)
}

/// Path to the daemon's rotating log file, under `state_dir()` unless
/// `WARDEN_LOG_PATH` overrides it.
pub fn log_path() -> PathBuf {
    if let Ok(path) = std::env::var("WARDEN_LOG_PATH") {
        return PathBuf::from(path);
    }
    state_dir().join("wardend.log")
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
