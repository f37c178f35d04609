// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::ProcessMatch;
use sysinfo::System;

/// Match every process whose full command line (binary + args) contains
/// `substring`, case-insensitively.
pub fn search_by_name(system: &System, substring: &str) -> Vec<ProcessMatch> {
    let needle = substring.to_ascii_lowercase();
    let mut matches = Vec::new();

    for (pid, process) in system.processes() {
        let command = full_command_line(process);
        if command.to_ascii_lowercase().contains(&needle) {
            matches.push(ProcessMatch {
                pid: pid.as_u32(),
                command,
            });
        }
    }

    matches
}

pub(crate) fn full_command_line(process: &sysinfo::Process) -> String {
    let cmd = process.cmd();
    if cmd.is_empty() {
        process.name().to_string_lossy().to_string()
    } else {
        cmd.iter()
            .map(|s| s.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
#[path = "process_list_tests.rs"]
mod tests;
