// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::process_list::full_command_line;
use crate::PortMatch;
use sysinfo::System;

/// List processes holding `port` locally over TCP or UDP.
///
/// On Linux this walks `/proc/net/{tcp,udp}` for the listening-socket
/// inode, then `/proc/*/fd` to map that inode back to a pid — the
/// standard userspace technique (what `netstat`/`ss` and `lsof` do
/// internally) since no single syscall returns this cross-platform.
/// Non-Linux targets return no matches, satisfying the interface
/// contract without shelling out to an OS-specific listing tool.
pub fn list_by_port(system: &System, port: u16) -> Vec<PortMatch> {
    #[cfg(target_os = "linux")]
    {
        linux::list_by_port(system, port)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (system, port);
        Vec::new()
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    pub fn list_by_port(system: &System, port: u16) -> Vec<PortMatch> {
        let mut inodes = HashSet::new();
        inodes.extend(listening_inodes("/proc/net/tcp", port));
        inodes.extend(listening_inodes("/proc/net/tcp6", port));
        inodes.extend(listening_inodes("/proc/net/udp", port));
        inodes.extend(listening_inodes("/proc/net/udp6", port));

        if inodes.is_empty() {
            return Vec::new();
        }

        let mut matches = Vec::new();
        let Ok(entries) = fs::read_dir("/proc") else {
            return matches;
        };

        for entry in entries.flatten() {
            let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok())
            else {
                continue;
            };
            if !pid_owns_any_inode(pid, &inodes) {
                continue;
            }
            let command = system
                .process(sysinfo::Pid::from_u32(pid))
                .map(full_command_line)
                .unwrap_or_default();
            let name = system
                .process(sysinfo::Pid::from_u32(pid))
                .map(|p| p.name().to_string_lossy().to_string());
            matches.push(PortMatch {
                pid,
                command,
                name,
            });
        }

        matches
    }

    /// Parse a `/proc/net/{tcp,udp}[6]` table, returning the socket
    /// inode of every entry whose local port matches and whose state is
    /// listening (`0A`) for TCP, or any state for UDP (connectionless).
    fn listening_inodes(path: &str, port: u16) -> Vec<u64> {
        let Ok(contents) = fs::read_to_string(path) else {
            return Vec::new();
        };
        let is_tcp = path.contains("tcp");

        contents
            .lines()
            .skip(1) // header
            .filter_map(|line| {
                let fields: Vec<&str> = line.split_whitespace().collect();
                let local = fields.first()?;
                let state = fields.get(3)?;
                let inode = fields.get(9)?;

                let local_port = local.split(':').nth(1)?;
                let parsed_port = u16::from_str_radix(local_port, 16).ok()?;
                if parsed_port != port {
                    return None;
                }
                if is_tcp && *state != "0A" {
                    return None;
                }
                inode.parse::<u64>().ok()
            })
            .collect()
    }

    fn pid_owns_any_inode(pid: u32, inodes: &HashSet<u64>) -> bool {
        let fd_dir = format!("/proc/{pid}/fd");
        let Ok(entries) = fs::read_dir(&fd_dir) else {
            return false;
        };
        for entry in entries.flatten() {
            let Ok(target) = fs::read_link(entry.path()) else {
                continue;
            };
            let Some(target) = target.to_str() else {
                continue;
            };
            if let Some(inode_str) = target
                .strip_prefix("socket:[")
                .and_then(|s| s.strip_suffix(']'))
            {
                if let Ok(inode) = inode_str.parse::<u64>() {
                    if inodes.contains(&inode) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod tests;
