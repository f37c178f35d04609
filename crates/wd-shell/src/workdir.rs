// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

/// Resolve a task's requested working directory against the server's
/// base run directory. An unset or non-directory path silently falls
/// back to `base_dir`.
pub fn resolve_working_dir(requested: Option<&str>, base_dir: &Path) -> PathBuf {
    match requested {
        Some(path) if !path.trim().is_empty() => {
            let candidate = PathBuf::from(path);
            let resolved = if candidate.is_absolute() {
                candidate
            } else {
                base_dir.join(candidate)
            };
            if resolved.is_dir() {
                resolved
            } else {
                base_dir.to_path_buf()
            }
        }
        _ => base_dir.to_path_buf(),
    }
}

#[cfg(test)]
#[path = "workdir_tests.rs"]
mod tests;
