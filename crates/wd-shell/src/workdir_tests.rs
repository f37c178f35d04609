// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

#[test]
fn none_falls_back_to_base() {
    let base = TempDir::new().unwrap();
    assert_eq!(resolve_working_dir(None, base.path()), base.path());
}

#[test]
fn nonexistent_path_falls_back_to_base() {
    let base = TempDir::new().unwrap();
    let resolved = resolve_working_dir(Some("/definitely/not/a/real/path"), base.path());
    assert_eq!(resolved, base.path());
}

#[test]
fn valid_absolute_directory_is_used_as_is() {
    let base = TempDir::new().unwrap();
    let sub = base.path().join("sub");
    std::fs::create_dir(&sub).unwrap();
    let resolved = resolve_working_dir(Some(sub.to_str().unwrap()), base.path());
    assert_eq!(resolved, sub);
}

#[test]
fn relative_directory_resolves_against_base() {
    let base = TempDir::new().unwrap();
    std::fs::create_dir(base.path().join("sub")).unwrap();
    let resolved = resolve_working_dir(Some("sub"), base.path());
    assert_eq!(resolved, base.path().join("sub"));
}

#[test]
fn blank_string_falls_back_to_base() {
    let base = TempDir::new().unwrap();
    assert_eq!(resolve_working_dir(Some("   "), base.path()), base.path());
}
