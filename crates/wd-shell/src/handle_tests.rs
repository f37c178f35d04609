// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_signal_accepts_bare_and_sig_prefixed_names() {
    assert!(parse_signal("TERM").is_ok());
    assert!(parse_signal("SIGTERM").is_ok());
    assert!(parse_signal("kill").is_ok());
    assert!(parse_signal("sigkill").is_ok());
}

#[test]
fn parse_signal_rejects_unknown_names() {
    assert!(parse_signal("NOT_A_SIGNAL").is_err());
}
