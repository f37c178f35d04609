// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid pid: {0}")]
    InvalidPid(u32),

    #[error("unknown signal: {0}")]
    UnknownSignal(String),

    #[error("signal delivery failed for pid {pid}: {source}")]
    SignalFailed { pid: u32, source: String },
}
