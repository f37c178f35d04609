// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to spawn command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to signal process: {0}")]
    SignalFailed(String),
}
