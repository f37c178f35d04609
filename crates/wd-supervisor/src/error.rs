// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;
use wd_shell::ShellError;
use wd_store::StoreError;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Shell(#[from] ShellError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
