// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wd-supervisor: the start/stop/restart state machine, the in-memory
//! process registry, and the guardian auto-restart loop. Depends on
//! `wd-core`, `wd-store`, `wd-shell`; never the reverse.

mod error;
mod guardian;
mod registry;
mod supervisor;

pub use error::SupervisorError;
pub use guardian::{Guardian, DEFAULT_TICK};
pub use registry::{LiveEntry, ProcessRegistry, Status};
pub use supervisor::{StartOutcome, StopOutcome, Supervisor, DEFAULT_STARTUP_TIMEOUT_MS};
