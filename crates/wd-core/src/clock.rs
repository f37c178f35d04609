// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so guardian backoff and startup-window tests never
//! depend on real wall-clock sleeps.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Monotonic instant, used for guardian backoff and startup-window deadlines.
    fn now(&self) -> Instant;

    /// Wall-clock time, used for `created_date`/`updated_date`/`last_started`.
    fn system_now(&self) -> SystemTime;
}

/// Real clock backed by the OS.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Deterministic clock for tests: advances only when told to.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

struct FakeClockState {
    monotonic: Instant,
    wall: SystemTime,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                monotonic: Instant::now(),
                wall: SystemTime::now(),
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock();
        state.monotonic += by;
        state.wall += by;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().monotonic
    }

    fn system_now(&self) -> SystemTime {
        self.inner.lock().wall
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
