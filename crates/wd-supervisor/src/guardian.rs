// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic auto-restart loop. Ticks every 5 s by default,
//! overridable via `WARDEN_GUARDIAN_TICK_MS` at the daemon layer for
//! faster integration tests.

use crate::supervisor::{StartOutcome, Supervisor};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wd_core::{Clock, Task, TaskId};

pub const DEFAULT_TICK: Duration = Duration::from_secs(5);

/// Owns no ambient globals: holds an `Arc<Supervisor>` (which itself
/// holds the store and registry) and a clock, passed in at
/// construction.
pub struct Guardian {
    supervisor: Arc<Supervisor>,
    clock: Arc<dyn Clock>,
    next_attempt: Mutex<HashMap<TaskId, Instant>>,
}

impl Guardian {
    pub fn new(supervisor: Arc<Supervisor>, clock: Arc<dyn Clock>) -> Self {
        Self {
            supervisor,
            clock,
            next_attempt: Mutex::new(HashMap::new()),
        }
    }

    /// Run forever, ticking every `interval`. Intended to be
    /// `tokio::spawn`ed once by the daemon at startup.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        loop {
            tokio::time::sleep(interval).await;
            self.tick().await;
        }
    }

    /// One guardian tick: evaluate every stored task and attempt a
    /// restart for each currently eligible one.
    pub async fn tick(&self) {
        for task in self.supervisor.store().list() {
            if self.eligible(&task) {
                self.attempt(task).await;
            }
        }
    }

    /// Drop any pending backoff state for `id`. Called whenever a user
    /// action (start/stop/restart) touches the task, since any manual
    /// action should clear guardian state for that id.
    pub fn clear_state(&self, id: &TaskId) {
        self.next_attempt.lock().remove(id);
    }

    fn eligible(&self, task: &Task) -> bool {
        task.auto_restart
            && !task.manual_stopped
            && task.was_running_before_shutdown
            && !self.supervisor.registry().is_running(&task.id)
            && (task.max_restarts == 0 || task.restart_count < task.max_restarts)
            && self.attempt_time_reached(&task.id)
    }

    fn attempt_time_reached(&self, id: &TaskId) -> bool {
        match self.next_attempt.lock().get(id) {
            Some(deadline) => self.clock.now() >= *deadline,
            None => true,
        }
    }

    async fn attempt(&self, task: Task) {
        let outcome = self.supervisor.start_for_guardian(&task).await;

        match outcome {
            Ok(StartOutcome::Success { .. }) => {
                let now = self.clock.system_now().into();
                let _ = self.supervisor.store().guardian_update(task.id.as_str(), |t| {
                    t.restart_count = 0;
                    t.manual_stopped = false;
                    t.was_running_before_shutdown = true;
                    t.last_started = Some(now);
                });
                self.next_attempt.lock().remove(&task.id);
            }
            _ => {
                let new_count = task.restart_count + 1;
                let interval_secs = task.restart_interval.max(1) as u64;
                let next_time = self.clock.now() + Duration::from_secs(interval_secs);

                let _ = self
                    .supervisor
                    .store()
                    .guardian_update(task.id.as_str(), |t| t.restart_count = new_count);

                let capped = task.max_restarts > 0 && new_count >= task.max_restarts;
                if capped {
                    tracing::info!(task_id = %task.id, new_count, "guardian restart cap reached, no further attempts");
                    self.next_attempt.lock().remove(&task.id);
                } else {
                    self.next_attempt.lock().insert(task.id.clone(), next_time);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "guardian_tests.rs"]
mod tests;
