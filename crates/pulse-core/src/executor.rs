// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The capability for scheduling work onto the managed runtime's thread.
//!
//! The managed runtime is a single-threaded cooperative execution context.
//! The sampler never blocks on it; all interaction goes through
//! fire-and-forget task submission via a [`RuntimeExecutor`] supplied by
//! the host binding layer at startup.

use std::fmt;
use std::sync::Arc;

/// A unit of work submitted for execution on the managed runtime's thread.
pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// A cloneable handle capable of scheduling a [`ScheduledTask`] onto the
/// managed runtime's thread.
///
/// Submission is fire-and-forget: `schedule` enqueues the task and returns
/// immediately, it never waits for the task to run. The wrapped scheduling
/// function is provided by the host and must itself be non-blocking.
#[derive(Clone)]
pub struct RuntimeExecutor {
    schedule_fn: Arc<dyn Fn(ScheduledTask) + Send + Sync>,
}

impl RuntimeExecutor {
    /// Wraps a host-provided scheduling function into an executor handle.
    pub fn new<F>(schedule_fn: F) -> Self
    where
        F: Fn(ScheduledTask) + Send + Sync + 'static,
    {
        Self {
            schedule_fn: Arc::new(schedule_fn),
        }
    }

    /// Submits a task for execution on the managed runtime's thread.
    ///
    /// Returns as soon as the task is handed to the host's scheduler.
    pub fn schedule(&self, task: ScheduledTask) {
        (self.schedule_fn)(task);
    }
}

impl fmt::Debug for RuntimeExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeExecutor").finish_non_exhaustive()
    }
}
