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

//! Tick state shared between the pacing loop, the reporting loop, and the
//! tick task running on the managed runtime's thread.
//!
//! All coordination is through atomics. The managed-runtime thread must
//! never block on a lock held by a background thread, and the tick task
//! itself must run in bounded, small time: one timestamp store, one
//! counter increment, one flag clear.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Weak;
use std::time::Instant;

use pulse_core::ScheduledTask;

/// Shared state for one engine instance's tick accounting.
///
/// `pending` is incremented only by the tick task on the managed-runtime
/// thread and drained only by the reporting loop, so the two never contend
/// for exclusive mutation. `in_flight` is the sole admission-control
/// mechanism: a single compare-exchange guarantees at most one outstanding
/// submission, bounding memory when the runtime is slow or stalled.
#[derive(Debug)]
pub struct TickState {
    /// Monotonic origin for `last_tick_us`.
    epoch: Instant,
    /// Ticks recorded since the last drain.
    pending: AtomicU32,
    /// Time of the most recent tick, in microseconds since `epoch`.
    last_tick_us: AtomicU64,
    /// Whether any tick has ever been recorded.
    ever_ticked: AtomicBool,
    /// Whether a submitted tick task has not yet executed.
    in_flight: AtomicBool,
    /// Cleared on engine stop; queued tick tasks then become no-ops.
    active: AtomicBool,
}

impl TickState {
    /// Creates a fresh, active tick state with no recorded ticks.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            pending: AtomicU32::new(0),
            last_tick_us: AtomicU64::new(0),
            ever_ticked: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            active: AtomicBool::new(true),
        }
    }

    /// Records one tick. Runs on the managed runtime's thread.
    ///
    /// If the engine has been stopped, only the in-flight flag is cleared:
    /// submissions queued before the stop must not touch the counters.
    pub fn run_tick(&self) {
        if !self.active.load(Ordering::Acquire) {
            self.in_flight.store(false, Ordering::Release);
            return;
        }
        self.last_tick_us
            .store(self.micros_now(), Ordering::Release);
        self.ever_ticked.store(true, Ordering::Release);
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.in_flight.store(false, Ordering::Release);
    }

    /// Attempts to claim the single in-flight submission slot.
    ///
    /// Returns `true` if the caller may submit a tick task; `false` if a
    /// previous submission is still outstanding and this wake should be
    /// skipped.
    pub fn try_begin_submission(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Atomically reads and resets the pending tick count.
    ///
    /// Contract: called only by the reporting loop.
    pub fn drain(&self) -> u32 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    /// Returns the time of the most recent tick in microseconds since the
    /// state's epoch, or `None` if no tick has ever been recorded.
    pub fn last_tick_micros(&self) -> Option<u64> {
        if self.ever_ticked.load(Ordering::Acquire) {
            Some(self.last_tick_us.load(Ordering::Acquire))
        } else {
            None
        }
    }

    /// Current time in microseconds since the state's epoch.
    pub fn micros_now(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }

    /// Marks the state as stopped. Tick tasks already queued on the
    /// managed runtime become no-ops that only release the in-flight slot.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Default for TickState {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the task submitted to the managed runtime for one tick.
///
/// The task carries only a weak back-reference to the tick state: a queued
/// task never extends the engine's lifetime, and a task that outlives its
/// engine simply does nothing when the upgrade fails.
pub fn make_tick_task(state: Weak<TickState>) -> ScheduledTask {
    Box::new(move || {
        if let Some(state) = state.upgrade() {
            state.run_tick();
        }
    })
}
