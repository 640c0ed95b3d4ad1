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

//! The pacing loop: requests one tick submission per wake at a fixed
//! cadence derived from the device's maximum sample rate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pulse_core::RuntimeExecutor;

use crate::tick::{make_tick_task, TickState};

/// A dedicated thread that wakes at the pacing interval and submits at
/// most one outstanding tick task to the managed runtime.
///
/// Wake times are absolute: each deadline is the previous deadline plus
/// the interval, never "now" plus the interval, so scheduling jitter does
/// not accumulate into drift over the life of the loop.
#[derive(Debug)]
pub struct PacingLoop {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PacingLoop {
    /// Spawns the pacing thread.
    ///
    /// `running` is shared with the owning engine; the loop exits promptly
    /// after it is cleared, within one pacing interval.
    pub fn spawn(
        executor: RuntimeExecutor,
        state: Arc<TickState>,
        running: Arc<AtomicBool>,
        interval: Duration,
    ) -> Self {
        let loop_running = Arc::clone(&running);
        let handle = thread::spawn(move || {
            log::info!(
                "Pacing loop started ({:.2} ms interval)",
                interval.as_secs_f64() * 1000.0
            );

            let mut next_wake = Instant::now() + interval;
            while loop_running.load(Ordering::Relaxed) {
                let now = Instant::now();
                if next_wake > now {
                    thread::sleep(next_wake - now);
                }
                next_wake += interval;

                if !loop_running.load(Ordering::Relaxed) {
                    break;
                }

                if !state.try_begin_submission() {
                    log::trace!("Previous tick submission still in flight, skipping wake");
                    continue;
                }
                executor.schedule(make_tick_task(Arc::downgrade(&state)));
            }

            log::info!("Pacing loop stopped.");
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    /// Stops the loop and waits for the thread to exit.
    ///
    /// When called from the loop's own thread the handle is dropped
    /// instead of joined; a self-join would deadlock.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                drop(handle);
            } else {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for PacingLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
