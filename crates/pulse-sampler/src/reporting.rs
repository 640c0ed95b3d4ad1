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

//! The reporting loop: aggregates ticks into a rate once per window and
//! publishes it into the result cell.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pulse_core::{RateCell, Stopwatch};

use crate::tick::TickState;

/// Computes the rate to publish for one completed window.
///
/// A stalled runtime is forced to zero regardless of ticks counted
/// earlier in the window. Otherwise the per-second rate is rounded half
/// away from zero and clamped to `[0, max_rate]`; timer jitter must
/// never push the published value past the device ceiling.
pub(crate) fn compute_rate(ticks: u32, elapsed_ms: f64, stale: bool, max_rate: f64) -> i32 {
    if stale || elapsed_ms <= 0.0 {
        return 0;
    }
    let rate = ticks as f64 * 1000.0 / elapsed_ms;
    rate.round().clamp(0.0, max_rate) as i32
}

/// A dedicated thread that wakes once per reporting window, drains the
/// tick counter, applies the staleness and clamp rules, and publishes the
/// result.
#[derive(Debug)]
pub struct ReportingLoop {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ReportingLoop {
    /// Spawns the reporting thread.
    ///
    /// `window` is both the wake cadence and the staleness threshold:
    /// a runtime with no tick for a full window is considered stalled.
    pub fn spawn(
        state: Arc<TickState>,
        cell: Arc<RateCell>,
        running: Arc<AtomicBool>,
        window: Duration,
        max_rate: f64,
    ) -> Self {
        let loop_running = Arc::clone(&running);
        let handle = thread::spawn(move || {
            log::info!("Reporting loop started ({} ms window)", window.as_millis());

            let window_us = window.as_micros() as u64;
            let mut window_clock = Stopwatch::new();
            while loop_running.load(Ordering::Relaxed) {
                thread::sleep(window);
                if !loop_running.load(Ordering::Relaxed) {
                    break;
                }

                let elapsed_ms = window_clock.elapsed_secs_f64() * 1000.0;
                window_clock = Stopwatch::new();

                let ticks = state.drain();
                let stale = match state.last_tick_micros() {
                    None => true,
                    Some(last) => state.micros_now().saturating_sub(last) >= window_us,
                };

                let rate = compute_rate(ticks, elapsed_ms, stale, max_rate);
                cell.publish(rate);
                log::trace!("Published rate {rate} ({ticks} ticks over {elapsed_ms:.1} ms)");
            }

            log::info!("Reporting loop stopped.");
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    /// Stops the loop and waits for the thread to exit.
    ///
    /// Same discipline as the pacing loop: a stop issued from the loop's
    /// own thread detaches instead of self-joining.
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

impl Drop for ReportingLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
