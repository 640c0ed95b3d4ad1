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

//! The shared result cell holding the most recently published rate.
//!
//! The cell is exactly one signed 32-bit integer. The reporting loop is
//! the sole writer; arbitrarily many consumer threads may poll it at any
//! time. Aligned atomic access makes torn reads impossible, and there is
//! no lock to contend on for either side.

use std::sync::atomic::{AtomicI32, Ordering};

/// A lock-free, single-writer, many-reader cell holding the last published
/// rate.
///
/// Zero-initialized: consumers polling before the first reporting window
/// has elapsed observe `0`, meaning "no measurement yet".
#[derive(Debug, Default)]
pub struct RateCell {
    value: AtomicI32,
}

impl RateCell {
    /// Creates a new cell holding `0`.
    pub fn new() -> Self {
        Self {
            value: AtomicI32::new(0),
        }
    }

    /// Reads the most recently published rate. Callable from any thread.
    pub fn read(&self) -> i32 {
        self.value.load(Ordering::Relaxed)
    }

    /// Publishes a new rate.
    ///
    /// Contract: called only by the engine's reporting loop. The cell has
    /// exactly one writer for the lifetime of the owning engine instance.
    pub fn publish(&self, rate: i32) {
        self.value.store(rate, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn cell_starts_at_zero() {
        let cell = RateCell::new();
        assert_eq!(cell.read(), 0, "A fresh cell should read 0");
    }

    #[test]
    fn publish_is_visible_to_readers() {
        let cell = RateCell::new();
        cell.publish(60);
        assert_eq!(cell.read(), 60);
        cell.publish(0);
        assert_eq!(cell.read(), 0);
    }

    #[test]
    fn readers_on_other_threads_observe_published_values() {
        let cell = Arc::new(RateCell::new());
        cell.publish(42);

        let reader = Arc::clone(&cell);
        let observed = thread::spawn(move || reader.read())
            .join()
            .expect("Reader thread should not panic");

        assert_eq!(observed, 42);
    }
}
