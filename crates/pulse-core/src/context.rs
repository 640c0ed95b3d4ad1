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

//! The runtime context shared between the host binding layer and the
//! sampler engine.
//!
//! The host supplies two values at startup: the capability for scheduling
//! work on the managed runtime's thread and the device's maximum
//! sustainable sample rate. Both are written at most a few times and read
//! often, so the fields sit behind a single mutex and accessors hand out
//! cheap clones/copies. The context is explicitly constructed and injected
//! into the engine; there is no hidden process-wide global.

use std::sync::Mutex;
use std::time::Duration;

use crate::error::ContextError;
use crate::executor::RuntimeExecutor;

/// Device maximum sample rate assumed when the host never supplies one.
pub const DEFAULT_MAX_SAMPLE_RATE_HZ: f64 = 60.0;

#[derive(Debug)]
struct ContextFields {
    executor: Option<RuntimeExecutor>,
    max_sample_rate_hz: f64,
}

/// Holder for the managed runtime's scheduling capability and the device's
/// maximum sample rate.
///
/// Created once by the host, outlives all engine instances.
#[derive(Debug)]
pub struct RuntimeContext {
    fields: Mutex<ContextFields>,
}

impl RuntimeContext {
    /// Creates a context with no executor and the default sample rate.
    pub fn new() -> Self {
        Self {
            fields: Mutex::new(ContextFields {
                executor: None,
                max_sample_rate_hz: DEFAULT_MAX_SAMPLE_RATE_HZ,
            }),
        }
    }

    /// Stores the scheduling capability. Last write wins; repeated calls
    /// are tolerated.
    pub fn set_executor(&self, executor: RuntimeExecutor) {
        let mut fields = self.lock();
        if fields.executor.is_some() {
            log::debug!("Runtime executor replaced in context");
        }
        fields.executor = Some(executor);
    }

    /// Returns a handle to the scheduling capability.
    ///
    /// Fails with [`ContextError::ExecutorNotSet`] if the host has not
    /// supplied one yet.
    pub fn executor(&self) -> Result<RuntimeExecutor, ContextError> {
        self.lock()
            .executor
            .clone()
            .ok_or(ContextError::ExecutorNotSet)
    }

    /// Stores the device's maximum sample rate in Hz.
    ///
    /// Non-positive values are ignored and the previous value is kept.
    pub fn set_max_sample_rate(&self, rate_hz: f64) {
        if rate_hz <= 0.0 {
            log::warn!("Ignoring non-positive max sample rate: {rate_hz}");
            return;
        }
        self.lock().max_sample_rate_hz = rate_hz;
    }

    /// Returns the device's maximum sample rate in Hz.
    pub fn max_sample_rate(&self) -> f64 {
        self.lock().max_sample_rate_hz
    }

    /// Returns the pacing interval derived from the max sample rate
    /// (one second divided by the rate).
    pub fn pacing_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.max_sample_rate())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ContextFields> {
        // The only writers are the host's one-time setters; poisoning
        // would require a panic while holding the lock, which none of the
        // accessors can produce.
        match self.fields.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executor_is_absent_until_supplied() {
        let context = RuntimeContext::new();
        assert_eq!(
            context.executor().unwrap_err(),
            ContextError::ExecutorNotSet,
            "A fresh context should report the executor as unset"
        );

        context.set_executor(RuntimeExecutor::new(|_task| {}));
        assert!(context.executor().is_ok());
    }

    #[test]
    fn last_executor_write_wins() {
        let context = RuntimeContext::new();
        context.set_executor(RuntimeExecutor::new(|_task| {}));
        context.set_executor(RuntimeExecutor::new(|task| task()));
        assert!(context.executor().is_ok());
    }

    #[test]
    fn sample_rate_defaults_to_sixty() {
        let context = RuntimeContext::new();
        assert_eq!(context.max_sample_rate(), DEFAULT_MAX_SAMPLE_RATE_HZ);
    }

    #[test]
    fn non_positive_rates_are_ignored() {
        let context = RuntimeContext::new();
        context.set_max_sample_rate(120.0);
        context.set_max_sample_rate(0.0);
        context.set_max_sample_rate(-30.0);
        assert_eq!(
            context.max_sample_rate(),
            120.0,
            "Non-positive writes should keep the previous value"
        );
    }

    #[test]
    fn pacing_interval_is_the_rate_reciprocal() {
        let context = RuntimeContext::new();
        context.set_max_sample_rate(100.0);
        assert_eq!(context.pacing_interval(), Duration::from_millis(10));
    }
}
