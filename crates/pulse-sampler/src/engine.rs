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

//! The engine owning both loops and the facade exposed to the host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulse_core::{ContextError, RateCell, RuntimeContext};

use crate::config::SamplerConfig;
use crate::pacing::PacingLoop;
use crate::reporting::ReportingLoop;
use crate::tick::TickState;

/// One activation of the sampler: owns the tick state, the result cell,
/// and the two loop threads.
///
/// Created lazily on first use, stopped and recreated any number of
/// times. Dropping the engine stops both loops; no threads outlive it.
#[derive(Debug)]
pub struct SamplerEngine {
    state: Arc<TickState>,
    cell: Arc<RateCell>,
    running: Arc<AtomicBool>,
    pacing: PacingLoop,
    reporting: ReportingLoop,
}

impl SamplerEngine {
    /// Starts a new engine bound to the given context.
    ///
    /// Reads the scheduling capability and device rate from the context
    /// once, at construction; later context writes affect only future
    /// engine instances.
    pub fn start(context: &RuntimeContext, config: &SamplerConfig) -> Result<Self, ContextError> {
        let executor = context.executor()?;
        let interval = context.pacing_interval();
        let max_rate = context.max_sample_rate();
        let window = Duration::from_millis(config.report_interval_ms);

        let state = Arc::new(TickState::new());
        let cell = Arc::new(RateCell::new());
        let running = Arc::new(AtomicBool::new(true));

        let pacing = PacingLoop::spawn(
            executor,
            Arc::clone(&state),
            Arc::clone(&running),
            interval,
        );
        let reporting = ReportingLoop::spawn(
            Arc::clone(&state),
            Arc::clone(&cell),
            Arc::clone(&running),
            window,
            max_rate,
        );

        log::info!(
            "Sampler engine started (max rate {max_rate} Hz, {} ms window)",
            config.report_interval_ms
        );
        Ok(Self {
            state,
            cell,
            running,
            pacing,
            reporting,
        })
    }

    /// Stops both loops and deactivates the tick state. Idempotent.
    ///
    /// Tick tasks still queued on the managed runtime after this call
    /// only release their submission slot; they no longer touch counters.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.state.deactivate();
        self.pacing.stop();
        self.reporting.stop();
        log::info!("Sampler engine stopped.");
    }

    /// The result cell this engine publishes into.
    pub fn rate_cell(&self) -> &Arc<RateCell> {
        &self.cell
    }
}

impl Drop for SamplerEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Host-facing facade over the engine lifecycle.
///
/// Holds the injected [`RuntimeContext`] and at most one live engine.
/// All entry points are safe to call at any time: activation before the
/// host has supplied the scheduling capability is deferred, not failed.
#[derive(Debug)]
pub struct RateSampler {
    context: Arc<RuntimeContext>,
    config: SamplerConfig,
    engine: Option<SamplerEngine>,
}

impl RateSampler {
    /// Creates an inactive sampler with the default configuration.
    pub fn new(context: Arc<RuntimeContext>) -> Self {
        Self::with_config(context, SamplerConfig::default())
    }

    /// Creates an inactive sampler with an explicit configuration.
    pub fn with_config(context: Arc<RuntimeContext>, config: SamplerConfig) -> Self {
        Self {
            context,
            config,
            engine: None,
        }
    }

    /// Starts measurement, replacing any previous engine instance.
    ///
    /// Stopping first guarantees repeated activation never leaves
    /// duplicate loops running.
    pub fn activate(&mut self) -> Result<(), ContextError> {
        self.deactivate();
        self.engine = Some(SamplerEngine::start(&self.context, &self.config)?);
        Ok(())
    }

    /// Stops measurement. Safe to call when nothing is active.
    pub fn deactivate(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
    }

    /// Whether an engine instance is currently running.
    pub fn is_active(&self) -> bool {
        self.engine.is_some()
    }

    /// Returns the current contents of the result cell.
    ///
    /// Lazily activates the engine on the first call and returns 0 for
    /// that call (no measurement has occurred yet). If the context has no
    /// executor the sampler stays inactive, returns 0, and retries
    /// activation on a later call: a persistent zero until the host
    /// supplies the capability.
    pub fn read_result(&mut self) -> i32 {
        match &self.engine {
            Some(engine) => engine.rate_cell().read(),
            None => {
                if let Err(e) = self.activate() {
                    log::debug!("Sampler activation deferred: {e}");
                }
                0
            }
        }
    }

    /// Returns a handle to the result cell, activating the engine first
    /// if needed.
    pub fn rate_cell(&mut self) -> Result<Arc<RateCell>, ContextError> {
        if self.engine.is_none() {
            self.activate()?;
        }
        self.engine
            .as_ref()
            .map(|engine| Arc::clone(engine.rate_cell()))
            .ok_or(ContextError::ExecutorNotSet)
    }
}

impl Drop for RateSampler {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{RuntimeExecutor, ScheduledTask};
    use std::thread;

    fn start_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// A managed-runtime stand-in: one thread draining a task queue, like
    /// a cooperative script runtime servicing its microtask queue.
    struct ScriptRuntime {
        tx: crossbeam_channel::Sender<ScheduledTask>,
        handle: Option<thread::JoinHandle<()>>,
    }

    impl ScriptRuntime {
        fn spawn() -> Self {
            let (tx, rx) = crossbeam_channel::unbounded::<ScheduledTask>();
            let handle = thread::spawn(move || {
                while let Ok(task) = rx.recv() {
                    task();
                }
            });
            Self {
                tx,
                handle: Some(handle),
            }
        }

        fn executor(&self) -> RuntimeExecutor {
            let tx = self.tx.clone();
            RuntimeExecutor::new(move |task| {
                let _ = tx.send(task);
            })
        }
    }

    impl Drop for ScriptRuntime {
        fn drop(&mut self) {
            // Executor clones held by a context may keep the channel open
            // past this drop, so detach the worker instead of joining; it
            // exits once the last sender goes away.
            if let Some(handle) = self.handle.take() {
                drop(handle);
            }
        }
    }

    fn fast_context(runtime: &ScriptRuntime) -> Arc<RuntimeContext> {
        let context = Arc::new(RuntimeContext::new());
        context.set_executor(runtime.executor());
        context.set_max_sample_rate(100.0);
        context
    }

    fn fast_config() -> SamplerConfig {
        SamplerConfig {
            report_interval_ms: 150,
        }
    }

    #[test]
    fn healthy_runtime_reports_a_positive_clamped_rate() {
        start_logger();
        let runtime = ScriptRuntime::spawn();
        let mut sampler = RateSampler::with_config(fast_context(&runtime), fast_config());

        assert_eq!(sampler.read_result(), 0, "First poll activates and reads 0");
        thread::sleep(Duration::from_millis(400));

        let rate = sampler.read_result();
        assert!(rate > 0, "A serviced runtime should report a positive rate");
        assert!(
            rate <= 100,
            "Published rate ({rate}) must not exceed the device ceiling"
        );
        sampler.deactivate();
    }

    #[test]
    fn stalled_runtime_reports_zero() {
        start_logger();
        // An executor that silently drops every task: the runtime never
        // executes a tick.
        let context = Arc::new(RuntimeContext::new());
        context.set_executor(RuntimeExecutor::new(|_task| {}));
        context.set_max_sample_rate(100.0);

        let mut sampler = RateSampler::with_config(context, fast_config());
        sampler.activate().expect("Executor is set");

        thread::sleep(Duration::from_millis(400));
        assert_eq!(
            sampler.read_result(),
            0,
            "A runtime that never ticks must be reported as stalled"
        );
        sampler.deactivate();
    }

    #[test]
    fn uninitialized_context_defers_activation() {
        start_logger();
        let context = Arc::new(RuntimeContext::new());
        let mut sampler = RateSampler::with_config(
            Arc::clone(&context),
            fast_config(),
        );

        assert_eq!(sampler.read_result(), 0);
        assert!(
            !sampler.is_active(),
            "No engine should exist while the executor is missing"
        );
        assert_eq!(
            sampler.rate_cell().unwrap_err(),
            ContextError::ExecutorNotSet
        );

        // The host supplies the capability; the next poll activates.
        let runtime = ScriptRuntime::spawn();
        context.set_executor(runtime.executor());
        context.set_max_sample_rate(100.0);

        assert_eq!(sampler.read_result(), 0, "Activation poll still reads 0");
        assert!(sampler.is_active());

        thread::sleep(Duration::from_millis(400));
        assert!(
            sampler.read_result() > 0,
            "One full window after activation the rate should be positive"
        );
        sampler.deactivate();
    }

    #[test]
    fn restart_produces_a_fresh_engine() {
        start_logger();
        let runtime = ScriptRuntime::spawn();
        let mut sampler = RateSampler::with_config(fast_context(&runtime), fast_config());

        sampler.activate().expect("Executor is set");
        thread::sleep(Duration::from_millis(400));
        assert!(sampler.read_result() > 0);

        sampler.deactivate();
        sampler.deactivate();
        assert!(!sampler.is_active());

        sampler.activate().expect("Reactivation should succeed");
        assert_eq!(
            sampler.read_result(),
            0,
            "A fresh engine starts from an empty cell"
        );
        thread::sleep(Duration::from_millis(400));
        assert!(
            sampler.read_result() > 0,
            "The restarted engine should republish once ticks resume"
        );
        sampler.deactivate();
    }

    #[test]
    fn engine_stop_is_idempotent() {
        start_logger();
        let runtime = ScriptRuntime::spawn();
        let context = fast_context(&runtime);
        let mut engine =
            SamplerEngine::start(&context, &fast_config()).expect("Executor is set");

        engine.stop();
        engine.stop();
    }

    #[test]
    fn repeated_activation_replaces_the_previous_engine() {
        start_logger();
        let runtime = ScriptRuntime::spawn();
        let mut sampler = RateSampler::with_config(fast_context(&runtime), fast_config());

        sampler.activate().expect("Executor is set");
        let first_cell = sampler.rate_cell().expect("Active sampler has a cell");
        sampler.activate().expect("Reactivation should succeed");
        let second_cell = sampler.rate_cell().expect("Active sampler has a cell");

        assert!(
            !Arc::ptr_eq(&first_cell, &second_cell),
            "Each activation owns a fresh result cell"
        );
        sampler.deactivate();
    }

    #[test]
    fn queued_tick_after_stop_is_harmless() {
        start_logger();
        // Hold submitted tasks so one is still queued when the engine stops.
        let (tx, rx) = crossbeam_channel::unbounded::<ScheduledTask>();
        let context = Arc::new(RuntimeContext::new());
        context.set_executor(RuntimeExecutor::new(move |task| {
            let _ = tx.send(task);
        }));

        let mut sampler = RateSampler::with_config(Arc::clone(&context), fast_config());
        sampler.activate().expect("Executor is set");
        thread::sleep(Duration::from_millis(50));
        sampler.deactivate();

        // Run whatever the runtime still holds; must not panic or publish.
        while let Ok(task) = rx.try_recv() {
            task();
        }
        assert_eq!(sampler.read_result(), 0);
        sampler.deactivate();
    }
}
