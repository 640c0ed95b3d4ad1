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

//! # Pulse Sampler
//!
//! Measures the execution rate of a cooperative, single-threaded managed
//! runtime from the outside, without degrading its throughput.
//!
//! Two independently paced background threads coordinate through atomic
//! counters:
//!
//! ```text
//! RuntimeContext ─► PacingLoop ──(submits)──► tick task  (managed-runtime thread)
//!                                                 │ increments
//!                                                 ▼
//!                                           TickState counter
//!                                                 │ drained each window
//!                                                 ▼
//!                   ReportingLoop ──(publishes)─► RateCell ─► consumer poll
//! ```
//!
//! The pacing loop requests at most one outstanding tick submission at a
//! time, so a stalled runtime never accumulates a backlog. The reporting
//! loop aggregates ticks into a per-second rate once per window, forces
//! the rate to zero when the runtime has stalled, clamps it to the device
//! ceiling, and publishes it into the lock-free [`RateCell`] that
//! consumers poll from any thread.

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod pacing;
pub mod reporting;
pub mod tick;

pub use config::SamplerConfig;
pub use engine::{RateSampler, SamplerEngine};
pub use pulse_core::{ContextError, RateCell, RuntimeContext, RuntimeExecutor};
