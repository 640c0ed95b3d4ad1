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

//! # Pulse Core
//!
//! Foundational crate containing the types shared between the sampler
//! engine and its host: the capability for scheduling work on the managed
//! runtime, the process-level runtime context, the lock-free result cell,
//! and the error contracts.

#![warn(missing_docs)]

pub mod cell;
pub mod context;
pub mod error;
pub mod executor;
pub mod utils;

pub use cell::RateCell;
pub use context::RuntimeContext;
pub use error::ContextError;
pub use executor::{RuntimeExecutor, ScheduledTask};
pub use utils::timer::Stopwatch;
