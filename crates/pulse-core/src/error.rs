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

//! Defines the error types for the runtime context and sampler engine.

use std::fmt;

/// An error related to the state of the [`RuntimeContext`](crate::RuntimeContext).
///
/// The only fallible external dependency of the sampler is the presence of
/// the scheduling capability, so this hierarchy is deliberately small. A
/// missing executor is a recoverable condition: callers defer activation
/// and retry on a later poll rather than treating it as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The scheduling capability was requested before the host supplied it.
    ExecutorNotSet,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::ExecutorNotSet => {
                write!(f, "runtime executor has not been supplied to the context")
            }
        }
    }
}

impl std::error::Error for ContextError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_missing_capability() {
        let message = ContextError::ExecutorNotSet.to_string();
        assert!(
            message.contains("executor"),
            "Error message should mention the executor: {message}"
        );
    }
}
