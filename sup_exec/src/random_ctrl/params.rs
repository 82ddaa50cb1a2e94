//! Parameters for the random exercise task

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Random exercise parameters.
#[derive(Debug, Copy, Clone, Deserialize)]
pub struct RandomParams {
    /// Total wall-clock length of the exercise window in milliseconds.
    pub window_ms: u64,

    /// Minimum delay between random actions in milliseconds.
    pub step_min_ms: u64,

    /// Maximum delay between random actions in milliseconds.
    pub step_max_ms: u64,
}

impl Default for RandomParams {
    fn default() -> Self {
        RandomParams {
            window_ms: 5_000,
            step_min_ms: 250,
            step_max_ms: 1_000,
        }
    }
}
