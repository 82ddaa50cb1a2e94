//! Parameters for the launch sequence task

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Launch sequence parameters.
#[derive(Debug, Copy, Clone, Deserialize)]
pub struct LaunchParams {
    /// Safety-ceiling duration of each stroke in milliseconds. Far longer
    /// than any real travel; reaching it means the stroke stalled.
    pub ceiling_ms: u64,

    /// Limit switch polling period in milliseconds.
    pub poll_ms: u64,

    /// Settling delay between the two strokes in milliseconds.
    pub settle_ms: u64,
}

impl Default for LaunchParams {
    fn default() -> Self {
        LaunchParams {
            ceiling_ms: 60_000,
            poll_ms: 20,
            settle_ms: 100,
        }
    }
}
