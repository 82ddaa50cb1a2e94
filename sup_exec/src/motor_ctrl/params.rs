//! Parameters for the motor channel supervisor

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motor channel supervisor parameters.
#[derive(Debug, Copy, Clone, Deserialize)]
pub struct MotorCtrlParams {
    /// Fixed duty demanded for every drive command, percent. Motors run
    /// open-loop at full commanded speed, never throttled.
    pub duty_percent: f64,
}

impl Default for MotorCtrlParams {
    fn default() -> Self {
        MotorCtrlParams { duty_percent: 90.0 }
    }
}
