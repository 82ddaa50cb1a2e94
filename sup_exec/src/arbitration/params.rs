//! Parameters for the input scan and arbitration task

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::input_scan::AxisDeadzone;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arbitration task parameters.
#[derive(Debug, Copy, Clone, Deserialize)]
pub struct ArbitrationParams {
    /// Input scan period in milliseconds.
    pub cycle_period_ms: u64,

    /// X axis dead-zone. The two axes are deliberately configured
    /// separately; the fitted joystick does not centre symmetrically.
    pub x_deadzone: AxisDeadzone,

    /// Y axis dead-zone.
    pub y_deadzone: AxisDeadzone,
}

impl Default for ArbitrationParams {
    fn default() -> Self {
        ArbitrationParams {
            cycle_period_ms: 50,
            x_deadzone: AxisDeadzone {
                low: 1500,
                high: 1600,
            },
            y_deadzone: AxisDeadzone {
                low: 1300,
                high: 1400,
            },
        }
    }
}
