//! # Launch Rig Supervisor Library
//!
//! This library implements the actuator supervisor for the aiming/launch rig:
//! the concurrent state machine which arbitrates who may drive each of the
//! three motor channels, for how long, and under which safety interlocks.
//!
//! The supervisor is built from four long-lived tasks sharing one mode cell:
//!
//! - `arbitration` - fixed-period input scan, mode transitions, manual aim
//! - `launch_ctrl` - the multi-phase launch sequence
//! - `random_ctrl` - the randomised pre-launch exercise routine
//! - `display_fwd` - forwards potentiometer readings to the status display
//!
//! All equipment access goes through the `hw_if` boundary traits, so the same
//! supervisor runs against the real peripherals or the simulated rig.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Input scan and mode arbitration task.
pub mod arbitration;

/// The shared control mode cell.
pub mod control_state;

/// Display forwarding task.
pub mod display_fwd;

/// Per-cycle input snapshots and joystick dead-zones.
pub mod input_scan;

/// Launch sequence task.
pub mod launch_ctrl;

/// Motor channel supervisor with cancellable auto-stop.
pub mod motor_ctrl;

/// Top-level parameter structure.
pub mod params;

/// Random exercise task.
pub mod random_ctrl;

/// Shared fault reporting.
pub mod report;

/// One-shot wake-up signals between tasks.
pub mod signals;

/// Task wiring and lifecycle.
pub mod supervisor;
