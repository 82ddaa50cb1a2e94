//! # Hardware interface crate.
//!
//! Provides the typed boundaries to the rig's external equipment: the
//! actuator peripheral (H-bridge motor channels), the raw input sampler
//! (limit switches, buttons, joystick) and the numeric status display.
//!
//! The supervisor executable only ever talks to equipment through the traits
//! defined here, so the same control code runs against the real peripherals
//! or against the simulated rig in [`sim`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Equipment boundary definitions (motors, inputs, display)
pub mod eqpt;

/// PCA9685-backed H-bridge motor driver
pub mod pca9685;

/// Simulated rig equipment for host-side runs and tests
pub mod sim;
