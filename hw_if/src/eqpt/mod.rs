//! # Equipment boundary definitions

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod display;
pub mod input;
pub mod motor;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use display::{Display, DisplayError};
pub use input::{Button, InputSampler, JoystickSample, LimitSwitch, PinLevel};
pub use motor::{MotorDirection, MotorDriver, MotorDriverError, MotorId, NUM_MOTORS};
