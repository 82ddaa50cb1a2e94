//! # Actuator peripheral boundary
//!
//! The rig carries three bidirectional DC motors driven through H-bridges.
//! Motors are run open-loop at a fixed high duty, never throttled.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of motor channels on the rig.
pub const NUM_MOTORS: usize = 3;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the rig's motor channels.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum MotorId {
    /// Channel 0 - drives the launch carriage between the home and out limit
    /// switches.
    Launch,

    /// Channel 1 - aims the rig along the joystick's X axis.
    AimX,

    /// Channel 2 - aims the rig along the joystick's Y axis.
    AimY,
}

/// Commanded rotation direction of a motor channel.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum MotorDirection {
    Forward,
    Reverse,
}

/// Possible errors raised by a motor driver backend.
#[derive(thiserror::Error, Debug)]
pub enum MotorDriverError {
    #[error("An I2C error occured")]
    I2c,

    #[error("Duty cycle must be between 0.0 and 100.0 percent, got {0}")]
    InvalidDuty(f64),

    #[error("The peripheral rejected the command")]
    Rejected,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing H-bridge motor driver boards.
///
/// Implementors must guarantee that `brake` is always safe to issue,
/// whatever the current state of the channel.
pub trait MotorDriver: Send {
    /// Commutate the given channel to rotate in `direction` at `duty_percent`
    /// (0.0 to 100.0). Values outside this range will be rejected.
    fn drive(
        &mut self,
        motor: MotorId,
        direction: MotorDirection,
        duty_percent: f64,
    ) -> Result<(), MotorDriverError>;

    /// Force both legs of the given channel to the braking/neutral state.
    fn brake(&mut self, motor: MotorId) -> Result<(), MotorDriverError>;
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl MotorId {
    /// All motor channels, in index order.
    pub const ALL: [MotorId; NUM_MOTORS] = [MotorId::Launch, MotorId::AimX, MotorId::AimY];

    /// The channel index (0 to 2) of this motor.
    pub fn index(&self) -> usize {
        match self {
            MotorId::Launch => 0,
            MotorId::AimX => 1,
            MotorId::AimY => 2,
        }
    }
}

impl MotorDirection {
    /// The opposite rotation direction.
    pub fn opposite(&self) -> Self {
        match self {
            MotorDirection::Forward => MotorDirection::Reverse,
            MotorDirection::Reverse => MotorDirection::Forward,
        }
    }
}
