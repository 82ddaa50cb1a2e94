//! # Input sampler boundary
//!
//! The sampler refreshes all digital and analog inputs asynchronously at a
//! fixed rate; the accessors below are instantaneous reads of the latest
//! values. All digital inputs are active-low: a level of `Low` means the
//! switch/button is asserted.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Digital level of an input pin.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum PinLevel {
    Low,
    High,
}

/// IDs of the rig's six travel limit switches.
///
/// Numbering follows the harness labels: 1/2 bound the launch carriage,
/// 3/4 bound the X aim axis, 5/6 bound the Y aim axis.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum LimitSwitch {
    /// Switch 1 - launch carriage at its home (retracted) position.
    LaunchHome,

    /// Switch 2 - launch carriage at its out (extended) position.
    LaunchOut,

    /// Switch 3 - X aim axis at its outward travel limit.
    AimXOut,

    /// Switch 4 - X aim axis at its inward travel limit.
    AimXIn,

    /// Switch 5 - Y aim axis at its outward travel limit.
    AimYOut,

    /// Switch 6 - Y aim axis at its inward travel limit.
    AimYIn,
}

/// IDs of the rig's push buttons.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum Button {
    /// Button 1 - request a launch sequence.
    Launch,

    /// Button 2 - request a random exercise run.
    Random,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One raw two-axis joystick sample.
///
/// Both axes are 12 bit raw ADC counts (0 to 4095).
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Copy, Clone)]
pub struct JoystickSample {
    pub x_raw: u16,
    pub y_raw: u16,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait providing read access to the rig's raw inputs.
pub trait InputSampler: Send + Sync {
    /// The latest level of the given limit switch (active-low).
    fn limit_switch(&self, switch: LimitSwitch) -> PinLevel;

    /// The latest level of the given button (active-low).
    fn button(&self, button: Button) -> PinLevel;

    /// The latest joystick sample.
    fn joystick(&self) -> JoystickSample;

    /// The latest raw reading of the auxiliary (potentiometer) channel,
    /// 12 bit (0 to 4095).
    fn aux_raw(&self) -> u16;
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl PinLevel {
    /// True if the input is asserted (active-low semantics: asserted == Low).
    pub fn is_asserted(&self) -> bool {
        matches!(self, PinLevel::Low)
    }
}

impl LimitSwitch {
    /// All limit switches, in harness label order.
    pub const ALL: [LimitSwitch; 6] = [
        LimitSwitch::LaunchHome,
        LimitSwitch::LaunchOut,
        LimitSwitch::AimXOut,
        LimitSwitch::AimXIn,
        LimitSwitch::AimYOut,
        LimitSwitch::AimYIn,
    ];

    /// The harness label index (0 based) of this switch.
    pub fn index(&self) -> usize {
        match self {
            LimitSwitch::LaunchHome => 0,
            LimitSwitch::LaunchOut => 1,
            LimitSwitch::AimXOut => 2,
            LimitSwitch::AimXIn => 3,
            LimitSwitch::AimYOut => 4,
            LimitSwitch::AimYIn => 5,
        }
    }
}

impl Button {
    /// The index (0 based) of this button.
    pub fn index(&self) -> usize {
        match self {
            Button::Launch => 0,
            Button::Random => 1,
        }
    }
}
