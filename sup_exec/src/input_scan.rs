//! Per-cycle input snapshots and joystick dead-zones
//!
//! The arbitration task never reads the sampler piecemeal while deciding:
//! it captures one [`InputSnapshot`] at the top of each scan cycle and
//! evaluates everything against that consistent copy.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use hw_if::eqpt::{Button, InputSampler, JoystickSample, LimitSwitch, PinLevel};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A consistent copy of all rig inputs, taken once per scan cycle.
#[derive(Debug, Copy, Clone)]
pub struct InputSnapshot {
    limit_switches: [PinLevel; 6],
    buttons: [PinLevel; 2],

    /// The raw joystick sample for this cycle.
    pub joystick: JoystickSample,

    /// The raw auxiliary (potentiometer) reading for this cycle.
    pub aux_raw: u16,
}

/// Dead-zone thresholds for one joystick axis.
///
/// The two axes of this hardware use different, asymmetric threshold pairs,
/// so each axis carries its own configuration rather than sharing constants.
#[derive(Debug, Copy, Clone, Deserialize)]
pub struct AxisDeadzone {
    /// Raw readings strictly below this are outside the dead-zone (low side).
    pub low: u16,

    /// Raw readings strictly above this are outside the dead-zone (high side).
    pub high: u16,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Position of one axis relative to its dead-zone.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum AxisPosition {
    /// Below the low threshold.
    Below,

    /// Within the dead-zone, no motion command.
    Neutral,

    /// Above the high threshold.
    Above,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputSnapshot {
    /// Capture a snapshot of all inputs from the sampler.
    pub fn capture(sampler: &dyn InputSampler) -> Self {
        let mut limit_switches = [PinLevel::High; 6];
        for switch in LimitSwitch::ALL.iter() {
            limit_switches[switch.index()] = sampler.limit_switch(*switch);
        }

        InputSnapshot {
            limit_switches,
            buttons: [
                sampler.button(Button::Launch),
                sampler.button(Button::Random),
            ],
            joystick: sampler.joystick(),
            aux_raw: sampler.aux_raw(),
        }
    }

    /// Level of the given limit switch in this snapshot.
    pub fn limit_switch(&self, switch: LimitSwitch) -> PinLevel {
        self.limit_switches[switch.index()]
    }

    /// Level of the given button in this snapshot.
    pub fn button(&self, button: Button) -> PinLevel {
        self.buttons[button.index()]
    }
}

impl AxisDeadzone {
    /// Classify a raw axis reading against this dead-zone.
    pub fn classify(&self, raw: u16) -> AxisPosition {
        if raw < self.low {
            AxisPosition::Below
        } else if raw > self.high {
            AxisPosition::Above
        } else {
            AxisPosition::Neutral
        }
    }

    /// The midpoint of the dead-zone, used as the simulated rig's neutral.
    pub fn neutral(&self) -> u16 {
        (self.low + self.high) / 2
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use hw_if::sim::SimRig;

    #[test]
    fn test_deadzone_classification_is_inclusive() {
        let dz = AxisDeadzone {
            low: 1500,
            high: 1600,
        };

        assert_eq!(dz.classify(0), AxisPosition::Below);
        assert_eq!(dz.classify(1499), AxisPosition::Below);
        assert_eq!(dz.classify(1500), AxisPosition::Neutral);
        assert_eq!(dz.classify(1550), AxisPosition::Neutral);
        assert_eq!(dz.classify(1600), AxisPosition::Neutral);
        assert_eq!(dz.classify(1601), AxisPosition::Above);
        assert_eq!(dz.classify(4095), AxisPosition::Above);
    }

    #[test]
    fn test_snapshot_captures_all_inputs() {
        let rig = SimRig::new(1550, 1350);
        rig.set_limit_switch(LimitSwitch::LaunchHome, PinLevel::Low);
        rig.set_button(Button::Random, PinLevel::Low);
        rig.set_aux(1234);

        let inputs = rig.inputs();
        let snapshot = InputSnapshot::capture(&inputs);

        assert!(snapshot.limit_switch(LimitSwitch::LaunchHome).is_asserted());
        assert!(!snapshot.limit_switch(LimitSwitch::LaunchOut).is_asserted());
        assert!(snapshot.button(Button::Random).is_asserted());
        assert!(!snapshot.button(Button::Launch).is_asserted());
        assert_eq!(snapshot.joystick.x_raw, 1550);
        assert_eq!(snapshot.aux_raw, 1234);
    }
}
