//! # Simulated rig equipment
//!
//! [`SimRig`] stands in for all three equipment boundaries at once, backed by
//! one shared state cell. Tests (and host-side runs, where no peripherals
//! exist) drive the inputs through the rig handle and observe what the
//! supervisor commands on the motors and display.
//!
//! Every `drive`/`brake` call is also appended to a command log, so tests can
//! assert not just the final state of a channel but that a superseded
//! auto-stop never issued a command at all.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use crate::eqpt::{
    Button, Display, DisplayError, InputSampler, JoystickSample, LimitSwitch, MotorDirection,
    MotorDriver, MotorDriverError, MotorId, PinLevel, NUM_MOTORS,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle on the simulated rig.
///
/// Cloning is cheap, all clones share the same underlying state.
#[derive(Clone)]
pub struct SimRig {
    state: Arc<SimState>,
}

/// Observed state of one simulated motor channel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimMotorState {
    /// The commanded direction, or `None` if the channel is braked.
    pub direction: Option<MotorDirection>,

    /// The commanded duty, percent.
    pub duty_percent: f64,
}

/// One entry of the simulated motor command log.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SimCommand {
    Drive(MotorId, MotorDirection),
    Brake(MotorId),
}

/// Input sampler facet of the rig.
#[derive(Clone)]
pub struct SimInputs {
    state: Arc<SimState>,
}

/// Motor driver facet of the rig.
pub struct SimMotors {
    state: Arc<SimState>,
}

/// Display facet of the rig.
pub struct SimDisplay {
    state: Arc<SimState>,
}

struct SimState {
    /// Digital levels, true == High. All switches and buttons are active-low,
    /// so everything starts High (clear/released).
    switch_levels: [AtomicBool; 6],
    button_levels: [AtomicBool; 2],

    joy_x: AtomicU16,
    joy_y: AtomicU16,
    aux: AtomicU16,

    motors: Mutex<[SimMotorState; NUM_MOTORS]>,
    command_log: Mutex<Vec<SimCommand>>,

    display_value: Mutex<Option<(u16, u8)>>,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Default for SimMotorState {
    fn default() -> Self {
        SimMotorState {
            direction: None,
            duty_percent: 0.0,
        }
    }
}

impl SimRig {
    /// Create a new simulated rig with all switches and buttons clear, the
    /// joystick at the given neutral point and all motors braked.
    pub fn new(joy_neutral_x: u16, joy_neutral_y: u16) -> Self {
        SimRig {
            state: Arc::new(SimState {
                switch_levels: Default::default(),
                button_levels: Default::default(),
                joy_x: AtomicU16::new(joy_neutral_x),
                joy_y: AtomicU16::new(joy_neutral_y),
                aux: AtomicU16::new(0),
                motors: Mutex::new([SimMotorState::default(); NUM_MOTORS]),
                command_log: Mutex::new(Vec::new()),
                display_value: Mutex::new(None),
            }),
        }
        .init_levels()
    }

    // AtomicBool::default() is false, but the idle level of every active-low
    // input is High.
    fn init_levels(self) -> Self {
        for level in self.state.switch_levels.iter() {
            level.store(true, Ordering::SeqCst);
        }
        for level in self.state.button_levels.iter() {
            level.store(true, Ordering::SeqCst);
        }
        self
    }

    /// Get the input sampler facet.
    pub fn inputs(&self) -> SimInputs {
        SimInputs {
            state: self.state.clone(),
        }
    }

    /// Get the motor driver facet.
    pub fn motors(&self) -> SimMotors {
        SimMotors {
            state: self.state.clone(),
        }
    }

    /// Get the display facet.
    pub fn display(&self) -> SimDisplay {
        SimDisplay {
            state: self.state.clone(),
        }
    }

    /// Set the level of a limit switch.
    pub fn set_limit_switch(&self, switch: LimitSwitch, level: PinLevel) {
        self.state.switch_levels[switch.index()]
            .store(matches!(level, PinLevel::High), Ordering::SeqCst);
    }

    /// Set the level of a button.
    pub fn set_button(&self, button: Button, level: PinLevel) {
        self.state.button_levels[button.index()]
            .store(matches!(level, PinLevel::High), Ordering::SeqCst);
    }

    /// Set the raw joystick sample.
    pub fn set_joystick(&self, x_raw: u16, y_raw: u16) {
        self.state.joy_x.store(x_raw, Ordering::SeqCst);
        self.state.joy_y.store(y_raw, Ordering::SeqCst);
    }

    /// Set the raw auxiliary (potentiometer) reading.
    pub fn set_aux(&self, raw: u16) {
        self.state.aux.store(raw, Ordering::SeqCst);
    }

    /// Observe the state of one motor channel.
    pub fn motor(&self, motor: MotorId) -> SimMotorState {
        self.state.motors.lock().unwrap()[motor.index()]
    }

    /// Number of motor commands issued so far.
    pub fn command_count(&self) -> usize {
        self.state.command_log.lock().unwrap().len()
    }

    /// A copy of the motor command log.
    pub fn command_log(&self) -> Vec<SimCommand> {
        self.state.command_log.lock().unwrap().clone()
    }

    /// The value currently shown on the display, or `None` if blanked.
    pub fn display_value(&self) -> Option<(u16, u8)> {
        *self.state.display_value.lock().unwrap()
    }
}

impl InputSampler for SimInputs {
    fn limit_switch(&self, switch: LimitSwitch) -> PinLevel {
        match self.state.switch_levels[switch.index()].load(Ordering::SeqCst) {
            true => PinLevel::High,
            false => PinLevel::Low,
        }
    }

    fn button(&self, button: Button) -> PinLevel {
        match self.state.button_levels[button.index()].load(Ordering::SeqCst) {
            true => PinLevel::High,
            false => PinLevel::Low,
        }
    }

    fn joystick(&self) -> JoystickSample {
        JoystickSample {
            x_raw: self.state.joy_x.load(Ordering::SeqCst),
            y_raw: self.state.joy_y.load(Ordering::SeqCst),
        }
    }

    fn aux_raw(&self) -> u16 {
        self.state.aux.load(Ordering::SeqCst)
    }
}

impl MotorDriver for SimMotors {
    fn drive(
        &mut self,
        motor: MotorId,
        direction: MotorDirection,
        duty_percent: f64,
    ) -> Result<(), MotorDriverError> {
        if !(0.0..=100.0).contains(&duty_percent) {
            return Err(MotorDriverError::InvalidDuty(duty_percent));
        }

        let mut motors = self.state.motors.lock().unwrap();
        motors[motor.index()] = SimMotorState {
            direction: Some(direction),
            duty_percent,
        };
        self.state
            .command_log
            .lock()
            .unwrap()
            .push(SimCommand::Drive(motor, direction));

        Ok(())
    }

    fn brake(&mut self, motor: MotorId) -> Result<(), MotorDriverError> {
        let mut motors = self.state.motors.lock().unwrap();
        motors[motor.index()] = SimMotorState::default();
        self.state
            .command_log
            .lock()
            .unwrap()
            .push(SimCommand::Brake(motor));

        Ok(())
    }
}

impl Display for SimDisplay {
    fn set_value(&mut self, value: u16, dot_mask: u8) -> Result<(), DisplayError> {
        if value > 9999 {
            return Err(DisplayError::ValueOutOfRange(value));
        }

        *self.state.display_value.lock().unwrap() = Some((value, dot_mask));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        *self.state.display_value.lock().unwrap() = None;
        Ok(())
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_levels_are_clear() {
        let rig = SimRig::new(1550, 1350);
        let inputs = rig.inputs();

        for switch in LimitSwitch::ALL.iter() {
            assert!(!inputs.limit_switch(*switch).is_asserted());
        }
        assert!(!inputs.button(Button::Launch).is_asserted());
        assert!(!inputs.button(Button::Random).is_asserted());
        assert_eq!(inputs.joystick(), JoystickSample { x_raw: 1550, y_raw: 1350 });
    }

    #[test]
    fn test_motor_facet_records_commands() {
        let rig = SimRig::new(1550, 1350);
        let mut motors = rig.motors();

        motors
            .drive(MotorId::Launch, MotorDirection::Forward, 90.0)
            .unwrap();
        assert_eq!(
            rig.motor(MotorId::Launch).direction,
            Some(MotorDirection::Forward)
        );

        motors.brake(MotorId::Launch).unwrap();
        assert_eq!(rig.motor(MotorId::Launch).direction, None);

        assert_eq!(
            rig.command_log(),
            vec![
                SimCommand::Drive(MotorId::Launch, MotorDirection::Forward),
                SimCommand::Brake(MotorId::Launch)
            ]
        );
    }

    #[test]
    fn test_invalid_duty_rejected() {
        let rig = SimRig::new(1550, 1350);
        let mut motors = rig.motors();

        assert!(motors
            .drive(MotorId::AimX, MotorDirection::Forward, 101.0)
            .is_err());
        assert_eq!(rig.motor(MotorId::AimX).direction, None);
    }
}
