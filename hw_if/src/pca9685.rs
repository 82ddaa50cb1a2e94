//! [`MotorDriver`] implementation for a PCA9685 driving three H-bridges
//!
//! Each motor channel occupies two consecutive PWM outputs, one per H-bridge
//! leg: motor `n` uses outputs `2n` (leg A) and `2n + 1` (leg B). Driving
//! forward runs leg A at the commanded duty with leg B held off; reverse
//! swaps the legs; braking holds both legs off.
//!
//! Direction changes pass through an all-off commutation gap before the
//! opposite leg is energised, to avoid shoot-through in the bridge.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::thread;
use std::time::Duration;

use embedded_hal::blocking::i2c::{Write, WriteRead};
use log::debug;
use pwm_pca9685::{Address, Channel, Pca9685};

use crate::eqpt::{MotorDirection, MotorDriver, MotorDriverError, MotorId, NUM_MOTORS};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Counts per PWM period on the PCA9685.
const MAX_PWM: u16 = 4096;

/// Internal oscillator frequency of the PCA9685 in Hz.
const OSC_FREQ_HZ: f64 = 25_000_000.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Configuration of the H-bridge backend, fixed at startup.
#[derive(Debug, Copy, Clone, serde::Deserialize)]
pub struct HBridgeConfig {
    /// I2C address of the PCA9685 board.
    pub i2c_address: u8,

    /// PWM carrier frequency in Hz. The PCA9685 tops out around 1.5 kHz.
    pub carrier_freq_hz: f64,

    /// Commutation dead-time inserted on direction changes, in microseconds.
    pub dead_time_us: u64,
}

impl Default for HBridgeConfig {
    fn default() -> Self {
        HBridgeConfig {
            i2c_address: 0x40,
            carrier_freq_hz: 1500.0,
            dead_time_us: 20,
        }
    }
}

/// PCA9685-backed H-bridge motor driver.
pub struct Pca9685HBridge<I2C> {
    pwm: Pca9685<I2C>,

    dead_time: Duration,

    /// Last commanded direction per channel, used to decide when a
    /// commutation gap is needed.
    last_direction: [Option<MotorDirection>; NUM_MOTORS],
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl<I2C, E> Pca9685HBridge<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E> + Send,
{
    /// Initialise the backend on the given bus and board address.
    ///
    /// Failure here is a fatal configuration error: callers are expected to
    /// abort startup.
    pub fn new<A: Into<Address>>(
        i2c: I2C,
        address: A,
        config: HBridgeConfig,
    ) -> Result<Self, MotorDriverError> {
        let mut pwm = Pca9685::new(i2c, address).map_err(to_driver_error)?;

        // prescale = osc / (4096 * carrier) - 1, clamped to the chip's range
        let prescale = (OSC_FREQ_HZ / (MAX_PWM as f64 * config.carrier_freq_hz) - 1.0)
            .round()
            .max(3.0)
            .min(255.0) as u8;

        pwm.set_prescale(prescale).map_err(to_driver_error)?;
        pwm.enable().map_err(to_driver_error)?;

        debug!(
            "PCA9685 initialised, carrier {} Hz (prescale {}), dead time {} us",
            config.carrier_freq_hz, prescale, config.dead_time_us
        );

        let mut bridge = Pca9685HBridge {
            pwm,
            dead_time: Duration::from_micros(config.dead_time_us),
            last_direction: [None; NUM_MOTORS],
        };

        // All bridges start braked
        for motor in MotorId::ALL.iter() {
            bridge.brake(*motor)?;
        }

        Ok(bridge)
    }

    /// The (leg A, leg B) PWM outputs of the given motor.
    fn legs(motor: MotorId) -> (Channel, Channel) {
        match motor {
            MotorId::Launch => (Channel::C0, Channel::C1),
            MotorId::AimX => (Channel::C2, Channel::C3),
            MotorId::AimY => (Channel::C4, Channel::C5),
        }
    }

    fn set_leg_duty(&mut self, leg: Channel, duty_percent: f64) -> Result<(), MotorDriverError> {
        let off_count = (duty_percent / 100.0 * (MAX_PWM - 1) as f64) as u16;
        self.pwm.set_channel_on(leg, 0).map_err(to_driver_error)?;
        self.pwm
            .set_channel_off(leg, off_count)
            .map_err(to_driver_error)
    }

    fn set_leg_off(&mut self, leg: Channel) -> Result<(), MotorDriverError> {
        self.pwm.set_channel_full_off(leg).map_err(to_driver_error)
    }
}

impl<I2C, E> MotorDriver for Pca9685HBridge<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E> + Send,
{
    fn drive(
        &mut self,
        motor: MotorId,
        direction: MotorDirection,
        duty_percent: f64,
    ) -> Result<(), MotorDriverError> {
        if !(0.0..=100.0).contains(&duty_percent) {
            return Err(MotorDriverError::InvalidDuty(duty_percent));
        }

        let (leg_a, leg_b) = Self::legs(motor);

        // Commutation gap when the bridge was energised in the other
        // direction
        if self.last_direction[motor.index()] == Some(direction.opposite()) {
            self.set_leg_off(leg_a)?;
            self.set_leg_off(leg_b)?;
            thread::sleep(self.dead_time);
        }

        let (hot, cold) = match direction {
            MotorDirection::Forward => (leg_a, leg_b),
            MotorDirection::Reverse => (leg_b, leg_a),
        };

        self.set_leg_off(cold)?;
        self.set_leg_duty(hot, duty_percent)?;
        self.last_direction[motor.index()] = Some(direction);

        Ok(())
    }

    fn brake(&mut self, motor: MotorId) -> Result<(), MotorDriverError> {
        let (leg_a, leg_b) = Self::legs(motor);

        self.set_leg_off(leg_a)?;
        self.set_leg_off(leg_b)?;
        self.last_direction[motor.index()] = None;

        Ok(())
    }
}

// -----------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn to_driver_error<E>(error: pwm_pca9685::Error<E>) -> MotorDriverError {
    match error {
        pwm_pca9685::Error::I2C(_) => MotorDriverError::I2c,
        pwm_pca9685::Error::InvalidInputData => MotorDriverError::Rejected,
    }
}
