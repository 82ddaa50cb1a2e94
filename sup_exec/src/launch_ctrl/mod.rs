//! Launch sequence task
//!
//! Runs the two-stroke launch: drive the carriage out to the far limit
//! switch, settle, drive it back to the home switch. The task blocks on the
//! launch trigger and owns the `Launching` mode (and with it the launch
//! motor) for the whole run.
//!
//! Every stroke is commanded with `drive_for` at the safety-ceiling
//! duration, so the motor stops by itself even if this task dies mid-phase.
//! The polling loop on the limit switch is the primary stop condition; the
//! ceiling doubles as the stall deadline, after which the phase is reported
//! as a fault instead of looping forever.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use hw_if::eqpt::{InputSampler, LimitSwitch, MotorDirection, MotorId};

use crate::control_state::ControlState;
use crate::motor_ctrl::{MotorCtrl, MotorCtrlError};
use crate::report::{Fault, SupReport};
use crate::signals::Trigger;

pub use params::LaunchParams;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// How long to block on the trigger before re-checking the shutdown flag.
const TRIGGER_WAIT: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The two actuation phases of the launch sequence.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum LaunchPhase {
    /// Carriage driving out towards the `LaunchOut` switch.
    DriveOut,

    /// Carriage driving back towards the `LaunchHome` switch.
    DriveBack,
}

/// Possible errors that can occur during the launch sequence.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("{phase:?} stalled: limit switch not reached before the safety ceiling")]
    Stall { phase: LaunchPhase },

    #[error(transparent)]
    Motor(#[from] MotorCtrlError),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The launch sequence task.
pub struct LaunchCtrl {
    params: LaunchParams,
    control_state: Arc<ControlState>,
    motor_ctrl: Arc<MotorCtrl>,
    sampler: Arc<dyn InputSampler>,
    trigger: Arc<Trigger>,
    report: Arc<SupReport>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaunchCtrl {
    pub fn new(
        params: LaunchParams,
        control_state: Arc<ControlState>,
        motor_ctrl: Arc<MotorCtrl>,
        sampler: Arc<dyn InputSampler>,
        trigger: Arc<Trigger>,
        report: Arc<SupReport>,
    ) -> Self {
        LaunchCtrl {
            params,
            control_state,
            motor_ctrl,
            sampler,
            trigger,
            report,
        }
    }

    /// Task loop: block on the launch trigger, run the sequence, return the
    /// mode to idle.
    pub fn run(&self, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            if !self.trigger.wait_timeout(TRIGGER_WAIT) {
                continue;
            }

            info!("Launch sequence starting");

            match self.execute(stop) {
                Ok(()) => info!("Launch sequence complete"),
                Err(LaunchError::Stall { phase }) => {
                    error!("Launch sequence stalled in {:?}", phase);
                    self.report.record(Fault::LaunchStall(phase));
                }
                Err(LaunchError::Motor(e)) => {
                    error!("Launch sequence aborted on motor fault: {}", e);
                    self.report.record(Fault::Actuation(MotorId::Launch));
                }
            }

            // Whatever happened, the rig must come back to an operable state
            self.control_state.return_to_idle();
        }
    }

    fn execute(&self, stop: &AtomicBool) -> Result<(), LaunchError> {
        self.run_phase(
            LaunchPhase::DriveOut,
            MotorDirection::Forward,
            LimitSwitch::LaunchOut,
            stop,
        )?;

        // Settle between strokes to damp mechanical bounce off the switch
        thread::sleep(Duration::from_millis(self.params.settle_ms));

        self.run_phase(
            LaunchPhase::DriveBack,
            MotorDirection::Reverse,
            LimitSwitch::LaunchHome,
            stop,
        )
    }

    /// Drive one stroke until `target` asserts.
    ///
    /// The drive command carries the safety-ceiling auto-stop; the same
    /// ceiling bounds the polling loop, turning a switch that never asserts
    /// into an observable stall instead of a silent hang.
    fn run_phase(
        &self,
        phase: LaunchPhase,
        direction: MotorDirection,
        target: LimitSwitch,
        stop: &AtomicBool,
    ) -> Result<(), LaunchError> {
        let ceiling = Duration::from_millis(self.params.ceiling_ms);
        let poll = Duration::from_millis(self.params.poll_ms);

        info!("{:?}: motor {:?} until {:?}", phase, direction, target);

        self.motor_ctrl
            .drive_for(MotorId::Launch, direction, ceiling)?;

        let deadline = Instant::now() + ceiling;
        while !self.sampler.limit_switch(target).is_asserted() {
            if stop.load(Ordering::Relaxed) {
                self.motor_ctrl.stop(MotorId::Launch)?;
                return Ok(());
            }

            if Instant::now() >= deadline {
                self.motor_ctrl.stop(MotorId::Launch)?;
                return Err(LaunchError::Stall { phase });
            }

            thread::sleep(poll);
        }

        info!("{:?} asserted", target);
        self.motor_ctrl.stop(MotorId::Launch)?;

        Ok(())
    }
}
