//! Random exercise task
//!
//! Exercises the two aim actuators unpredictably for a fixed window before
//! every launch. Each step independently picks stop/forward/reverse for each
//! aim motor, honouring a motion only while the corresponding travel limit
//! is clear. When the window elapses the task stops both motors and chains
//! straight into the launch sequence by handing the mode over and raising
//! the launch trigger.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cmp::min;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use hw_if::eqpt::{InputSampler, LimitSwitch, MotorDirection, MotorId};

use crate::control_state::{ControlState, Mode};
use crate::motor_ctrl::MotorCtrl;
use crate::report::{Fault, SupReport};
use crate::signals::Trigger;

pub use params::RandomParams;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// How long to block on the trigger before re-checking the shutdown flag.
const TRIGGER_WAIT: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The random exercise task.
pub struct RandomCtrl {
    params: RandomParams,
    control_state: Arc<ControlState>,
    motor_ctrl: Arc<MotorCtrl>,
    sampler: Arc<dyn InputSampler>,
    random_trigger: Arc<Trigger>,
    launch_trigger: Arc<Trigger>,
    report: Arc<SupReport>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RandomCtrl {
    pub fn new(
        params: RandomParams,
        control_state: Arc<ControlState>,
        motor_ctrl: Arc<MotorCtrl>,
        sampler: Arc<dyn InputSampler>,
        random_trigger: Arc<Trigger>,
        launch_trigger: Arc<Trigger>,
        report: Arc<SupReport>,
    ) -> Self {
        RandomCtrl {
            params,
            control_state,
            motor_ctrl,
            sampler,
            random_trigger,
            launch_trigger,
            report,
        }
    }

    /// Task loop: block on the random trigger, run the exercise window,
    /// chain into a launch.
    pub fn run(&self, stop: &AtomicBool) {
        let mut rng = SmallRng::from_entropy();

        while !stop.load(Ordering::Relaxed) {
            if !self.random_trigger.wait_timeout(TRIGGER_WAIT) {
                continue;
            }

            info!(
                "Random exercise starting, window {} ms",
                self.params.window_ms
            );

            let deadline = Instant::now() + Duration::from_millis(self.params.window_ms);

            while Instant::now() < deadline && !stop.load(Ordering::Relaxed) {
                self.exercise_motor(
                    &mut rng,
                    MotorId::AimX,
                    LimitSwitch::AimXOut,
                    LimitSwitch::AimXIn,
                );
                self.exercise_motor(
                    &mut rng,
                    MotorId::AimY,
                    LimitSwitch::AimYOut,
                    LimitSwitch::AimYIn,
                );

                // Let the motors run a while before the next action, bounded
                // by the window remainder
                let step =
                    Duration::from_millis(rng.gen_range(self.params.step_min_ms..=self.params.step_max_ms));
                thread::sleep(min(step, deadline.saturating_duration_since(Instant::now())));
            }

            // Window over: both aim motors must end stopped
            self.force_stop(MotorId::AimX);
            self.force_stop(MotorId::AimY);

            if stop.load(Ordering::Relaxed) {
                self.control_state.return_to_idle();
                break;
            }

            // Chain directly into the launch sequence. The handoff is a
            // single transition under the state lock, so no other mode can
            // interleave between exercise and launch.
            info!("Random exercise complete, chaining into launch");
            if self
                .control_state
                .try_enter(Mode::RandomExercise, Mode::Launching)
            {
                self.launch_trigger.raise();
            } else {
                warn!("Lost ownership of RandomExercise mode, not chaining");
                self.control_state.return_to_idle();
            }
        }
    }

    /// Pick and apply one random action for the given motor.
    fn exercise_motor(
        &self,
        rng: &mut SmallRng,
        motor: MotorId,
        out_switch: LimitSwitch,
        in_switch: LimitSwitch,
    ) {
        let result = match rng.gen_range(0..3u8) {
            1 if !self.sampler.limit_switch(out_switch).is_asserted() => {
                self.motor_ctrl.drive(motor, MotorDirection::Forward)
            }
            2 if !self.sampler.limit_switch(in_switch).is_asserted() => {
                self.motor_ctrl.drive(motor, MotorDirection::Reverse)
            }
            _ => self.motor_ctrl.stop(motor),
        };

        if let Err(e) = result {
            warn!("Exercise command on {:?} failed: {}", motor, e);
            self.report.record(Fault::Actuation(motor));
        }
    }

    fn force_stop(&self, motor: MotorId) {
        if let Err(e) = self.motor_ctrl.stop(motor) {
            warn!("Could not stop {:?} at end of exercise: {}", motor, e);
            self.report.record(Fault::Actuation(motor));
        }
    }
}
