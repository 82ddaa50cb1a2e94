//! Input scan and mode arbitration task
//!
//! The fixed-period heart of the supervisor. Each cycle it captures one
//! input snapshot, forwards the potentiometer reading to the display
//! pipeline, and evaluates the current mode:
//!
//! - In `Idle` it decides whether to start a launch, a random exercise, or
//!   manual aiming. Trigger conditions are evaluated in a fixed priority
//!   order (launch, random, joystick); the first match wins for that cycle.
//! - In `ManualAim` it drives the two aim channels from the joystick, one
//!   axis per channel, and returns to `Idle` once both axes are neutral.
//! - In `Launching`/`RandomExercise` it only keeps sampling; those tasks own
//!   their motors exclusively.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Internal
use hw_if::eqpt::{Button, InputSampler, LimitSwitch, MotorDirection, MotorId};

use crate::control_state::{ControlState, Mode};
use crate::input_scan::{AxisPosition, InputSnapshot};
use crate::motor_ctrl::MotorCtrl;
use crate::report::{Fault, SupReport};
use crate::signals::Trigger;

pub use params::ArbitrationParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The input scan and arbitration task.
pub struct Arbitration {
    params: ArbitrationParams,
    control_state: Arc<ControlState>,
    motor_ctrl: Arc<MotorCtrl>,
    sampler: Arc<dyn InputSampler>,
    launch_trigger: Arc<Trigger>,
    random_trigger: Arc<Trigger>,
    aux_sender: SyncSender<u16>,
    report: Arc<SupReport>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Arbitration {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        params: ArbitrationParams,
        control_state: Arc<ControlState>,
        motor_ctrl: Arc<MotorCtrl>,
        sampler: Arc<dyn InputSampler>,
        launch_trigger: Arc<Trigger>,
        random_trigger: Arc<Trigger>,
        aux_sender: SyncSender<u16>,
        report: Arc<SupReport>,
    ) -> Self {
        Arbitration {
            params,
            control_state,
            motor_ctrl,
            sampler,
            launch_trigger,
            random_trigger,
            aux_sender,
            report,
        }
    }

    /// Task loop: snapshot, evaluate, sleep for the scan period.
    pub fn run(&self, stop: &AtomicBool) {
        let period = Duration::from_millis(self.params.cycle_period_ms);

        while !stop.load(Ordering::Relaxed) {
            let snapshot = InputSnapshot::capture(self.sampler.as_ref());
            self.step(&snapshot);
            thread::sleep(period);
        }

        // Fail-safe on shutdown: whatever the cycle left running, stop the
        // channels this task may own
        let _ = self.motor_ctrl.stop(MotorId::AimX);
        let _ = self.motor_ctrl.stop(MotorId::AimY);
    }

    /// Evaluate one scan cycle.
    pub fn step(&self, snapshot: &InputSnapshot) {
        // Forward the potentiometer reading to the display pipeline. The
        // send never blocks: a slow display drops samples rather than
        // stalling the scan loop.
        if self.aux_sender.try_send(snapshot.aux_raw).is_err() {
            trace!("Display queue full, dropping aux sample");
        }

        match self.control_state.read() {
            Mode::Idle => self.step_idle(snapshot),
            Mode::ManualAim => self.step_manual_aim(snapshot),
            // Launch/Random own their motors, nothing to actuate here
            Mode::Launching | Mode::RandomExercise => (),
        }
    }

    /// Idle: check trigger conditions in priority order.
    fn step_idle(&self, snapshot: &InputSnapshot) {
        let launch_requested = snapshot.button(Button::Launch).is_asserted()
            && snapshot.limit_switch(LimitSwitch::LaunchHome).is_asserted();

        if launch_requested {
            if self.control_state.try_enter(Mode::Idle, Mode::Launching) {
                info!("Launch button pressed with carriage home, triggering launch");
                self.launch_trigger.raise();
            }
        } else if snapshot.button(Button::Random).is_asserted() {
            if self
                .control_state
                .try_enter(Mode::Idle, Mode::RandomExercise)
            {
                info!("Random button pressed, triggering exercise");
                self.random_trigger.raise();
            }
        } else if self.x_position(snapshot) != AxisPosition::Neutral
            || self.y_position(snapshot) != AxisPosition::Neutral
        {
            self.control_state.try_enter(Mode::Idle, Mode::ManualAim);
        }
    }

    /// Manual aim: one axis per channel, independently.
    fn step_manual_aim(&self, snapshot: &InputSnapshot) {
        let x = self.x_position(snapshot);
        let y = self.y_position(snapshot);

        self.aim_axis(
            snapshot,
            MotorId::AimX,
            x,
            LimitSwitch::AimXOut,
            LimitSwitch::AimXIn,
        );
        self.aim_axis(
            snapshot,
            MotorId::AimY,
            y,
            LimitSwitch::AimYOut,
            LimitSwitch::AimYIn,
        );

        // Both axes back in their dead-zones: hand the rig back to idle.
        // The per-axis handling above has already stopped both channels.
        if x == AxisPosition::Neutral && y == AxisPosition::Neutral {
            self.control_state.try_enter(Mode::ManualAim, Mode::Idle);
        }
    }

    /// Drive one aim channel from its axis position and travel limits.
    ///
    /// The drive command is re-issued every scan cycle while the stick is
    /// held; the channel is stopped the moment the axis re-enters its
    /// dead-zone or its travel limit asserts.
    fn aim_axis(
        &self,
        snapshot: &InputSnapshot,
        motor: MotorId,
        position: AxisPosition,
        out_switch: LimitSwitch,
        in_switch: LimitSwitch,
    ) {
        let result = match position {
            AxisPosition::Below if !snapshot.limit_switch(out_switch).is_asserted() => {
                self.motor_ctrl.drive(motor, MotorDirection::Forward)
            }
            AxisPosition::Above if !snapshot.limit_switch(in_switch).is_asserted() => {
                self.motor_ctrl.drive(motor, MotorDirection::Reverse)
            }
            _ => self.motor_ctrl.stop(motor),
        };

        if let Err(e) = result {
            warn!("Manual aim command on {:?} failed: {}", motor, e);
            self.report.record(Fault::Actuation(motor));
        }
    }

    fn x_position(&self, snapshot: &InputSnapshot) -> AxisPosition {
        self.params.x_deadzone.classify(snapshot.joystick.x_raw)
    }

    fn y_position(&self, snapshot: &InputSnapshot) -> AxisPosition {
        self.params.y_deadzone.classify(snapshot.joystick.y_raw)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::motor_ctrl::{Commanded, MotorCtrlParams};
    use hw_if::eqpt::PinLevel;
    use hw_if::sim::SimRig;
    use std::sync::mpsc::{sync_channel, Receiver};

    struct Fixture {
        rig: SimRig,
        arb: Arbitration,
        state: Arc<ControlState>,
        motor_ctrl: Arc<MotorCtrl>,
        launch_trigger: Arc<Trigger>,
        random_trigger: Arc<Trigger>,
        aux_receiver: Receiver<u16>,
    }

    fn fixture() -> Fixture {
        let params = ArbitrationParams::default();
        let rig = SimRig::new(
            params.x_deadzone.neutral(),
            params.y_deadzone.neutral(),
        );

        let state = Arc::new(ControlState::new());
        let motor_ctrl = Arc::new(MotorCtrl::new(
            Box::new(rig.motors()),
            &MotorCtrlParams::default(),
        ));
        let launch_trigger = Arc::new(Trigger::new());
        let random_trigger = Arc::new(Trigger::new());
        let (aux_sender, aux_receiver) = sync_channel(8);

        let arb = Arbitration::new(
            params,
            state.clone(),
            motor_ctrl.clone(),
            Arc::new(rig.inputs()),
            launch_trigger.clone(),
            random_trigger.clone(),
            aux_sender,
            Arc::new(SupReport::new()),
        );

        Fixture {
            rig,
            arb,
            state,
            motor_ctrl,
            launch_trigger,
            random_trigger,
            aux_receiver,
        }
    }

    fn step(f: &Fixture) {
        let snapshot = InputSnapshot::capture(&f.rig.inputs());
        f.arb.step(&snapshot);
    }

    #[test]
    fn test_launch_takes_priority_over_random() {
        let f = fixture();

        // Both buttons pressed, carriage home
        f.rig.set_button(Button::Launch, PinLevel::Low);
        f.rig.set_button(Button::Random, PinLevel::Low);
        f.rig.set_limit_switch(LimitSwitch::LaunchHome, PinLevel::Low);

        step(&f);

        assert_eq!(f.state.read(), Mode::Launching);
        assert!(f.launch_trigger.wait_timeout(Duration::from_millis(10)));
        assert!(!f.random_trigger.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_launch_needs_carriage_home() {
        let f = fixture();

        // Button pressed but carriage not home: random wins nothing either,
        // mode stays idle
        f.rig.set_button(Button::Launch, PinLevel::Low);

        step(&f);

        assert_eq!(f.state.read(), Mode::Idle);
        assert!(!f.launch_trigger.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_joystick_enters_and_leaves_manual_aim() {
        let f = fixture();

        // Deflect X below its low threshold
        f.rig.set_joystick(1000, f.arb.params.y_deadzone.neutral());
        step(&f);
        assert_eq!(f.state.read(), Mode::ManualAim);

        // Next cycle drives the X channel forward
        step(&f);
        assert_eq!(f.motor_ctrl.commanded(MotorId::AimX), Commanded::Forward);
        assert_eq!(f.motor_ctrl.commanded(MotorId::AimY), Commanded::Stopped);

        // Stick back to neutral: channel stops, mode returns to idle
        f.rig.set_joystick(
            f.arb.params.x_deadzone.neutral(),
            f.arb.params.y_deadzone.neutral(),
        );
        step(&f);
        assert_eq!(f.motor_ctrl.commanded(MotorId::AimX), Commanded::Stopped);
        assert_eq!(f.state.read(), Mode::Idle);
    }

    #[test]
    fn test_manual_aim_respects_travel_limit() {
        let f = fixture();

        // X deflected but its outward travel limit is already reached
        f.rig.set_limit_switch(LimitSwitch::AimXOut, PinLevel::Low);
        f.rig.set_joystick(1000, f.arb.params.y_deadzone.neutral());

        step(&f); // enter manual aim
        step(&f); // evaluate axes

        assert_eq!(f.motor_ctrl.commanded(MotorId::AimX), Commanded::Stopped);
        assert_eq!(f.state.read(), Mode::ManualAim);
    }

    #[test]
    fn test_aux_forwarded_and_dropped_on_overflow() {
        let f = fixture();
        f.rig.set_aux(2048);

        // Queue depth is 8: more steps than that must not block
        for _ in 0..20 {
            step(&f);
        }

        assert_eq!(f.aux_receiver.try_recv(), Ok(2048));
    }

    #[test]
    fn test_no_actuation_while_launching() {
        let f = fixture();
        assert!(f.state.try_enter(Mode::Idle, Mode::Launching));

        f.rig.set_joystick(1000, 1000);
        step(&f);

        assert_eq!(f.motor_ctrl.commanded(MotorId::AimX), Commanded::Stopped);
        assert_eq!(f.motor_ctrl.commanded(MotorId::AimY), Commanded::Stopped);
        assert_eq!(f.rig.command_count(), 0);
        assert_eq!(f.state.read(), Mode::Launching);
    }
}
