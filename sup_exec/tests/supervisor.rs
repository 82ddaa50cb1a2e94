//! End-to-end supervisor tests against the simulated rig.
//!
//! These spawn the full task set with shortened timings and play out the
//! rig-side events (button presses, limit switches asserting as the
//! mechanics move) while observing modes and motor commands.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hw_if::eqpt::{Button, LimitSwitch, MotorDirection, MotorId, PinLevel};
use hw_if::sim::{SimCommand, SimRig};

use sup_lib::control_state::Mode;
use sup_lib::launch_ctrl::LaunchPhase;
use sup_lib::motor_ctrl::Commanded;
use sup_lib::params::SupExecParams;
use sup_lib::report::Fault;
use sup_lib::supervisor::Supervisor;

/// Shortened timings so the scenarios play out in tens of milliseconds.
fn fast_params() -> SupExecParams {
    let mut params = SupExecParams::default();
    params.arbitration.cycle_period_ms = 10;
    params.launch.ceiling_ms = 2_000;
    params.launch.poll_ms = 5;
    params.launch.settle_ms = 20;
    params.random.window_ms = 400;
    params.random.step_min_ms = 30;
    params.random.step_max_ms = 60;
    params
}

fn start(params: SupExecParams) -> (SimRig, Supervisor) {
    let rig = SimRig::new(
        params.arbitration.x_deadzone.neutral(),
        params.arbitration.y_deadzone.neutral(),
    );

    let supervisor = Supervisor::start(
        Box::new(rig.motors()),
        Arc::new(rig.inputs()),
        Box::new(rig.display()),
        params,
    )
    .unwrap();

    (rig, supervisor)
}

/// Poll `cond` until it holds or `timeout_ms` elapses.
fn wait_for<F: Fn() -> bool>(cond: F, timeout_ms: u64) -> bool {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn launch_sequence_end_to_end() {
    let (rig, supervisor) = start(fast_params());
    let state = supervisor.control_state();
    let motors = supervisor.motor_ctrl();

    // Carriage home, launch button pressed
    rig.set_limit_switch(LimitSwitch::LaunchHome, PinLevel::Low);
    rig.set_button(Button::Launch, PinLevel::Low);

    assert!(wait_for(|| state.read() == Mode::Launching, 500));
    rig.set_button(Button::Launch, PinLevel::High);

    // Drive out phase
    assert!(wait_for(
        || motors.commanded(MotorId::Launch) == Commanded::Forward,
        500
    ));
    rig.set_limit_switch(LimitSwitch::LaunchHome, PinLevel::High);

    // Carriage reaches the out switch
    thread::sleep(Duration::from_millis(100));
    rig.set_limit_switch(LimitSwitch::LaunchOut, PinLevel::Low);

    // Drive back phase after the settle delay
    assert!(wait_for(
        || motors.commanded(MotorId::Launch) == Commanded::Reverse,
        500
    ));
    rig.set_limit_switch(LimitSwitch::LaunchOut, PinLevel::High);

    // Carriage reaches home again
    thread::sleep(Duration::from_millis(60));
    rig.set_limit_switch(LimitSwitch::LaunchHome, PinLevel::Low);

    assert!(wait_for(|| state.read() == Mode::Idle, 500));
    assert_eq!(motors.commanded(MotorId::Launch), Commanded::Stopped);
    assert_eq!(supervisor.report().fault_count(), 0);

    supervisor.stop();
}

#[test]
fn manual_aim_drives_and_releases() {
    let params = fast_params();
    let x_neutral = params.arbitration.x_deadzone.neutral();
    let y_neutral = params.arbitration.y_deadzone.neutral();
    let (rig, supervisor) = start(params);
    let state = supervisor.control_state();
    let motors = supervisor.motor_ctrl();

    // X below its low threshold, Y neutral, limits clear
    rig.set_joystick(1000, y_neutral);

    assert!(wait_for(|| state.read() == Mode::ManualAim, 500));
    assert!(wait_for(
        || motors.commanded(MotorId::AimX) == Commanded::Forward,
        500
    ));

    // The command is re-issued on every scan cycle while the stick is held
    let drives = |log: &[SimCommand]| {
        log.iter()
            .filter(|c| matches!(c, SimCommand::Drive(MotorId::AimX, MotorDirection::Forward)))
            .count()
    };
    let before = drives(&rig.command_log());
    thread::sleep(Duration::from_millis(80));
    assert!(drives(&rig.command_log()) > before);

    // Stick returns to neutral
    rig.set_joystick(x_neutral, y_neutral);

    assert!(wait_for(
        || motors.commanded(MotorId::AimX) == Commanded::Stopped,
        500
    ));
    assert!(wait_for(|| state.read() == Mode::Idle, 500));

    supervisor.stop();
}

#[test]
fn random_exercise_chains_into_one_launch() {
    let (rig, supervisor) = start(fast_params());
    let state = supervisor.control_state();
    let motors = supervisor.motor_ctrl();

    rig.set_button(Button::Random, PinLevel::Low);
    assert!(wait_for(|| state.read() == Mode::RandomExercise, 500));
    rig.set_button(Button::Random, PinLevel::High);

    // After the window both aim motors are stopped and the launch has been
    // triggered
    assert!(wait_for(|| state.read() == Mode::Launching, 1_500));
    assert_eq!(motors.commanded(MotorId::AimX), Commanded::Stopped);
    assert_eq!(motors.commanded(MotorId::AimY), Commanded::Stopped);

    // Play the launch out to completion
    assert!(wait_for(
        || motors.commanded(MotorId::Launch) == Commanded::Forward,
        500
    ));
    rig.set_limit_switch(LimitSwitch::LaunchOut, PinLevel::Low);
    assert!(wait_for(
        || motors.commanded(MotorId::Launch) == Commanded::Reverse,
        500
    ));
    rig.set_limit_switch(LimitSwitch::LaunchOut, PinLevel::High);
    rig.set_limit_switch(LimitSwitch::LaunchHome, PinLevel::Low);
    assert!(wait_for(|| state.read() == Mode::Idle, 500));

    // The chain raised the launch trigger exactly once: one outbound stroke
    let launches = rig
        .command_log()
        .iter()
        .filter(|c| matches!(c, SimCommand::Drive(MotorId::Launch, MotorDirection::Forward)))
        .count();
    assert_eq!(launches, 1);

    supervisor.stop();
}

#[test]
fn launch_stall_is_reported_as_fault() {
    let mut params = fast_params();
    params.launch.ceiling_ms = 150;
    let (rig, supervisor) = start(params);
    let state = supervisor.control_state();
    let motors = supervisor.motor_ctrl();
    let report = supervisor.report();

    rig.set_limit_switch(LimitSwitch::LaunchHome, PinLevel::Low);
    rig.set_button(Button::Launch, PinLevel::Low);
    assert!(wait_for(|| state.read() == Mode::Launching, 500));
    rig.set_button(Button::Launch, PinLevel::High);

    // The out switch never asserts: the ceiling stops the motor and the
    // stall is surfaced instead of silently succeeding
    assert!(wait_for(
        || report.last_fault() == Some(Fault::LaunchStall(LaunchPhase::DriveOut)),
        2_000
    ));
    assert!(wait_for(|| state.read() == Mode::Idle, 500));
    assert_eq!(motors.commanded(MotorId::Launch), Commanded::Stopped);
    assert_eq!(report.fault_count(), 1);

    supervisor.stop();
}

#[test]
fn aux_readings_reach_the_display() {
    let (rig, supervisor) = start(fast_params());

    // Full scale pot reading renders as 30.0 m/s
    rig.set_aux(4095);
    assert!(wait_for(
        || rig.display_value().map(|(value, _)| value) == Some(300),
        500
    ));

    supervisor.stop();
}
