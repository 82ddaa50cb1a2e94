//! Main supervisor executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise the equipment (motor driver, input sampler, display)
//!     - Start the supervisor tasks:
//!         - Input scan and mode arbitration
//!         - Launch sequence
//!         - Random exercise
//!         - Display forwarding
//!     - Hand control to the scheduler indefinitely
//!
//! On hosts without the rig hardware the executable runs against the
//! simulated rig, which is also what the integration tests use.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::info;
use std::sync::Arc;

// Internal
use hw_if::sim::SimRig;
use sup_lib::{params::SupExecParams, supervisor::Supervisor};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("sup_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Launch Rig Supervisor Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: SupExecParams =
        util::params::load("sup_exec.toml").wrap_err("Could not load supervisor params")?;

    info!("Parameters loaded");

    // ---- EQUIPMENT INITIALISATION ----

    // The sim rig provides the inputs and the display on every target; on
    // the rig's Pi it is replaced channel-by-channel as the hardware
    // backends come online.
    let rig = SimRig::new(
        params.arbitration.x_deadzone.neutral(),
        params.arbitration.y_deadzone.neutral(),
    );

    let motor_driver = build_motor_driver(&rig, &params)?;

    info!("Equipment initialised");

    // ---- START SUPERVISOR ----

    let supervisor = Supervisor::start(
        motor_driver,
        Arc::new(rig.inputs()),
        Box::new(rig.display()),
        params,
    )
    .wrap_err("Failed to start the supervisor")?;

    info!("Initialisation complete, supervisor running");

    supervisor.wait();

    Ok(())
}

/// Build the motor driver backend for this target.
#[cfg(target_arch = "arm")]
fn build_motor_driver(
    _rig: &SimRig,
    params: &SupExecParams,
) -> Result<Box<dyn hw_if::eqpt::MotorDriver>> {
    use color_eyre::eyre::eyre;

    // TODO: rppal GPIO/ADC backends for the input sampler and the display,
    // so the sim rig can come out of the loop entirely on hardware.
    let i2c = rppal::i2c::I2c::new().wrap_err("Failed to open the I2C bus")?;

    let bridge =
        hw_if::pca9685::Pca9685HBridge::new(i2c, params.hbridge.i2c_address, params.hbridge)
            .map_err(|e| eyre!("Failed to initialise the PCA9685 H-bridge: {}", e))?;

    info!("PCA9685 H-bridge backend initialised");
    Ok(Box::new(bridge))
}

/// Build the motor driver backend for this target.
#[cfg(not(target_arch = "arm"))]
fn build_motor_driver(
    rig: &SimRig,
    _params: &SupExecParams,
) -> Result<Box<dyn hw_if::eqpt::MotorDriver>> {
    info!("No rig hardware on this target, using the simulated motor driver");
    Ok(Box::new(rig.motors()))
}
