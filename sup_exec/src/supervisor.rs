//! Task wiring and lifecycle
//!
//! Builds all shared state at startup (mode cell, triggers, motor
//! supervisor, fault report, display queue), spawns the four supervisor
//! tasks plus the display task, and offers a cooperative shutdown used by
//! the integration tests.
//!
//! Motor ownership is structural: the launch task only ever touches the
//! launch channel, manual aim and the random exercise only touch the two aim
//! channels, and the latter two are mutually exclusive through the mode
//! cell. No per-channel lock is needed on top of that.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

// Internal
use hw_if::eqpt::{Display, InputSampler, MotorDriver};

use crate::arbitration::Arbitration;
use crate::control_state::ControlState;
use crate::display_fwd::{DisplayFwd, AUX_QUEUE_DEPTH};
use crate::launch_ctrl::LaunchCtrl;
use crate::motor_ctrl::MotorCtrl;
use crate::params::SupExecParams;
use crate::random_ctrl::RandomCtrl;
use crate::report::SupReport;
use crate::signals::Trigger;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while starting the supervisor.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("Could not spawn the {0} task: {1}")]
    SpawnError(&'static str, std::io::Error),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Handle on the running supervisor.
pub struct Supervisor {
    control_state: Arc<ControlState>,
    motor_ctrl: Arc<MotorCtrl>,
    report: Arc<SupReport>,

    stop: Arc<AtomicBool>,
    tasks: Vec<JoinHandle<()>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Supervisor {
    /// Build the shared state and spawn all tasks.
    pub fn start(
        driver: Box<dyn MotorDriver>,
        sampler: Arc<dyn InputSampler>,
        display: Box<dyn Display>,
        params: SupExecParams,
    ) -> Result<Self, SupervisorError> {
        let control_state = Arc::new(ControlState::new());
        let motor_ctrl = Arc::new(MotorCtrl::new(driver, &params.motor_ctrl));
        let report = Arc::new(SupReport::new());
        let launch_trigger = Arc::new(Trigger::new());
        let random_trigger = Arc::new(Trigger::new());
        let (aux_sender, aux_receiver) = sync_channel(AUX_QUEUE_DEPTH);

        let stop = Arc::new(AtomicBool::new(false));
        let mut tasks = Vec::with_capacity(4);

        // Arbitration task
        let arbitration = Arbitration::new(
            params.arbitration,
            control_state.clone(),
            motor_ctrl.clone(),
            sampler.clone(),
            launch_trigger.clone(),
            random_trigger.clone(),
            aux_sender,
            report.clone(),
        );
        tasks.push(spawn_task("arbitration", stop.clone(), move |stop| {
            arbitration.run(&stop)
        })?);

        // Launch sequence task
        let launch_ctrl = LaunchCtrl::new(
            params.launch,
            control_state.clone(),
            motor_ctrl.clone(),
            sampler.clone(),
            launch_trigger.clone(),
            report.clone(),
        );
        tasks.push(spawn_task("launch_ctrl", stop.clone(), move |stop| {
            launch_ctrl.run(&stop)
        })?);

        // Random exercise task
        let random_ctrl = RandomCtrl::new(
            params.random,
            control_state.clone(),
            motor_ctrl.clone(),
            sampler,
            random_trigger,
            launch_trigger,
            report.clone(),
        );
        tasks.push(spawn_task("random_ctrl", stop.clone(), move |stop| {
            random_ctrl.run(&stop)
        })?);

        // Display task
        let mut display_fwd = DisplayFwd::new(aux_receiver, display);
        tasks.push(spawn_task("display_fwd", stop.clone(), move |stop| {
            display_fwd.run(&stop)
        })?);

        info!("All supervisor tasks running");

        Ok(Supervisor {
            control_state,
            motor_ctrl,
            report,
            stop,
            tasks,
        })
    }

    /// The shared mode cell.
    pub fn control_state(&self) -> Arc<ControlState> {
        self.control_state.clone()
    }

    /// The shared motor channel supervisor.
    pub fn motor_ctrl(&self) -> Arc<MotorCtrl> {
        self.motor_ctrl.clone()
    }

    /// The shared fault report.
    pub fn report(&self) -> Arc<SupReport> {
        self.report.clone()
    }

    /// Block until the tasks exit, which they only do on shutdown.
    pub fn wait(mut self) {
        for task in self.tasks.drain(..) {
            let _ = task.join();
        }
    }

    /// Cooperative shutdown: flag all tasks, then join them.
    pub fn stop(mut self) {
        info!("Supervisor shutting down");
        self.stop.store(true, Ordering::Relaxed);
        for task in self.tasks.drain(..) {
            let _ = task.join();
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn spawn_task<F>(
    name: &'static str,
    stop: Arc<AtomicBool>,
    body: F,
) -> Result<JoinHandle<()>, SupervisorError>
where
    F: FnOnce(Arc<AtomicBool>) + Send + 'static,
{
    thread::Builder::new()
        .name(name.into())
        .spawn(move || body(stop))
        .map_err(|e| SupervisorError::SpawnError(name, e))
}
