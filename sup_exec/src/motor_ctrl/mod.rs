//! Motor channel supervisor
//!
//! [`MotorCtrl`] owns the H-bridge driver and exposes the three public
//! operations on each channel: `drive`, `drive_for` and `stop`. Each channel
//! carries a generation counter which is bumped, under the channel lock, by
//! every command; a scheduled auto-stop records the generation it was issued
//! against and fires only if the channel has not been commanded since. This
//! makes cancel-and-reschedule a single atomic replace, so a stale timer can
//! never undo a later command.
//!
//! Channel command serialization across tasks is structural (mode ownership),
//! not enforced here. The only concurrent writer to a channel is its own
//! auto-stop, and `stop` is idempotent, so a stop that fires in the window
//! between supersession checks is harmless.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod sched;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// Internal
use hw_if::eqpt::{MotorDirection, MotorDriver, MotorDriverError, MotorId, NUM_MOTORS};

pub use params::MotorCtrlParams;
use sched::SchedMsg;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The commanded state of a motor channel.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Commanded {
    Forward,
    Reverse,
    Stopped,
}

/// Possible errors that can occur during MotorCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum MotorCtrlError {
    /// The peripheral rejected a runtime command. The channel has been forced
    /// to stopped; the command is not retried (retrying a jammed actuator is
    /// unsafe without limit-switch confirmation).
    #[error("Driver fault on {0:?}: {1}")]
    DriverFault(MotorId, MotorDriverError),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Supervisor for the three motor channels.
pub struct MotorCtrl {
    inner: Arc<Inner>,

    sched_sender: Sender<SchedMsg>,
    sched_handle: Option<JoinHandle<()>>,
}

pub(crate) struct Inner {
    driver: Mutex<Box<dyn MotorDriver>>,
    channels: [Mutex<ChannelState>; NUM_MOTORS],
    duty_percent: f64,
}

struct ChannelState {
    commanded: Commanded,

    /// Bumped by every command. A pending auto-stop is implicitly cancelled
    /// when the generation it recorded is no longer current.
    generation: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotorCtrl {
    /// Create the supervisor over an initialised driver and start the
    /// auto-stop scheduler thread.
    pub fn new(driver: Box<dyn MotorDriver>, params: &MotorCtrlParams) -> Self {
        let inner = Arc::new(Inner {
            driver: Mutex::new(driver),
            channels: [
                Mutex::new(ChannelState::new()),
                Mutex::new(ChannelState::new()),
                Mutex::new(ChannelState::new()),
            ],
            duty_percent: params.duty_percent,
        });

        let (sched_sender, sched_receiver) = channel();

        let sched_handle = {
            let inner = inner.clone();
            thread::spawn(move || sched::sched_thread(inner, sched_receiver))
        };

        MotorCtrl {
            inner,
            sched_sender,
            sched_handle: Some(sched_handle),
        }
    }

    /// Command continuous rotation on a channel.
    ///
    /// Cancels any pending auto-stop on that channel.
    pub fn drive(&self, motor: MotorId, direction: MotorDirection) -> Result<(), MotorCtrlError> {
        let mut channel = self.lock_channel(motor);
        channel.generation += 1;

        self.inner.command_drive(&mut channel, motor, direction)
    }

    /// Command rotation on a channel with a one-shot auto-stop after
    /// `duration`, unless superseded by a later command first.
    pub fn drive_for(
        &self,
        motor: MotorId,
        direction: MotorDirection,
        duration: Duration,
    ) -> Result<(), MotorCtrlError> {
        let mut channel = self.lock_channel(motor);
        channel.generation += 1;
        let generation = channel.generation;

        self.inner.command_drive(&mut channel, motor, direction)?;

        trace!(
            "Auto-stop scheduled for {:?} in {} ms",
            motor,
            duration.as_millis()
        );
        if self
            .sched_sender
            .send(SchedMsg::Schedule {
                motor,
                generation,
                deadline: Instant::now() + duration,
            })
            .is_err()
        {
            warn!("Auto-stop scheduler is gone, {:?} not protected", motor);
        }

        Ok(())
    }

    /// Force a channel to the braking/neutral state.
    ///
    /// Idempotent; always safe to call. Cancels any pending auto-stop.
    pub fn stop(&self, motor: MotorId) -> Result<(), MotorCtrlError> {
        let mut channel = self.lock_channel(motor);
        channel.generation += 1;

        self.inner.command_stop(&mut channel, motor)
    }

    /// The current commanded state of a channel.
    pub fn commanded(&self, motor: MotorId) -> Commanded {
        self.lock_channel(motor).commanded
    }

    fn lock_channel(&self, motor: MotorId) -> MutexGuard<'_, ChannelState> {
        self.inner.channels[motor.index()].lock().unwrap()
    }
}

impl Drop for MotorCtrl {
    fn drop(&mut self) {
        let _ = self.sched_sender.send(SchedMsg::Shutdown);
        if let Some(handle) = self.sched_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Inner {
    /// Commutate the driver, updating the channel's commanded state.
    ///
    /// On a driver fault the channel is forced to stopped and the fault is
    /// surfaced to the calling task.
    fn command_drive(
        &self,
        channel: &mut ChannelState,
        motor: MotorId,
        direction: MotorDirection,
    ) -> Result<(), MotorCtrlError> {
        match self
            .driver
            .lock()
            .unwrap()
            .drive(motor, direction, self.duty_percent)
        {
            Ok(()) => {
                channel.commanded = direction.into();
                Ok(())
            }
            Err(e) => {
                warn!("{:?} rejected drive command, forcing stop: {}", motor, e);
                if let Err(brake_err) = self.driver.lock().unwrap().brake(motor) {
                    warn!("{:?} also rejected brake: {}", motor, brake_err);
                }
                channel.commanded = Commanded::Stopped;
                Err(MotorCtrlError::DriverFault(motor, e))
            }
        }
    }

    /// Brake the channel, updating its commanded state.
    fn command_stop(
        &self,
        channel: &mut ChannelState,
        motor: MotorId,
    ) -> Result<(), MotorCtrlError> {
        channel.commanded = Commanded::Stopped;

        self.driver
            .lock()
            .unwrap()
            .brake(motor)
            .map_err(|e| MotorCtrlError::DriverFault(motor, e))
    }

    /// Called by the scheduler thread when an auto-stop deadline expires.
    ///
    /// Re-validates the generation under the channel lock: if the channel has
    /// been commanded since the stop was scheduled this is a no-op.
    fn fire_auto_stop(&self, motor: MotorId, generation: u64) {
        let mut channel = self.channels[motor.index()].lock().unwrap();

        if channel.generation != generation {
            trace!("Auto-stop for {:?} superseded, ignoring", motor);
            return;
        }

        debug!("Auto-stop expired, stopping {:?}", motor);
        if let Err(e) = self.command_stop(&mut channel, motor) {
            warn!("Auto-stop for {:?} failed: {}", motor, e);
        }
    }
}

impl ChannelState {
    fn new() -> Self {
        ChannelState {
            commanded: Commanded::Stopped,
            generation: 0,
        }
    }
}

impl From<MotorDirection> for Commanded {
    fn from(direction: MotorDirection) -> Self {
        match direction {
            MotorDirection::Forward => Commanded::Forward,
            MotorDirection::Reverse => Commanded::Reverse,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use hw_if::sim::{SimCommand, SimRig};

    fn make_ctrl(rig: &SimRig) -> MotorCtrl {
        MotorCtrl::new(Box::new(rig.motors()), &MotorCtrlParams::default())
    }

    #[test]
    fn test_last_command_wins() {
        let rig = SimRig::new(1550, 1350);
        let ctrl = make_ctrl(&rig);

        ctrl.drive(MotorId::AimX, MotorDirection::Forward).unwrap();
        ctrl.drive_for(
            MotorId::AimX,
            MotorDirection::Reverse,
            Duration::from_secs(10),
        )
        .unwrap();
        ctrl.drive(MotorId::AimX, MotorDirection::Forward).unwrap();

        assert_eq!(ctrl.commanded(MotorId::AimX), Commanded::Forward);
        assert_eq!(
            rig.motor(MotorId::AimX).direction,
            Some(MotorDirection::Forward)
        );
    }

    #[test]
    fn test_auto_stop_fires_after_duration() {
        let rig = SimRig::new(1550, 1350);
        let ctrl = make_ctrl(&rig);

        ctrl.drive_for(
            MotorId::Launch,
            MotorDirection::Forward,
            Duration::from_millis(50),
        )
        .unwrap();
        assert_eq!(ctrl.commanded(MotorId::Launch), Commanded::Forward);

        thread::sleep(Duration::from_millis(150));

        assert_eq!(ctrl.commanded(MotorId::Launch), Commanded::Stopped);
        assert_eq!(rig.motor(MotorId::Launch).direction, None);
    }

    #[test]
    fn test_stop_cancels_pending_auto_stop() {
        let rig = SimRig::new(1550, 1350);
        let ctrl = make_ctrl(&rig);

        ctrl.drive_for(
            MotorId::AimY,
            MotorDirection::Forward,
            Duration::from_millis(100),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(10));
        ctrl.stop(MotorId::AimY).unwrap();

        let commands_after_stop = rig.command_count();

        // Past the original deadline: the superseded stop must not have fired
        thread::sleep(Duration::from_millis(200));
        assert_eq!(rig.command_count(), commands_after_stop);
        assert_eq!(ctrl.commanded(MotorId::AimY), Commanded::Stopped);
    }

    #[test]
    fn test_reschedule_replaces_pending_deadline() {
        let rig = SimRig::new(1550, 1350);
        let ctrl = make_ctrl(&rig);

        ctrl.drive_for(
            MotorId::AimX,
            MotorDirection::Forward,
            Duration::from_millis(50),
        )
        .unwrap();
        thread::sleep(Duration::from_millis(20));
        ctrl.drive_for(
            MotorId::AimX,
            MotorDirection::Forward,
            Duration::from_millis(200),
        )
        .unwrap();

        // The first deadline has passed but was superseded
        thread::sleep(Duration::from_millis(80));
        assert_eq!(ctrl.commanded(MotorId::AimX), Commanded::Forward);

        // The replacement deadline stops the channel, exactly once
        thread::sleep(Duration::from_millis(250));
        assert_eq!(ctrl.commanded(MotorId::AimX), Commanded::Stopped);

        let brakes = rig
            .command_log()
            .iter()
            .filter(|c| matches!(c, SimCommand::Brake(MotorId::AimX)))
            .count();
        assert_eq!(brakes, 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let rig = SimRig::new(1550, 1350);
        let ctrl = make_ctrl(&rig);

        ctrl.drive(MotorId::Launch, MotorDirection::Reverse).unwrap();

        ctrl.stop(MotorId::Launch).unwrap();
        let state_once = rig.motor(MotorId::Launch);
        let commanded_once = ctrl.commanded(MotorId::Launch);

        ctrl.stop(MotorId::Launch).unwrap();
        assert_eq!(rig.motor(MotorId::Launch), state_once);
        assert_eq!(ctrl.commanded(MotorId::Launch), commanded_once);
        assert_eq!(commanded_once, Commanded::Stopped);
    }
}
