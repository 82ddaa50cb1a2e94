//! The shared control mode cell
//!
//! The mode is the single point of truth for which task currently holds
//! exclusive authority over motor commands. The raw mode field is never
//! exposed; every read-modify-write crosses the cell's lock, so no two tasks
//! can ever believe they own a non-idle mode at the same time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Serialize;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The supervisor's operating mode.
///
/// At most one mode is active system-wide at any instant. Only the
/// arbitration task transitions out of `Idle`; the launch and random tasks
/// transition out of their own mode when their run completes.
#[derive(Serialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum Mode {
    /// No task is driving any motor.
    Idle,

    /// The arbitration task is driving the aim channels from the joystick.
    ManualAim,

    /// The launch task owns the launch channel.
    Launching,

    /// The random exercise task owns both aim channels.
    RandomExercise,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Mutually-exclusive cell holding the current supervisor mode.
pub struct ControlState {
    mode: Mutex<Mode>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControlState {
    /// Create a new cell in `Idle`.
    pub fn new() -> Self {
        ControlState {
            mode: Mutex::new(Mode::Idle),
        }
    }

    /// Atomically transition from `from` to `to`.
    ///
    /// Succeeds only if the current mode is exactly `from`, returning whether
    /// the transition occurred. Used both for entry out of `Idle` and for the
    /// random-to-launch chain handoff.
    pub fn try_enter(&self, from: Mode, to: Mode) -> bool {
        let mut mode = self.mode.lock().unwrap();

        if *mode == from {
            info!("Mode transition: {:?} -> {:?}", from, to);
            *mode = to;
            true
        } else {
            debug!(
                "Mode transition {:?} -> {:?} refused, current mode is {:?}",
                from, to, *mode
            );
            false
        }
    }

    /// Current mode, without blocking on anything but the cell's own lock.
    pub fn read(&self) -> Mode {
        *self.mode.lock().unwrap()
    }

    /// Unconditionally reset to `Idle`.
    ///
    /// Only the owner of the currently active non-idle mode may call this.
    pub fn return_to_idle(&self) {
        let mut mode = self.mode.lock().unwrap();

        if *mode != Mode::Idle {
            info!("Mode transition: {:?} -> Idle", *mode);
        }
        *mode = Mode::Idle;
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_try_enter_requires_source_mode() {
        let state = ControlState::new();
        assert_eq!(state.read(), Mode::Idle);

        assert!(state.try_enter(Mode::Idle, Mode::ManualAim));
        assert_eq!(state.read(), Mode::ManualAim);

        // Can't enter launching from manual aim
        assert!(!state.try_enter(Mode::Idle, Mode::Launching));
        assert_eq!(state.read(), Mode::ManualAim);

        assert!(state.try_enter(Mode::ManualAim, Mode::Idle));
        assert_eq!(state.read(), Mode::Idle);
    }

    #[test]
    fn test_concurrent_entry_has_one_winner() {
        let state = Arc::new(ControlState::new());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let state = state.clone();
                thread::spawn(move || state.try_enter(Mode::Idle, Mode::Launching))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(state.read(), Mode::Launching);
    }

    #[test]
    fn test_return_to_idle_is_unconditional() {
        let state = ControlState::new();

        assert!(state.try_enter(Mode::Idle, Mode::RandomExercise));
        state.return_to_idle();
        assert_eq!(state.read(), Mode::Idle);

        // Idempotent
        state.return_to_idle();
        assert_eq!(state.read(), Mode::Idle);
    }
}
