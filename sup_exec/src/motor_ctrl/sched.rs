//! Auto-stop scheduler thread
//!
//! One background thread holds at most one pending stop per channel.
//! Scheduling a stop for a channel replaces that channel's pending entry in
//! a single step; expiry re-validates the recorded generation under the
//! channel lock before braking, so a superseded entry is a no-op.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hw_if::eqpt::{MotorId, NUM_MOTORS};

use super::Inner;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Receive timeout used when no stop is pending.
const IDLE_WAIT: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Messages to the scheduler thread.
pub(super) enum SchedMsg {
    /// Replace the channel's pending stop with one at `deadline`, valid only
    /// while `generation` is the channel's current generation.
    Schedule {
        motor: MotorId,
        generation: u64,
        deadline: Instant,
    },

    /// The supervisor is shutting down.
    Shutdown,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

pub(super) fn sched_thread(inner: Arc<Inner>, receiver: Receiver<SchedMsg>) {
    let mut pending: [Option<(u64, Instant)>; NUM_MOTORS] = [None; NUM_MOTORS];

    loop {
        // Fire any due entries
        let now = Instant::now();
        for (index, slot) in pending.iter_mut().enumerate() {
            if let Some((generation, deadline)) = *slot {
                if deadline <= now {
                    *slot = None;
                    inner.fire_auto_stop(MotorId::ALL[index], generation);
                }
            }
        }

        // Sleep until the nearest remaining deadline or the next message
        let timeout = pending
            .iter()
            .flatten()
            .map(|(_, deadline)| deadline.saturating_duration_since(now))
            .min()
            .unwrap_or(IDLE_WAIT);

        match receiver.recv_timeout(timeout) {
            Ok(SchedMsg::Schedule {
                motor,
                generation,
                deadline,
            }) => {
                // Atomic replace of the channel's pending stop
                pending[motor.index()] = Some((generation, deadline));
            }
            Ok(SchedMsg::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                trace!("Auto-stop scheduler exiting");
                break;
            }
            Err(RecvTimeoutError::Timeout) => (),
        }
    }
}
