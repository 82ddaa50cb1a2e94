//! One-shot wake-up signals between tasks
//!
//! A [`Trigger`] hands control from the arbitration task to the launch or
//! random task without polling: the owning task blocks on the trigger, the
//! arbitration task raises it. Raising an already-raised trigger is a no-op,
//! and a wake-up consumes the signal.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Condvar, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A one-shot binary signal.
pub struct Trigger {
    raised: Mutex<bool>,
    condvar: Condvar,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trigger {
    /// Create a new, unraised trigger.
    pub fn new() -> Self {
        Trigger {
            raised: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Raise the trigger, waking one waiter.
    pub fn raise(&self) {
        let mut raised = self.raised.lock().unwrap();
        *raised = true;
        self.condvar.notify_one();
    }

    /// Block until the trigger is raised or `timeout` elapses.
    ///
    /// Returns true if the trigger was raised, consuming the signal. Waits
    /// are bounded so task loops can periodically observe their shutdown
    /// flag.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let raised = self.raised.lock().unwrap();

        let (mut raised, _) = self
            .condvar
            .wait_timeout_while(raised, timeout, |raised| !*raised)
            .unwrap();

        if *raised {
            *raised = false;
            true
        } else {
            false
        }
    }
}

impl Default for Trigger {
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
    fn test_wait_times_out_when_unraised() {
        let trigger = Trigger::new();
        assert!(!trigger.wait_timeout(Duration::from_millis(20)));
    }

    #[test]
    fn test_raise_wakes_waiter_and_is_consumed() {
        let trigger = Arc::new(Trigger::new());

        let waiter = {
            let trigger = trigger.clone();
            thread::spawn(move || trigger.wait_timeout(Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(20));
        trigger.raise();

        assert!(waiter.join().unwrap());

        // The wake consumed the signal
        assert!(!trigger.wait_timeout(Duration::from_millis(20)));
    }

    #[test]
    fn test_double_raise_is_one_signal() {
        let trigger = Trigger::new();

        trigger.raise();
        trigger.raise();

        assert!(trigger.wait_timeout(Duration::from_millis(20)));
        assert!(!trigger.wait_timeout(Duration::from_millis(20)));
    }
}
