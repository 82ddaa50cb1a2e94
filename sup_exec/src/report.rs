//! Shared fault reporting
//!
//! Faults which the owning task cannot handle beyond stopping the motor are
//! recorded here so the rest of the system (and the tests) can observe them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use std::sync::Mutex;

use hw_if::eqpt::MotorId;

use crate::launch_ctrl::LaunchPhase;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Fault conditions recorded by the supervisor tasks.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Fault {
    /// A launch phase's limit switch never asserted before the safety
    /// ceiling expired. The motor was stopped by the ceiling, not by the
    /// switch.
    LaunchStall(LaunchPhase),

    /// A runtime motor command was rejected by the peripheral and the
    /// channel was forced to stopped.
    Actuation(MotorId),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shared fault record.
pub struct SupReport {
    inner: Mutex<ReportInner>,
}

#[derive(Default)]
struct ReportInner {
    last_fault: Option<Fault>,
    fault_count: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SupReport {
    pub fn new() -> Self {
        SupReport {
            inner: Mutex::new(ReportInner::default()),
        }
    }

    /// Record a fault.
    pub fn record(&self, fault: Fault) {
        warn!("Fault recorded: {:?}", fault);

        let mut inner = self.inner.lock().unwrap();
        inner.last_fault = Some(fault);
        inner.fault_count += 1;
    }

    /// The most recently recorded fault, if any.
    pub fn last_fault(&self) -> Option<Fault> {
        self.inner.lock().unwrap().last_fault
    }

    /// Total number of faults recorded this session.
    pub fn fault_count(&self) -> u32 {
        self.inner.lock().unwrap().fault_count
    }
}

impl Default for SupReport {
    fn default() -> Self {
        Self::new()
    }
}
