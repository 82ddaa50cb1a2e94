//! Display forwarding task
//!
//! Consumes the potentiometer readings queued by the arbitration task,
//! converts them to a speed figure and pushes that to the status display.
//! The queue between the two tasks is bounded and fed non-blockingly, so a
//! slow display only ever costs dropped samples, never scan latency.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

// Internal
use hw_if::eqpt::Display;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Depth of the aux sample queue between arbitration and this task.
pub const AUX_QUEUE_DEPTH: usize = 8;

/// Full-scale speed figure corresponding to a full-scale pot reading, m/s.
const FULL_SCALE_SPEED_MS: f64 = 30.0;

/// Full-scale raw ADC count of the pot channel.
const FULL_SCALE_RAW: f64 = 4095.0;

/// Decimal point after the third digit: the display shows tenths.
const SPEED_DOT_MASK: u8 = 0b0000_0100;

/// How long to block on the queue before re-checking the shutdown flag.
const RECV_WAIT: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The display forwarding task.
pub struct DisplayFwd {
    receiver: Receiver<u16>,
    display: Box<dyn Display>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DisplayFwd {
    pub fn new(receiver: Receiver<u16>, display: Box<dyn Display>) -> Self {
        DisplayFwd { receiver, display }
    }

    /// Task loop: receive a raw reading, render it as tenths of m/s.
    pub fn run(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            let raw = match self.receiver.recv_timeout(RECV_WAIT) {
                Ok(raw) => raw,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let value = speed_tenths(raw);
            debug!("Aux {} -> display {} (tenths of m/s)", raw, value);

            if let Err(e) = self.display.set_value(value, SPEED_DOT_MASK) {
                warn!("Display rejected value {}: {}", value, e);
            }
        }

        let _ = self.display.clear();
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a raw pot reading to tenths of m/s, clamped to the display range.
fn speed_tenths(raw: u16) -> u16 {
    let speed_ms = f64::from(raw).min(FULL_SCALE_RAW) * FULL_SCALE_SPEED_MS / FULL_SCALE_RAW;
    (speed_ms * 10.0).round() as u16
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_speed_scaling() {
        assert_eq!(speed_tenths(0), 0);
        assert_eq!(speed_tenths(4095), 300);

        // Half scale is 15.0 m/s
        assert_eq!(speed_tenths(2048), 150);

        // Out of range raw readings clamp to full scale
        assert_eq!(speed_tenths(u16::MAX), 300);
    }
}
