//! Monotonic per-byte inactivity timer.
//!
//! The framing state machine's only timing primitive: every phase that
//! waits on the serial port resets this timer whenever the port yields at
//! least one new byte, and fails the phase when `elapsed_us()` exceeds the
//! configured per-byte timeout without a reset.

use std::time::Instant;

/// Wraps [`std::time::Instant`] so the transport layer measures elapsed
/// microseconds against a single monotonic reference instead of reaching for
/// a wall clock, which can jump backward across a leap-second or NTP step.
#[derive(Debug, Clone)]
pub struct MicrosecondTimer {
    mark: Instant,
}

impl MicrosecondTimer {
    /// Starts a timer with its mark set to now.
    pub fn new() -> Self {
        Self { mark: Instant::now() }
    }

    /// Moves the mark to now, as if the timer had just been constructed.
    pub fn reset(&mut self) {
        self.mark = Instant::now();
    }

    /// Microseconds elapsed since the last [`Self::reset`] (or construction).
    pub fn elapsed_us(&self) -> u64 {
        self.mark.elapsed().as_micros() as u64
    }

    /// Whether `elapsed_us()` has reached or passed `timeout_us`.
    pub fn has_elapsed(&self, timeout_us: u64) -> bool {
        self.elapsed_us() >= timeout_us
    }
}

impl Default for MicrosecondTimer {
    fn default() -> Self {
        Self::new()
    }
}
