//! Monotonic deadline arithmetic.
//!
//! The engine has no clock of its own; callers pass in microsecond readings
//! from the platform's monotonic counter. Comparisons saturate so a counter
//! read that appears to step backwards never expires a deadline early.

/// A bounded wait window measured from a start instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    start_us: u64,
    window_us: u64,
}

impl Deadline {
    #[inline]
    pub const fn starting_at(now_us: u64, window_us: u32) -> Self {
        Self {
            start_us: now_us,
            window_us: window_us as u64,
        }
    }

    #[inline]
    pub const fn elapsed_us(&self, now_us: u64) -> u64 {
        now_us.saturating_sub(self.start_us)
    }

    /// True once strictly more than the window has passed.
    #[inline]
    pub const fn expired(&self, now_us: u64) -> bool {
        self.elapsed_us(now_us) > self.window_us
    }

    #[inline]
    pub const fn window_us(&self) -> u64 {
        self.window_us
    }
}
