//! Time management for the monitoring loop
//!
//! Everything in this firmware is timed against milliseconds since boot:
//! the telemetry record timestamp, the alert toggle cadence and the
//! advertising recovery phases. There is no wall clock on the device, so
//! the abstraction stays deliberately small.

/// Timestamp in milliseconds since device boot (monotonic)
pub type Timestamp = u64;

/// Source of monotonic time for the control loop
pub trait Clock {
    /// Get milliseconds elapsed since boot
    fn now(&self) -> Timestamp;
}

/// Monotonic clock backed by `std::time::Instant` (host-side harnesses)
///
/// Boot time is the moment of construction.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct StdClock {
    boot: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose zero point is now
    pub fn new() -> Self {
        Self {
            boot: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&self) -> Timestamp {
        self.boot.elapsed().as_millis() as Timestamp
    }
}

/// Hand-driven clock for deterministic tests
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Timestamp,
}

impl ManualClock {
    /// Create a clock starting at the given uptime
    pub fn new(now_ms: Timestamp) -> Self {
        Self { now_ms }
    }

    /// Jump to an absolute uptime
    pub fn set(&mut self, now_ms: Timestamp) {
        self.now_ms = now_ms;
    }

    /// Advance the clock by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let mut clock = ManualClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.advance(500);
        assert_eq!(clock.now(), 1500);

        clock.set(10_000);
        assert_eq!(clock.now(), 10_000);
    }

    #[cfg(feature = "std")]
    #[test]
    fn std_clock_is_monotonic() {
        let clock = StdClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
