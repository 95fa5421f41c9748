//! Monotonic clock for the control loop.
//!
//! - **`feature = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **host**: uses `std::time::Instant` for simulation runs.

/// Time since boot, handed to the supervisor as `now_ms` each tick.
pub struct MonotonicClock {
    #[cfg(not(feature = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(feature = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(feature = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: read of the free-running esp_timer counter.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since the clock was created.
    #[cfg(not(feature = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Milliseconds since boot.
    pub fn uptime_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}
