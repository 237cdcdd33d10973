//! Monotonic time source

/// Free-running millisecond clock
///
/// The value is allowed to wrap; consumers must compare timestamps with
/// wrapping arithmetic.
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u32;
}

/// Clock backed by the embassy time driver
#[cfg(feature = "embassy-time")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy-time")]
impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the intended wrap
        embassy_time::Instant::now().as_millis() as u32
    }
}
