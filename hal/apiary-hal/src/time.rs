//! Time sources

/// Board clock
///
/// The kernel derives every deadline from [`Clock::millis`] (through its
/// own tick accounting); wall-clock seconds are only used for reporting.
pub trait Clock {
    /// Seconds since the Unix epoch (0 if the board has no wall clock)
    fn secs_since_epoch(&self) -> u32;

    /// Milliseconds since the device started (wraps after ~49 days)
    fn millis(&self) -> u32;
}
