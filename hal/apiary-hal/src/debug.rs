//! Debug output sink
//!
//! A one-way, best-effort text channel for diagnostics. On hardware this is
//! usually a UART; the host runner forwards it to `tracing`.

use core::fmt;

/// Best-effort debug text sink
///
/// Text is appended with the [`fmt::Write`] methods (and so with
/// `write!`). Sinks never report failures to the caller that matter:
/// implementations should swallow transport errors and return `Ok`.
pub trait DebugSink: fmt::Write {
    /// Stop all future output
    fn disable(&mut self);

    /// Check if the sink still accepts output
    fn is_enabled(&self) -> bool;
}

impl<T: DebugSink + ?Sized> DebugSink for &mut T {
    fn disable(&mut self) {
        (**self).disable();
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl fmt::Write for NullSink {
    fn write_str(&mut self, _s: &str) -> fmt::Result {
        Ok(())
    }
}

impl DebugSink for NullSink {
    fn disable(&mut self) {}

    fn is_enabled(&self) -> bool {
        false
    }
}
