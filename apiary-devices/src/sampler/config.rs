//! Sampler timing configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sampling cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplerConfig {
    /// Delay between microphone reads inside a window (µs)
    pub sample_interval_us: u32,
    /// Length of one peak-to-peak measurement window (ms)
    pub window_ms: u32,
    /// Length of one histogram session (ms)
    pub session_ms: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_interval_us: 1000,
            window_ms: 1000,
            session_ms: 60 * 60 * 1000,
        }
    }
}

impl SamplerConfig {
    /// Windows that fit in one session
    pub fn windows_per_session(&self) -> u32 {
        self.session_ms / self.window_ms.max(1)
    }
}
