//! Sound amplitude sampler
//!
//! Builds an hour-long histogram of one-second peak-to-peak microphone
//! amplitudes. The work is a nest of stack frames:
//!
//! ```text
//! ACCEPT_COMMANDS          idle: start a session
//!   SAMPLE_HOUR            reset histogram, run the hour loop, report
//!     HOUR_LOOP            bin the last window, schedule the next one
//!       PAUSE              one command-responsive tick between windows
//!       SAMPLE_1SEC        seed [min, max] with one reading
//!         -> SAMPLE_1SEC_COL   tighten [min, max] until the window ends
//! ```
//!
//! An interrupting command seen during the pause unwinds everything back
//! to `ACCEPT_COMMANDS`.

pub mod config;
pub mod device;
pub mod histogram;
pub mod state;

pub use config::SamplerConfig;
pub use device::{Sampler, SoundPin};
pub use histogram::{Histogram, HISTOGRAM_BUCKETS};
pub use state::SamplerState;
