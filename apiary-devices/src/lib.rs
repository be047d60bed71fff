//! Apiary device variants
//!
//! Each variant is a [`Device`](apiary_core::controller::Device): a state
//! enum, handler tables and the hardware it drives. The runner wraps one in
//! a [`Controller`](apiary_core::controller::Controller) and registers it
//! with the scheduler.
//!
//! - [`sampler`] - sound amplitude histogram over hour-long sessions
//! - [`focuser`] - stepper-driven telescope focuser
//! - [`reporter`] - periodic temperature broadcast

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod focuser;
pub mod reporter;
pub mod sampler;

pub use focuser::{Build, BuildParams, Focuser, FocuserPin, FocuserState, TimingParams};
pub use reporter::TemperatureReporter;
pub use sampler::{Histogram, Sampler, SamplerConfig, SamplerState, SoundPin};
