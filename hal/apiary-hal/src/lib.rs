//! Apiary Hardware Abstraction Layer
//!
//! This crate defines the capabilities the firmware consumes from the
//! board it runs on. Chip-specific glue (ESP8266 Wi-Fi, RP2040, or the host
//! simulator) implements these traits; the kernel and the device variants
//! only ever see the traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Runner (apiary-sim, board firmware)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  apiary-core / apiary-devices           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  apiary-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::Hardware`] - Pin modes, digital and analog I/O
//! - [`net::NetServer`], [`net::NetClient`] - Listening socket and clients
//! - [`debug::DebugSink`] - Best-effort debug text output
//! - [`time::Clock`] - Wall clock and uptime
//! - [`sensor::TemperatureSensor`] - Fixed-point temperature readings

#![no_std]
#![deny(unsafe_code)]

pub mod debug;
pub mod gpio;
pub mod net;
pub mod sensor;
pub mod time;

// Re-export key traits at crate root for convenience
pub use debug::{DebugSink, NullSink};
pub use gpio::{Hardware, PinIoMode, PinState};
pub use net::{NetClient, NetServer};
pub use sensor::{SensorError, TemperatureSensor};
pub use time::Clock;
