//! Board-agnostic execution kernel for Apiary firmware
//!
//! This crate contains the machinery every device variant shares:
//!
//! - Action scheduler (cooperative, fixed-order polling)
//! - State stack and argument model
//! - Controller engine (handler tables, tick clock, command dispatch)
//! - Line-oriented connection multiplexer
//!
//! Nothing here touches real hardware; capabilities come from
//! `apiary-hal` traits.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod controller;
pub mod net;
pub mod scheduler;
pub mod shared;
pub mod state;

pub use shared::Shared;
