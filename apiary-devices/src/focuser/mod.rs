//! Stepper motor focuser
//!
//! Accepts `ABS`/`HOME` moves and status queries. Motion is one step per
//! tick; commands are re-checked every few steps so a move can be
//! superseded or aborted. After a period without interrupting commands the
//! stepper driver is put to sleep and woken again on the next move.

pub mod build;
pub mod device;
pub mod state;

pub use build::{Build, BuildParams, TimingParams};
pub use device::{Focuser, FocuserPin};
pub use state::FocuserState;
