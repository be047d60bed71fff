//! Stack machine data model
//!
//! Long-running device behavior is expressed as a LIFO of frames. Each
//! frame names a state and carries one small argument; the handler for the
//! top frame runs once per controller tick.

pub mod argument;
pub mod stack;

pub use argument::{Argument, ArgumentError, ArgumentKind, Direction};
pub use stack::{ErrorCause, Frame, StateStack, StateTag, MAX_STACK_DEPTH};
