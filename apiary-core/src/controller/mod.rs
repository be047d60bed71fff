//! Command/state stack engine
//!
//! Each device variant supplies its state and command handlers as tables
//! built once at startup. The [`Controller`] validates them, then on every
//! tick runs the handler for the top stack frame, advances its
//! millisecond clock and flushes output.

pub mod clock;
pub mod common;
pub mod context;
pub mod device;
pub mod engine;
pub mod table;

pub use clock::{deadline_reached, TickClock};
pub use context::{Context, Kernel};
pub use device::{CommandFn, CommandTable, Device, StateFn, StateTable};
pub use engine::Controller;
pub use table::{HandlerTable, InterruptPolicy, TableError, TableKind, MAX_HANDLERS};
