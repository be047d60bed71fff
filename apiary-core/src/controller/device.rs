//! Device variant contract

use apiary_hal::DebugSink;
use apiary_protocol::{Command, CommandPacket};

use super::context::Context;
use super::table::{HandlerTable, InterruptPolicy};
use crate::net::LineChannel;
use crate::state::StateTag;

/// Handler for one state; returns microseconds until the next tick
pub type StateFn<D> = fn(&mut Context<'_, D>) -> u32;

/// Handler for one command
pub type CommandFn<D> = fn(&mut Context<'_, D>, CommandPacket);

/// State tag to handler table
pub type StateTable<D> = HandlerTable<<D as Device>::State, StateFn<D>>;

/// Command tag to handler table
pub type CommandTable<D> = HandlerTable<Command, CommandFn<D>>;

/// A device variant driven by a [`Controller`](super::Controller)
///
/// The implementor owns the variant's hardware and data; the controller
/// owns the state stack and clock and hands both to handlers through a
/// [`Context`].
pub trait Device: Sized {
    type State: StateTag;
    type Net: LineChannel;
    type Log: DebugSink;

    /// Name used in logs and the startup line
    const NAME: &'static str;

    /// Version reported by `FIRMWARE`
    const FIRMWARE_VERSION: &'static str = "1.0";

    fn net(&mut self) -> &mut Self::Net;

    fn log(&mut self) -> &mut Self::Log;

    /// Build the state handler table
    fn state_handlers() -> StateTable<Self>;

    /// Build the command handler table
    fn command_handlers() -> CommandTable<Self>;

    /// Commands that interrupt long-running work
    fn interrupt_policy() -> InterruptPolicy;
}
