//! Handler execution context

use core::fmt::Write;

use apiary_protocol::{parse_command, CommandPacket, Line};

use super::clock::{deadline_reached, TickClock};
use super::device::{CommandTable, Device};
use super::table::{command_name, InterruptPolicy};
use crate::net::LineChannel;
use crate::state::{ArgumentError, ErrorCause, StateStack, StateTag};

/// Controller-owned execution state
#[derive(Debug, Clone)]
pub struct Kernel<S: StateTag> {
    pub stack: StateStack<S>,
    pub clock: TickClock,
    last_interrupt_ms: u32,
}

impl<S: StateTag> Default for Kernel<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateTag> Kernel<S> {
    pub fn new() -> Self {
        Self {
            stack: StateStack::new(),
            clock: TickClock::new(),
            last_interrupt_ms: 0,
        }
    }

    /// Clock value when the last interrupting command arrived
    pub fn last_interrupt_ms(&self) -> u32 {
        self.last_interrupt_ms
    }
}

/// What a handler sees while it runs
///
/// Gives access to the device, the stack and the clock, plus the
/// cancellation context: [`Context::cancelled`] and [`Context::idle_ms`].
pub struct Context<'a, D: Device> {
    pub device: &'a mut D,
    pub kernel: &'a mut Kernel<D::State>,
    commands: &'a CommandTable<D>,
    policy: InterruptPolicy,
}

impl<'a, D: Device> Context<'a, D> {
    pub(crate) fn new(
        device: &'a mut D,
        kernel: &'a mut Kernel<D::State>,
        commands: &'a CommandTable<D>,
        policy: InterruptPolicy,
    ) -> Self {
        Self {
            device,
            kernel,
            commands,
            policy,
        }
    }

    pub fn stack(&mut self) -> &mut StateStack<D::State> {
        &mut self.kernel.stack
    }

    pub fn now_ms(&self) -> u32 {
        self.kernel.clock.now_ms()
    }

    /// Milliseconds since the last interrupting command
    pub fn idle_ms(&self) -> u32 {
        self.now_ms().wrapping_sub(self.kernel.last_interrupt_ms)
    }

    /// Check if an interrupting command arrived after the top frame was pushed
    pub fn cancelled(&self) -> bool {
        self.kernel.stack.top_cancelled()
    }

    pub fn deadline_reached(&self, deadline: u32) -> bool {
        deadline_reached(self.now_ms(), deadline)
    }

    /// Read at most one line and dispatch it
    ///
    /// Returns `true` when a line was received, whether or not it parsed.
    pub fn accept_command(&mut self) -> bool {
        let mut line = Line::new();
        if !self.device.net().read_line(&mut line) {
            return false;
        }
        let packet = parse_command(&line);
        let text = core::str::from_utf8(&line).unwrap_or("<binary>");
        let _ = writeln!(
            self.device.log(),
            "{}: received \"{}\" as {}",
            D::NAME,
            text,
            command_name(packet.command)
        );
        self.dispatch(packet);
        true
    }

    /// Run the handler for `packet`, recording interrupts first
    pub fn dispatch(&mut self, packet: CommandPacket) {
        if self.policy.interrupts(packet.command) {
            self.kernel.last_interrupt_ms = self.now_ms();
            self.kernel.stack.mark_interrupt();
        }
        match self.commands.get(packet.command) {
            Some(handler) => handler(self, packet),
            None => self.fail(ErrorCause::MissingHandler),
        }
    }

    /// Integer argument of the top frame
    ///
    /// A mismatch is logged and forces `ERROR_STATE`.
    pub fn top_int(&mut self) -> Option<i32> {
        let arg = self.kernel.stack.top_arg();
        self.checked(arg.int())
    }

    /// Deadline argument of the top frame
    ///
    /// A mismatch is logged and forces `ERROR_STATE`.
    pub fn top_deadline(&mut self) -> Option<u32> {
        let arg = self.kernel.stack.top_arg();
        self.checked(arg.deadline())
    }

    /// Force `ERROR_STATE`
    pub fn fail(&mut self, cause: ErrorCause) {
        let state = self.kernel.stack.top_state();
        let _ = writeln!(
            self.device.log(),
            "{}: {} failed ({:?}), entering {}",
            D::NAME,
            state.name(),
            cause,
            D::State::ERROR_STATE.name()
        );
        self.kernel.stack.push_error(cause);
    }

    fn checked<T>(&mut self, result: Result<T, ArgumentError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                let _ = writeln!(self.device.log(), "{}: {}", D::NAME, err);
                self.fail(ErrorCause::BadArgument);
                None
            }
        }
    }
}
