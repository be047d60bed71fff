//! Controller tick loop

use core::fmt::Write;

use apiary_protocol::Command;

use super::context::{Context, Kernel};
use super::device::{CommandTable, Device, StateTable};
use super::table::{command_name, InterruptPolicy, TableError, TableKind};
use crate::net::LineChannel;
use crate::scheduler::Action;
use crate::state::{ErrorCause, StateStack, StateTag};

/// Stack machine interpreter for one device variant
pub struct Controller<D: Device> {
    device: D,
    kernel: Kernel<D::State>,
    states: StateTable<D>,
    commands: CommandTable<D>,
    policy: InterruptPolicy,
}

impl<D: Device> Controller<D> {
    /// Build the handler tables and check them for completeness
    pub fn new(mut device: D) -> Result<Self, TableError> {
        let states = D::state_handlers();
        states.validate(TableKind::States, D::State::ALL, <D::State as StateTag>::name)?;
        let commands = D::command_handlers();
        commands.validate(TableKind::Commands, &Command::ALL, command_name)?;

        let _ = writeln!(device.log(), "{} is up", D::NAME);
        Ok(Self {
            device,
            kernel: Kernel::new(),
            states,
            commands,
            policy: D::interrupt_policy(),
        })
    }

    /// Run the top frame's handler once
    ///
    /// Returns the handler's requested delay in microseconds.
    pub fn tick(&mut self) -> u32 {
        let state = self.kernel.stack.top_state();
        let mut ctx = Context::new(
            &mut self.device,
            &mut self.kernel,
            &self.commands,
            self.policy,
        );
        let delay = match self.states.get(state) {
            Some(handler) => handler(&mut ctx),
            None => {
                ctx.fail(ErrorCause::MissingHandler);
                0
            }
        };
        self.kernel.clock.advance(delay);
        self.device.net().flush();
        delay
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn stack(&self) -> &StateStack<D::State> {
        &self.kernel.stack
    }

    pub fn kernel(&self) -> &Kernel<D::State> {
        &self.kernel
    }

    /// Controller clock in milliseconds
    pub fn now_ms(&self) -> u32 {
        self.kernel.clock.now_ms()
    }
}

impl<D: Device> Action for Controller<D> {
    fn poll(&mut self) -> u32 {
        self.tick()
    }

    fn name(&self) -> &'static str {
        D::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::common;
    use crate::controller::context::Context;
    use crate::controller::device::{CommandFn, StateFn};
    use crate::controller::table::HandlerTable;
    use crate::net::mock::{MemoryLog, ScriptChannel};
    use crate::state::Argument;
    use apiary_protocol::CommandPacket;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestState {
        Accept,
        Busy,
        Error,
    }

    impl StateTag for TestState {
        const ACCEPT_COMMANDS: Self = TestState::Accept;
        const ERROR_STATE: Self = TestState::Error;
        const ALL: &'static [Self] = &[TestState::Accept, TestState::Busy, TestState::Error];

        fn name(self) -> &'static str {
            match self {
                TestState::Accept => "ACCEPTING_COMMANDS",
                TestState::Busy => "BUSY",
                TestState::Error => "ERROR ERROR ERROR",
            }
        }
    }

    #[derive(Default)]
    struct TestDevice {
        net: ScriptChannel,
        log: MemoryLog,
        busy_ticks: u32,
    }

    fn state_accept(ctx: &mut Context<'_, TestDevice>) -> u32 {
        if ctx.accept_command() {
            return 0;
        }
        common::until_next_epoch(ctx, 100)
    }

    fn state_busy(ctx: &mut Context<'_, TestDevice>) -> u32 {
        if ctx.cancelled() {
            ctx.stack().pop();
            return 0;
        }
        let Some(remaining) = ctx.top_int() else {
            return 0;
        };
        ctx.device.busy_ticks += 1;
        if remaining <= 1 {
            ctx.stack().pop();
        } else {
            ctx.stack().set_top_arg(Argument::Int(remaining - 1));
        }
        ctx.accept_command();
        1500
    }

    fn do_abs(ctx: &mut Context<'_, TestDevice>, packet: CommandPacket) {
        let count = packet.argument.unwrap_or(0);
        ctx.stack().push(TestState::Busy, Argument::Int(count));
    }

    impl Device for TestDevice {
        type State = TestState;
        type Net = ScriptChannel;
        type Log = MemoryLog;

        const NAME: &'static str = "test";

        fn net(&mut self) -> &mut ScriptChannel {
            &mut self.net
        }

        fn log(&mut self) -> &mut MemoryLog {
            &mut self.log
        }

        fn state_handlers() -> StateTable<Self> {
            HandlerTable::new()
                .with(TestState::Accept, state_accept as StateFn<Self>)
                .with(TestState::Busy, state_busy)
                .with(TestState::Error, common::state_error)
        }

        fn command_handlers() -> CommandTable<Self> {
            HandlerTable::new()
                .with(Command::Abort, common::do_abort as CommandFn<Self>)
                .with(Command::Home, common::do_not_supported)
                .with(Command::Abs, do_abs)
                .with(Command::PStatus, common::do_not_supported)
                .with(Command::MStatus, common::do_mstatus)
                .with(Command::SStatus, common::do_not_supported)
                .with(Command::HStatus, common::do_not_supported)
                .with(Command::Firmware, common::do_firmware)
                .with(Command::Caps, common::do_not_supported)
                .with(Command::DebugOff, common::do_debug_off)
                .with(Command::NoCommand, common::do_no_command)
        }

        fn interrupt_policy() -> InterruptPolicy {
            InterruptPolicy::none().with(Command::Abort).with(Command::Abs)
        }
    }

    fn controller() -> Controller<TestDevice> {
        Controller::new(TestDevice::default()).expect("complete tables")
    }

    fn send(controller: &mut Controller<TestDevice>, line: &str) {
        controller.device_mut().net.push_line(line);
    }

    #[test]
    fn test_startup_logged() {
        let c = controller();
        assert!(c.device().log.text.contains("test is up"));
        assert_eq!(c.stack().top_state(), TestState::Accept);
        assert_eq!(Action::name(&c), "test");
    }

    #[test]
    fn test_idle_accept_waits_for_next_epoch() {
        let mut c = controller();
        assert_eq!(c.tick(), 100_000);
        assert_eq!(c.now_ms(), 100);
        assert_eq!(c.device().net.flushes, 1);
    }

    #[test]
    fn test_status_command_answered_immediately() {
        let mut c = controller();
        send(&mut c, "firmware");
        assert_eq!(c.tick(), 0);
        assert_eq!(c.device().net.sent_text(), "Firmware: 1.0\n");

        send(&mut c, "MSTATUS");
        c.tick();
        assert!(c.device().net.sent_text().ends_with("State: ACCEPTING_COMMANDS NoArg\n"));
    }

    #[test]
    fn test_unsupported_command_reply() {
        let mut c = controller();
        send(&mut c, "CAPS");
        c.tick();
        assert_eq!(c.device().net.sent_text(), "# CAPS not supported\n");
        assert_eq!(c.stack().depth(), 1);
    }

    #[test]
    fn test_garbage_forces_permanent_error() {
        let mut c = controller();
        send(&mut c, "bogus words");
        assert_eq!(c.tick(), 0);
        assert_eq!(c.stack().top_state(), TestState::Error);
        assert_eq!(
            c.stack().top_arg(),
            Argument::Int(ErrorCause::UnknownCommand as i32)
        );

        assert_eq!(c.tick(), common::ERROR_REPORT_INTERVAL_US);
        send(&mut c, "ABORT");
        assert_eq!(c.tick(), common::ERROR_REPORT_INTERVAL_US);
        assert_eq!(c.stack().top_state(), TestState::Error);
        assert!(c.device().net.sent_text().contains("hep hep hep error error error\n"));
        assert!(c.device().log.text.contains("hep hep hep"));
    }

    #[test]
    fn test_long_task_runs_to_completion() {
        let mut c = controller();
        send(&mut c, "ABS 3");
        assert_eq!(c.tick(), 0);
        assert_eq!(c.stack().top_state(), TestState::Busy);
        for _ in 0..3 {
            assert_eq!(c.tick(), 1500);
        }
        assert_eq!(c.device().busy_ticks, 3);
        assert_eq!(c.stack().top_state(), TestState::Accept);
        assert_eq!(c.now_ms(), 4);
    }

    #[test]
    fn test_interrupting_command_cancels_task() {
        let mut c = controller();
        send(&mut c, "ABS 100");
        c.tick();
        c.tick();
        send(&mut c, "ABORT");
        // Busy consumes the ABORT, then notices on its next tick
        c.tick();
        assert_eq!(c.kernel().last_interrupt_ms(), 1);
        assert_eq!(c.now_ms(), 3);
        c.tick();
        assert_eq!(c.stack().top_state(), TestState::Accept);
        assert_eq!(c.device().busy_ticks, 2);
    }

    #[test]
    fn test_new_task_not_cancelled_by_its_own_command() {
        let mut c = controller();
        send(&mut c, "ABS 100");
        c.tick();
        c.tick();
        send(&mut c, "ABS 2");
        c.tick();
        // The second ABS pushed a fresh frame over the first
        assert_eq!(c.stack().depth(), 3);
        c.tick();
        c.tick();
        assert_eq!(c.stack().depth(), 2);
        // The first task was cancelled by the second ABS
        c.tick();
        assert_eq!(c.stack().depth(), 1);
    }

    #[test]
    fn test_debug_off_disables_log() {
        let mut c = controller();
        send(&mut c, "DEBUGOFF");
        c.tick();
        assert!(c.device().log.text.contains("Disabling low level debug output"));
        assert!(c.device().log.disabled);
    }

    #[test]
    fn test_wrong_argument_forces_error() {
        let mut c = controller();
        send(&mut c, "ABS 5");
        c.tick();
        c.kernel.stack.set_top_arg(Argument::None);
        c.tick();
        assert_eq!(c.stack().top_state(), TestState::Error);
        assert_eq!(
            c.stack().top_arg(),
            Argument::Int(ErrorCause::BadArgument as i32)
        );
        assert!(c.device().log.text.contains("argument mismatch"));
    }

    struct IncompleteDevice {
        net: ScriptChannel,
        log: MemoryLog,
    }

    impl Device for IncompleteDevice {
        type State = TestState;
        type Net = ScriptChannel;
        type Log = MemoryLog;

        const NAME: &'static str = "incomplete";

        fn net(&mut self) -> &mut ScriptChannel {
            &mut self.net
        }

        fn log(&mut self) -> &mut MemoryLog {
            &mut self.log
        }

        fn state_handlers() -> StateTable<Self> {
            HandlerTable::new()
                .with(TestState::Accept, common::state_error as StateFn<Self>)
                .with(TestState::Error, common::state_error)
        }

        fn command_handlers() -> CommandTable<Self> {
            HandlerTable::new()
        }

        fn interrupt_policy() -> InterruptPolicy {
            InterruptPolicy::none()
        }
    }

    #[test]
    fn test_incomplete_tables_rejected() {
        let device = IncompleteDevice {
            net: ScriptChannel::default(),
            log: MemoryLog::default(),
        };
        let err = Controller::new(device).err();
        assert_eq!(
            err,
            Some(TableError::Missing {
                table: TableKind::States,
                tag: "BUSY"
            })
        );
    }
}
