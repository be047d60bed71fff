//! Focuser device and handlers

use core::fmt::Write;

use apiary_core::controller::{
    common, CommandFn, CommandTable, Context, Device, HandlerTable, InterruptPolicy, StateFn,
    StateTable,
};
use apiary_core::net::LineChannel;
use apiary_core::state::{Argument, Direction, ErrorCause};
use apiary_hal::{DebugSink, Hardware, PinIoMode, PinState};
use apiary_protocol::{Command, CommandPacket};

use super::build::BuildParams;
use super::state::FocuserState;

/// Pins used by the focuser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FocuserPin {
    /// Stepper direction (high = forward)
    Dir,
    /// Stepper step pulse
    Step,
    /// Driver sleep control (low = asleep)
    Sleep,
    /// Home switch input (low = at home)
    Home,
}

/// Telescope focuser device
pub struct Focuser<N, H, L> {
    net: N,
    hardware: H,
    log: L,
    params: BuildParams,
    position: i32,
    synched: bool,
    asleep: bool,
    steps_since_check: u32,
}

impl<N, H, L> Focuser<N, H, L>
where
    N: LineChannel,
    H: Hardware<Pin = FocuserPin>,
    L: DebugSink,
{
    pub fn new(net: N, mut hardware: H, mut log: L, params: BuildParams) -> Self {
        let _ = writeln!(log, "Bringing up focuser");
        hardware.pin_mode(FocuserPin::Dir, PinIoMode::Output);
        hardware.pin_mode(FocuserPin::Step, PinIoMode::Output);
        hardware.pin_mode(FocuserPin::Sleep, PinIoMode::Output);
        hardware.pin_mode(FocuserPin::Home, PinIoMode::InputPullup);
        hardware.digital_write(FocuserPin::Step, PinState::Low);
        hardware.digital_write(FocuserPin::Sleep, PinState::High);
        Self {
            net,
            hardware,
            log,
            params,
            position: 0,
            synched: false,
            asleep: false,
            steps_since_check: 0,
        }
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    /// Check if the position was set by homing
    pub fn is_synched(&self) -> bool {
        self.synched
    }

    /// Check if the stepper driver is powered down
    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    pub fn params(&self) -> &BuildParams {
        &self.params
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    fn step(&mut self, dir: Direction) {
        let level = PinState::from_high(dir == Direction::Forward);
        self.hardware.digital_write(FocuserPin::Dir, level);
        self.hardware.digital_write(FocuserPin::Step, PinState::High);
        self.hardware.digital_write(FocuserPin::Step, PinState::Low);
        self.position += match dir {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        };
    }

    fn at_home(&mut self) -> bool {
        !self.hardware.digital_read(FocuserPin::Home).is_high()
    }

    fn power_down(&mut self) {
        let _ = writeln!(self.log, "Putting stepper driver to sleep");
        self.hardware.digital_write(FocuserPin::Sleep, PinState::Low);
        self.asleep = true;
    }

    /// Push a motion frame, preceded by a wake-up if the driver sleeps
    ///
    /// A motion already in progress is replaced rather than stacked, so
    /// retargeting mid-move never deepens the stack.
    fn begin_motion(ctx: &mut Context<'_, Self>, state: FocuserState, arg: Argument) {
        ctx.device.steps_since_check = 0;
        let mut pending_wake = None;
        while ctx.stack().depth() > 1 {
            match ctx.stack().top_state() {
                FocuserState::Wake => pending_wake = ctx.top_deadline(),
                FocuserState::MoveTo | FocuserState::StopAtHome => {}
                _ => break,
            }
            ctx.stack().pop();
        }
        ctx.stack().push(state, arg);
        if let Some(ready) = pending_wake {
            ctx.stack().push(FocuserState::Wake, Argument::from_deadline(ready));
        } else if ctx.device.asleep {
            let _ = writeln!(ctx.device.log, "Waking stepper driver");
            ctx.device
                .hardware
                .digital_write(FocuserPin::Sleep, PinState::High);
            ctx.device.asleep = false;
            let ready = ctx
                .now_ms()
                .wrapping_add(ctx.device.params.timing.time_to_power_stepper_ms);
            ctx.stack().push(FocuserState::Wake, Argument::from_deadline(ready));
        }
    }

    /// Count a step and check for commands when due
    fn after_step(ctx: &mut Context<'_, Self>) -> u32 {
        let timing = ctx.device.params.timing;
        ctx.device.steps_since_check += 1;
        if ctx.device.steps_since_check >= timing.max_steps_between_checks {
            ctx.device.steps_since_check = 0;
            ctx.accept_command();
        }
        timing.step_pause_us
    }

    fn state_accept_commands(ctx: &mut Context<'_, Self>) -> u32 {
        if ctx.accept_command() {
            return 0;
        }
        let timing = ctx.device.params.timing;
        if !ctx.device.asleep && ctx.idle_ms() >= timing.inactivity_to_sleep_ms {
            ctx.stack().push(FocuserState::Sleep, Argument::None);
            return 0;
        }
        common::until_next_epoch(ctx, timing.epoch_between_command_checks_ms)
    }

    fn state_move_to(ctx: &mut Context<'_, Self>) -> u32 {
        if ctx.cancelled() {
            let _ = writeln!(ctx.device.log, "Move interrupted");
            ctx.stack().pop();
            return 0;
        }
        let Some(target) = ctx.top_int() else {
            return 0;
        };
        let position = ctx.device.position;
        if position == target {
            let _ = writeln!(ctx.device.log, "Arrived at {}", target);
            ctx.stack().pop();
            return 0;
        }
        let dir = if target > position {
            Direction::Forward
        } else {
            Direction::Reverse
        };
        ctx.device.step(dir);
        Self::after_step(ctx)
    }

    fn state_stop_at_home(ctx: &mut Context<'_, Self>) -> u32 {
        if ctx.cancelled() {
            let _ = writeln!(ctx.device.log, "Homing interrupted");
            ctx.stack().pop();
            return 0;
        }
        if ctx.device.at_home() {
            let _ = writeln!(ctx.device.log, "Home switch reached");
            ctx.device.position = 0;
            ctx.device.synched = true;
            ctx.stack().pop();
            return 0;
        }
        ctx.device.step(Direction::Reverse);
        Self::after_step(ctx)
    }

    fn state_sleep(ctx: &mut Context<'_, Self>) -> u32 {
        // A move woke the driver after this frame was pushed
        if ctx.cancelled() {
            ctx.stack().pop();
            return 0;
        }
        if !ctx.device.asleep {
            ctx.device.power_down();
        }
        if ctx.accept_command() {
            return 0;
        }
        let epoch = ctx.device.params.timing.epoch_for_sleep_command_checks_ms;
        common::until_next_epoch(ctx, epoch)
    }

    fn state_wake(ctx: &mut Context<'_, Self>) -> u32 {
        let Some(ready) = ctx.top_deadline() else {
            return 0;
        };
        if ctx.deadline_reached(ready) {
            ctx.stack().pop();
            return 0;
        }
        ready.wrapping_sub(ctx.now_ms()).saturating_mul(1000)
    }

    fn do_home(ctx: &mut Context<'_, Self>, _packet: CommandPacket) {
        let _ = writeln!(ctx.device.log, "Processing home request");
        if ctx.device.params.has_home {
            Self::begin_motion(ctx, FocuserState::StopAtHome, Argument::None);
        } else {
            // Without a switch the current position becomes home
            ctx.device.position = 0;
            ctx.device.synched = true;
        }
    }

    fn do_abs(ctx: &mut Context<'_, Self>, packet: CommandPacket) {
        let Some(requested) = packet.argument else {
            ctx.fail(ErrorCause::BadArgument);
            return;
        };
        let target = requested.clamp(0, ctx.device.params.max_abs_pos);
        let _ = writeln!(ctx.device.log, "Moving to {}", target);
        Self::begin_motion(ctx, FocuserState::MoveTo, Argument::Int(target));
    }

    fn do_pstatus(ctx: &mut Context<'_, Self>, _packet: CommandPacket) {
        let _ = writeln!(ctx.device.log, "Processing pstatus request");
        writeln!(ctx.device.net, "Position: {}", ctx.device.position);
    }

    fn do_sstatus(ctx: &mut Context<'_, Self>, _packet: CommandPacket) {
        let _ = writeln!(ctx.device.log, "Processing sstatus request");
        let synched = if ctx.device.synched { "YES" } else { "NO" };
        writeln!(ctx.device.net, "Synched: {}", synched);
    }

    fn do_caps(ctx: &mut Context<'_, Self>, _packet: CommandPacket) {
        let _ = writeln!(ctx.device.log, "Processing capabilities request");
        let params = ctx.device.params;
        writeln!(ctx.device.net, "MaxPos: {}", params.max_abs_pos);
        writeln!(
            ctx.device.net,
            "CanHome: {}",
            if params.has_home { "YES" } else { "NO" }
        );
    }
}

impl<N, H, L> Device for Focuser<N, H, L>
where
    N: LineChannel,
    H: Hardware<Pin = FocuserPin>,
    L: DebugSink,
{
    type State = FocuserState;
    type Net = N;
    type Log = L;

    const NAME: &'static str = "focuser";

    fn net(&mut self) -> &mut N {
        &mut self.net
    }

    fn log(&mut self) -> &mut L {
        &mut self.log
    }

    fn state_handlers() -> StateTable<Self> {
        HandlerTable::new()
            .with(
                FocuserState::AcceptCommands,
                Self::state_accept_commands as StateFn<Self>,
            )
            .with(FocuserState::MoveTo, Self::state_move_to)
            .with(FocuserState::StopAtHome, Self::state_stop_at_home)
            .with(FocuserState::Sleep, Self::state_sleep)
            .with(FocuserState::Wake, Self::state_wake)
            .with(FocuserState::Error, common::state_error)
    }

    fn command_handlers() -> CommandTable<Self> {
        HandlerTable::new()
            .with(Command::Abort, common::do_abort as CommandFn<Self>)
            .with(Command::Home, Self::do_home)
            .with(Command::Abs, Self::do_abs)
            .with(Command::PStatus, Self::do_pstatus)
            .with(Command::MStatus, common::do_mstatus)
            .with(Command::SStatus, Self::do_sstatus)
            .with(Command::HStatus, common::do_not_supported)
            .with(Command::Firmware, common::do_firmware)
            .with(Command::Caps, Self::do_caps)
            .with(Command::DebugOff, common::do_debug_off)
            .with(Command::NoCommand, common::do_no_command)
    }

    fn interrupt_policy() -> InterruptPolicy {
        InterruptPolicy::none()
            .with(Command::Abort)
            .with(Command::Home)
            .with(Command::Abs)
    }
}
