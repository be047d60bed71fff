//! Sampler device and handlers

use core::fmt::Write;

use apiary_core::controller::{
    common, CommandFn, CommandTable, Context, Device, HandlerTable, InterruptPolicy, StateFn,
    StateTable,
};
use apiary_core::net::LineChannel;
use apiary_core::state::Argument;
use apiary_hal::{Clock, DebugSink, Hardware, PinIoMode};
use apiary_protocol::{Command, CommandPacket};

use super::config::SamplerConfig;
use super::histogram::{Histogram, HISTOGRAM_BUCKETS};
use super::state::SamplerState;

/// Pins used by the sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoundPin {
    /// Analog microphone output
    Microphone,
}

/// Sound sampler device
pub struct Sampler<N, H, L, C> {
    net: N,
    hardware: H,
    log: L,
    clock: C,
    config: SamplerConfig,
    histogram: Histogram,
    /// Extremes of the window being collected
    window: (u16, u16),
    /// Peak-to-peak of the last finished window, not yet binned
    completed: Option<u16>,
    sessions: u32,
}

impl<N, H, L, C> Sampler<N, H, L, C>
where
    N: LineChannel,
    H: Hardware<Pin = SoundPin>,
    L: DebugSink,
    C: Clock,
{
    pub fn new(net: N, mut hardware: H, mut log: L, clock: C, config: SamplerConfig) -> Self {
        let _ = writeln!(log, "Bringing up sound sampler");
        hardware.pin_mode(SoundPin::Microphone, PinIoMode::Input);
        Self {
            net,
            hardware,
            log,
            clock,
            config,
            histogram: Histogram::new(),
            window: (0, 0),
            completed: None,
            sessions: 0,
        }
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sessions completed since start
    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    fn read_microphone(&mut self) -> u16 {
        self.hardware.analog_read(SoundPin::Microphone)
    }

    fn state_accept_commands(ctx: &mut Context<'_, Self>) -> u32 {
        if ctx.accept_command() {
            return 0;
        }
        ctx.stack().push(SamplerState::SampleHour, Argument::None);
        0
    }

    fn state_sample_hour(ctx: &mut Context<'_, Self>) -> u32 {
        if ctx.kernel.stack.top_arg().is_none() {
            let now = ctx.now_ms();
            let deadline = now.wrapping_add(ctx.device.config.session_ms);
            ctx.device.histogram.reset();
            ctx.device.completed = None;
            let _ = writeln!(ctx.device.log, "Starting sampling session");
            ctx.stack().set_top_arg(Argument::from_deadline(now));
            ctx.stack().push(SamplerState::HourLoop, Argument::from_deadline(deadline));
            return 0;
        }

        let Some(started) = ctx.top_deadline() else {
            return 0;
        };
        let elapsed_ms = ctx.now_ms().wrapping_sub(started);
        let device = &mut *ctx.device;
        device.sessions = device.sessions.wrapping_add(1);
        writeln!(
            device.net,
            "# Session complete: {} samples over {} s at {}",
            device.histogram.total(),
            elapsed_ms / 1000,
            device.clock.secs_since_epoch()
        );
        ctx.stack().pop();
        0
    }

    fn state_hour_loop(ctx: &mut Context<'_, Self>) -> u32 {
        let Some(deadline) = ctx.top_deadline() else {
            return 0;
        };
        if let Some(delta) = ctx.device.completed.take() {
            ctx.device.histogram.insert(delta);
        }
        if ctx.deadline_reached(deadline) {
            ctx.stack().pop();
            return 0;
        }
        ctx.stack().push(SamplerState::Pause, Argument::None);
        ctx.stack().push(SamplerState::Sample1Sec, Argument::None);
        0
    }

    fn state_sample_1sec(ctx: &mut Context<'_, Self>) -> u32 {
        let reading = ctx.device.read_microphone();
        ctx.device.window = (reading, reading);
        let deadline = ctx.now_ms().wrapping_add(ctx.device.config.window_ms);
        ctx.stack()
            .replace_top(SamplerState::Sample1SecCollect, Argument::from_deadline(deadline));
        ctx.device.config.sample_interval_us
    }

    fn state_sample_1sec_collect(ctx: &mut Context<'_, Self>) -> u32 {
        let Some(deadline) = ctx.top_deadline() else {
            return 0;
        };
        let reading = ctx.device.read_microphone();
        let (min, max) = ctx.device.window;
        let window = (min.min(reading), max.max(reading));
        ctx.device.window = window;

        if ctx.deadline_reached(deadline) {
            ctx.device.completed = Some(window.1 - window.0);
            ctx.stack().pop();
            return 0;
        }
        ctx.device.config.sample_interval_us
    }

    fn state_pause(ctx: &mut Context<'_, Self>) -> u32 {
        ctx.accept_command();
        if ctx.kernel.stack.top_state() != SamplerState::Pause {
            // The command pushed work of its own
            return 0;
        }
        if ctx.cancelled() {
            let _ = writeln!(ctx.device.log, "Sampling interrupted");
            ctx.stack().reset();
            return 0;
        }
        ctx.stack().pop();
        0
    }

    fn do_hstatus(ctx: &mut Context<'_, Self>, _packet: CommandPacket) {
        let _ = writeln!(ctx.device.log, "Processing hstatus request");
        let device = &mut *ctx.device;
        writeln!(device.net, "Histogram: {} samples", device.histogram.total());
        for (delta, count) in device.histogram.non_empty() {
            writeln!(device.net, "{} {}", delta, count);
        }
    }

    fn do_caps(ctx: &mut Context<'_, Self>, _packet: CommandPacket) {
        let _ = writeln!(ctx.device.log, "Processing capabilities request");
        writeln!(ctx.device.net, "Buckets: {}", HISTOGRAM_BUCKETS);
        writeln!(ctx.device.net, "CanHome: NO");
    }
}

impl<N, H, L, C> Device for Sampler<N, H, L, C>
where
    N: LineChannel,
    H: Hardware<Pin = SoundPin>,
    L: DebugSink,
    C: Clock,
{
    type State = SamplerState;
    type Net = N;
    type Log = L;

    const NAME: &'static str = "sampler";

    fn net(&mut self) -> &mut N {
        &mut self.net
    }

    fn log(&mut self) -> &mut L {
        &mut self.log
    }

    fn state_handlers() -> StateTable<Self> {
        HandlerTable::new()
            .with(
                SamplerState::AcceptCommands,
                Self::state_accept_commands as StateFn<Self>,
            )
            .with(SamplerState::SampleHour, Self::state_sample_hour)
            .with(SamplerState::HourLoop, Self::state_hour_loop)
            .with(SamplerState::Sample1Sec, Self::state_sample_1sec)
            .with(
                SamplerState::Sample1SecCollect,
                Self::state_sample_1sec_collect,
            )
            .with(SamplerState::Pause, Self::state_pause)
            .with(SamplerState::Error, common::state_error)
    }

    fn command_handlers() -> CommandTable<Self> {
        HandlerTable::new()
            .with(Command::Abort, common::do_abort as CommandFn<Self>)
            .with(Command::Home, common::do_not_supported)
            .with(Command::Abs, common::do_not_supported)
            .with(Command::PStatus, common::do_not_supported)
            .with(Command::MStatus, common::do_mstatus)
            .with(Command::SStatus, common::do_not_supported)
            .with(Command::HStatus, Self::do_hstatus)
            .with(Command::Firmware, common::do_firmware)
            .with(Command::Caps, Self::do_caps)
            .with(Command::DebugOff, common::do_debug_off)
            .with(Command::NoCommand, common::do_no_command)
    }

    fn interrupt_policy() -> InterruptPolicy {
        InterruptPolicy::none().with(Command::Abort)
    }
}
