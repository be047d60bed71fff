//! Handlers shared by every device variant

use core::fmt::Write;

use apiary_hal::DebugSink;
use apiary_protocol::CommandPacket;

use super::context::Context;
use super::device::Device;
use super::table::command_name;
use crate::net::LineChannel;
use crate::state::{ErrorCause, StateTag};

/// Delay between error reports (10 s)
pub const ERROR_REPORT_INTERVAL_US: u32 = 10_000_000;

/// Line broadcast while in `ERROR_STATE`
pub const ERROR_REPORT: &str = "hep hep hep error error error\n";

/// `ERROR_STATE` handler
///
/// The fault is permanent: report on the debug sink and the network every
/// 10 s until the device is reset.
pub fn state_error<D: Device>(ctx: &mut Context<'_, D>) -> u32 {
    let _ = ctx.device.log().write_str(ERROR_REPORT);
    ctx.device.net().write_str(ERROR_REPORT);
    ERROR_REPORT_INTERVAL_US
}

/// `ABORT`: the interrupt itself does the work
pub fn do_abort<D: Device>(ctx: &mut Context<'_, D>, _packet: CommandPacket) {
    let _ = writeln!(ctx.device.log(), "Processing abort request");
}

/// `MSTATUS`: report the top frame
pub fn do_mstatus<D: Device>(ctx: &mut Context<'_, D>, _packet: CommandPacket) {
    let _ = writeln!(ctx.device.log(), "Processing mstatus request");
    let top = ctx.kernel.stack.top();
    writeln!(ctx.device.net(), "State: {} {}", top.state.name(), top.arg);
}

/// `FIRMWARE`: report the firmware version
pub fn do_firmware<D: Device>(ctx: &mut Context<'_, D>, _packet: CommandPacket) {
    let _ = writeln!(ctx.device.log(), "Processing firmware request");
    writeln!(ctx.device.net(), "Firmware: {}", D::FIRMWARE_VERSION);
}

/// `DEBUGOFF`: silence the debug sink
pub fn do_debug_off<D: Device>(ctx: &mut Context<'_, D>, _packet: CommandPacket) {
    let log = ctx.device.log();
    let _ = writeln!(log, "Disabling low level debug output");
    log.disable();
}

/// Unparseable input
pub fn do_no_command<D: Device>(ctx: &mut Context<'_, D>, _packet: CommandPacket) {
    ctx.fail(ErrorCause::UnknownCommand);
}

/// Reply for commands the variant cannot perform
pub fn do_not_supported<D: Device>(ctx: &mut Context<'_, D>, packet: CommandPacket) {
    writeln!(
        ctx.device.net(),
        "# {} not supported",
        command_name(packet.command)
    );
}

/// Microseconds until the next multiple of `epoch_ms` on the controller clock
pub fn until_next_epoch<D: Device>(ctx: &Context<'_, D>, epoch_ms: u32) -> u32 {
    let epoch_ms = epoch_ms.max(1);
    let ms = epoch_ms - ctx.now_ms() % epoch_ms;
    ms.saturating_mul(1000)
}
