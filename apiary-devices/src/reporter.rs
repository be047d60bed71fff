//! Periodic temperature broadcast

use core::fmt::Write;

use apiary_core::net::LineChannel;
use apiary_core::scheduler::Action;
use apiary_hal::{DebugSink, TemperatureSensor};

/// Delay between reports (1 s)
pub const REPORT_INTERVAL_US: u32 = 1_000_000;

/// Action that sends `temperature <tenths of °C>` once a second
pub struct TemperatureReporter<N, T, L> {
    net: N,
    sensor: T,
    log: L,
}

impl<N, T, L> TemperatureReporter<N, T, L>
where
    N: LineChannel,
    T: TemperatureSensor,
    L: DebugSink,
{
    pub fn new(net: N, sensor: T, log: L) -> Self {
        Self { net, sensor, log }
    }
}

impl<N, T, L> Action for TemperatureReporter<N, T, L>
where
    N: LineChannel,
    T: TemperatureSensor,
    L: DebugSink,
{
    fn poll(&mut self) -> u32 {
        match self.sensor.read_celsius_x10() {
            Ok(tenths) => {
                writeln!(self.net, "temperature {}", tenths);
                self.net.flush();
            }
            Err(err) => {
                let _ = writeln!(self.log, "temperature read failed: {:?}", err);
            }
        }
        REPORT_INTERVAL_US
    }

    fn name(&self) -> &'static str {
        "temperature"
    }
}
