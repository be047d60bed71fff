//! Mocks shared by the device integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fmt;

use apiary_core::controller::{Controller, Device};
use apiary_core::net::LineChannel;
use apiary_devices::{FocuserPin, SoundPin};
use apiary_hal::{Clock, DebugSink, Hardware, PinIoMode, PinState};
use apiary_protocol::Line;

/// Line channel fed with whole lines, recording everything sent
#[derive(Default)]
pub struct ScriptNet {
    pub inbound: VecDeque<String>,
    pub sent: String,
}

impl ScriptNet {
    pub fn send(&mut self, line: &str) {
        self.inbound.push_back(line.to_string());
    }

    /// Drain what has been sent so far
    pub fn take_sent(&mut self) -> String {
        std::mem::take(&mut self.sent)
    }
}

impl LineChannel for ScriptNet {
    fn read_line(&mut self, line: &mut Line) -> bool {
        match self.inbound.pop_front() {
            Some(text) => {
                line.clear();
                let _ = line.extend_from_slice(text.as_bytes());
                true
            }
            None => false,
        }
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.sent.push_str(&String::from_utf8_lossy(bytes));
        bytes.len()
    }

    fn flush(&mut self) {}
}

/// Debug sink keeping text in memory
#[derive(Default)]
pub struct MemLog {
    pub text: String,
    pub disabled: bool,
}

impl fmt::Write for MemLog {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if !self.disabled {
            self.text.push_str(s);
        }
        Ok(())
    }
}

impl DebugSink for MemLog {
    fn disable(&mut self) {
        self.disabled = true;
    }

    fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

/// Wall clock stuck at one instant
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn secs_since_epoch(&self) -> u32 {
        self.0
    }

    fn millis(&self) -> u32 {
        0
    }
}

/// Microphone cycling through a fixed pattern of readings
pub struct SoundBoard {
    pattern: Vec<u16>,
    next: usize,
    pub reads: u64,
    pub mode: Option<PinIoMode>,
}

impl SoundBoard {
    pub fn new(pattern: &[u16]) -> Self {
        Self {
            pattern: pattern.to_vec(),
            next: 0,
            reads: 0,
            mode: None,
        }
    }
}

impl Hardware for SoundBoard {
    type Pin = SoundPin;

    fn pin_mode(&mut self, _pin: SoundPin, mode: PinIoMode) {
        self.mode = Some(mode);
    }

    fn digital_write(&mut self, _pin: SoundPin, _state: PinState) {}

    fn digital_read(&mut self, _pin: SoundPin) -> PinState {
        PinState::Low
    }

    fn analog_read(&mut self, _pin: SoundPin) -> u16 {
        let value = self.pattern[self.next];
        self.next = (self.next + 1) % self.pattern.len();
        self.reads += 1;
        value
    }
}

/// Stepper driver and home switch model
///
/// Tracks the physical carriage position from step pulses. The home
/// switch reads low once the carriage is at or below zero.
pub struct StepperBoard {
    pub carriage: i64,
    pub pulses: u64,
    pub dir_high: bool,
    step_high: bool,
    pub awake: bool,
    pub modes: Vec<(FocuserPin, PinIoMode)>,
}

impl StepperBoard {
    pub fn new(carriage: i64) -> Self {
        Self {
            carriage,
            pulses: 0,
            dir_high: false,
            step_high: false,
            awake: false,
            modes: Vec::new(),
        }
    }
}

impl Hardware for StepperBoard {
    type Pin = FocuserPin;

    fn pin_mode(&mut self, pin: FocuserPin, mode: PinIoMode) {
        self.modes.push((pin, mode));
    }

    fn digital_write(&mut self, pin: FocuserPin, state: PinState) {
        match pin {
            FocuserPin::Dir => self.dir_high = state.is_high(),
            FocuserPin::Step => {
                // Count rising edges
                if state.is_high() && !self.step_high {
                    self.pulses += 1;
                    self.carriage += if self.dir_high { 1 } else { -1 };
                }
                self.step_high = state.is_high();
            }
            FocuserPin::Sleep => self.awake = state.is_high(),
            FocuserPin::Home => {}
        }
    }

    fn digital_read(&mut self, pin: FocuserPin) -> PinState {
        match pin {
            FocuserPin::Home => PinState::from_high(self.carriage > 0),
            _ => PinState::Low,
        }
    }

    fn analog_read(&mut self, _pin: FocuserPin) -> u16 {
        0
    }
}

/// Tick until `done` holds, returning the number of ticks taken
pub fn run_until<D: Device>(
    controller: &mut Controller<D>,
    max_ticks: u64,
    mut done: impl FnMut(&mut Controller<D>) -> bool,
) -> u64 {
    for ticks in 0..max_ticks {
        if done(controller) {
            return ticks;
        }
        controller.tick();
    }
    assert!(done(controller), "condition not reached in {} ticks", max_ticks);
    max_ticks
}
