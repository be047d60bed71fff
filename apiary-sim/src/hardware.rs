//! Simulated boards
//!
//! Pin activity is logged through `tracing`; inputs are synthesized so the
//! devices have something plausible to work with.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use apiary_devices::{FocuserPin, SoundPin};
use apiary_hal::{Clock, Hardware, PinIoMode, PinState, SensorError, TemperatureSensor};
use tracing::{debug, info, trace};

/// Resting level of the simulated microphone
const MIC_CENTER: u16 = 200;

/// Microphone board
///
/// Readings alternate above and below [`MIC_CENTER`] with an amplitude that
/// ramps slowly from 0 to 127 and wraps, so every one-second window sees a
/// different peak-to-peak value.
#[derive(Debug, Default)]
pub struct SimSoundBoard {
    reads: u32,
}

impl SimSoundBoard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Hardware for SimSoundBoard {
    type Pin = SoundPin;

    fn pin_mode(&mut self, pin: SoundPin, mode: PinIoMode) {
        debug!("PM ({:?}) = {:?}", pin, mode);
    }

    fn digital_write(&mut self, pin: SoundPin, state: PinState) {
        debug!("DW ({:?}) = {:?}", pin, state);
    }

    fn digital_read(&mut self, pin: SoundPin) -> PinState {
        debug!("DR ({:?}) returning Low", pin);
        PinState::Low
    }

    fn analog_read(&mut self, _pin: SoundPin) -> u16 {
        let amplitude = ((self.reads / 2000) % 128) as u16;
        let value = if self.reads & 1 == 0 {
            MIC_CENTER + amplitude
        } else {
            MIC_CENTER - amplitude
        };
        self.reads = self.reads.wrapping_add(1);
        value
    }
}

/// Stepper driver with a home switch
///
/// The carriage moves one step on every rising edge of `Step` while the
/// driver is awake; the home switch closes (reads low) at position 0 and
/// below.
#[derive(Debug)]
pub struct SimStepperBoard {
    carriage: i32,
    step_high: bool,
    forward: bool,
    awake: bool,
}

impl SimStepperBoard {
    pub fn new(start_position: i32) -> Self {
        Self {
            carriage: start_position,
            step_high: false,
            forward: true,
            awake: true,
        }
    }

    #[cfg(test)]
    fn carriage(&self) -> i32 {
        self.carriage
    }
}

impl Hardware for SimStepperBoard {
    type Pin = FocuserPin;

    fn pin_mode(&mut self, pin: FocuserPin, mode: PinIoMode) {
        debug!("PM ({:?}) = {:?}", pin, mode);
    }

    fn digital_write(&mut self, pin: FocuserPin, state: PinState) {
        let high = state.is_high();
        match pin {
            FocuserPin::Step => {
                if high && !self.step_high && self.awake {
                    self.carriage += if self.forward { 1 } else { -1 };
                    trace!(carriage = self.carriage, "step");
                }
                self.step_high = high;
            }
            FocuserPin::Dir => {
                if self.forward != high {
                    debug!("DW (Dir) = {:?}", state);
                }
                self.forward = high;
            }
            FocuserPin::Sleep => {
                if self.awake != high {
                    let wake = if high { "awake" } else { "asleep" };
                    info!(carriage = self.carriage, "stepper driver {}", wake);
                }
                self.awake = high;
            }
            FocuserPin::Home => debug!("DW (Home) = {:?} ignored on an input", state),
        }
    }

    fn digital_read(&mut self, pin: FocuserPin) -> PinState {
        match pin {
            FocuserPin::Home => PinState::from_high(self.carriage > 0),
            FocuserPin::Dir => PinState::from_high(self.forward),
            FocuserPin::Sleep => PinState::from_high(self.awake),
            FocuserPin::Step => PinState::from_high(self.step_high),
        }
    }

    fn analog_read(&mut self, pin: FocuserPin) -> u16 {
        debug!("AR ({:?}) returning 0", pin);
        0
    }
}

/// Thermometer drifting around 21.5 °C
#[derive(Debug, Default)]
pub struct SimThermometer {
    reads: u32,
}

impl SimThermometer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemperatureSensor for SimThermometer {
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        // Triangle wave, 20 readings from 205 up to 225 and back
        let phase = (self.reads % 40) as i16;
        self.reads = self.reads.wrapping_add(1);
        Ok(if phase < 20 { 205 + phase } else { 245 - phase })
    }

    fn read_humidity_x10(&mut self) -> Result<i16, SensorError> {
        Ok(450)
    }
}

/// Wall clock plus a monotonic millisecond counter
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    start: Instant,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SimClock {
    fn secs_since_epoch(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_secs() as u32)
            .unwrap_or(0)
    }

    fn millis(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}
