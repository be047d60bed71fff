//! Pin-level hardware abstractions
//!
//! A device variant names its pins with its own enum and the board glue
//! maps those names onto real GPIOs. The core never assumes a numbering
//! scheme beyond the opaque [`Hardware::Pin`] identifier.

/// Direction a pin is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinIoMode {
    /// Pin is read by the firmware
    Input,
    /// Pin is read with the internal pull-up enabled
    InputPullup,
    /// Pin is driven by the firmware
    Output,
}

/// Logic level of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    /// Logic 0
    #[default]
    Low,
    /// Logic 1
    High,
}

impl PinState {
    /// Build a pin state from a boolean (true = high)
    pub const fn from_high(high: bool) -> Self {
        if high {
            PinState::High
        } else {
            PinState::Low
        }
    }

    /// Check if this is the high level
    pub const fn is_high(self) -> bool {
        matches!(self, PinState::High)
    }
}

/// Pin-level hardware interface
///
/// Implementations handle the register access (or simulation) for the
/// specific board.
pub trait Hardware {
    /// Opaque pin identifier, usually a per-variant enum
    type Pin: Copy;

    /// Configure a pin's direction
    fn pin_mode(&mut self, pin: Self::Pin, mode: PinIoMode);

    /// Drive an output pin
    fn digital_write(&mut self, pin: Self::Pin, state: PinState);

    /// Read a digital pin
    fn digital_read(&mut self, pin: Self::Pin) -> PinState;

    /// Read an analog pin (raw ADC counts)
    fn analog_read(&mut self, pin: Self::Pin) -> u16;
}

impl<T: Hardware + ?Sized> Hardware for &mut T {
    type Pin = T::Pin;

    fn pin_mode(&mut self, pin: Self::Pin, mode: PinIoMode) {
        (**self).pin_mode(pin, mode);
    }

    fn digital_write(&mut self, pin: Self::Pin, state: PinState) {
        (**self).digital_write(pin, state);
    }

    fn digital_read(&mut self, pin: Self::Pin) -> PinState {
        (**self).digital_read(pin)
    }

    fn analog_read(&mut self, pin: Self::Pin) -> u16 {
        (**self).analog_read(pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_state_from_bool() {
        assert_eq!(PinState::from_high(true), PinState::High);
        assert_eq!(PinState::from_high(false), PinState::Low);
        assert!(PinState::High.is_high());
        assert!(!PinState::Low.is_high());
    }
}
