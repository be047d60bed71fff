//! Environmental sensor traits

/// Errors that can occur with sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor did not answer
    NotResponding,
    /// Reading out of expected range
    OutOfRange,
}

/// Trait for temperature sensors
pub trait TemperatureSensor {
    /// Read the current temperature with 0.1°C resolution
    ///
    /// For example, 21.5°C is returned as 215.
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError>;

    /// Read the relative humidity with 0.1% resolution
    fn read_humidity_x10(&mut self) -> Result<i16, SensorError>;
}
