//! Per-build hardware parameters

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timing knobs for one focuser build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingParams {
    /// Command check period while idle (ms)
    pub epoch_between_command_checks_ms: u32,
    /// Steps taken between command checks while moving
    pub max_steps_between_checks: u32,
    /// Idle time before the driver is put to sleep (ms)
    pub inactivity_to_sleep_ms: u32,
    /// Command check period while asleep (ms)
    pub epoch_for_sleep_command_checks_ms: u32,
    /// Time for the driver to power up after waking (ms)
    pub time_to_power_stepper_ms: u32,
    /// Pause between steps (µs)
    pub step_pause_us: u32,
}

/// Hardware description of one focuser build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BuildParams {
    pub timing: TimingParams,
    /// A home switch is fitted
    pub has_home: bool,
    /// Largest reachable position
    pub max_abs_pos: i32,
}

/// Known focuser builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Build {
    LowPowerHyperstar,
    LowPowerHyperstarMicrostep,
    Traditional,
    UnitTestHyperstar,
    UnitTestTraditional,
}

const UNIT_TEST_TIMING: TimingParams = TimingParams {
    epoch_between_command_checks_ms: 10,
    max_steps_between_checks: 2,
    inactivity_to_sleep_ms: 1000,
    epoch_for_sleep_command_checks_ms: 500,
    time_to_power_stepper_ms: 200,
    step_pause_us: 1000,
};

impl Build {
    pub const ALL: [Build; 5] = [
        Build::LowPowerHyperstar,
        Build::LowPowerHyperstarMicrostep,
        Build::Traditional,
        Build::UnitTestHyperstar,
        Build::UnitTestTraditional,
    ];

    pub const fn params(self) -> BuildParams {
        match self {
            Build::LowPowerHyperstar => BuildParams {
                timing: TimingParams {
                    epoch_between_command_checks_ms: 100,
                    max_steps_between_checks: 100,
                    inactivity_to_sleep_ms: 5 * 60 * 1000,
                    epoch_for_sleep_command_checks_ms: 1000,
                    time_to_power_stepper_ms: 1000,
                    step_pause_us: 1000,
                },
                has_home: true,
                max_abs_pos: 50_000,
            },
            Build::LowPowerHyperstarMicrostep => BuildParams {
                timing: TimingParams {
                    epoch_between_command_checks_ms: 100,
                    max_steps_between_checks: 1000,
                    inactivity_to_sleep_ms: 5 * 60 * 1000,
                    epoch_for_sleep_command_checks_ms: 1000,
                    time_to_power_stepper_ms: 1000,
                    step_pause_us: 31,
                },
                has_home: true,
                max_abs_pos: 500_000,
            },
            Build::Traditional => BuildParams {
                timing: TimingParams {
                    epoch_between_command_checks_ms: 100,
                    max_steps_between_checks: 50,
                    inactivity_to_sleep_ms: 10 * 24 * 60 * 1000,
                    epoch_for_sleep_command_checks_ms: 1000,
                    time_to_power_stepper_ms: 1000,
                    step_pause_us: 1000,
                },
                has_home: false,
                max_abs_pos: 5000,
            },
            Build::UnitTestHyperstar => BuildParams {
                timing: UNIT_TEST_TIMING,
                has_home: true,
                max_abs_pos: 35_000,
            },
            Build::UnitTestTraditional => BuildParams {
                timing: UNIT_TEST_TIMING,
                has_home: false,
                max_abs_pos: 5000,
            },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Build::LowPowerHyperstar => "low_power_hyperstar",
            Build::LowPowerHyperstarMicrostep => "low_power_hyperstar_microstep",
            Build::Traditional => "traditional",
            Build::UnitTestHyperstar => "unit_test_hyperstar",
            Build::UnitTestTraditional => "unit_test_traditional",
        }
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
