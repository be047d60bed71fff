//! Focuser states

use apiary_core::state::StateTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FocuserState {
    /// Read commands; fall asleep after inactivity
    AcceptCommands,
    /// Step toward a target (arg: target position)
    MoveTo,
    /// Step backwards until the home switch closes
    StopAtHome,
    /// Driver powered down; poll for commands slowly
    Sleep,
    /// Wait for the driver to power up (arg: ready deadline)
    Wake,
    /// Permanent fault
    Error,
}

impl StateTag for FocuserState {
    const ACCEPT_COMMANDS: Self = FocuserState::AcceptCommands;
    const ERROR_STATE: Self = FocuserState::Error;
    const ALL: &'static [Self] = &[
        FocuserState::AcceptCommands,
        FocuserState::MoveTo,
        FocuserState::StopAtHome,
        FocuserState::Sleep,
        FocuserState::Wake,
        FocuserState::Error,
    ];

    fn name(self) -> &'static str {
        match self {
            FocuserState::AcceptCommands => "ACCEPTING_COMMANDS",
            FocuserState::MoveTo => "MOVING",
            FocuserState::StopAtHome => "STOP_AT_HOME",
            FocuserState::Sleep => "SLEEPING",
            FocuserState::Wake => "WAKING",
            FocuserState::Error => "ERROR ERROR ERROR",
        }
    }
}
