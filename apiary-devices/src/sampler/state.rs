//! Sampler states

use apiary_core::state::StateTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerState {
    /// Read commands; start a session when idle
    AcceptCommands,
    /// One histogram session (arg: none before start, start time after)
    SampleHour,
    /// Session loop (arg: session deadline)
    HourLoop,
    /// Seed a one-second window
    Sample1Sec,
    /// Collect a one-second window (arg: window deadline)
    Sample1SecCollect,
    /// Command check between windows
    Pause,
    /// Permanent fault
    Error,
}

impl StateTag for SamplerState {
    const ACCEPT_COMMANDS: Self = SamplerState::AcceptCommands;
    const ERROR_STATE: Self = SamplerState::Error;
    const ALL: &'static [Self] = &[
        SamplerState::AcceptCommands,
        SamplerState::SampleHour,
        SamplerState::HourLoop,
        SamplerState::Sample1Sec,
        SamplerState::Sample1SecCollect,
        SamplerState::Pause,
        SamplerState::Error,
    ];

    fn name(self) -> &'static str {
        match self {
            SamplerState::AcceptCommands => "ACCEPTING_COMMANDS",
            SamplerState::SampleHour => "SAMPLE_HOUR",
            SamplerState::HourLoop => "HOUR_LOOP",
            SamplerState::Sample1Sec => "SAMPLE_1SEC_SOUNDS",
            SamplerState::Sample1SecCollect => "SAMPLE_1SEC_SOUNDS_COL",
            SamplerState::Pause => "PAUSE",
            SamplerState::Error => "ERROR ERROR ERROR",
        }
    }
}
