//! Command tags and packets

use core::fmt;

/// Number of distinct [`Command`] tags
pub const COMMAND_COUNT: usize = 11;

/// Commands understood by Apiary devices
///
/// Every device variant must handle every tag; a variant answers the ones
/// its hardware cannot perform with a "not supported" line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Stop whatever long-running work is in progress
    Abort,
    /// Seek the home position
    Home,
    /// Move to an absolute position (payload: target)
    Abs,
    /// Report position
    PStatus,
    /// Report the current machine state
    MStatus,
    /// Report synchronisation status
    SStatus,
    /// Report the amplitude histogram
    HStatus,
    /// Report firmware version
    Firmware,
    /// Report device capabilities
    Caps,
    /// Disable low level debug output
    DebugOff,
    /// Received text was not a command
    NoCommand,
}

impl Command {
    /// All command tags, in declaration order
    pub const ALL: [Command; COMMAND_COUNT] = [
        Command::Abort,
        Command::Home,
        Command::Abs,
        Command::PStatus,
        Command::MStatus,
        Command::SStatus,
        Command::HStatus,
        Command::Firmware,
        Command::Caps,
        Command::DebugOff,
        Command::NoCommand,
    ];

    /// Wire token for this command (empty for [`Command::NoCommand`])
    pub const fn token(self) -> &'static str {
        match self {
            Command::Abort => "ABORT",
            Command::Home => "HOME",
            Command::Abs => "ABS",
            Command::PStatus => "PSTATUS",
            Command::MStatus => "MSTATUS",
            Command::SStatus => "SSTATUS",
            Command::HStatus => "HSTATUS",
            Command::Firmware => "FIRMWARE",
            Command::Caps => "CAPS",
            Command::DebugOff => "DEBUGOFF",
            Command::NoCommand => "",
        }
    }

    /// Check if this command requires an integer argument
    pub const fn takes_argument(self) -> bool {
        matches!(self, Command::Abs)
    }

    /// Look up a command by its wire token (case-insensitive)
    pub fn from_token(token: &str) -> Option<Command> {
        Command::ALL
            .iter()
            .copied()
            .filter(|c| *c != Command::NoCommand)
            .find(|c| c.token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NoCommand => f.write_str("<none>"),
            other => f.write_str(other.token()),
        }
    }
}

/// A parsed command with its optional argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandPacket {
    /// Which command was received
    pub command: Command,
    /// Integer argument, if the command takes one
    pub argument: Option<i32>,
}

impl CommandPacket {
    /// Create a packet without an argument
    pub const fn new(command: Command) -> Self {
        Self {
            command,
            argument: None,
        }
    }

    /// Create a packet with an integer argument
    pub const fn with_argument(command: Command, argument: i32) -> Self {
        Self {
            command,
            argument: Some(argument),
        }
    }

    /// The sentinel packet for unparseable input
    pub const fn none() -> Self {
        Self::new(Command::NoCommand)
    }
}
