//! Frame arguments

use core::fmt;

/// Travel direction carried by a frame argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Opposite direction
    pub const fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Which variant an [`Argument`] holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArgumentKind {
    None,
    Int,
    Dir,
}

/// Value attached to a stack frame
///
/// Positions, targets and deadlines are all integers. Deadlines are
/// millisecond timestamps from the tick clock stored bit-for-bit in the
/// integer variant; see [`Argument::deadline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Argument {
    #[default]
    None,
    Int(i32),
    Dir(Direction),
}

/// A frame argument was read as the wrong variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArgumentError {
    /// Variant the caller asked for
    pub expected: ArgumentKind,
    /// Variant actually stored
    pub found: ArgumentKind,
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "argument mismatch: expected {:?}, found {:?}",
            self.expected, self.found
        )
    }
}

impl Argument {
    /// Store a tick-clock deadline
    pub const fn from_deadline(ms: u32) -> Self {
        Argument::Int(ms as i32)
    }

    /// Variant tag
    pub const fn kind(&self) -> ArgumentKind {
        match self {
            Argument::None => ArgumentKind::None,
            Argument::Int(_) => ArgumentKind::Int,
            Argument::Dir(_) => ArgumentKind::Dir,
        }
    }

    pub const fn is_none(&self) -> bool {
        matches!(self, Argument::None)
    }

    /// Integer payload
    pub fn int(&self) -> Result<i32, ArgumentError> {
        match *self {
            Argument::Int(value) => Ok(value),
            _ => Err(self.mismatch(ArgumentKind::Int)),
        }
    }

    /// Integer payload reinterpreted as a tick-clock deadline
    pub fn deadline(&self) -> Result<u32, ArgumentError> {
        self.int().map(|value| value as u32)
    }

    /// Direction payload
    pub fn dir(&self) -> Result<Direction, ArgumentError> {
        match *self {
            Argument::Dir(dir) => Ok(dir),
            _ => Err(self.mismatch(ArgumentKind::Dir)),
        }
    }

    fn mismatch(&self, expected: ArgumentKind) -> ArgumentError {
        ArgumentError {
            expected,
            found: self.kind(),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::None => f.write_str("NoArg"),
            Argument::Int(value) => write!(f, "{}", value),
            Argument::Dir(Direction::Forward) => f.write_str("FORWARD"),
            Argument::Dir(Direction::Reverse) => f.write_str("REVERSE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::format;

    #[test]
    fn test_checked_access() {
        assert_eq!(Argument::Int(42).int(), Ok(42));
        assert_eq!(
            Argument::Dir(Direction::Forward).dir(),
            Ok(Direction::Forward)
        );
    }

    #[test]
    fn test_wrong_variant_is_reported() {
        let err = Argument::None.int().unwrap_err();
        assert_eq!(err.expected, ArgumentKind::Int);
        assert_eq!(err.found, ArgumentKind::None);

        let err = Argument::Int(3).dir().unwrap_err();
        assert_eq!(err.expected, ArgumentKind::Dir);
        assert_eq!(err.found, ArgumentKind::Int);
    }

    #[test]
    fn test_deadline_survives_high_clock_values() {
        let late = u32::MAX - 5;
        assert_eq!(Argument::from_deadline(late).deadline(), Ok(late));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Argument::None), "NoArg");
        assert_eq!(format!("{}", Argument::Int(-7)), "-7");
        assert_eq!(format!("{}", Argument::Dir(Direction::Reverse)), "REVERSE");
        assert_eq!(Direction::Reverse.reversed(), Direction::Forward);
    }
}
