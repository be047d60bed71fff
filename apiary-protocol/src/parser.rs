//! Line tokenizer
//!
//! Turns one received line (terminator already stripped) into a
//! [`CommandPacket`]. Anything that is not exactly a known token, followed
//! by exactly one integer for commands that take one, is
//! [`Command::NoCommand`].

use core::str;

use heapless::Vec;

use crate::command::{Command, CommandPacket};

/// Maximum length of one inbound line in bytes (terminator excluded)
pub const MAX_LINE_LEN: usize = 128;

/// One inbound text line
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// Parse a received line into a command packet
pub fn parse_command(line: &[u8]) -> CommandPacket {
    let Ok(text) = str::from_utf8(line) else {
        return CommandPacket::none();
    };

    let mut tokens = text.split_ascii_whitespace();

    let Some(command) = tokens.next().and_then(Command::from_token) else {
        return CommandPacket::none();
    };

    let packet = if command.takes_argument() {
        match tokens.next().and_then(|t| t.parse::<i32>().ok()) {
            Some(arg) => CommandPacket::with_argument(command, arg),
            None => return CommandPacket::none(),
        }
    } else {
        CommandPacket::new(command)
    };

    // Trailing garbage invalidates the whole line
    if tokens.next().is_some() {
        return CommandPacket::none();
    }

    packet
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command(b"ABORT"), CommandPacket::new(Command::Abort));
        assert_eq!(parse_command(b"  caps \r"), CommandPacket::new(Command::Caps));
        assert_eq!(
            parse_command(b"DebugOff"),
            CommandPacket::new(Command::DebugOff)
        );
    }

    #[test]
    fn test_parse_argument() {
        assert_eq!(
            parse_command(b"ABS 1200"),
            CommandPacket::with_argument(Command::Abs, 1200)
        );
        assert_eq!(
            parse_command(b"abs   -5"),
            CommandPacket::with_argument(Command::Abs, -5)
        );
    }

    #[test]
    fn test_missing_or_bad_argument() {
        assert_eq!(parse_command(b"ABS"), CommandPacket::none());
        assert_eq!(parse_command(b"ABS ten"), CommandPacket::none());
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert_eq!(parse_command(b"PSTATUS now"), CommandPacket::none());
        assert_eq!(parse_command(b"ABS 10 20"), CommandPacket::none());
    }

    #[test]
    fn test_empty_and_invalid_utf8() {
        assert_eq!(parse_command(b""), CommandPacket::none());
        assert_eq!(parse_command(b"   "), CommandPacket::none());
        assert_eq!(parse_command(&[0xff, 0xfe]), CommandPacket::none());
    }

    proptest! {
        #[test]
        fn test_abs_accepts_any_i32(target in any::<i32>()) {
            let mut text: heapless::String<32> = heapless::String::new();
            core::fmt::write(&mut text, format_args!("ABS {}", target)).unwrap();
            prop_assert_eq!(
                parse_command(text.as_bytes()),
                CommandPacket::with_argument(Command::Abs, target)
            );
        }

        #[test]
        fn test_parser_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..MAX_LINE_LEN)) {
            let _ = parse_command(&bytes);
        }
    }
}
