//! Apiary Command Protocol
//!
//! This crate defines the plain-text protocol spoken between a device and
//! its network clients (a telnet session, an ASCOM driver, a logging
//! script). The protocol is line oriented and human readable.
//!
//! # Protocol Overview
//!
//! ```text
//! client → device   COMMAND [ARGUMENT]\n       e.g. "ABS 1200\n"
//! device → client   free-form text lines\n      e.g. "Position: 1200\n"
//!                   "# ..." lines are comments  e.g. "# ready for commands\n"
//! ```
//!
//! Tokens are case-insensitive and surrounding whitespace is ignored. A line
//! that does not parse becomes [`Command::NoCommand`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod parser;

pub use command::{Command, CommandPacket, COMMAND_COUNT};
pub use parser::{parse_command, Line, MAX_LINE_LEN};
