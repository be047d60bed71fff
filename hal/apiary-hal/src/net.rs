//! Network transport abstractions
//!
//! A device listens on one socket and serves a handful of clients. Byte
//! transfer goes through the `embedded-io` traits so the same multiplexer
//! runs over an ESP8266 Wi-Fi client, an embassy-net socket or a host
//! `TcpStream`.
//!
//! Link bring-up (joining a network, address assignment) happens before
//! any of these traits are used and is not modelled here.

use embedded_io::{Read, ReadReady, Write};

/// One connected remote client
///
/// `read` is only called after `read_ready` reported data, so blocking
/// implementations never stall the cooperative loop. Transport errors are
/// not surfaced to the firmware as faults: implementations mark themselves
/// disconnected and [`NetClient::is_connected`] reports it on the next
/// occupancy check.
pub trait NetClient: Read + ReadReady + Write {
    /// Check if the remote end is still connected
    fn is_connected(&self) -> bool;

    /// Close the connection
    fn stop(&mut self);
}

/// Listening socket
pub trait NetServer {
    /// Client type produced by this server
    type Client: NetClient;

    /// Accept one pending connection, if any
    ///
    /// Must not block.
    fn accept(&mut self) -> Option<Self::Client>;
}
