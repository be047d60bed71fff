//! Non-blocking TCP transport
//!
//! Adapts `std::net` sockets to the [`NetServer`]/[`NetClient`]
//! capabilities. Nothing here ever blocks: accept, read and write return
//! straight away when the socket has nothing to offer.

use std::io::{self, Read as _, Write as _};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};

use apiary_hal::{NetClient, NetServer};
use embedded_io::{ErrorType, Read, ReadReady, Write};
use tracing::{debug, info, warn};

/// Transport error carrying the socket's error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetError(pub io::ErrorKind);

impl embedded_io::Error for NetError {
    fn kind(&self) -> embedded_io::ErrorKind {
        use embedded_io::ErrorKind as Kind;
        match self.0 {
            io::ErrorKind::ConnectionReset => Kind::ConnectionReset,
            io::ErrorKind::ConnectionAborted => Kind::ConnectionAborted,
            io::ErrorKind::NotConnected => Kind::NotConnected,
            io::ErrorKind::BrokenPipe => Kind::BrokenPipe,
            io::ErrorKind::TimedOut => Kind::TimedOut,
            io::ErrorKind::Interrupted => Kind::Interrupted,
            _ => Kind::Other,
        }
    }
}

impl From<io::Error> for NetError {
    fn from(e: io::Error) -> Self {
        NetError(e.kind())
    }
}

/// Listening socket
pub struct TcpServer {
    listener: TcpListener,
}

impl TcpServer {
    pub fn bind(addr: SocketAddr) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        let server = Self { listener };
        info!("Telnet to this address to connect: {}", server.local_addr()?);
        Ok(server)
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl NetServer for TcpServer {
    type Client = TcpClient;

    fn accept(&mut self) -> Option<TcpClient> {
        match self.listener.accept() {
            Ok((stream, peer)) => match TcpClient::new(stream) {
                Ok(client) => {
                    info!(%peer, "client connected");
                    Some(client)
                }
                Err(e) => {
                    warn!(%peer, "failed to configure client socket: {}", e);
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => None,
            Err(e) => {
                warn!("accept failed: {}", e);
                None
            }
        }
    }
}

/// One connected client
pub struct TcpClient {
    stream: TcpStream,
    connected: bool,
}

impl TcpClient {
    fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            connected: true,
        })
    }

    /// Note a failure, dropping the connection unless the socket was just busy
    fn check<T>(&mut self, result: io::Result<T>, idle: T) -> Result<T, NetError> {
        match result {
            Ok(value) => Ok(value),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(idle),
            Err(e) => {
                debug!("client dropped: {}", e);
                self.connected = false;
                Err(e.into())
            }
        }
    }
}

impl ErrorType for TcpClient {
    type Error = NetError;
}

impl ReadReady for TcpClient {
    fn read_ready(&mut self) -> Result<bool, NetError> {
        let mut probe = [0u8; 1];
        let result = self.stream.peek(&mut probe).map(Some);
        match self.check(result, None)? {
            // Readable with nothing to read: the peer hung up
            Some(0) => {
                self.connected = false;
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }
}

impl Read for TcpClient {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        let result = self.stream.read(buf).map(Some);
        match self.check(result, None)? {
            Some(0) if !buf.is_empty() => {
                self.connected = false;
                Ok(0)
            }
            Some(count) => Ok(count),
            None => Ok(0),
        }
    }
}

impl Write for TcpClient {
    fn write(&mut self, buf: &[u8]) -> Result<usize, NetError> {
        let result = self.stream.write(buf).map(Some);
        match self.check(result, None)? {
            Some(count) => Ok(count),
            // A full send buffer drops the rest of this write
            None => Err(NetError(io::ErrorKind::WouldBlock)),
        }
    }

    fn flush(&mut self) -> Result<(), NetError> {
        let result = self.stream.flush();
        self.check(result, ())
    }
}

impl NetClient for TcpClient {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn stop(&mut self) {
        if self.connected {
            let _ = self.stream.shutdown(Shutdown::Both);
            self.connected = false;
        }
    }
}
