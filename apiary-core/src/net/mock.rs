//! Scripted transport for multiplexer tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use apiary_hal::{NetClient, NetServer};
use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};

#[derive(Debug)]
pub struct MockError;

impl embedded_io::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Default)]
struct Wire {
    inbound: VecDeque<u8>,
    writes: Vec<Vec<u8>>,
    flushes: usize,
    disconnected: bool,
    stopped: bool,
}

/// Client whose wire stays observable after it moves into a slot
#[derive(Clone)]
pub struct MockClient {
    id: u8,
    wire: Rc<RefCell<Wire>>,
}

impl MockClient {
    pub fn new(id: u8) -> Self {
        Self {
            id,
            wire: Rc::new(RefCell::new(Wire::default())),
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn feed(&self, bytes: &[u8]) {
        self.wire.borrow_mut().inbound.extend(bytes.iter().copied());
    }

    /// Each transport write call, in order
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.wire.borrow().writes.clone()
    }

    /// Everything written, concatenated
    pub fn received(&self) -> Vec<u8> {
        self.wire.borrow().writes.concat()
    }

    pub fn flushes(&self) -> usize {
        self.wire.borrow().flushes
    }

    pub fn disconnect(&self) {
        self.wire.borrow_mut().disconnected = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.wire.borrow().stopped
    }
}

impl ErrorType for MockClient {
    type Error = MockError;
}

impl Read for MockClient {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        let mut count = 0;
        while count < buf.len() {
            match wire.inbound.pop_front() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

impl ReadReady for MockClient {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.wire.borrow().inbound.is_empty())
    }
}

impl Write for MockClient {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.wire.borrow_mut().writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.wire.borrow_mut().flushes += 1;
        Ok(())
    }
}

impl NetClient for MockClient {
    fn is_connected(&self) -> bool {
        let wire = self.wire.borrow();
        !wire.disconnected && !wire.stopped
    }

    fn stop(&mut self) {
        self.wire.borrow_mut().stopped = true;
    }
}

/// Server handing out queued clients
#[derive(Default)]
pub struct MockServer {
    pending: VecDeque<MockClient>,
}

impl MockServer {
    pub fn connect(&mut self, client: MockClient) {
        self.pending.push_back(client);
    }
}

impl NetServer for MockServer {
    type Client = MockClient;

    fn accept(&mut self) -> Option<MockClient> {
        self.pending.pop_front()
    }
}

/// Debug sink collecting text in memory
#[derive(Default)]
pub struct MemoryLog {
    pub text: std::string::String,
    pub disabled: bool,
}

impl core::fmt::Write for MemoryLog {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        if !self.disabled {
            self.text.push_str(s);
        }
        Ok(())
    }
}

impl apiary_hal::DebugSink for MemoryLog {
    fn disable(&mut self) {
        self.disabled = true;
    }

    fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

/// Line channel fed from a script of whole lines
#[derive(Default)]
pub struct ScriptChannel {
    pub inbound: VecDeque<Vec<u8>>,
    pub sent: Vec<u8>,
    pub flushes: usize,
}

impl ScriptChannel {
    pub fn push_line(&mut self, line: &str) {
        self.inbound.push_back(line.as_bytes().to_vec());
    }

    pub fn sent_text(&self) -> std::string::String {
        std::string::String::from_utf8_lossy(&self.sent).into_owned()
    }
}

impl crate::net::LineChannel for ScriptChannel {
    fn read_line(&mut self, line: &mut apiary_protocol::Line) -> bool {
        match self.inbound.pop_front() {
            Some(bytes) => {
                line.clear();
                let _ = line.extend_from_slice(&bytes);
                true
            }
            None => false,
        }
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.sent.extend_from_slice(bytes);
        bytes.len()
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}
