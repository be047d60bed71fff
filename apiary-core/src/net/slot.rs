//! Per-client connection state

use apiary_hal::NetClient;
use apiary_protocol::{Line, MAX_LINE_LEN};
use heapless::Vec;

/// Outbound buffer capacity per client
pub const OUTGOING_BUFFER_SIZE: usize = 1500;

/// Capacity of each of the two inbound buffers
pub const INCOMING_BUFFER_SIZE: usize = 2 * MAX_LINE_LEN;

/// Bytes pulled from the transport per read call
const READ_CHUNK: usize = 64;

type IncomingBuffer = Vec<u8, INCOMING_BUFFER_SIZE>;

/// One client slot of the multiplexer
///
/// Inbound bytes accumulate in the current of two buffers. When a line is
/// taken, whatever followed its terminator moves to the other buffer and
/// the two swap roles. Slots are reset on eviction and reused, never
/// destroyed.
pub struct ConnectionSlot<C> {
    client: Option<C>,
    incoming: [IncomingBuffer; 2],
    current: usize,
    /// Dropping bytes of an over-long line until its terminator
    discarding: bool,
    outgoing: Vec<u8, OUTGOING_BUFFER_SIZE>,
    /// Transport has nothing buffered on our behalf
    all_flushed: bool,
}

impl<C: NetClient> Default for ConnectionSlot<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NetClient> ConnectionSlot<C> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            client: None,
            incoming: [Vec::new(), Vec::new()],
            current: 0,
            discarding: false,
            outgoing: Vec::new(),
            all_flushed: true,
        }
    }

    /// Check if a live client is attached
    pub fn is_occupied(&self) -> bool {
        self.client.as_ref().is_some_and(|c| c.is_connected())
    }

    /// Attached client, live or not
    pub fn client(&self) -> Option<&C> {
        self.client.as_ref()
    }

    /// Close any attached client and clear all buffers
    pub fn reset(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.stop();
        }
        for buffer in self.incoming.iter_mut() {
            buffer.clear();
        }
        self.current = 0;
        self.discarding = false;
        self.outgoing.clear();
        self.all_flushed = true;
    }

    /// Reset the slot and hand it to a new client
    pub fn attach(&mut self, client: C) {
        self.reset();
        self.client = Some(client);
    }

    /// Bytes received but not yet returned as a line
    pub fn pending_bytes(&self) -> usize {
        self.incoming[self.current].len()
    }

    /// Bytes queued for the transport
    pub fn queued_bytes(&self) -> usize {
        self.outgoing.len()
    }

    /// Pull whatever the transport has ready into the current buffer
    pub fn poll_incoming(&mut self) {
        let Some(client) = self.client.as_mut() else {
            return;
        };
        if !client.is_connected() {
            return;
        }

        loop {
            if !matches!(client.read_ready(), Ok(true)) {
                return;
            }

            let buffer = &mut self.incoming[self.current];
            let free = buffer.capacity() - buffer.len();
            if free == 0 {
                if buffer.contains(&b'\n') {
                    // A complete line is waiting; leave the rest in the transport
                    return;
                }
                buffer.clear();
                self.discarding = true;
                continue;
            }

            let mut chunk = [0u8; READ_CHUNK];
            let want = free.min(READ_CHUNK);
            let count = match client.read(&mut chunk[..want]) {
                Ok(0) | Err(_) => return,
                Ok(count) => count,
            };
            for &byte in &chunk[..count] {
                ingest(buffer, &mut self.discarding, byte);
            }
        }
    }

    /// Move the next complete line into `line`
    ///
    /// The terminator and a trailing `\r` are stripped. Lines longer than
    /// [`MAX_LINE_LEN`] are dropped.
    pub fn take_line(&mut self, line: &mut Line) -> bool {
        loop {
            let [first, second] = &mut self.incoming;
            let (src, dst) = if self.current == 0 {
                (first, second)
            } else {
                (second, first)
            };

            let Some(newline) = src.iter().position(|&b| b == b'\n') else {
                return false;
            };
            let mut end = newline;
            if end > 0 && src[end - 1] == b'\r' {
                end -= 1;
            }

            let fits = end <= MAX_LINE_LEN;
            if fits {
                line.clear();
                let _ = line.extend_from_slice(&src[..end]);
            }

            dst.clear();
            let _ = dst.extend_from_slice(&src[newline + 1..]);
            src.clear();
            self.current = 1 - self.current;

            if fits {
                return true;
            }
        }
    }

    /// Queue bytes for this client
    ///
    /// A write that would overflow the buffer flushes it first; a write
    /// larger than the whole buffer goes straight to the transport.
    pub fn write(&mut self, bytes: &[u8]) {
        if !self.is_occupied() {
            return;
        }
        if self.outgoing.len() + bytes.len() > OUTGOING_BUFFER_SIZE {
            self.flush();
        }
        if bytes.len() > OUTGOING_BUFFER_SIZE {
            if let Some(client) = self.client.as_mut() {
                let _ = client.write_all(bytes);
            }
            self.all_flushed = false;
            return;
        }
        let _ = self.outgoing.extend_from_slice(bytes);
    }

    /// Hand queued bytes to the transport in one write
    ///
    /// With nothing queued, asks the transport to drain its own buffer
    /// once after the last write.
    pub fn flush(&mut self) {
        if !self.is_occupied() {
            return;
        }
        let Some(client) = self.client.as_mut() else {
            return;
        };
        if !self.outgoing.is_empty() {
            let _ = client.write_all(&self.outgoing);
            self.outgoing.clear();
            self.all_flushed = false;
        } else if !self.all_flushed {
            self.all_flushed = client.flush().is_ok();
        }
    }
}

fn ingest(buffer: &mut IncomingBuffer, discarding: &mut bool, byte: u8) {
    if *discarding {
        if byte == b'\n' {
            *discarding = false;
        }
        return;
    }
    if byte == b'\n' && buffer.last() == Some(&b'\\') {
        // Line continuation
        buffer.pop();
        return;
    }
    let _ = buffer.push(byte);
}
