//! Fixed-capacity connection pool
//!
//! New connections take the first free slot. With every slot busy, the
//! slot under a round-robin cursor is evicted: its client gets one notice
//! line and is closed, then the newcomer takes over. The cursor only moves
//! when an eviction actually happens.

use apiary_hal::{DebugSink, NetServer};
use apiary_protocol::Line;

use super::channel::LineChannel;
use super::slot::ConnectionSlot;
use crate::scheduler::Action;

/// Number of client slots
pub const MAX_CONNECTIONS: usize = 4;

/// Delay requested by the multiplexer's housekeeping action (0.5 s)
pub const NET_POLL_INTERVAL_US: u32 = 500_000;

/// Sent to a client that is being evicted to make room
pub const EVICTION_NOTICE: &str = "# New Client and no free slots - Dropping Your Connection.\n";

/// Connection pool and line broadcaster
pub struct Multiplexer<S: NetServer, L: DebugSink> {
    server: S,
    log: L,
    slots: [ConnectionSlot<S::Client>; MAX_CONNECTIONS],
    next_to_kick: usize,
    banner: &'static str,
}

impl<S: NetServer, L: DebugSink> Multiplexer<S, L> {
    /// Create a multiplexer serving `server`
    ///
    /// `banner` is sent to every new client and should end with `\n`.
    pub fn new(server: S, log: L, banner: &'static str) -> Self {
        Self {
            server,
            log,
            slots: core::array::from_fn(|_| ConnectionSlot::new()),
            next_to_kick: 0,
            banner,
        }
    }

    /// Accept at most one pending connection
    pub fn handle_new_connections(&mut self) {
        let Some(client) = self.server.accept() else {
            return;
        };
        let _ = writeln!(self.log, "New client connecting");

        let index = match self.slots.iter().position(|slot| !slot.is_occupied()) {
            Some(free) => free,
            None => {
                let victim = self.next_to_kick;
                self.next_to_kick = (victim + 1) % MAX_CONNECTIONS;
                victim
            }
        };
        let _ = writeln!(
            self.log,
            "Using slot {} of {} for the new client",
            index,
            MAX_CONNECTIONS - 1
        );

        let slot = &mut self.slots[index];
        if slot.is_occupied() {
            let _ = writeln!(self.log, "Slot {} busy, disconnecting its client", index);
            slot.write(EVICTION_NOTICE.as_bytes());
            slot.flush();
        }
        slot.attach(client);
        slot.write(self.banner.as_bytes());
    }

    /// Slot at `index`
    pub fn slot(&self, index: usize) -> Option<&ConnectionSlot<S::Client>> {
        self.slots.get(index)
    }

    /// Number of slots with a live client
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_occupied()).count()
    }

    /// Slot the next eviction will hit
    pub fn next_to_kick(&self) -> usize {
        self.next_to_kick
    }

    pub fn server_mut(&mut self) -> &mut S {
        &mut self.server
    }

    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }
}

impl<S: NetServer, L: DebugSink> LineChannel for Multiplexer<S, L> {
    /// Returns the first complete line, scanning slots in index order
    fn read_line(&mut self, line: &mut Line) -> bool {
        self.handle_new_connections();
        self.slots.iter_mut().any(|slot| {
            slot.poll_incoming();
            slot.take_line(line)
        })
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        for slot in self.slots.iter_mut() {
            slot.write(bytes);
        }
        bytes.len()
    }

    fn flush(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.flush();
        }
    }
}

impl<S: NetServer, L: DebugSink> Action for Multiplexer<S, L> {
    fn poll(&mut self) -> u32 {
        self.handle_new_connections();
        LineChannel::flush(self);
        NET_POLL_INTERVAL_US
    }

    fn name(&self) -> &'static str {
        "net"
    }
}
