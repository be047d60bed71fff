//! Line-oriented connection multiplexer
//!
//! A fixed pool of client slots fed from one listening server. Inbound
//! bytes are assembled into lines; outbound text is broadcast to every
//! connected client.

pub mod channel;
pub mod multiplexer;
pub mod slot;

#[cfg(test)]
pub(crate) mod mock;

pub use channel::LineChannel;
pub use multiplexer::{Multiplexer, EVICTION_NOTICE, MAX_CONNECTIONS, NET_POLL_INTERVAL_US};
pub use slot::{ConnectionSlot, INCOMING_BUFFER_SIZE, OUTGOING_BUFFER_SIZE};
