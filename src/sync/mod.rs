//! Peer-to-peer synchronization.
//!
//! - `message`: the wire protocol
//! - `pending`: parking slots for partner payloads that arrive early
//! - `engine`: the per-peer state machine driving both

pub mod engine;
pub mod message;
pub mod pending;

pub use engine::SyncEngine;
pub use message::{Envelope, Message};
pub use pending::PendingBuffer;
