//! Broadcast channel abstraction.
//!
//! The synchronization engine talks to the outside world through
//! [`Transport`]. Implementations must broadcast every frame to every
//! subscriber (the sender included) at least once, in no particular order.
//! Presence is only consulted to decide when the initializer may send `init`.
//!
//! [`local::LocalHub`] is an in-process implementation that can shuffle and
//! duplicate deliveries.

pub mod local;

pub use local::{DeliveryOptions, LocalEndpoint, LocalHub};

use serde::{Deserialize, Serialize};

use crate::core::TransportError;

/// Subscription state of an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    /// Subscription requested, not yet confirmed.
    Joining,
    /// Subscribed; frames sent now will be delivered to this endpoint.
    Joined,
    /// The channel is gone.
    Closed,
}

/// Membership change reported by the channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceEvent {
    Joined { key: String },
    Left { key: String },
}

/// Something the channel delivered to an endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// An encoded protocol frame.
    Frame(String),
    Presence(PresenceEvent),
    Status(ChannelStatus),
}

/// A pub/sub broadcast channel endpoint.
pub trait Transport {
    /// Current subscription state.
    fn status(&self) -> ChannelStatus;

    /// Number of participants currently present on the channel.
    fn members(&self) -> usize;

    /// Broadcast a frame to every subscriber.
    fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Next delivered event, if any.
    fn poll(&mut self) -> Option<Inbound>;

    /// Joined and at least `required` participants present.
    fn is_ready(&self, required: usize) -> bool {
        self.status() == ChannelStatus::Joined && self.members() >= required
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn status(&self) -> ChannelStatus {
        (**self).status()
    }

    fn members(&self) -> usize {
        (**self).members()
    }

    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        (**self).send(frame)
    }

    fn poll(&mut self) -> Option<Inbound> {
        (**self).poll()
    }
}
