//! In-process broadcast channel.
//!
//! `LocalHub` models the delivery guarantees the engine is written against:
//!
//! - frames reach every endpoint subscribed *at send time*, sender included
//! - with `shuffle`, each endpoint drains its inbox in random order
//! - with `duplicate_probability > 0`, frames may be delivered twice
//!
//! Everything is single-threaded (`Rc<RefCell<_>>`), matching one event loop
//! per peer.
//!
//! ```
//! use card_duel::transport::{Inbound, LocalHub, Transport};
//!
//! let hub = LocalHub::new();
//! let mut alice = hub.endpoint("alice");
//! let mut bob = hub.endpoint("bob");
//! alice.subscribe();
//! bob.subscribe();
//!
//! alice.send("hello".to_string()).unwrap();
//!
//! let frames: Vec<_> = std::iter::from_fn(|| bob.poll())
//!     .filter(|event| matches!(event, Inbound::Frame(_)))
//!     .collect();
//! assert_eq!(frames, vec![Inbound::Frame("hello".to_string())]);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace};

use super::{ChannelStatus, Inbound, PresenceEvent, Transport};
use crate::core::{GameRng, TransportError};

/// How the hub delivers frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeliveryOptions {
    /// Drain inboxes in random order instead of FIFO.
    pub shuffle: bool,

    /// Probability that a frame is delivered a second time.
    pub duplicate_probability: f64,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            shuffle: false,
            duplicate_probability: 0.0,
        }
    }
}

impl DeliveryOptions {
    /// In-order, exactly-once delivery.
    #[must_use]
    pub fn reliable() -> Self {
        Self::default()
    }

    /// Shuffled delivery with the given duplication probability.
    #[must_use]
    pub fn chaotic(duplicate_probability: f64) -> Self {
        Self {
            shuffle: true,
            duplicate_probability,
        }
    }
}

#[derive(Debug)]
struct Subscriber {
    key: String,
    subscribed: bool,
    inbox: VecDeque<Inbound>,
}

#[derive(Debug)]
struct HubInner {
    subscribers: Vec<Subscriber>,
    options: DeliveryOptions,
    rng: GameRng,
    closed: bool,
}

impl HubInner {
    fn members(&self) -> usize {
        self.subscribers.iter().filter(|s| s.subscribed).count()
    }

    fn announce(&mut self, event: PresenceEvent) {
        for sub in self.subscribers.iter_mut().filter(|s| s.subscribed) {
            sub.inbox.push_back(Inbound::Presence(event.clone()));
        }
    }
}

/// Shared in-process channel. Clone it to hand out more endpoints.
#[derive(Clone, Debug)]
pub struct LocalHub {
    inner: Rc<RefCell<HubInner>>,
}

impl Default for LocalHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHub {
    /// Reliable, in-order hub.
    #[must_use]
    pub fn new() -> Self {
        Self::with_delivery(0, DeliveryOptions::reliable())
    }

    /// Hub with the given delivery behavior; `seed` drives shuffling and
    /// duplication.
    #[must_use]
    pub fn with_delivery(seed: u64, options: DeliveryOptions) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HubInner {
                subscribers: Vec::new(),
                options,
                rng: GameRng::new(seed).for_context("delivery"),
                closed: false,
            })),
        }
    }

    /// Create an endpoint. It receives nothing until it subscribes.
    #[must_use]
    pub fn endpoint(&self, key: impl Into<String>) -> LocalEndpoint {
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.push(Subscriber {
            key: key.into(),
            subscribed: false,
            inbox: VecDeque::new(),
        });
        LocalEndpoint {
            inner: Rc::clone(&self.inner),
            index: inner.subscribers.len() - 1,
        }
    }

    /// Number of subscribed endpoints.
    #[must_use]
    pub fn members(&self) -> usize {
        self.inner.borrow().members()
    }

    /// Close the channel for every endpoint.
    pub fn close(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.closed = true;
        for sub in &mut inner.subscribers {
            sub.inbox.push_back(Inbound::Status(ChannelStatus::Closed));
        }
    }
}

/// One participant's view of a `LocalHub`.
#[derive(Debug)]
pub struct LocalEndpoint {
    inner: Rc<RefCell<HubInner>>,
    index: usize,
}

impl LocalEndpoint {
    /// Presence key of this endpoint.
    #[must_use]
    pub fn key(&self) -> String {
        self.inner.borrow().subscribers[self.index].key.clone()
    }

    /// Join the channel and announce presence.
    pub fn subscribe(&mut self) {
        let mut inner = self.inner.borrow_mut();
        if inner.closed || inner.subscribers[self.index].subscribed {
            return;
        }
        let key = {
            let sub = &mut inner.subscribers[self.index];
            sub.subscribed = true;
            sub.inbox.push_back(Inbound::Status(ChannelStatus::Joined));
            sub.key.clone()
        };
        debug!(%key, "endpoint subscribed");
        inner.announce(PresenceEvent::Joined { key });
    }

    /// Leave the channel. Undelivered frames are lost.
    pub fn unsubscribe(&mut self) {
        let mut inner = self.inner.borrow_mut();
        if !inner.subscribers[self.index].subscribed {
            return;
        }
        let key = {
            let sub = &mut inner.subscribers[self.index];
            sub.subscribed = false;
            sub.inbox.clear();
            sub.key.clone()
        };
        debug!(%key, "endpoint unsubscribed");
        inner.announce(PresenceEvent::Left { key });
    }
}

impl Transport for LocalEndpoint {
    fn status(&self) -> ChannelStatus {
        let inner = self.inner.borrow();
        if inner.closed {
            ChannelStatus::Closed
        } else if inner.subscribers[self.index].subscribed {
            ChannelStatus::Joined
        } else {
            ChannelStatus::Joining
        }
    }

    fn members(&self) -> usize {
        self.inner.borrow().members()
    }

    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        if inner.closed {
            return Err(TransportError::Closed);
        }
        if !inner.subscribers[self.index].subscribed {
            return Err(TransportError::NotSubscribed);
        }

        let options = inner.options;
        let mut recipients = 0;
        for sub in inner.subscribers.iter_mut().filter(|s| s.subscribed) {
            sub.inbox.push_back(Inbound::Frame(frame.clone()));
            if inner.rng.gen_bool(options.duplicate_probability) {
                sub.inbox.push_back(Inbound::Frame(frame.clone()));
            }
            recipients += 1;
        }
        trace!(recipients, bytes = frame.len(), "frame broadcast");
        Ok(())
    }

    fn poll(&mut self) -> Option<Inbound> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let shuffle = inner.options.shuffle;
        let inbox = &mut inner.subscribers[self.index].inbox;
        if inbox.is_empty() {
            return None;
        }
        if shuffle {
            let pick = inner.rng.gen_range_usize(0..inbox.len());
            inbox.remove(pick)
        } else {
            inbox.pop_front()
        }
    }
}
