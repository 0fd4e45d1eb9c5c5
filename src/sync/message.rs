//! Wire protocol.
//!
//! Frames are JSON objects:
//!
//! ```json
//! {"generation": 0, "message": {"event": "final_pick", "payload": {"from": "a", "card_id": 7}}}
//! ```
//!
//! `generation` is the game number within the session. It lets a peer tell
//! a frame from a finished game apart from one belonging to the next.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::{GameState, Move, ProtocolError, Role};

/// Protocol events and their payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum Message {
    /// Freshly dealt state, sent once by the initializer.
    Init { state: GameState },

    /// Round-1 keep set.
    CardsExchange { from: Role, cards: Vec<CardId> },

    /// Round-2 pick.
    FinalPick { from: Role, card_id: CardId },

    Vote { from: Role, card_id: CardId },

    /// Move for duel number `attempt`.
    DuelMove {
        from: Role,
        #[serde(rename = "move")]
        mv: Move,
        attempt: u32,
    },

    /// Authoritative decision.
    Decided { card_id: CardId },

    /// Leave the finished game; the initializer deals the next one.
    Restart { from: Role },
}

impl Message {
    /// Wire name of the event.
    #[must_use]
    pub const fn event(&self) -> &'static str {
        match self {
            Message::Init { .. } => "init",
            Message::CardsExchange { .. } => "cards_exchange",
            Message::FinalPick { .. } => "final_pick",
            Message::Vote { .. } => "vote",
            Message::DuelMove { .. } => "duel_move",
            Message::Decided { .. } => "decided",
            Message::Restart { .. } => "restart",
        }
    }

    /// The role that authored the message, for events that carry one.
    #[must_use]
    pub const fn sender(&self) -> Option<Role> {
        match self {
            Message::CardsExchange { from, .. }
            | Message::FinalPick { from, .. }
            | Message::Vote { from, .. }
            | Message::DuelMove { from, .. }
            | Message::Restart { from } => Some(*from),
            Message::Init { .. } | Message::Decided { .. } => None,
        }
    }
}

/// A message stamped with the game it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub generation: u32,
    pub message: Message,
}

impl Envelope {
    #[must_use]
    pub fn new(generation: u32, message: Message) -> Self {
        Self { generation, message }
    }

    /// Serialize to a JSON frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Parse a JSON frame.
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}
