//! Error types.
//!
//! Only local operations surface errors. Remote payloads that fail the same
//! checks are dropped by the synchronization engine and logged instead.

use thiserror::Error;

use super::role::Role;
use super::state::Round;
use crate::cards::CardId;

/// A local submission that violates the round's constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("no game in progress")]
    NoGame,

    #[error("submission for round {expected}, but the game is in round {actual}")]
    WrongRound { expected: Round, actual: Round },

    #[error("expected {expected} cards, got {got}")]
    WrongCount { expected: usize, got: usize },

    #[error("{card} is not in the hand of role {role}")]
    NotInHand { role: Role, card: CardId },

    #[error("{0} selected more than once")]
    DuplicateCard(CardId),

    #[error("{0} is not one of the vote candidates")]
    NotACandidate(CardId),
}

/// The catalogue could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    #[error("card id {0} registered twice")]
    DuplicateId(CardId),
}

/// A fresh game could not be dealt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DealError {
    #[error("catalogue has {available} cards, a deal needs {needed}")]
    CatalogueTooSmall { needed: usize, available: usize },
}

/// Invalid round configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("keep-count must be at least 1")]
    ZeroKeepCount,

    #[error("keep-count {keep_count} exceeds hand size {hand_size}")]
    KeepExceedsHand { keep_count: usize, hand_size: usize },
}

/// A frame could not be encoded or decoded.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The broadcast channel refused a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("channel is closed")]
    Closed,

    #[error("endpoint has not subscribed to the channel")]
    NotSubscribed,
}

/// Anything a `SyncEngine` operation can fail with.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Deal(#[from] DealError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("only the initializer can deal a game")]
    NotInitializer,

    #[error("a game is already dealt for generation {0}")]
    GameInProgress(u32),
}
