//! Game state: the replicated aggregate.
//!
//! ## Round
//!
//! `1 → 2 → {result | vote}`, `vote → {result | hand-duel}`,
//! `hand-duel → {result | hand-duel}`. Rounds are ordered so callers can tell
//! a payload for an earlier round (stale) from one for a later round (early).
//!
//! ## GameState
//!
//! Each peer owns one copy. It is only ever mutated through the functions in
//! [`crate::rules`], and the copies converge because both peers feed those
//! functions the same inputs.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::role::{Role, RoleMap};
use crate::cards::CardId;

/// A role's round-1 keep set.
pub type Selection = SmallVec<[CardId; 5]>;

/// Current stage of a game.
///
/// Serialized as `1`, `2`, `"vote"`, `"hand-duel"`, `"result"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RoundRepr", into = "RoundRepr")]
pub enum Round {
    /// Keep `keep_count` of the dealt hand.
    One,
    /// Pick one card from the exchanged hand.
    Two,
    /// Vote between the two differing picks.
    Vote,
    /// Rock/paper/scissors between the voters.
    HandDuel,
    /// A card has been decided.
    Result,
}

impl Round {
    /// Wire name of the round.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Round::One => "1",
            Round::Two => "2",
            Round::Vote => "vote",
            Round::HandDuel => "hand-duel",
            Round::Result => "result",
        }
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RoundRepr {
    Number(u8),
    Name(String),
}

impl From<Round> for RoundRepr {
    fn from(round: Round) -> Self {
        match round {
            Round::One => RoundRepr::Number(1),
            Round::Two => RoundRepr::Number(2),
            other => RoundRepr::Name(other.name().to_string()),
        }
    }
}

impl TryFrom<RoundRepr> for Round {
    type Error = String;

    fn try_from(repr: RoundRepr) -> Result<Self, Self::Error> {
        match repr {
            RoundRepr::Number(1) => Ok(Round::One),
            RoundRepr::Number(2) => Ok(Round::Two),
            RoundRepr::Number(n) => Err(format!("unknown round number {n}")),
            RoundRepr::Name(name) => match name.as_str() {
                "vote" => Ok(Round::Vote),
                "hand-duel" => Ok(Round::HandDuel),
                "result" => Ok(Round::Result),
                _ => Err(format!("unknown round {name:?}")),
            },
        }
    }
}

/// A hand-duel move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// Whether this move beats `other`.
    #[must_use]
    pub const fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors) | (Move::Scissors, Move::Paper) | (Move::Paper, Move::Rock)
        )
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Rock => f.write_str("rock"),
            Move::Paper => f.write_str("paper"),
            Move::Scissors => f.write_str("scissors"),
        }
    }
}

/// The replicated game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub round: Round,

    /// Current hand per role. Replaced once, by the round-1 exchange.
    pub hands: RoleMap<Vec<CardId>>,

    /// Round-1 output.
    pub selections: RoleMap<Option<Selection>>,

    /// Round-2 output.
    pub final_picks: RoleMap<Option<CardId>>,

    /// Only populated during `Round::Vote`.
    pub votes: RoleMap<Option<CardId>>,

    /// Only populated during `Round::HandDuel`.
    pub duel_moves: RoleMap<Option<Move>>,

    /// Set exactly once, together with `round = Result`.
    pub decided_card: Option<CardId>,

    /// Number of drawn duels so far. Duel moves are tagged with it.
    #[serde(default)]
    pub duel_attempt: u32,

    /// Game number within the session.
    #[serde(default)]
    pub generation: u32,
}

impl GameState {
    /// Fresh round-1 state for the given hands.
    #[must_use]
    pub fn new(hands: RoleMap<Vec<CardId>>, generation: u32) -> Self {
        Self {
            round: Round::One,
            hands,
            selections: RoleMap::default(),
            final_picks: RoleMap::default(),
            votes: RoleMap::default(),
            duel_moves: RoleMap::default(),
            decided_card: None,
            duel_attempt: 0,
            generation,
        }
    }

    /// A role's current hand.
    #[must_use]
    pub fn hand(&self, role: Role) -> &[CardId] {
        &self.hands[role]
    }

    /// The two vote candidates (`final_picks.a`, `final_picks.b`).
    ///
    /// Only meaningful once both picks are in and they differ.
    #[must_use]
    pub fn candidates(&self) -> Option<(CardId, CardId)> {
        match self.final_picks.pair() {
            Some((&a, &b)) if a != b => Some((a, b)),
            _ => None,
        }
    }

    /// Whether a card has been decided.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.round == Round::Result
    }
}
