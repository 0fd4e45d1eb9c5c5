//! Pending-apply buffer for partner payloads that arrive early.
//!
//! Delivery is unordered, so the partner's payload for a stage can arrive
//! before this peer is in a position to apply it: round-1 cards before the
//! local selection exists, a final pick before the exchange happened here, a
//! vote before both picks are known, a duel move for the next attempt before
//! the current one drew. Each case gets one explicit slot. The engine parks
//! payloads here and flushes a slot as soon as its precondition holds.
//!
//! Slots are first-write-wins, like the state fields they feed.

use std::collections::BTreeMap;

use crate::cards::CardId;
use crate::core::Move;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingBuffer {
    selection: Option<Vec<CardId>>,
    final_pick: Option<CardId>,
    vote: Option<CardId>,
    duel_moves: BTreeMap<u32, Move>,
}

impl PendingBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Park the partner's round-1 cards. Returns false if already parked.
    pub fn park_selection(&mut self, cards: Vec<CardId>) -> bool {
        park(&mut self.selection, cards)
    }

    pub fn take_selection(&mut self) -> Option<Vec<CardId>> {
        self.selection.take()
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn park_final_pick(&mut self, card: CardId) -> bool {
        park(&mut self.final_pick, card)
    }

    pub fn take_final_pick(&mut self) -> Option<CardId> {
        self.final_pick.take()
    }

    #[must_use]
    pub fn has_final_pick(&self) -> bool {
        self.final_pick.is_some()
    }

    pub fn park_vote(&mut self, card: CardId) -> bool {
        park(&mut self.vote, card)
    }

    pub fn take_vote(&mut self) -> Option<CardId> {
        self.vote.take()
    }

    #[must_use]
    pub fn has_vote(&self) -> bool {
        self.vote.is_some()
    }

    /// Park a duel move for `attempt`.
    pub fn park_duel_move(&mut self, attempt: u32, mv: Move) -> bool {
        if self.duel_moves.contains_key(&attempt) {
            return false;
        }
        self.duel_moves.insert(attempt, mv);
        true
    }

    /// Take the move parked for `attempt`, dropping any for earlier attempts.
    pub fn take_duel_move(&mut self, attempt: u32) -> Option<Move> {
        self.duel_moves = self.duel_moves.split_off(&attempt);
        self.duel_moves.remove(&attempt)
    }

    #[must_use]
    pub fn has_duel_move(&self, attempt: u32) -> bool {
        self.duel_moves.contains_key(&attempt)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selection.is_none()
            && self.final_pick.is_none()
            && self.vote.is_none()
            && self.duel_moves.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn park<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}
