//! Round transitions and tie-break evaluation.
//!
//! Every function here is deterministic and touches nothing but the
//! `GameState` it is given. Two peers that feed the same submissions into
//! these functions end up with equal states, whatever the order.
//!
//! ## Replays
//!
//! Submitting for a role whose field is already set returns
//! `Ok(Applied::Replay)` and leaves the state alone. Redelivered messages
//! land here, so a replay is never an error.
//!
//! ## Tie-break
//!
//! ```text
//! picks equal  -> result
//! picks differ -> vote -> votes equal -> result
//!                      -> votes split -> hand-duel -> draw -> hand-duel
//!                                                  -> win  -> result
//! ```

use rustc_hash::FxHashSet;
use tracing::trace;

use super::duel::resolve_duel;
use crate::cards::CardId;
use crate::core::{GameState, Move, Role, RoleMap, Round, RoundConfig, SubmitError};

/// Whether a submission changed the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The field was empty and has been written.
    Recorded,
    /// The field was already set; nothing changed.
    Replay,
}

/// Result of `evaluate_final_picks`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    /// Not in round 2, or a pick is still missing.
    Pending,
    /// Both picked the same card; the game is decided.
    Matched(CardId),
    /// Picks differ; the game moved to the vote.
    Split { a: CardId, b: CardId },
}

/// Result of `evaluate_votes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    Pending,
    /// Both voted for the same candidate; the game is decided.
    Agreed(CardId),
    /// One vote each; the game moved to the hand-duel.
    Split,
}

/// Result of evaluating a hand-duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuelOutcome {
    Pending,
    /// Equal moves. The next duel is `next_attempt`.
    Draw { next_attempt: u32 },
    /// `winner`'s final pick is the decided card.
    Won { winner: Role, card: CardId },
}

fn expect_round(state: &GameState, expected: Round) -> Result<(), SubmitError> {
    if state.round == expected {
        Ok(())
    } else {
        Err(SubmitError::WrongRound {
            expected,
            actual: state.round,
        })
    }
}

/// Record `role`'s round-1 keep set.
///
/// `chosen` must hold exactly `config.keep_count` distinct ids from the
/// role's hand. Once both roles' sets are known the hands are exchanged
/// (`a` receives `b`'s set and vice versa) and the game enters round 2.
pub fn apply_round1_submission(
    state: &mut GameState,
    config: &RoundConfig,
    role: Role,
    chosen: &[CardId],
) -> Result<Applied, SubmitError> {
    if state.selections[role].is_some() {
        return Ok(Applied::Replay);
    }
    expect_round(state, Round::One)?;

    if chosen.len() != config.keep_count {
        return Err(SubmitError::WrongCount {
            expected: config.keep_count,
            got: chosen.len(),
        });
    }

    let hand: FxHashSet<CardId> = state.hands[role].iter().copied().collect();
    let mut seen = FxHashSet::default();
    for &card in chosen {
        if !hand.contains(&card) {
            return Err(SubmitError::NotInHand { role, card });
        }
        if !seen.insert(card) {
            return Err(SubmitError::DuplicateCard(card));
        }
    }

    state.selections[role] = Some(chosen.iter().copied().collect());

    if let Some((a, b)) = state.selections.pair() {
        state.hands = RoleMap::new(b.to_vec(), a.to_vec());
        state.round = Round::Two;
        trace!("both selections known, hands exchanged");
    }

    Ok(Applied::Recorded)
}

/// Record `role`'s round-2 pick from its exchanged hand.
pub fn apply_round2_submission(
    state: &mut GameState,
    role: Role,
    card: CardId,
) -> Result<Applied, SubmitError> {
    if state.final_picks[role].is_some() {
        return Ok(Applied::Replay);
    }
    expect_round(state, Round::Two)?;

    if !state.hands[role].contains(&card) {
        return Err(SubmitError::NotInHand { role, card });
    }

    state.final_picks[role] = Some(card);
    Ok(Applied::Recorded)
}

/// Compare both final picks once they are in.
///
/// Equal picks decide the game directly. Different picks start the vote,
/// with the two picks as candidates.
pub fn evaluate_final_picks(state: &mut GameState) -> PickOutcome {
    if state.round != Round::Two {
        return PickOutcome::Pending;
    }
    let Some((&a, &b)) = state.final_picks.pair() else {
        return PickOutcome::Pending;
    };

    if a == b {
        commit_decision(state, a);
        PickOutcome::Matched(a)
    } else {
        state.round = Round::Vote;
        PickOutcome::Split { a, b }
    }
}

/// Record `role`'s vote for one of the two candidates.
pub fn apply_vote(state: &mut GameState, role: Role, card: CardId) -> Result<Applied, SubmitError> {
    if state.votes[role].is_some() {
        return Ok(Applied::Replay);
    }
    expect_round(state, Round::Vote)?;

    match state.candidates() {
        Some((a, b)) if card == a || card == b => {
            state.votes[role] = Some(card);
            Ok(Applied::Recorded)
        }
        _ => Err(SubmitError::NotACandidate(card)),
    }
}

/// Compare both votes once they are in. Votes are cleared on leaving the
/// vote round.
pub fn evaluate_votes(state: &mut GameState) -> VoteOutcome {
    if state.round != Round::Vote {
        return VoteOutcome::Pending;
    }
    let Some((&a, &b)) = state.votes.pair() else {
        return VoteOutcome::Pending;
    };

    state.votes.clear();
    if a == b {
        commit_decision(state, a);
        VoteOutcome::Agreed(a)
    } else {
        state.round = Round::HandDuel;
        state.duel_moves.clear();
        VoteOutcome::Split
    }
}

/// Record `role`'s move for the current duel.
pub fn apply_duel_move(state: &mut GameState, role: Role, mv: Move) -> Result<Applied, SubmitError> {
    if state.duel_moves[role].is_some() {
        return Ok(Applied::Replay);
    }
    expect_round(state, Round::HandDuel)?;

    state.duel_moves[role] = Some(mv);
    Ok(Applied::Recorded)
}

/// Evaluate the current duel without changing the state.
#[must_use]
pub fn evaluate_duel(state: &GameState) -> DuelOutcome {
    if state.round != Round::HandDuel {
        return DuelOutcome::Pending;
    }
    let Some((&move_a, &move_b)) = state.duel_moves.pair() else {
        return DuelOutcome::Pending;
    };

    match resolve_duel(move_a, move_b).winner() {
        None => DuelOutcome::Draw {
            next_attempt: state.duel_attempt + 1,
        },
        Some(winner) => match state.final_picks[winner] {
            Some(card) => DuelOutcome::Won { winner, card },
            None => DuelOutcome::Pending,
        },
    }
}

/// Clear both moves and start the next duel.
pub fn restart_duel(state: &mut GameState) {
    state.duel_moves.clear();
    state.duel_attempt += 1;
}

/// Evaluate the current duel and apply its outcome.
///
/// A draw restarts the duel in place; a win decides the game with the
/// winner's final pick.
pub fn settle_duel(state: &mut GameState) -> DuelOutcome {
    let outcome = evaluate_duel(state);
    match outcome {
        DuelOutcome::Pending => {}
        DuelOutcome::Draw { .. } => restart_duel(state),
        DuelOutcome::Won { card, .. } => {
            commit_decision(state, card);
        }
    }
    outcome
}

/// Decide the game. First write wins; later calls are replays.
pub fn commit_decision(state: &mut GameState, card: CardId) -> Applied {
    if state.decided_card.is_some() {
        return Applied::Replay;
    }
    state.decided_card = Some(card);
    state.round = Round::Result;
    state.votes.clear();
    state.duel_moves.clear();
    Applied::Recorded
}
