//! Game rules: dealing, round transitions, and tie-break.
//!
//! Nothing in this module performs I/O. The synchronization engine is the
//! only caller, and unit tests drive the functions directly.

pub mod deal;
pub mod duel;
pub mod transitions;

pub use deal::{create_initial_state, deal};
pub use duel::{resolve_duel, DuelResult};
pub use transitions::{
    apply_duel_move, apply_round1_submission, apply_round2_submission, apply_vote,
    commit_decision, evaluate_duel, evaluate_final_picks, evaluate_votes,
    restart_duel, settle_duel, Applied, DuelOutcome, PickOutcome, VoteOutcome,
};
