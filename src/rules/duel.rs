//! Hand-duel resolution.

use crate::core::{Move, Role};

/// Outcome of a single rock/paper/scissors exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuelResult {
    AWins,
    BWins,
    Draw,
}

impl DuelResult {
    /// The winning role, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Role> {
        match self {
            DuelResult::AWins => Some(Role::A),
            DuelResult::BWins => Some(Role::B),
            DuelResult::Draw => None,
        }
    }
}

/// Rock beats scissors, scissors beats paper, paper beats rock.
///
/// ```
/// use card_duel::core::Move;
/// use card_duel::rules::{resolve_duel, DuelResult};
///
/// assert_eq!(resolve_duel(Move::Rock, Move::Scissors), DuelResult::AWins);
/// assert_eq!(resolve_duel(Move::Rock, Move::Paper), DuelResult::BWins);
/// assert_eq!(resolve_duel(Move::Paper, Move::Paper), DuelResult::Draw);
/// ```
#[must_use]
pub const fn resolve_duel(move_a: Move, move_b: Move) -> DuelResult {
    if move_a.beats(move_b) {
        DuelResult::AWins
    } else if move_b.beats(move_a) {
        DuelResult::BWins
    } else {
        DuelResult::Draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_three_draws() {
        let draws = Move::ALL
            .iter()
            .flat_map(|&a| Move::ALL.iter().map(move |&b| resolve_duel(a, b)))
            .filter(|r| *r == DuelResult::Draw)
            .count();
        assert_eq!(draws, 3);
    }

    #[test]
    fn test_antisymmetric() {
        for a in Move::ALL {
            for b in Move::ALL {
                let forward = resolve_duel(a, b);
                let backward = resolve_duel(b, a);
                match forward {
                    DuelResult::AWins => assert_eq!(backward, DuelResult::BWins),
                    DuelResult::BWins => assert_eq!(backward, DuelResult::AWins),
                    DuelResult::Draw => assert_eq!(backward, DuelResult::Draw),
                }
            }
        }
    }

    #[test]
    fn test_winner_role() {
        assert_eq!(DuelResult::AWins.winner(), Some(Role::A));
        assert_eq!(DuelResult::BWins.winner(), Some(Role::B));
        assert_eq!(DuelResult::Draw.winner(), None);
    }
}
