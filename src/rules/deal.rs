//! Dealing a fresh game.
//!
//! The whole catalogue is shuffled, the first `2 × hand_size` ids are taken,
//! and they are split down the middle: first half to `a`, second half to `b`.
//! Catalogue ids are unique, so the hands are disjoint by construction.

use crate::cards::{CardCatalogue, CardId};
use crate::core::{DealError, GameRng, GameState, RoleMap, RoundConfig};

/// Deal two disjoint hands of `config.hand_size` cards.
pub fn deal(
    catalogue: &CardCatalogue,
    config: &RoundConfig,
    rng: &mut GameRng,
) -> Result<RoleMap<Vec<CardId>>, DealError> {
    let needed = config.cards_needed();
    if catalogue.len() < needed {
        return Err(DealError::CatalogueTooSmall {
            needed,
            available: catalogue.len(),
        });
    }

    let mut pool: Vec<CardId> = catalogue.ids().collect();
    rng.shuffle(&mut pool);
    pool.truncate(needed);

    let b = pool.split_off(config.hand_size);
    Ok(RoleMap::new(pool, b))
}

/// Deal and wrap the hands in a round-1 `GameState`.
pub fn create_initial_state(
    catalogue: &CardCatalogue,
    config: &RoundConfig,
    rng: &mut GameRng,
    generation: u32,
) -> Result<GameState, DealError> {
    let hands = deal(catalogue, config, rng)?;
    Ok(GameState::new(hands, generation))
}
