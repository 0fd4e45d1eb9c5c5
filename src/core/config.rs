//! Game and engine configuration.
//!
//! - `RoundConfig`: hand size and keep-count for the selection rounds
//! - `EngineConfig`: everything a `SyncEngine` needs besides its transport
//!
//! Both are plain builders; nothing is read from the environment.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Cards dealt to each role for round 1.
pub const DEFAULT_HAND_SIZE: usize = 20;

/// Cards each role keeps at the end of round 1.
pub const DEFAULT_KEEP_COUNT: usize = 5;

/// Presence count at which the channel counts as fully joined.
pub const DEFAULT_READY_MEMBERS: usize = 2;

/// Shape of the two selection rounds.
///
/// Round 1 deals `hand_size` cards per role and keeps `keep_count`. The kept
/// cards are exchanged and become the round-2 hand, from which exactly one
/// card is picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Round-1 hand size per role.
    pub hand_size: usize,

    /// Round-1 keep-count (and therefore the round-2 hand size).
    pub keep_count: usize,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            hand_size: DEFAULT_HAND_SIZE,
            keep_count: DEFAULT_KEEP_COUNT,
        }
    }
}

impl RoundConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    #[must_use]
    pub fn with_keep_count(mut self, keep_count: usize) -> Self {
        self.keep_count = keep_count;
        self
    }

    /// Cards a deal consumes from the catalogue (both hands).
    #[must_use]
    pub const fn cards_needed(&self) -> usize {
        self.hand_size * 2
    }

    /// Check the round shape is playable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keep_count == 0 {
            return Err(ConfigError::ZeroKeepCount);
        }
        if self.keep_count > self.hand_size {
            return Err(ConfigError::KeepExceedsHand {
                keep_count: self.keep_count,
                hand_size: self.hand_size,
            });
        }
        Ok(())
    }
}

/// Configuration for one peer's synchronization engine.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Round shape used when dealing.
    pub rounds: RoundConfig,

    /// Seed for dealing. `None` draws one from the OS.
    pub seed: Option<u64>,

    /// Presence count required before the initializer broadcasts `init`.
    pub ready_members: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rounds: RoundConfig::default(),
            seed: None,
            ready_members: DEFAULT_READY_MEMBERS,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rounds(mut self, rounds: RoundConfig) -> Self {
        self.rounds = rounds;
        self
    }

    /// Fix the dealing seed (reproducible games).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_ready_members(mut self, members: usize) -> Self {
        self.ready_members = members;
        self
    }
}
