//! # card-duel
//!
//! A two-party card decision game kept in sync over a broadcast channel.
//!
//! Two peers each hold a full replica of the game. There is no server: the
//! initializer (role `a`) deals and broadcasts the starting state, after which
//! both peers apply the same deterministic transitions to the same inputs.
//!
//! ## Flow
//!
//! 1. **Round 1**: each role keeps `keep_count` cards from its dealt hand.
//!    The kept sets are exchanged.
//! 2. **Round 2**: each role picks one card from the exchanged hand.
//!    Equal picks decide the game.
//! 3. **Vote**: both vote for one of the two picks. Agreement decides.
//! 4. **Hand-duel**: rock-paper-scissors until someone wins. The winner's
//!    pick is the decided card.
//!
//! ## Modules
//!
//! - `core`: roles, configuration, state, RNG, errors
//! - `cards`: card definitions and the built-in catalogue
//! - `rules`: dealing and pure round transitions
//! - `transport`: broadcast channel trait and an in-process implementation
//! - `sync`: wire protocol and the per-peer synchronization engine
//!
//! ## Example
//!
//! ```
//! use card_duel::{EngineConfig, LocalHub, Role, Round, SyncEngine};
//!
//! let hub = LocalHub::new();
//! let (mut a_end, mut b_end) = (hub.endpoint("a"), hub.endpoint("b"));
//! a_end.subscribe();
//! b_end.subscribe();
//!
//! let config = EngineConfig::new().with_seed(42);
//! let mut a = SyncEngine::new(config.clone(), Role::A, a_end).unwrap();
//! let mut b = SyncEngine::new(config, Role::B, b_end).unwrap();
//!
//! a.start_game().unwrap();
//! while a.pump().unwrap() + b.pump().unwrap() > 0 {}
//!
//! assert_eq!(b.round(), Some(Round::One));
//! assert_eq!(a.state(), b.state());
//! ```

pub mod cards;
pub mod core;
pub mod rules;
pub mod sync;
pub mod transport;

// Re-export commonly used types
pub use crate::core::{
    EngineConfig, EngineError, GameRng, GameState, Move, Role, RoleMap, Round, RoundConfig,
    SubmitError,
};

pub use crate::cards::{Card, CardCatalogue, CardId, Category};

pub use crate::rules::{create_initial_state, deal, resolve_duel, DuelResult};

pub use crate::sync::{Envelope, Message, SyncEngine};

pub use crate::transport::{DeliveryOptions, LocalEndpoint, LocalHub, Transport};
