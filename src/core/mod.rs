//! Core types: roles, RNG, configuration, state, errors.
//!
//! Everything here is plain data. Behavior lives in `rules` (pure
//! transitions) and `sync` (the only code that does I/O).

pub mod config;
pub mod error;
pub mod rng;
pub mod role;
pub mod state;

pub use config::{EngineConfig, RoundConfig, DEFAULT_HAND_SIZE, DEFAULT_KEEP_COUNT};
pub use error::{
    CatalogueError, ConfigError, DealError, EngineError, ProtocolError, SubmitError,
    TransportError,
};
pub use rng::GameRng;
pub use role::{Role, RoleMap};
pub use state::{GameState, Move, Round, Selection};
