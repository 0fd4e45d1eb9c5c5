//! Card system: definitions and the catalogue.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for a card
//! - `Category`: One of the seven card categories
//! - `Card`: Static card data (id, text, category)
//! - `CardCatalogue`: The immutable pool hands are dealt from

pub mod catalogue;
pub mod definition;

pub use catalogue::CardCatalogue;
pub use definition::{Card, CardId, Category};
