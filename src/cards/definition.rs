//! Card definitions - static card data.
//!
//! A `Card` is a labelled, categorised entry in the catalogue. Cards never
//! change after the catalogue is built; hands and selections refer to them
//! by `CardId` only.

use serde::{Deserialize, Serialize};

/// Unique identifier for a card.
///
/// Serializes as a bare integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// The seven card categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Outing,
    Gourmet,
    Drive,
    Culture,
    Chill,
    Romantic,
    Challenge,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 7] = [
        Category::Outing,
        Category::Gourmet,
        Category::Drive,
        Category::Culture,
        Category::Chill,
        Category::Romantic,
        Category::Challenge,
    ];

    /// Lowercase name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Outing => "outing",
            Category::Gourmet => "gourmet",
            Category::Drive => "drive",
            Category::Culture => "culture",
            Category::Chill => "chill",
            Category::Romantic => "romantic",
            Category::Challenge => "challenge",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use card_duel::cards::{Card, CardId, Category};
///
/// let card = Card::new(CardId::new(1), "Picnic in the park", Category::Outing);
/// assert_eq!(card.category, Category::Outing);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier.
    pub id: CardId,

    /// Label shown to players.
    pub text: String,

    /// Category used for grouping and styling.
    pub category: Category,
}

impl Card {
    /// Create a new card.
    #[must_use]
    pub fn new(id: CardId, text: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            text: text.into(),
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id() {
        let id = CardId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
    }

    #[test]
    fn test_card_id_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&CardId::new(9)).unwrap(), "9");
        let id: CardId = serde_json::from_str("13").unwrap();
        assert_eq!(id, CardId::new(13));
    }

    #[test]
    fn test_category_names() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn test_card_serialization() {
        let card = Card::new(CardId::new(3), "Night drive to the coast", Category::Drive);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(
            json,
            r#"{"id":3,"text":"Night drive to the coast","category":"drive"}"#
        );
    }
}
