//! Card catalogue for definition lookup.
//!
//! `CardCatalogue` is the immutable pool a game is dealt from. The built-in
//! catalogue (`CardCatalogue::builtin`) ships eight cards per category, which
//! is comfortably more than the forty a default deal consumes.

use rustc_hash::FxHashMap;

use super::definition::{Card, CardId, Category};
use crate::core::CatalogueError;

const BUILTIN: &[(&str, Category)] = &[
    ("Picnic in the park", Category::Outing),
    ("Afternoon at the zoo", Category::Outing),
    ("Flea market treasure hunt", Category::Outing),
    ("Botanical garden walk", Category::Outing),
    ("Aquarium visit", Category::Outing),
    ("Amusement park day", Category::Outing),
    ("Rent bikes and explore", Category::Outing),
    ("Browse a bookshop together", Category::Outing),
    ("Try a new ramen place", Category::Gourmet),
    ("Dessert crawl", Category::Gourmet),
    ("Cook a three-course dinner", Category::Gourmet),
    ("Street food night market", Category::Gourmet),
    ("Brunch at a hidden cafe", Category::Gourmet),
    ("Wine or tea tasting", Category::Gourmet),
    ("Make dumplings from scratch", Category::Gourmet),
    ("All-you-can-eat barbecue", Category::Gourmet),
    ("Sunset drive along the coast", Category::Drive),
    ("Mountain pass road trip", Category::Drive),
    ("Drive-in movie", Category::Drive),
    ("Roadside diner hopping", Category::Drive),
    ("Visit a hot spring town", Category::Drive),
    ("Night drive with a playlist", Category::Drive),
    ("Lakeside day trip", Category::Drive),
    ("Scenic lookout at dawn", Category::Drive),
    ("Art museum afternoon", Category::Culture),
    ("Live jazz bar", Category::Culture),
    ("Theatre matinee", Category::Culture),
    ("Pottery workshop", Category::Culture),
    ("Planetarium show", Category::Culture),
    ("Historic district tour", Category::Culture),
    ("Indie film screening", Category::Culture),
    ("Photography walk", Category::Culture),
    ("Movie marathon at home", Category::Chill),
    ("Board game night", Category::Chill),
    ("Lazy morning in bed", Category::Chill),
    ("Bath house and massage", Category::Chill),
    ("Puzzle and playlist evening", Category::Chill),
    ("Read side by side at a cafe", Category::Chill),
    ("Stargazing on the balcony", Category::Chill),
    ("Nap in the park", Category::Chill),
    ("Candlelit dinner", Category::Romantic),
    ("Write letters to each other", Category::Romantic),
    ("Night view from a tower", Category::Romantic),
    ("Slow dance in the living room", Category::Romantic),
    ("Recreate your first date", Category::Romantic),
    ("Rooftop bar at sunset", Category::Romantic),
    ("Boat ride on the river", Category::Romantic),
    ("Matching photo booth strip", Category::Romantic),
    ("Escape room", Category::Challenge),
    ("Bouldering gym", Category::Challenge),
    ("Karaoke battle", Category::Challenge),
    ("Sunrise hike", Category::Challenge),
    ("Learn a dance routine", Category::Challenge),
    ("Trivia night", Category::Challenge),
    ("Cook with a mystery ingredient", Category::Challenge),
    ("Go-kart race", Category::Challenge),
];

/// Immutable pool of cards indexed by id.
///
/// ## Example
///
/// ```
/// use card_duel::cards::{CardCatalogue, CardId};
///
/// let catalogue = CardCatalogue::builtin();
/// let card = catalogue.get(CardId::new(1)).unwrap();
/// assert_eq!(card.id, CardId::new(1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalogue {
    cards: Vec<Card>,
    index: FxHashMap<CardId, usize>,
}

impl CardCatalogue {
    /// Create an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalogue the game ships with. Ids start at 1.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalogue = Self::new();
        for (offset, (text, category)) in BUILTIN.iter().enumerate() {
            let card = Card::new(CardId::new(offset as u32 + 1), *text, *category);
            catalogue.cards.push(card);
            catalogue.index.insert(CardId::new(offset as u32 + 1), offset);
        }
        catalogue
    }

    /// Build a catalogue from cards, rejecting duplicate ids.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Result<Self, CatalogueError> {
        let mut catalogue = Self::new();
        for card in cards {
            catalogue.register(card)?;
        }
        Ok(catalogue)
    }

    /// Add a card.
    pub fn register(&mut self, card: Card) -> Result<(), CatalogueError> {
        if self.index.contains_key(&card.id) {
            return Err(CatalogueError::DuplicateId(card.id));
        }
        self.index.insert(card.id, self.cards.len());
        self.cards.push(card);
        Ok(())
    }

    /// Get a card by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.index.get(&id).map(|&i| &self.cards[i])
    }

    /// Check if a card ID is present.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.index.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All card ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.iter().map(|c| c.id)
    }

    /// Iterate over all cards in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Cards of one category.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.category == category)
    }
}
