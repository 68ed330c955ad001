use alloc::vec::Vec;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub value: CardValue,
}

/// Cards of one deal, in the order they are laid out on the board.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Unshuffled deck for `config`: ids `0..len`, values cycling through `1..=len/2` so each value appears twice.
    pub fn ordered(config: GameConfig) -> Self {
        let len = config.deck_len();
        let pairs = config.pair_count();
        let cards = (0..len)
            .map(|id| Card {
                id,
                value: id % pairs + 1,
            })
            .collect();
        Self { cards }
    }

    pub fn from_cards(cards: Vec<Card>) -> Result<Self> {
        let mut ids = HashSet::with_capacity(cards.len());
        let mut value_counts: HashMap<CardValue, usize> = HashMap::new();

        for card in &cards {
            if !ids.insert(card.id) {
                return Err(GameError::UnpairedDeck);
            }
            *value_counts.entry(card.value).or_default() += 1;
        }

        if value_counts.values().any(|&count| count != 2) {
            return Err(GameError::UnpairedDeck);
        }

        Ok(Self { cards })
    }

    /// Builds a deck laid out exactly as given, ids are assigned by position.
    pub fn from_values(values: &[CardValue]) -> Result<Self> {
        let cards = values
            .iter()
            .zip(0..)
            .map(|(&value, id)| Card { id, value })
            .collect();
        Self::from_cards(cards)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<Card> {
        self.cards.iter().copied().find(|card| card.id == id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.card(id).is_some()
    }

    /// Splits the layout into board rows, the last row is short when the deck does not fill the square.
    pub fn rows(&self, columns: usize) -> impl Iterator<Item = &[Card]> {
        self.cards.chunks(columns.max(1))
    }
}

pub trait DeckGenerator {
    fn generate(self, config: GameConfig) -> Deck;
}

/// Deals the ordered deck and applies a seeded Fisher-Yates shuffle.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomDeckGenerator {
    seed: u64,
}

impl RandomDeckGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl DeckGenerator for RandomDeckGenerator {
    fn generate(self, config: GameConfig) -> Deck {
        use rand::prelude::*;

        let mut deck = Deck::ordered(config);
        let mut rng = SmallRng::seed_from_u64(self.seed);
        deck.cards.shuffle(&mut rng);

        log::debug!(
            "Dealt {} cards ({} pairs) for grid {}, seed: {}",
            deck.len(),
            config.pair_count(),
            config.grid_size,
            self.seed
        );
        deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_histogram(deck: &Deck) -> HashMap<CardValue, usize> {
        let mut counts = HashMap::new();
        for card in deck.cards() {
            *counts.entry(card.value).or_default() += 1;
        }
        counts
    }

    #[test]
    fn every_supported_grid_deals_exact_pairs() {
        for grid_size in GameConfig::MIN_GRID_SIZE..=GameConfig::MAX_GRID_SIZE {
            let config = GameConfig::new(grid_size);
            for seed in 0..8 {
                let deck = RandomDeckGenerator::new(seed).generate(config);
                assert_eq!(deck.len(), usize::from(config.deck_len()));
                assert_eq!(deck.len() % 2, 0);

                let counts = value_histogram(&deck);
                assert_eq!(counts.len(), usize::from(config.pair_count()));
                for value in 1..=config.pair_count() {
                    assert_eq!(counts.get(&value), Some(&2), "grid {} value {}", grid_size, value);
                }
            }
        }
    }

    #[test]
    fn ordered_deck_matches_dealing_rule() {
        let deck = Deck::ordered(GameConfig::new(2));
        let values: Vec<_> = deck.cards().iter().map(|card| (card.id, card.value)).collect();
        assert_eq!(values, [(0, 1), (1, 2), (2, 1), (3, 2)]);
    }

    #[test]
    fn odd_grid_drops_the_highest_id() {
        let deck = RandomDeckGenerator::new(7).generate(GameConfig::new(3));
        assert_eq!(deck.len(), 8);
        assert!(!deck.contains(8));
        assert!((0..8).all(|id| deck.contains(id)));
    }

    #[test]
    fn tiny_unchecked_grids_deal_nothing() {
        assert!(Deck::ordered(GameConfig::new_unchecked(0)).is_empty());
        assert!(RandomDeckGenerator::new(1).generate(GameConfig::new_unchecked(1)).is_empty());
    }

    #[test]
    fn same_seed_deals_same_layout() {
        let config = GameConfig::new(6);
        let a = RandomDeckGenerator::new(1234).generate(config);
        let b = RandomDeckGenerator::new(1234).generate(config);
        let c = RandomDeckGenerator::new(4321).generate(config);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn shuffle_does_not_keep_dealing_order() {
        let config = GameConfig::new(GameConfig::MAX_GRID_SIZE);
        let ordered = Deck::ordered(config);
        for seed in 0..32 {
            assert_ne!(RandomDeckGenerator::new(seed).generate(config), ordered);
        }
    }

    #[test]
    fn shuffle_has_no_positional_bias() {
        let config = GameConfig::new(2);
        let rounds = 4000;
        let mut first_slot = [0usize; 4];
        for seed in 0..rounds {
            let deck = RandomDeckGenerator::new(seed).generate(config);
            first_slot[usize::from(deck.cards()[0].id)] += 1;
        }
        // each id should land first about a quarter of the time
        for (id, &count) in first_slot.iter().enumerate() {
            assert!((800..1200).contains(&count), "id {} landed first {} times", id, count);
        }
    }

    #[test]
    fn from_values_validates_pairs() {
        assert!(Deck::from_values(&[1, 2, 2, 1]).is_ok());
        assert!(Deck::from_values(&[]).is_ok());
        assert_eq!(Deck::from_values(&[1, 1, 2]), Err(GameError::UnpairedDeck));
        assert_eq!(Deck::from_values(&[1, 1, 1, 1]), Err(GameError::UnpairedDeck));
    }

    #[test]
    fn from_cards_rejects_duplicate_ids() {
        let cards = alloc::vec![Card { id: 0, value: 1 }, Card { id: 0, value: 1 }];
        assert_eq!(Deck::from_cards(cards), Err(GameError::UnpairedDeck));
    }

    #[test]
    fn rows_follow_board_columns() {
        let deck = Deck::ordered(GameConfig::new(3));
        let rows: Vec<usize> = deck.rows(3).map(<[Card]>::len).collect();
        assert_eq!(rows, [3, 3, 2]);
    }
}
