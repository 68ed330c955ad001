use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// How long a revealed pair stays face up before it is resolved.
pub const DEFAULT_RESOLVE_DELAY_MS: u32 = 1000;

/// Valid transitions:
/// - Idle -> OneFlipped
/// - OneFlipped -> PairPending
/// - PairPending -> Idle
/// - PairPending -> Won
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No unresolved card is face up
    #[default]
    Idle,
    /// One card of the current turn is face up
    OneFlipped,
    /// Two cards are face up waiting for a resolution ticket
    PairPending,
    /// Every card of the deck is solved
    Won,
}

impl EngineState {
    pub const fn accepts_flips(self) -> bool {
        matches!(self, Self::Idle | Self::OneFlipped)
    }

    pub const fn is_won(self) -> bool {
        matches!(self, Self::Won)
    }
}

/// Handle for resolving one revealed pair, only valid for the deal and turn it was issued in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveTicket {
    generation: u32,
    turn: u32,
    pair: [CardId; 2],
}

impl ResolveTicket {
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn pair(&self) -> [CardId; 2] {
        self.pair
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlipOutcome {
    NoChange,
    Flipped,
    PairRevealed(ResolveTicket),
}

impl FlipOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Flipped => true,
            Self::PairRevealed(_) => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ResolveOutcome {
    Stale,
    Mismatched,
    Matched,
    Won,
}

impl ResolveOutcome {
    pub const fn has_update(self) -> bool {
        use ResolveOutcome::*;
        match self {
            Stale => false,
            Mismatched => true,
            Matched => true,
            Won => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEngine {
    config: GameConfig,
    deck: Deck,
    flipped: SmallVec<[CardId; 2]>,
    solved: HashSet<CardId>,
    generation: u32,
    turn: u32,
}

impl PlayEngine {
    pub fn new(config: GameConfig, deck: Deck) -> Self {
        Self {
            config,
            deck,
            flipped: SmallVec::new(),
            solved: HashSet::new(),
            generation: 0,
            turn: 0,
        }
    }

    pub fn deal(config: GameConfig, generator: impl DeckGenerator) -> Self {
        Self::new(config, generator.generate(config))
    }

    /// Replaces the deck and forgets every flip and match, tickets issued before are stale from now on.
    pub fn reset(&mut self, config: GameConfig, deck: Deck) {
        self.config = config;
        self.deck = deck;
        self.flipped.clear();
        self.solved.clear();
        self.generation = self.generation.wrapping_add(1);
        self.turn = 0;
        log::debug!(
            "Reset board, generation: {}, grid: {}, cards: {}",
            self.generation,
            self.config.grid_size,
            self.deck.len()
        );
    }

    pub fn redeal(&mut self, config: GameConfig, generator: impl DeckGenerator) {
        self.reset(config, generator.generate(config));
    }

    pub fn state(&self) -> EngineState {
        if self.is_won() {
            return EngineState::Won;
        }
        match self.flipped.len() {
            0 => EngineState::Idle,
            1 => EngineState::OneFlipped,
            _ => EngineState::PairPending,
        }
    }

    pub fn is_won(&self) -> bool {
        !self.deck.is_empty() && self.solved.len() == self.deck.len()
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn card(&self, id: CardId) -> Option<Card> {
        self.deck.card(id)
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn flipped(&self) -> &[CardId] {
        &self.flipped
    }

    pub fn is_flipped(&self, id: CardId) -> bool {
        self.flipped.contains(&id)
    }

    pub fn is_solved(&self, id: CardId) -> bool {
        self.solved.contains(&id)
    }

    pub fn solved_count(&self) -> usize {
        self.solved.len()
    }

    pub fn pairs_left(&self) -> usize {
        (self.deck.len() - self.solved.len()) / 2
    }

    pub fn pending_ticket(&self) -> Option<ResolveTicket> {
        match self.flipped[..] {
            [first, second] => Some(self.ticket_for([first, second])),
            _ => None,
        }
    }

    /// Turns a card face up, at most two unresolved cards can be face up at once.
    pub fn flip(&mut self, id: CardId) -> Result<FlipOutcome> {
        use FlipOutcome::*;

        let card = self.deck.card(id).ok_or(GameError::InvalidCard)?;

        if self.is_solved(id) || self.is_flipped(id) {
            log::trace!("Card {} is already face up", id);
            return Ok(NoChange);
        }

        if self.flipped.len() >= 2 {
            log::trace!("Pair pending, dropped flip of card {}", id);
            return Ok(NoChange);
        }

        self.flipped.push(id);
        log::debug!("Flip card {}, value: {}", id, card.value);

        Ok(match self.flipped[..] {
            [first, second] => {
                self.turn = self.turn.wrapping_add(1);
                PairRevealed(self.ticket_for([first, second]))
            }
            _ => Flipped,
        })
    }

    /// Applies the outcome of a revealed pair: equal values become solved, and the pair is turned back down either way.
    pub fn resolve(&mut self, ticket: ResolveTicket) -> ResolveOutcome {
        if self.pending_ticket() != Some(ticket) {
            log::debug!("Ignoring stale ticket: {:?}", ticket);
            return ResolveOutcome::Stale;
        }

        let [first, second] = ticket.pair;
        self.flipped.clear();

        let first_value = self.deck.card(first).map(|card| card.value);
        let second_value = self.deck.card(second).map(|card| card.value);
        if first_value != second_value {
            log::trace!("Cards {} and {} do not match", first, second);
            return ResolveOutcome::Mismatched;
        }

        self.solved.insert(first);
        self.solved.insert(second);
        log::debug!(
            "Cards {} and {} matched, {} pairs left",
            first,
            second,
            self.pairs_left()
        );

        if self.is_won() {
            log::info!("All {} pairs found", self.deck.len() / 2);
            ResolveOutcome::Won
        } else {
            ResolveOutcome::Matched
        }
    }

    fn ticket_for(&self, pair: [CardId; 2]) -> ResolveTicket {
        ResolveTicket {
            generation: self.generation,
            turn: self.turn,
            pair,
        }
    }
}
