use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Card is not part of the current deck")]
    InvalidCard,
    #[error("Grid size must be a whole number")]
    InvalidGridSize,
    #[error("Deck must have unique card ids and every value exactly twice")]
    UnpairedDeck,
}

pub type Result<T> = core::result::Result<T, GameError>;
