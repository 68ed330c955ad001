#![no_std]

extern crate alloc;

use core::num::IntErrorKind;
use serde::{Deserialize, Serialize};

pub use deck::*;
pub use engine::*;
pub use error::*;
pub use types::*;

mod deck;
mod engine;
mod error;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub grid_size: GridSize,
}

impl GameConfig {
    pub const MIN_GRID_SIZE: GridSize = 2;
    pub const MAX_GRID_SIZE: GridSize = 8;

    pub const fn new_unchecked(grid_size: GridSize) -> Self {
        Self { grid_size }
    }

    pub fn new(grid_size: GridSize) -> Self {
        Self::new_unchecked(grid_size.clamp(Self::MIN_GRID_SIZE, Self::MAX_GRID_SIZE))
    }

    /// Parses user supplied text, anything that is not a whole number is rejected and out of range values are clamped.
    pub fn parse_grid_size(input: &str) -> Result<Self> {
        let requested: i64 = match input.trim().parse() {
            Ok(requested) => requested,
            // still a whole number, just far out of range
            Err(err) => match err.kind() {
                IntErrorKind::PosOverflow => i64::MAX,
                IntErrorKind::NegOverflow => i64::MIN,
                _ => return Err(GameError::InvalidGridSize),
            },
        };
        let clamped = requested.clamp(
            Self::MIN_GRID_SIZE.into(),
            Self::MAX_GRID_SIZE.into(),
        );
        if clamped != requested {
            log::debug!("Grid size {} out of range, clamped to {}", requested, clamped);
        }
        // clamped into the GridSize range above
        Ok(Self::new_unchecked(clamped as GridSize))
    }

    pub const fn deck_len(&self) -> CardCount {
        deck_len(self.grid_size)
    }

    pub const fn pair_count(&self) -> CardCount {
        self.deck_len() / 2
    }

    pub const fn columns(&self) -> usize {
        self.grid_size as usize
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(4)
    }
}
