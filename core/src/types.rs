/// Identifier of a card, unique within one deal.
pub type CardId = u16;

/// Pair key, shared by exactly two cards of a deck.
pub type CardValue = u16;

/// Side length of the square board.
pub type GridSize = u8;

/// Count type used for deck lengths and pair counts.
pub type CardCount = u16;

/// Number of cards dealt for a board of side `grid_size`, rounded down to an even count so every card has a pair.
pub const fn deck_len(grid_size: GridSize) -> CardCount {
    let side = grid_size as CardCount;
    let cells = side.saturating_mul(side);
    cells - cells % 2
}
