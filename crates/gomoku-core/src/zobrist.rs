//! Zobrist hashing keys for position deduplication.

use crate::board::Board;
use crate::color::Color;
use crate::pos::{CELL_COUNT, Pos};

/// Zobrist key for each (color, cell) pair. Indexed by `[Color::index()][Pos::index()]`.
pub(crate) static STONE_CELL: [[u64; CELL_COUNT]; Color::COUNT] = {
    let mut table = [[0u64; CELL_COUNT]; Color::COUNT];
    let mut state = SEED;
    let mut color = 0;
    while color < Color::COUNT {
        let mut cell = 0;
        while cell < CELL_COUNT {
            let (val, next) = xorshift64(state);
            table[color][cell] = val;
            state = next;
            cell += 1;
        }
        color += 1;
    }
    table
};

const SEED: u64 = 0x474f_4d4f_4b55_2135; // "GOMOKU!5"

/// Xorshift64 PRNG. Returns (value, next_state).
const fn xorshift64(mut state: u64) -> (u64, u64) {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    (state, state)
}

/// Key toggled when a stone of `color` appears on or leaves `pos`.
#[inline]
pub(crate) fn key(pos: Pos, color: Color) -> u64 {
    STONE_CELL[color.index()][pos.index()]
}

/// Compute a Zobrist hash from scratch for the given board.
pub(crate) fn hash_from_scratch(board: &Board) -> u64 {
    board
        .stones()
        .fold(0u64, |hash, (pos, color)| hash ^ key(pos, color))
}
