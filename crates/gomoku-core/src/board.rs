//! The game board: cell occupancy, move log, terminal test, and neighbourhood queries.

use std::fmt;

use crate::color::Color;
use crate::direction::Direction;
use crate::error::BoardError;
use crate::notation;
use crate::pos::{BOARD_SIZE, CELL_COUNT, Pos};
use crate::zobrist;

/// Number of aligned stones that wins the game.
pub const WIN_LENGTH: usize = 5;

/// A 15x15 board with its move log and incremental Zobrist hash.
///
/// The move log always lists exactly the occupied cells, in the order
/// they were filled. Cloning produces a fully independent board.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Color>; CELL_COUNT],
    log: Vec<Pos>,
    hash: u64,
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Board {
        Board {
            cells: [None; CELL_COUNT],
            log: Vec::new(),
            hash: 0,
        }
    }

    /// Build a board by replaying `moves` with alternating colors, Black first.
    pub fn from_moves(moves: &[Pos]) -> Result<Board, BoardError> {
        let mut board = Board::new();
        for (ply, &pos) in moves.iter().enumerate() {
            board.place(pos, Color::for_ply(ply))?;
        }
        debug_assert_eq!(board.hash, zobrist::hash_from_scratch(&board));
        Ok(board)
    }

    /// Return the stone on `(x, y)`, failing if the coordinate is off the board.
    pub fn cell(&self, x: i32, y: i32) -> Result<Option<Color>, BoardError> {
        Pos::from_signed(x, y)
            .map(|pos| self.at(pos))
            .ok_or(BoardError::OutOfRange { x, y })
    }

    /// Return the stone on `pos`, if any.
    #[inline]
    pub fn at(&self, pos: Pos) -> Option<Color> {
        self.cells[pos.index()]
    }

    /// Return `true` if `pos` holds no stone.
    #[inline]
    pub fn is_empty_at(&self, pos: Pos) -> bool {
        self.cells[pos.index()].is_none()
    }

    /// Return `true` if `(x, y)` is on the board and empty.
    pub fn is_legal(&self, x: i32, y: i32) -> bool {
        matches!(self.cell(x, y), Ok(None))
    }

    /// Place a stone, failing if the cell is occupied.
    pub fn place(&mut self, pos: Pos, color: Color) -> Result<(), BoardError> {
        if !self.is_empty_at(pos) {
            return Err(BoardError::Occupied { pos });
        }
        self.put(pos, color);
        Ok(())
    }

    /// Remove a stone, failing if the cell is empty.
    pub fn remove(&mut self, pos: Pos) -> Result<Color, BoardError> {
        self.take(pos).ok_or(BoardError::Vacant { pos })
    }

    /// Place a stone on a cell known to be empty.
    ///
    /// Used on the search hot path where the candidate generator only
    /// proposes empty cells.
    #[inline]
    pub fn put(&mut self, pos: Pos, color: Color) {
        debug_assert!(self.is_empty_at(pos), "put on occupied cell {pos}");
        self.cells[pos.index()] = Some(color);
        self.log.push(pos);
        self.hash ^= zobrist::key(pos, color);
    }

    /// Remove the stone on `pos`, returning its color.
    ///
    /// Searches undo in LIFO order, so the log entry is normally the last one.
    pub fn take(&mut self, pos: Pos) -> Option<Color> {
        let color = self.cells[pos.index()].take()?;
        if self.log.last() == Some(&pos) {
            self.log.pop();
        } else if let Some(i) = self.log.iter().rposition(|&p| p == pos) {
            self.log.remove(i);
        }
        self.hash ^= zobrist::key(pos, color);
        Some(color)
    }

    /// Return `true` if the stone on `pos` completes five in a row on any axis.
    ///
    /// The caller must ensure `pos` is occupied; an empty cell returns `false`.
    pub fn is_terminal(&self, pos: Pos) -> bool {
        debug_assert!(!self.is_empty_at(pos), "terminal test on empty cell {pos}");
        let Some(color) = self.at(pos) else {
            return false;
        };
        Direction::ALL
            .into_iter()
            .any(|dir| self.run_length(pos, dir, color) >= WIN_LENGTH)
    }

    /// Length of the contiguous run of `color` through `pos` along `dir`.
    fn run_length(&self, pos: Pos, dir: Direction, color: Color) -> usize {
        let (dx, dy) = dir.delta();
        let mut count = 1;
        for sign in [1, -1] {
            let mut step = 1;
            while let Some(next) = pos.offset(dx * sign, dy * sign, step) {
                if self.at(next) != Some(color) {
                    break;
                }
                count += 1;
                step += 1;
            }
        }
        count
    }

    /// Return `true` if at least `count` stones lie in the square window of
    /// radius `distance` around `pos`, not counting `pos` itself.
    pub fn has_neighbor(&self, pos: Pos, distance: i32, count: usize) -> bool {
        let (cx, cy) = (pos.x() as i32, pos.y() as i32);
        let mut found = 0;
        for y in (cy - distance)..=(cy + distance) {
            for x in (cx - distance)..=(cx + distance) {
                if x == cx && y == cy {
                    continue;
                }
                let Some(other) = Pos::from_signed(x, y) else {
                    continue;
                };
                if self.at(other).is_some() {
                    found += 1;
                    if found >= count {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Number of stones on the board.
    #[inline]
    pub fn steps(&self) -> usize {
        self.log.len()
    }

    /// Occupied cells in the order they were filled.
    #[inline]
    pub fn moves(&self) -> &[Pos] {
        &self.log
    }

    /// The most recently filled cell.
    #[inline]
    pub fn last_move(&self) -> Option<Pos> {
        self.log.last().copied()
    }

    /// Color of the side to move under strict alternation.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        Color::for_ply(self.steps())
    }

    /// Iterate over occupied cells in row-major order.
    pub fn stones(&self) -> impl Iterator<Item = (Pos, Color)> + '_ {
        Pos::all().filter_map(|pos| self.at(pos).map(|color| (pos, color)))
    }

    /// Return the Zobrist hash of the position.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", notation::encode(&self.log))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..BOARD_SIZE {
            write!(f, "{} ", notation::row_char(y))?;
            for x in 0..BOARD_SIZE {
                let c = match self.at(Pos::at(x, y)) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, " ")?;
        for x in 0..BOARD_SIZE {
            write!(f, " {}", notation::column_char(x))?;
        }
        writeln!(f)
    }
}
