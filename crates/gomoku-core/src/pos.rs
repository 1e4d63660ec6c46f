//! Board coordinates and chosen moves.

use std::fmt;

/// Side length of the board.
pub const BOARD_SIZE: usize = 15;

/// Number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// A cell on the board, stored as the row-major index `y * 15 + x`.
///
/// `x` is the column (0 = A) and `y` the row counted from the top.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos(u8);

impl Pos {
    /// The centre cell (H8).
    pub const CENTER: Pos = Pos((7 * BOARD_SIZE + 7) as u8);

    /// Create a position from a column and row, returning `None` if out of range.
    #[inline]
    pub const fn new(x: usize, y: usize) -> Option<Pos> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Some(Pos((y * BOARD_SIZE + x) as u8))
        } else {
            None
        }
    }

    /// Create a position from signed coordinates, returning `None` if out of range.
    #[inline]
    pub const fn from_signed(x: i32, y: i32) -> Option<Pos> {
        if x < 0 || y < 0 {
            return None;
        }
        Pos::new(x as usize, y as usize)
    }

    /// Create a position from coordinates known to be on the board.
    ///
    /// # Panics
    ///
    /// Debug-asserts that both coordinates are in range.
    #[inline]
    pub const fn at(x: usize, y: usize) -> Pos {
        debug_assert!(x < BOARD_SIZE && y < BOARD_SIZE);
        Pos((y * BOARD_SIZE + x) as u8)
    }

    /// Create a position from a row-major index, returning `None` if out of range.
    #[inline]
    pub const fn from_index(index: usize) -> Option<Pos> {
        if index < CELL_COUNT {
            Some(Pos(index as u8))
        } else {
            None
        }
    }

    /// Return the row-major index (0..225).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Column, 0 = A.
    #[inline]
    pub const fn x(self) -> usize {
        self.index() % BOARD_SIZE
    }

    /// Row, 0 = top.
    #[inline]
    pub const fn y(self) -> usize {
        self.index() / BOARD_SIZE
    }

    /// Step `steps` times along `(dx, dy)`, returning `None` when leaving the board.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32, steps: i32) -> Option<Pos> {
        Pos::from_signed(self.x() as i32 + dx * steps, self.y() as i32 + dy * steps)
    }

    /// Iterate over all cells in row-major order.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..CELL_COUNT as u8).map(Pos)
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos(x={}, y={})", self.x(), self.y())
    }
}

/// A move chosen by a strategy.
///
/// `winning` is set when the move belongs to a proven forced win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    /// Target cell.
    pub pos: Pos,
    /// Whether the move is part of a certified forced win.
    pub winning: bool,
}

impl Move {
    /// A move with no certainty attached.
    #[inline]
    pub const fn new(pos: Pos) -> Move {
        Move { pos, winning: false }
    }

    /// A move that is part of a proven forced win.
    #[inline]
    pub const fn winning(pos: Pos) -> Move {
        Move { pos, winning: true }
    }
}
