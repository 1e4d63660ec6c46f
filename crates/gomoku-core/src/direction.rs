//! The four line axes of the board.

/// A line axis through a cell. Each axis is scanned in both senses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
    Diagonal,
    AntiDiagonal,
}

impl Direction {
    /// Number of axes.
    pub const COUNT: usize = 4;

    /// All axes in index order.
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::Diagonal,
        Direction::AntiDiagonal,
    ];

    /// Return the index (0..4).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit step `(dx, dy)` in the positive sense of the axis.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Horizontal => (1, 0),
            Direction::Vertical => (0, 1),
            Direction::Diagonal => (1, 1),
            Direction::AntiDiagonal => (-1, 1),
        }
    }
}
