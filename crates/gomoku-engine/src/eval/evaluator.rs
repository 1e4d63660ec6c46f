//! Per-cell, per-direction pattern scoring.

use gomoku_core::{Board, CELL_COUNT, Color, Direction, Pos};

use super::score::{FIVE, double_empty, non_empty, single_empty};

/// Cached direction scores, indexed by color, direction, and cell.
#[derive(Clone)]
pub(crate) struct DirectionCache {
    scores: Box<[[[i32; CELL_COUNT]; Direction::COUNT]; Color::COUNT]>,
}

impl DirectionCache {
    pub(crate) fn new() -> DirectionCache {
        DirectionCache {
            scores: Box::new([[[0; CELL_COUNT]; Direction::COUNT]; Color::COUNT]),
        }
    }

    /// Score `pos` for `color`, rescanning only `only` (or every direction
    /// when `None`) and reusing cached values for the rest.
    pub(crate) fn score_point(
        &mut self,
        board: &Board,
        pos: Pos,
        color: Color,
        only: Option<Direction>,
    ) -> i32 {
        let mut total = 0;
        for dir in Direction::ALL {
            let slot = &mut self.scores[color.index()][dir.index()][pos.index()];
            if only.is_none_or(|d| d == dir) {
                *slot = LineScan::scan(board, pos, color, dir).score();
            }
            total += *slot;
        }
        total
    }
}

/// The shape of one line through a cell, as seen by one color.
///
/// Right is the `+delta` side, left the `-delta` side. A gap is a single
/// empty cell followed by another own stone; at most one is taken per side.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LineScan {
    left_count: i32,
    right_count: i32,
    /// Own stones found beyond the left gap.
    left_gap: Option<i32>,
    /// Own stones found before the right gap.
    right_gap: Option<i32>,
    left_block: bool,
    right_block: bool,
}

impl LineScan {
    fn scan(board: &Board, pos: Pos, color: Color, dir: Direction) -> LineScan {
        let (dx, dy) = dir.delta();
        let mut line = LineScan::default();

        let mut step = 1;
        loop {
            let Some(cell) = pos.offset(dx, dy, step) else {
                line.right_block = true;
                break;
            };
            match board.at(cell) {
                None => {
                    let continues = cell
                        .offset(dx, dy, 1)
                        .is_some_and(|next| board.at(next) == Some(color));
                    if line.right_gap.is_none() && continues {
                        line.right_gap = Some(line.right_count);
                    } else {
                        break;
                    }
                }
                Some(c) if c == color => line.right_count += 1,
                Some(_) => {
                    line.right_block = true;
                    break;
                }
            }
            step += 1;
        }

        let mut step = 1;
        loop {
            let Some(cell) = pos.offset(-dx, -dy, step) else {
                line.left_block = true;
                break;
            };
            match board.at(cell) {
                None => {
                    let continues = cell
                        .offset(-dx, -dy, 1)
                        .is_some_and(|next| board.at(next) == Some(color));
                    if line.left_gap.is_none() && continues {
                        line.left_gap = Some(0);
                    } else {
                        break;
                    }
                }
                Some(c) if c == color => {
                    line.left_count += 1;
                    if let Some(beyond) = line.left_gap.as_mut() {
                        *beyond += 1;
                    }
                }
                Some(_) => {
                    line.left_block = true;
                    break;
                }
            }
            step += 1;
        }
        line
    }

    fn score(&self) -> i32 {
        let count = self.left_count + self.right_count + 1;
        let (lb, rb) = (self.left_block, self.right_block);
        match (self.left_gap, self.right_gap) {
            (None, None) => {
                if count >= 5 {
                    FIVE
                } else if !lb && !rb {
                    non_empty(count, false)
                } else if !lb || !rb {
                    non_empty(count, true)
                } else {
                    0
                }
            }
            (Some(beyond), None) => single_empty(beyond, count, lb, rb),
            (None, Some(before)) => single_empty(self.right_count - before, count, rb, lb),
            (Some(left_beyond), Some(right_before)) => {
                let right_beyond = self.right_count - right_before;
                if left_beyond > right_beyond {
                    double_empty(
                        right_beyond,
                        right_before,
                        rb,
                        self.left_count - left_beyond,
                        left_beyond,
                        lb,
                    )
                } else {
                    double_empty(
                        left_beyond,
                        self.left_count - left_beyond,
                        lb,
                        right_before,
                        right_beyond,
                        rb,
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::score::{BLOCKED_FOUR, FOUR, THREE, TWO};
    use gomoku_core::notation::decode;

    fn board_with(stones: &[(usize, usize, Color)]) -> Board {
        let mut board = Board::new();
        for &(x, y, color) in stones {
            board.put(Pos::at(x, y), color);
        }
        board
    }

    #[test]
    fn open_three_scores_three() {
        let board = board_with(&[(6, 7, Color::Black), (7, 7, Color::Black)]);
        let line = LineScan::scan(&board, Pos::at(8, 7), Color::Black, Direction::Horizontal);
        assert_eq!(line.left_count, 2);
        assert!(!line.left_block && !line.right_block);
        assert_eq!(line.score(), THREE);
    }

    #[test]
    fn enemy_stone_blocks_the_line() {
        let board = board_with(&[
            (5, 7, Color::White),
            (6, 7, Color::Black),
            (7, 7, Color::Black),
            (8, 7, Color::Black),
        ]);
        let line = LineScan::scan(&board, Pos::at(9, 7), Color::Black, Direction::Horizontal);
        assert!(line.left_block);
        assert_eq!(line.score(), BLOCKED_FOUR);
    }

    #[test]
    fn board_edge_blocks_the_line() {
        let board = board_with(&[(0, 0, Color::Black), (1, 0, Color::Black)]);
        let line = LineScan::scan(&board, Pos::at(2, 0), Color::Black, Direction::Horizontal);
        assert!(line.left_block);
        assert!(!line.right_block);
    }

    #[test]
    fn split_shapes_record_gaps() {
        // X X _ [X]: the gap lies to the left with two stones beyond it
        let board = board_with(&[(4, 7, Color::Black), (5, 7, Color::Black)]);
        let line = LineScan::scan(&board, Pos::at(7, 7), Color::Black, Direction::Horizontal);
        assert_eq!(line.left_gap, Some(2));
        assert_eq!(line.score(), THREE);
    }

    #[test]
    fn filling_the_gap_of_a_split_four_wins() {
        // F8 G8 _ I8 J8: H8 completes five
        let mut board = Board::new();
        for pos in decode("F8 G8 I8 J8").unwrap() {
            board.put(pos, Color::Black);
        }
        let mut cache = DirectionCache::new();
        assert!(cache.score_point(&board, Pos::at(7, 7), Color::Black, None) >= FIVE);
    }

    #[test]
    fn cache_reuses_untouched_directions() {
        let board = board_with(&[(7, 6, Color::Black), (6, 7, Color::Black)]);
        let mut cache = DirectionCache::new();
        let full = cache.score_point(&board, Pos::at(7, 7), Color::Black, None);
        let partial =
            cache.score_point(&board, Pos::at(7, 7), Color::Black, Some(Direction::Vertical));
        assert_eq!(full, partial);
        assert_eq!(full, 2 * TWO + 2 * crate::eval::score::ONE);
    }

    #[test]
    fn open_four_from_two_split_threes() {
        let board = board_with(&[
            (5, 7, Color::Black),
            (6, 7, Color::Black),
            (8, 7, Color::Black),
        ]);
        let mut cache = DirectionCache::new();
        let score = cache.score_point(&board, Pos::at(7, 7), Color::Black, Some(Direction::Horizontal));
        assert!(score >= FOUR, "filling the middle of X X _ X makes an open four");
    }
}
