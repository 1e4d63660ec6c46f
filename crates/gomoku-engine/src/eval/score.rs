//! Pattern score tiers and the formulas that turn one line scan into a score.
//!
//! A line through a cell is summarised as a run of own stones, optionally
//! broken by one empty cell on each side, plus whether each end is blocked
//! by the board edge or an enemy stone. The three formulas below cover the
//! no-gap, one-gap and two-gap shapes.

/// Single open stone.
pub const ONE: i32 = 10;
/// Open two.
pub const TWO: i32 = 100;
/// Open three.
pub const THREE: i32 = 1_000;
/// Open four: wins next move unless the opponent already has five.
pub const FOUR: i32 = 100_000;
/// Five in a row.
pub const FIVE: i32 = 10_000_000;
/// Single stone blocked on one side.
pub const BLOCKED_ONE: i32 = 1;
/// Two blocked on one side.
pub const BLOCKED_TWO: i32 = 10;
/// Three blocked on one side.
pub const BLOCKED_THREE: i32 = 100;
/// Four with exactly one completing cell.
pub const BLOCKED_FOUR: i32 = 10_000;

/// Score of a gapless run of `count` stones (1..=4).
///
/// Counts outside that range score zero; callers handle five and longer
/// runs before reaching here.
pub fn non_empty(count: i32, blocked: bool) -> i32 {
    match (count, blocked) {
        (1, false) => ONE,
        (1, true) => BLOCKED_ONE,
        (2, false) => TWO,
        (2, true) => BLOCKED_TWO,
        (3, false) => THREE,
        (3, true) => BLOCKED_THREE,
        (4, false) => FOUR,
        (4, true) => BLOCKED_FOUR,
        _ => 0,
    }
}

/// Score of a run broken by one gap.
///
/// `empty_pos` is the number of stones beyond the gap, `count` the total
/// stones in the line including the scored cell. `empty_side_block` tells
/// whether the end past the gap is blocked, `non_empty_side_block` the
/// other end.
pub fn single_empty(
    empty_pos: i32,
    count: i32,
    empty_side_block: bool,
    non_empty_side_block: bool,
) -> i32 {
    let open = !empty_side_block && !non_empty_side_block;
    let half_open = empty_side_block != non_empty_side_block;
    match empty_pos {
        1 => {
            if count >= 6 {
                FIVE
            } else if open {
                match count {
                    2 => TWO / 2,
                    3 => THREE,
                    4 => BLOCKED_FOUR,
                    5 => FOUR,
                    _ => 0,
                }
            } else if half_open {
                match count {
                    2 => BLOCKED_TWO,
                    3 => BLOCKED_THREE,
                    4 => BLOCKED_FOUR,
                    5 if empty_side_block => FOUR,
                    5 => BLOCKED_FOUR,
                    _ => 0,
                }
            } else if count >= 4 {
                BLOCKED_FOUR
            } else {
                0
            }
        }
        2 => {
            if count >= 7 {
                FIVE
            } else if open {
                match count {
                    3 => THREE,
                    4 | 5 => BLOCKED_FOUR,
                    6 => FOUR,
                    _ => 0,
                }
            } else if half_open {
                match count {
                    3 => BLOCKED_THREE,
                    4 | 5 => BLOCKED_FOUR,
                    6 if empty_side_block => FOUR,
                    6 => BLOCKED_FOUR,
                    _ => 0,
                }
            } else if count >= 4 {
                BLOCKED_FOUR
            } else {
                0
            }
        }
        3 => {
            if count >= 8 {
                FIVE
            } else if open {
                match count {
                    4..=6 => BLOCKED_FOUR,
                    7 => FOUR,
                    _ => 0,
                }
            } else if half_open {
                match count {
                    4..=6 => BLOCKED_FOUR,
                    7 if empty_side_block => FOUR,
                    7 => BLOCKED_FOUR,
                    _ => 0,
                }
            } else if count >= 4 {
                BLOCKED_FOUR
            } else {
                0
            }
        }
        4 => {
            if count >= 9 {
                FIVE
            } else if open {
                match count {
                    5..=8 => FOUR,
                    _ => 0,
                }
            } else if half_open {
                match count {
                    5..=7 if non_empty_side_block => FOUR,
                    5..=7 => BLOCKED_FOUR,
                    8 => FOUR,
                    _ => 0,
                }
            } else if count >= 5 {
                BLOCKED_FOUR
            } else {
                0
            }
        }
        p if p >= 5 => FIVE,
        _ => 0,
    }
}

/// Score of a run broken by a gap on both sides of the scored cell.
///
/// The layout is `(left_a) _ (left_b) X (right_a) _ (right_b)`, where `X`
/// is the scored cell and `_` the two gaps.
pub fn double_empty(
    left_a: i32,
    left_b: i32,
    left_block: bool,
    right_a: i32,
    right_b: i32,
    right_block: bool,
) -> i32 {
    let middle = left_b + 1 + right_a;
    if right_b >= 5 || left_a >= 5 || middle >= 5 {
        return FIVE;
    }
    if middle == 4 {
        return FOUR;
    }
    if (left_a == 4 && !left_block) || (right_b == 4 && !right_block) {
        return FOUR;
    }
    if left_a == 4 && right_b == 4 {
        return FOUR;
    }
    match middle {
        3 => FOUR,
        2 => {
            if left_a >= 2 && right_b >= 2 {
                FOUR
            } else if right_b >= 2 {
                BLOCKED_FOUR
            } else {
                THREE
            }
        }
        1 => {
            if left_a >= 3 && right_b >= 3 {
                FOUR
            } else if left_a == 2 || right_b >= 3 {
                BLOCKED_FOUR
            } else if right_b == 2 {
                THREE
            } else {
                TWO
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gapless_runs_follow_tier_table() {
        assert_eq!(non_empty(1, false), ONE);
        assert_eq!(non_empty(3, false), THREE);
        assert_eq!(non_empty(3, true), BLOCKED_THREE);
        assert_eq!(non_empty(4, true), BLOCKED_FOUR);
        assert_eq!(non_empty(7, false), 0, "out-of-range counts score zero");
    }

    #[test]
    fn single_gap_split_threes_and_fours() {
        // X _ X open: a split two
        assert_eq!(single_empty(1, 2, false, false), TWO / 2);
        // X X _ X open: a split three
        assert_eq!(single_empty(1, 3, false, false), THREE);
        // X X _ X X: a four that needs the gap
        assert_eq!(single_empty(2, 4, false, false), BLOCKED_FOUR);
        // X X X X _ X X X X with the far side blocked still wins on the gap
        assert_eq!(single_empty(4, 8, true, false), FOUR);
    }

    #[test]
    fn single_gap_blocked_side_matters() {
        assert_eq!(single_empty(1, 5, true, false), FOUR);
        assert_eq!(single_empty(1, 5, false, true), BLOCKED_FOUR);
        assert_eq!(single_empty(4, 6, false, true), FOUR);
        assert_eq!(single_empty(4, 6, true, false), BLOCKED_FOUR);
    }

    #[test]
    fn single_gap_long_lines_are_five() {
        assert_eq!(single_empty(1, 6, true, true), FIVE);
        assert_eq!(single_empty(2, 7, false, false), FIVE);
        assert_eq!(single_empty(5, 6, false, false), FIVE);
    }

    #[test]
    fn single_gap_never_panics_on_odd_input() {
        assert_eq!(single_empty(0, 3, false, false), 0);
        assert_eq!(single_empty(-1, 3, true, true), 0);
        assert_eq!(single_empty(3, 2, true, true), 0);
    }

    #[test]
    fn double_gap_shapes() {
        // _ X _ with single stones beyond each gap: X _ X _ X
        assert_eq!(double_empty(1, 0, false, 0, 1, false), TWO);
        // X X _ X _ X X
        assert_eq!(double_empty(2, 0, false, 0, 2, false), BLOCKED_FOUR);
        // X _ X X X _ X
        assert_eq!(double_empty(1, 1, false, 1, 1, false), FOUR);
        // X _ X X _ X
        assert_eq!(double_empty(1, 0, false, 1, 1, false), THREE);
        // five stones beyond a gap
        assert_eq!(double_empty(1, 0, true, 0, 5, true), FIVE);
    }
}
