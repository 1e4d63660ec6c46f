//! Incrementally maintained per-cell scores and candidate-move generation.

use std::ops::{Deref, DerefMut};

use gomoku_core::{Board, CELL_COUNT, Color, Direction, Pos};

use super::evaluator::DirectionCache;
use super::score::{BLOCKED_FOUR, FIVE, FOUR, THREE, TWO};

/// Distance over which a stone can change another cell's score.
const UPDATE_RADIUS: i32 = 10;

/// Default number of candidates returned by [`ScoreManager::candidates`].
pub const CANDIDATE_LIMIT: usize = 20;

/// A private board together with the pattern score of every relevant cell
/// for both colors.
///
/// Empty cells carry the score a stone of each color would get there;
/// occupied cells carry the score of the stone on them and zero for the
/// other color. Empty cells with no stone within two cells stay at zero.
#[derive(Clone)]
pub struct ScoreManager {
    board: Board,
    cache: DirectionCache,
    scores: Box<[[i32; CELL_COUNT]; Color::COUNT]>,
    far_attack: i32,
}

impl ScoreManager {
    /// Take ownership of `board` and score it from scratch.
    pub fn new(board: Board) -> ScoreManager {
        let far_attack = if board.steps() <= 7 { 2 * TWO } else { TWO };
        let mut manager = ScoreManager {
            board,
            cache: DirectionCache::new(),
            scores: Box::new([[0; CELL_COUNT]; Color::COUNT]),
            far_attack,
        };
        manager.init_scores();
        manager
    }

    fn init_scores(&mut self) {
        for pos in Pos::all() {
            match self.board.at(pos) {
                None => {
                    if self.board.has_neighbor(pos, 2, 1) {
                        for color in Color::ALL {
                            self.scores[color.index()][pos.index()] =
                                self.cache.score_point(&self.board, pos, color, None);
                        }
                    }
                }
                Some(stone) => {
                    self.scores[stone.index()][pos.index()] =
                        self.cache.score_point(&self.board, pos, stone, None);
                    self.scores[(!stone).index()][pos.index()] = 0;
                }
            }
        }
    }

    /// The board being scored.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Give the board back.
    pub fn into_board(self) -> Board {
        self.board
    }

    /// Score of `pos` for `color`.
    #[inline]
    pub fn score(&self, pos: Pos, color: Color) -> i32 {
        self.scores[color.index()][pos.index()]
    }

    /// Place a stone on an empty cell and refresh the affected scores.
    pub fn place(&mut self, pos: Pos, color: Color) {
        self.board.put(pos, color);
        self.update(pos);
    }

    /// Remove the stone on `pos` and refresh the affected scores.
    pub fn undo(&mut self, pos: Pos) {
        self.board.take(pos);
        self.update(pos);
    }

    /// Place a stone that is removed again when the returned guard drops.
    pub fn apply(&mut self, pos: Pos, color: Color) -> StoneGuard<'_> {
        self.place(pos, color);
        StoneGuard { manager: self, pos }
    }

    /// Refresh the scores along the four lines through `pos`.
    pub fn update(&mut self, pos: Pos) {
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            for step in -UPDATE_RADIUS..=UPDATE_RADIUS {
                if let Some(cell) = pos.offset(dx, dy, step) {
                    self.update_in_direction(cell, dir);
                }
            }
        }
    }

    fn update_in_direction(&mut self, pos: Pos, dir: Direction) {
        let stone = self.board.at(pos);
        for color in Color::ALL {
            self.scores[color.index()][pos.index()] = match stone {
                Some(s) if s != color => 0,
                _ => self.cache.score_point(&self.board, pos, color, Some(dir)),
            };
        }
    }

    /// Static evaluation from `color`'s point of view: the summed scores of
    /// its stones minus the opponent's.
    pub fn evaluation(&self, color: Color) -> i32 {
        let mut own = 0;
        let mut enemy = 0;
        for (pos, stone) in self.board.stones() {
            let score = self.score(pos, stone);
            if stone == color {
                own += score;
            } else {
                enemy += score;
            }
        }
        own - enemy
    }

    /// Candidate moves for `color` with the default neighbourhood and limit.
    pub fn candidates(&self, color: Color) -> Vec<Pos> {
        self.candidates_with(color, false, 1, CANDIDATE_LIMIT)
    }

    /// Only the forcing part of the candidate list, when there is one.
    pub fn important_candidates(&self, color: Color) -> Vec<Pos> {
        self.candidates_with(color, true, 1, CANDIDATE_LIMIT)
    }

    /// Threat-bucketed candidate moves for `color`.
    ///
    /// Immediate fives come first and alone, then own open fours, then
    /// replies to enemy open fours. Otherwise double threes, own blocked
    /// fours and threes lead, followed by enemy blocked fours and threes,
    /// and twos (or singles) sorted by score fill the list up to `limit`.
    /// An empty board yields the centre.
    pub fn candidates_with(
        &self,
        color: Color,
        important_only: bool,
        neighbor_distance: i32,
        limit: usize,
    ) -> Vec<Pos> {
        let mut fives = Vec::new();
        let mut my_fours = Vec::new();
        let mut enemy_fours = Vec::new();
        let mut my_blocked_fours = Vec::new();
        let mut enemy_blocked_fours = Vec::new();
        let mut my_two_threes = Vec::new();
        let mut enemy_two_threes = Vec::new();
        let mut my_threes = Vec::new();
        let mut enemy_threes = Vec::new();
        let mut my_twos = Vec::new();
        let mut enemy_twos = Vec::new();
        let mut ones = Vec::new();

        for pos in Pos::all() {
            if !self.board.is_empty_at(pos) {
                continue;
            }
            let mine = self.score(pos, color);
            let theirs = self.score(pos, !color);
            if !self.board.has_neighbor(pos, neighbor_distance, 1)
                && !(self.board.has_neighbor(pos, 2, 1) && mine >= self.far_attack)
            {
                continue;
            }

            if mine >= FIVE || theirs >= FIVE {
                fives.push(pos);
            } else if mine >= FOUR {
                my_fours.push(pos);
            } else if theirs >= FOUR {
                enemy_fours.push(pos);
            } else if mine >= BLOCKED_FOUR {
                my_blocked_fours.push(pos);
            } else if theirs >= BLOCKED_FOUR {
                enemy_blocked_fours.push(pos);
            } else if mine >= 2 * THREE {
                my_two_threes.push(pos);
            } else if theirs >= 2 * THREE {
                enemy_two_threes.push(pos);
            } else if mine >= THREE {
                my_threes.push(pos);
            } else if theirs >= THREE {
                enemy_threes.push(pos);
            } else if mine >= TWO / 2 {
                my_twos.push((pos, mine));
            } else if theirs >= TWO / 2 {
                enemy_twos.push((pos, theirs));
            } else {
                ones.push(pos);
            }
        }

        if !fives.is_empty() {
            return fives;
        }
        if !my_fours.is_empty() {
            return my_fours;
        }
        if !enemy_fours.is_empty() {
            if my_blocked_fours.is_empty() {
                enemy_fours.extend(enemy_blocked_fours);
            } else {
                enemy_fours.extend(my_blocked_fours);
                enemy_fours.extend(enemy_blocked_fours);
            }
            return enemy_fours;
        }

        let forcing_threes = !my_two_threes.is_empty() || !enemy_two_threes.is_empty();
        let mut results = my_two_threes;
        results.extend(enemy_two_threes);
        results.extend(my_blocked_fours);
        results.extend(my_threes);
        if important_only && !results.is_empty() {
            return results;
        }
        results.extend(enemy_blocked_fours);
        results.extend(enemy_threes);
        if !results.is_empty() && forcing_threes {
            return results;
        }

        let mut twos = my_twos;
        twos.extend(enemy_twos);
        if twos.is_empty() {
            results.extend(ones);
        } else {
            twos.sort_by(|a, b| b.1.cmp(&a.1));
            results.extend(twos.into_iter().map(|(pos, _)| pos));
        }
        results.truncate(limit);

        if results.is_empty() && self.board.is_empty_at(Pos::CENTER) {
            results.push(Pos::CENTER);
        }
        results
    }

    /// Stones within `radius` of `pos` along the four lines whose score for
    /// `color` completes five.
    pub(crate) fn five_near(&self, pos: Pos, color: Color, radius: i32) -> Option<Pos> {
        Direction::ALL.into_iter().find_map(|dir| {
            let (dx, dy) = dir.delta();
            (-radius..=radius)
                .filter_map(|step| pos.offset(dx, dy, step))
                .find(|&cell| self.board.is_empty_at(cell) && self.score(cell, color) >= FIVE)
        })
    }
}

impl std::fmt::Debug for ScoreManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreManager")
            .field("board", &self.board)
            .field("far_attack", &self.far_attack)
            .finish_non_exhaustive()
    }
}

/// A stone placed through [`ScoreManager::apply`]; removed on drop.
pub struct StoneGuard<'a> {
    manager: &'a mut ScoreManager,
    pos: Pos,
}

impl Deref for StoneGuard<'_> {
    type Target = ScoreManager;

    fn deref(&self) -> &ScoreManager {
        self.manager
    }
}

impl DerefMut for StoneGuard<'_> {
    fn deref_mut(&mut self) -> &mut ScoreManager {
        self.manager
    }
}

impl Drop for StoneGuard<'_> {
    fn drop(&mut self) {
        self.manager.undo(self.pos);
    }
}
