//! Candidate scan for the blocked-four almost-win search.

use gomoku_core::{Color, Pos};
use rustc_hash::FxHashSet;

use super::manager::{CANDIDATE_LIMIT, ScoreManager};
use super::score::{BLOCKED_FOUR, FIVE, FOUR, THREE, TWO};

/// Radius searched for the cell a blocked four threatens to complete.
const ECHO_RADIUS: i32 = 4;

/// Outcome of scanning the board for one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FourScan {
    /// The scanning color completes five on this cell.
    Completes(Pos),
    /// Ranked candidate moves.
    Moves(Vec<Pos>),
    /// Blocked-four cells paired with the cell the opponent must answer on.
    Pairs(Vec<(Pos, Pos)>),
}

impl ScoreManager {
    /// Attack candidates for `role`: open fours if any, else forcing cells,
    /// then own twos, then enemy twos by score (or singles), capped at 20.
    pub fn four_candidates(&mut self, role: Color) -> FourScan {
        self.scan_fours(role, None)
    }

    /// Blocked fours `role` can still play, each paired with the reply it
    /// forces. Cells in `used` are skipped.
    pub fn blocked_four_pairs(&mut self, role: Color, used: &FxHashSet<Pos>) -> FourScan {
        self.scan_fours(role, Some(used))
    }

    fn scan_fours(&mut self, role: Color, used: Option<&FxHashSet<Pos>>) -> FourScan {
        let mut my_fours = Vec::new();
        let mut importants = Vec::new();
        let mut less_important = Vec::new();
        let mut pairs = Vec::new();
        let mut twos = Vec::new();
        let mut ones = Vec::new();

        for pos in Pos::all() {
            if !self.board().is_empty_at(pos) {
                continue;
            }
            let mine = self.score(pos, role);
            let theirs = self.score(pos, !role);
            if !self.board().has_neighbor(pos, 1, 1)
                && (!self.board().has_neighbor(pos, 2, 1) || mine < TWO)
            {
                continue;
            }

            if mine >= FIVE {
                return FourScan::Completes(pos);
            } else if theirs >= FIVE {
                return match used {
                    Some(_) => FourScan::Pairs(Vec::new()),
                    None => FourScan::Moves(vec![pos]),
                };
            } else if mine >= FOUR {
                my_fours.push(pos);
            } else if theirs >= FOUR {
                importants.push(pos);
            } else if mine >= BLOCKED_FOUR {
                if let Some(used) = used
                    && !used.contains(&pos)
                    && let Some(reply) = self.echo(pos, role)
                {
                    pairs.push((pos, reply));
                }
            } else if theirs >= BLOCKED_FOUR || mine >= THREE || theirs >= THREE {
                importants.push(pos);
            } else if mine >= TWO {
                less_important.push(pos);
            } else if theirs >= TWO {
                twos.push((pos, theirs));
            } else {
                ones.push(pos);
            }
        }

        if used.is_some() {
            return FourScan::Pairs(pairs);
        }
        if !my_fours.is_empty() {
            return FourScan::Moves(my_fours);
        }
        importants.extend(less_important);
        if importants.len() > CANDIDATE_LIMIT {
            importants.truncate(CANDIDATE_LIMIT);
            return FourScan::Moves(importants);
        }
        if twos.is_empty() {
            importants.extend(ones);
        } else {
            twos.sort_by(|a, b| b.1.cmp(&a.1));
            importants.extend(twos.into_iter().map(|(pos, _)| pos));
        }
        importants.truncate(CANDIDATE_LIMIT);
        FourScan::Moves(importants)
    }

    /// The cell that completes five once `role` plays the blocked four on
    /// `pos`, i.e. where the opponent is forced to answer.
    fn echo(&mut self, pos: Pos, role: Color) -> Option<Pos> {
        let guard = self.apply(pos, role);
        guard.five_near(pos, role, ECHO_RADIUS)
    }
}
