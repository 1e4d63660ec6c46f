//! Forcing-move lists for the VCX attacker and defender.

use std::collections::VecDeque;
use std::fmt;

use gomoku_core::{Color, Pos};

use super::manager::ScoreManager;
use super::score::{BLOCKED_FOUR, FIVE, FOUR, THREE};
use crate::config::VcxOptimization;

/// A candidate cell packed with a signed score into one 64-bit word.
///
/// The score sits in the high 32 bits and the cell index in the low 32, so
/// both come back out losslessly. Defender lists store the attacker-relative
/// score: negative values are the defender's own threats.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Threat(i64);

impl Threat {
    /// Pack `score` and `pos`.
    #[inline]
    pub const fn new(score: i32, pos: Pos) -> Threat {
        Threat(((score as i64) << 32) | pos.index() as i64)
    }

    /// The packed score.
    #[inline]
    pub const fn score(self) -> i32 {
        (self.0 >> 32) as i32
    }

    /// The packed cell.
    #[inline]
    pub fn pos(self) -> Pos {
        Pos::from_index((self.0 & 0xffff_ffff) as usize).unwrap_or(Pos::CENTER)
    }
}

impl fmt::Debug for Threat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Threat({}, {})", self.pos(), self.score())
    }
}

/// Return `true` if `a` and `b` share a row, column or diagonal.
fn in_line(a: Pos, b: Pos) -> bool {
    let dx = a.x().abs_diff(b.x());
    let dy = a.y().abs_diff(b.y());
    dx == 0 || dy == 0 || dx == dy
}

impl ScoreManager {
    /// Attacking moves for `attacker`.
    ///
    /// A completing five is returned alone. Otherwise, if the defender can
    /// complete five, only the cells that block it are returned. The rest
    /// are threes or better in line with `last` (the attacker's previous
    /// forcing move), threes that also block an enemy four, and whatever
    /// `optimization` admits off the line, sorted by descending score.
    pub fn attack_moves(
        &self,
        attacker: Color,
        last: Option<Pos>,
        optimization: VcxOptimization,
    ) -> Vec<Threat> {
        let mut results = Vec::new();
        let mut fives = Vec::new();
        for pos in Pos::all() {
            if !self.board().is_empty_at(pos) {
                continue;
            }
            let attack = self.score(pos, attacker);
            let defense = self.score(pos, !attacker);
            if attack >= FIVE {
                return vec![Threat::new(attack, pos)];
            }
            if defense >= FIVE {
                fives.push(Threat::new(-defense, pos));
            } else if last.is_none_or(|last| in_line(pos, last)) {
                if attack >= THREE {
                    results.push(Threat::new(attack, pos));
                }
            } else if (defense >= FOUR && attack >= THREE) || optimization.admits(attack) {
                results.push(Threat::new(attack, pos));
            }
        }
        if !fives.is_empty() {
            return fives;
        }
        results.sort_by(|a, b| b.score().cmp(&a.score()));
        results
    }

    /// Defending replies against `attacker`.
    ///
    /// The defender's own five wins outright. Otherwise blocks of an
    /// attacker five come alone; then the defender's open fours (first),
    /// blocks of attacker open fours, and the defender's blocked fours,
    /// followed by blocks of attacker blocked fours. No four-level threat
    /// on the board means an empty list: the defence is taken as holding.
    pub fn defend_moves(&self, attacker: Color) -> Vec<Threat> {
        let mut fives = Vec::new();
        let mut fours = VecDeque::new();
        let mut blocked_fours = Vec::new();
        for pos in Pos::all() {
            if !self.board().is_empty_at(pos) {
                continue;
            }
            let defense = self.score(pos, !attacker);
            let attack = self.score(pos, attacker);
            if defense >= FIVE {
                return vec![Threat::new(-defense, pos)];
            }
            if attack >= FIVE {
                fives.push(Threat::new(attack, pos));
            } else if defense >= FOUR {
                fours.push_front(Threat::new(-defense, pos));
            } else if attack >= FOUR {
                fours.push_back(Threat::new(attack, pos));
            } else if defense >= BLOCKED_FOUR {
                fours.push_back(Threat::new(-defense, pos));
            } else if attack >= BLOCKED_FOUR {
                blocked_fours.push(Threat::new(attack, pos));
            }
        }
        if !fives.is_empty() {
            return fives;
        }
        if fours.is_empty() {
            return Vec::new();
        }
        let mut results: Vec<Threat> = fours.into();
        results.extend(blocked_fours);
        results
    }
}
