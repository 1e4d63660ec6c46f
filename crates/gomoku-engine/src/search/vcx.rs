//! Forced-win search by continuous threats ("VCX").
//!
//! The attacker only plays threes or better, the defender only answers
//! four-level threats. A defender with nothing to answer is assumed to have
//! held, so a `None` result means "no forcing win found", not "no win".

use std::time::Duration;

use gomoku_core::{Board, Color, Move, Pos};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::VcxOptimization;
use crate::eval::ScoreManager;
use crate::eval::score::{FIVE, FOUR};
use crate::search::control::{CancelToken, SearchControl};

/// Default maximum depth in plies.
pub const DEFAULT_DEPTH: i32 = 23;

/// Default wall-clock budget.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(55);

/// Shallowest depth of the deepening schedule.
const MIN_DEPTH: i32 = 5;

/// Depth added per deepening iteration.
const DEPTH_STEP: i32 = 4;

/// Span of the deepening schedule below the requested depth.
const DEEPENING_SPAN: i32 = 16;

/// A configured forced-win search for one attacking color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vcx {
    attacker: Color,
    depth: i32,
    optimization: VcxOptimization,
    budget: Duration,
}

impl Vcx {
    /// Search for `attacker` up to `depth` plies with the fast tier.
    pub fn new(attacker: Color, depth: i32) -> Vcx {
        Vcx {
            attacker,
            depth,
            optimization: VcxOptimization::Fast,
            budget: DEFAULT_BUDGET,
        }
    }

    /// Use a different candidate tier.
    pub fn with_optimization(mut self, optimization: VcxOptimization) -> Vcx {
        self.optimization = optimization;
        self
    }

    /// Use a different wall-clock budget.
    pub fn with_budget(mut self, budget: Duration) -> Vcx {
        self.budget = budget;
        self
    }

    /// The attacking color.
    pub fn attacker(&self) -> Color {
        self.attacker
    }

    /// The maximum depth.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Search `board` and return the first move of a forced win.
    pub fn search(&self, board: &Board, cancel: &CancelToken) -> Option<Move> {
        let control = SearchControl::new_timed(cancel.clone(), self.budget);
        let mut manager = ScoreManager::new(board.clone());
        let mut run = VcxRun {
            attacker: self.attacker,
            optimization: self.optimization,
            control: &control,
            memo: FxHashMap::default(),
            root_depth: 0,
            best: None,
        };

        let mut depth = (self.depth - DEEPENING_SPAN).max(MIN_DEPTH);
        while depth <= self.depth {
            run.root_depth = depth;
            run.memo.clear();
            match run.attacker_wins(&mut manager, depth, None) {
                Some(true) => break,
                None => break,
                Some(false) => {}
            }
            if control.should_stop_iterating(self.optimization.time_factor()) {
                break;
            }
            depth += DEPTH_STEP;
        }

        debug!(
            attacker = %self.attacker,
            depth = run.root_depth,
            found = run.best.is_some(),
            elapsed_ms = control.elapsed().as_millis() as u64,
            "vcx finished"
        );
        run.best.map(Move::winning)
    }
}

struct VcxRun<'a> {
    attacker: Color,
    optimization: VcxOptimization,
    control: &'a SearchControl,
    memo: FxHashMap<u64, bool>,
    root_depth: i32,
    best: Option<Pos>,
}

impl VcxRun<'_> {
    fn remember(&mut self, hash: u64, result: bool) -> bool {
        self.memo.insert(hash, result);
        result
    }

    /// `None` when the search was aborted.
    fn attacker_wins(
        &mut self,
        sm: &mut ScoreManager,
        depth: i32,
        last: Option<Pos>,
    ) -> Option<bool> {
        let hash = sm.board().hash();
        if let Some(&known) = self.memo.get(&hash) {
            return Some(known);
        }
        if depth <= 0 {
            return Some(self.remember(hash, false));
        }

        let moves = sm.attack_moves(self.attacker, last, self.optimization);
        let Some(first) = moves.first() else {
            return Some(self.remember(hash, false));
        };
        if first.score() >= FOUR {
            if depth == self.root_depth {
                self.best = Some(first.pos());
            }
            return Some(self.remember(hash, true));
        }

        let mut max_point = None;
        for threat in moves {
            if self.control.should_stop() {
                return None;
            }
            let pos = threat.pos();
            if threat.score() > -FIVE {
                max_point = Some(pos);
            }
            let defender_lost = {
                let mut child = sm.apply(pos, self.attacker);
                self.defender_loses(&mut child, depth - 1, max_point)?
            };
            if defender_lost {
                if depth == self.root_depth {
                    self.best = Some(pos);
                }
                return Some(self.remember(hash, true));
            }
        }
        Some(self.remember(hash, false))
    }

    fn defender_loses(
        &mut self,
        sm: &mut ScoreManager,
        depth: i32,
        last: Option<Pos>,
    ) -> Option<bool> {
        let hash = sm.board().hash();
        if let Some(&known) = self.memo.get(&hash) {
            return Some(known);
        }
        if depth <= 0 {
            return Some(self.remember(hash, false));
        }

        let moves = sm.defend_moves(self.attacker);
        let Some(first) = moves.first() else {
            return Some(self.remember(hash, false));
        };
        if -first.score() >= FOUR {
            return Some(self.remember(hash, false));
        }

        for threat in moves {
            let attacker_won = {
                let mut child = sm.apply(threat.pos(), !self.attacker);
                self.attacker_wins(&mut child, depth - 1, last)?
            };
            if !attacker_won {
                return Some(self.remember(hash, false));
            }
        }
        Some(self.remember(hash, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomoku_core::notation::decode;

    fn board(transcript: &str) -> Board {
        Board::from_moves(&decode(transcript).unwrap()).unwrap()
    }

    #[test]
    fn open_four_is_an_immediate_win() {
        let b = board("H8 H9 I8 I9 J8 A1");
        let found = Vcx::new(Color::Black, 9).search(&b, &CancelToken::new());
        let mv = found.expect("black extends the open three to an open four");
        assert!(mv.winning);
        assert!([Pos::at(6, 7), Pos::at(10, 7)].contains(&mv.pos));
    }

    #[test]
    fn completing_five_is_found() {
        let b = board("H8 H9 I8 I9 J8 J9 K8 A1");
        let mv = Vcx::new(Color::Black, 5).search(&b, &CancelToken::new()).unwrap();
        assert!([Pos::at(6, 7), Pos::at(11, 7)].contains(&mv.pos));
    }

    #[test]
    fn quiet_position_has_no_forced_win() {
        let b = board("H8 I9");
        assert_eq!(Vcx::new(Color::Black, 9).search(&b, &CancelToken::new()), None);
    }

    #[test]
    fn cancelled_search_returns_nothing() {
        let token = CancelToken::new();
        token.cancel();
        let b = board("H8 I8 I9 G7 J9 K9 Ha H9");
        assert_eq!(Vcx::new(Color::Black, 9).search(&b, &token), None);
    }

    #[test]
    fn search_leaves_the_board_untouched() {
        let b = board("H8 I8 I9 G7 J9 K9 Ha H9");
        let copy = b.clone();
        let _ = Vcx::new(Color::Black, 9).search(&b, &CancelToken::new());
        assert_eq!(b, copy);
    }

    #[test]
    fn depth_below_schedule_runs_nothing() {
        let b = board("H8 H9 I8 I9 J8 A1");
        assert_eq!(Vcx::new(Color::Black, 3).search(&b, &CancelToken::new()), None);
    }
}
