//! Almost-win search: find a quiet attacking move after which every defence
//! still loses to a VCX.
//!
//! The defender may interpose blocked fours before answering. How many of
//! those forcing sequences are enumerated depends on how many the defender
//! has: with many, each is tried alone; with a few, every order is tried.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use gomoku_core::{Board, Color, Move, Pos};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::config::VcxOptimization;
use crate::eval::{FourScan, ScoreManager};
use crate::search::control::{CancelToken, SearchControl};
use crate::search::vcx::Vcx;

/// Default wall-clock budget.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(45);

/// Above this many defender blocked fours, each is examined on its own.
const FAST_PAIRS: usize = 8;

/// Above this many, only the first is branched on recursively.
const MEDIUM_PAIRS: usize = 4;

/// Depth cap of the slow second-opinion VCX.
const SLOW_PROBE_DEPTH: i32 = 21;

/// Depth by which the slow probe is shallower than the main one.
const SLOW_PROBE_REDUCTION: i32 = 6;

/// A configured almost-win search for one attacking color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlmostVcx {
    attacker: Color,
    depth: i32,
    budget: Duration,
}

impl AlmostVcx {
    /// Search for `attacker`, confirming each defence with a VCX of `depth`.
    pub fn new(attacker: Color, depth: i32) -> AlmostVcx {
        AlmostVcx {
            attacker,
            depth,
            budget: DEFAULT_BUDGET,
        }
    }

    /// Use a different wall-clock budget.
    pub fn with_budget(mut self, budget: Duration) -> AlmostVcx {
        self.budget = budget;
        self
    }

    /// The VCX depth used to confirm defences.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Search `board` for a move after which the defender cannot hold.
    pub fn search(&self, board: &Board, cancel: &CancelToken) -> Option<Move> {
        let control = SearchControl::new_timed(cancel.clone(), self.budget);
        let run = AlmostRun {
            attacker: self.attacker,
            defender: !self.attacker,
            deep_probe: Vcx::new(self.attacker, self.depth),
            slow_probe: Vcx::new(
                self.attacker,
                SLOW_PROBE_DEPTH.min(self.depth - SLOW_PROBE_REDUCTION),
            )
            .with_optimization(VcxOptimization::Slow),
            control: &control,
        };
        let mut manager = ScoreManager::new(board.clone());
        let found = run.attack(&mut manager);
        debug!(
            attacker = %self.attacker,
            depth = self.depth,
            found = ?found,
            elapsed_ms = control.elapsed().as_millis() as u64,
            "almost-vcx finished"
        );
        found.map(Move::winning)
    }
}

struct AlmostRun<'a> {
    attacker: Color,
    defender: Color,
    deep_probe: Vcx,
    slow_probe: Vcx,
    control: &'a SearchControl,
}

impl AlmostRun<'_> {
    fn attack(&self, sm: &mut ScoreManager) -> Option<Pos> {
        let candidates = match sm.four_candidates(self.attacker) {
            FourScan::Completes(pos) => return Some(pos),
            FourScan::Moves(moves) => moves,
            FourScan::Pairs(_) => return None,
        };
        for pos in candidates {
            if self.control.should_stop() {
                break;
            }
            let must_win = {
                let mut child = sm.apply(pos, self.attacker);
                self.block_four_defend_fail(&mut child, &FxHashSet::default())
            };
            debug!(%pos, must_win, "almost-vcx candidate");
            if must_win {
                return Some(pos);
            }
        }
        None
    }

    /// Defender blocked fours paired with the attacker's forced answer, or
    /// `None` if the defender completes five.
    fn defender_pairs(
        &self,
        sm: &mut ScoreManager,
        used: &FxHashSet<Pos>,
    ) -> Option<Vec<(Pos, Pos)>> {
        match sm.blocked_four_pairs(self.defender, used) {
            FourScan::Pairs(pairs) => Some(pairs),
            FourScan::Completes(_) | FourScan::Moves(_) => None,
        }
    }

    fn block_four_defend_fail(&self, sm: &mut ScoreManager, used: &FxHashSet<Pos>) -> bool {
        let Some(pairs) = self.defender_pairs(sm, used) else {
            return false;
        };
        if pairs.len() > FAST_PAIRS {
            self.defend_fail_fast(sm)
        } else if pairs.len() > MEDIUM_PAIRS {
            self.non_block_defend_fail(sm) && self.defend_fail_medium(sm)
        } else {
            self.defend_fail_complete(sm, used)
        }
    }

    /// Each blocked four played alone, followed by a quiet defence.
    fn defend_fail_fast(&self, sm: &mut ScoreManager) -> bool {
        let Some(pairs) = self.defender_pairs(sm, &FxHashSet::default()) else {
            return false;
        };
        if !self.non_block_defend_fail(sm) {
            return false;
        }
        pairs.into_iter().all(|(four, reply)| {
            let mut played = sm.apply(four, self.defender);
            let mut answered = played.apply(reply, self.attacker);
            self.non_block_defend_fail(&mut answered)
        })
    }

    /// Branch on the first blocked four: either the defender plays it, or
    /// the attacker takes the cell first.
    fn defend_fail_medium(&self, sm: &mut ScoreManager) -> bool {
        let Some(pairs) = self.defender_pairs(sm, &FxHashSet::default()) else {
            return false;
        };
        let Some(&(four, reply)) = pairs.first() else {
            return self.non_block_defend_fail(sm);
        };
        for (defender_cell, attacker_cell) in [(four, reply), (reply, four)] {
            let mut played = sm.apply(defender_cell, self.defender);
            let mut answered = played.apply(attacker_cell, self.attacker);
            if !self.defend_fail_medium(&mut answered) {
                return false;
            }
        }
        true
    }

    /// Every sequence of unused blocked fours.
    fn defend_fail_complete(&self, sm: &mut ScoreManager, used: &FxHashSet<Pos>) -> bool {
        let Some(pairs) = self.defender_pairs(sm, used) else {
            return false;
        };
        if !self.non_block_defend_fail(sm) {
            return false;
        }
        let mut used = used.clone();
        for (four, reply) in pairs {
            used.insert(four);
            let mut played = sm.apply(four, self.defender);
            let mut answered = played.apply(reply, self.attacker);
            if !self.defend_fail_complete(&mut answered, &used) {
                return false;
            }
        }
        true
    }

    /// Whether every quiet defence still loses to a VCX. The defences are
    /// checked in parallel and the first one that holds stops the rest.
    fn non_block_defend_fail(&self, sm: &mut ScoreManager) -> bool {
        if self.control.should_stop() {
            return false;
        }
        let defences = match sm.four_candidates(self.defender) {
            FourScan::Moves(moves) => moves,
            FourScan::Completes(_) | FourScan::Pairs(_) => return false,
        };
        if defences.is_empty() {
            return true;
        }

        let probes = self.control.token().child();
        let held = thread::scope(|scope| {
            let (tx, rx) = mpsc::channel();
            for pos in defences {
                let mut board = sm.board().clone();
                board.put(pos, self.defender);
                let tx = tx.clone();
                let token = probes.clone();
                let (deep, slow) = (self.deep_probe, self.slow_probe);
                scope.spawn(move || {
                    let won = deep.search(&board, &token).is_some()
                        || slow.search(&board, &token).is_some();
                    // the receiver is gone once a defence has held
                    let _ = tx.send(won);
                });
            }
            drop(tx);
            let held = rx.iter().any(|won| !won);
            probes.cancel();
            held
        });
        !held
    }
}
