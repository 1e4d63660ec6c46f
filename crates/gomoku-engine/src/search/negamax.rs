//! Alpha-beta negamax over the candidate generator, with an optional VCX
//! probe near the root.

use std::time::Duration;

use gomoku_core::{Board, Color, Move, Pos};
use tracing::debug;

use crate::config::NegamaxContext;
use crate::eval::ScoreManager;
use crate::eval::score::FIVE;
use crate::search::control::CancelToken;
use crate::search::tt::{ABORTED, TranspositionTable};
use crate::search::vcx::{self, Vcx};

/// Half-width of the root search window.
pub const WINDOW: i32 = 99_999_999;

/// Stones on the board below which the depth is capped.
const EARLY_GAME_STEPS: usize = 8;

/// Depth cap for the early game.
const EARLY_GAME_DEPTH: i32 = 7;

/// Result of a completed (or cancelled) search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Best root move found, if any candidate improved on the window.
    pub best: Option<Pos>,
    /// Value of the root from the searcher's point of view.
    pub score: i32,
    /// Depth actually searched.
    pub depth: i32,
    /// Nodes visited.
    pub nodes: u64,
}

impl SearchResult {
    /// The best move, flagged as winning when the score proves five.
    pub fn to_move(self) -> Option<Move> {
        self.best.map(|pos| Move {
            pos,
            winning: self.score >= FIVE,
        })
    }
}

/// Fixed-depth negamax searcher for one color.
///
/// The transposition table persists across calls, so repeated searches of
/// the same game reuse earlier work.
#[derive(Debug)]
pub struct Searcher {
    tt: TranspositionTable,
    color: Color,
    depth: i32,
    context: NegamaxContext,
    vcx_budget: Duration,
}

impl Searcher {
    /// Create a searcher playing `color` to `depth` plies.
    pub fn new(color: Color, depth: i32, context: NegamaxContext) -> Self {
        Self {
            tt: TranspositionTable::new(),
            color,
            depth,
            context,
            vcx_budget: vcx::DEFAULT_BUDGET,
        }
    }

    /// Use a different budget for the VCX probes.
    pub fn with_vcx_budget(mut self, budget: Duration) -> Self {
        self.vcx_budget = budget;
        self
    }

    /// The color this searcher plays.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Forget all transposition entries.
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// Search `board` with `self.color` to move.
    pub fn search(&mut self, board: Board, cancel: &CancelToken) -> SearchResult {
        let root_steps = board.steps();
        let depth = if root_steps < EARLY_GAME_STEPS {
            self.depth.min(EARLY_GAME_DEPTH)
        } else {
            self.depth
        };
        let mut manager = ScoreManager::new(board);
        let mut ctx = SearchContext {
            tt: &mut self.tt,
            color: self.color,
            first_depth: depth,
            root_steps,
            context: self.context,
            vcx_budget: self.vcx_budget,
            cancel,
            best: None,
            nodes: 0,
        };
        let score = negamax(&mut ctx, &mut manager, self.color, depth, -WINDOW, WINDOW, None);
        debug!(
            color = %self.color,
            depth,
            score,
            nodes = ctx.nodes,
            best = ?ctx.best,
            "negamax finished"
        );
        SearchResult {
            best: ctx.best,
            score,
            depth,
            nodes: ctx.nodes,
        }
    }
}

/// Per-search state threaded through the recursion.
struct SearchContext<'a> {
    tt: &'a mut TranspositionTable,
    color: Color,
    first_depth: i32,
    root_steps: usize,
    context: NegamaxContext,
    vcx_budget: Duration,
    cancel: &'a CancelToken,
    best: Option<Pos>,
    nodes: u64,
}

impl SearchContext<'_> {
    fn aborted(&self, mover: Color) -> i32 {
        if mover == self.color { -ABORTED } else { ABORTED }
    }

    fn store(&mut self, hash: u64, value: i32, depth: i32) -> i32 {
        self.tt.store(hash, value, depth);
        value
    }

    fn probe_fires(&self, depth: i32) -> bool {
        self.context.enabled()
            && self.root_steps > self.context.start_steps()
            && depth == self.first_depth - self.context.depth_delta()
    }
}

fn negamax(
    ctx: &mut SearchContext<'_>,
    sm: &mut ScoreManager,
    mover: Color,
    depth: i32,
    mut alpha: i32,
    beta: i32,
    last: Option<Pos>,
) -> i32 {
    ctx.nodes += 1;
    let hash = sm.board().hash();
    if depth != ctx.first_depth
        && let Some(value) = ctx.tt.probe(hash, depth)
    {
        return value;
    }

    if depth == 0 || last.is_some_and(|pos| sm.board().is_terminal(pos)) {
        return ctx.store(hash, sm.evaluation(mover), depth);
    }
    if ctx.cancel.is_cancelled() {
        return ctx.aborted(mover);
    }

    let candidates = sm.candidates(mover);

    if ctx.probe_fires(depth) {
        let probe = Vcx::new(mover, ctx.context.vcx_depth()).with_budget(ctx.vcx_budget);
        if probe.search(sm.board(), ctx.cancel).is_some() {
            return ctx.store(hash, FIVE, depth);
        }
    }

    let mut best = i32::MIN + 1;
    for pos in candidates {
        if ctx.cancel.is_cancelled() {
            return ctx.aborted(mover);
        }
        let value = {
            let mut child = sm.apply(pos, mover);
            -negamax(ctx, &mut child, !mover, depth - 1, -beta, -alpha, Some(pos))
        };
        best = best.max(value);
        if value > alpha {
            if depth == ctx.first_depth {
                ctx.best = Some(pos);
                if best >= FIVE {
                    return ctx.store(hash, best, depth);
                }
            }
            if value >= beta {
                return value;
            }
            alpha = value;
        }
    }
    ctx.store(hash, best, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomoku_core::notation::decode;

    fn board(transcript: &str) -> Board {
        Board::from_moves(&decode(transcript).unwrap()).unwrap()
    }

    #[test]
    fn takes_the_five() {
        let b = board("H8 H9 I8 I9 J8 J9 K8 A1");
        let mut searcher = Searcher::new(Color::Black, 3, NegamaxContext::Disabled);
        let result = searcher.search(b, &CancelToken::new());
        assert!([Pos::at(6, 7), Pos::at(11, 7)].contains(&result.best.unwrap()));
        assert!(result.to_move().unwrap().winning);
    }

    #[test]
    fn completes_a_blocked_four() {
        // H9 I9 J9 K9 capped by L9, so G9 is the only five
        let b = board("H8 H9 I8 I9 A1 J9 B1 K9 L9");
        let mut searcher = Searcher::new(Color::White, 3, NegamaxContext::Disabled);
        let result = searcher.search(b, &CancelToken::new());
        assert_eq!(result.best, Some(Pos::at(6, 6)));
        assert!(result.score >= FIVE);
    }

    #[test]
    fn empty_board_opens_in_the_centre() {
        let mut searcher = Searcher::new(Color::Black, 3, NegamaxContext::Disabled);
        let result = searcher.search(Board::new(), &CancelToken::new());
        assert_eq!(result.best, Some(Pos::CENTER));
    }

    #[test]
    fn early_game_caps_depth() {
        let mut searcher = Searcher::new(Color::White, 9, NegamaxContext::Disabled);
        let result = searcher.search(board("H8"), &CancelToken::new());
        assert_eq!(result.depth, 7);
    }

    #[test]
    fn cancelled_search_stores_nothing_aborted() {
        let token = CancelToken::new();
        token.cancel();
        let mut searcher = Searcher::new(Color::White, 5, NegamaxContext::Disabled);
        let result = searcher.search(board("H8 I9 I8"), &token);
        assert_eq!(result.best, None);
        assert_eq!(result.score.abs(), ABORTED);
        assert!(
            searcher.tt.probe(board("H8 I9 I8").hash(), 0).is_none(),
            "root must not be cached after cancellation"
        );
    }

    #[test]
    fn transposition_table_persists_between_searches() {
        let mut searcher = Searcher::new(Color::White, 3, NegamaxContext::Disabled);
        let b = board("H8 I9 I8");
        searcher.search(b.clone(), &CancelToken::new());
        assert!(!searcher.tt.is_empty());
        let again = searcher.search(b, &CancelToken::new());
        assert!(again.best.is_some());
    }
}
