//! Decorators that race forced-win searches against the strategy they wrap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gomoku_core::{Color, Move, Pos, SharedBoard};
use tracing::{debug, warn};

use crate::book::OpeningBook;
use crate::eval::ScoreManager;
use crate::eval::score::{BLOCKED_FOUR, FOUR};
use crate::pipeline::{Contender, MoveStrategy, Task, WorkerPool, race, snapshot};
use crate::search::almost_mcts::AlmostMctsWin;
use crate::search::almost_vcx::AlmostVcx;
use crate::search::control::CancelToken;
use crate::search::vcx::Vcx;

/// Depth given up by the VCX that follows an already found win.
const STICKY_DEPTH_DROP: i32 = 2;

fn delegate(inner: &Arc<dyn MoveStrategy>) -> Task {
    let inner = Arc::clone(inner);
    Box::new(move |token: &CancelToken| inner.find_move(token))
}

/// Races a VCX search against the inner strategy.
///
/// Once VCX proves a win the decorator keeps answering with slightly
/// shallower VCX searches, and only falls back to the inner strategy if one
/// of them fails.
pub struct VcxDecorator {
    inner: Arc<dyn MoveStrategy>,
    board: SharedBoard,
    pool: Arc<WorkerPool>,
    color: Color,
    depth: i32,
    budget: Duration,
    sticky: AtomicBool,
}

impl VcxDecorator {
    pub fn new(
        inner: Arc<dyn MoveStrategy>,
        board: SharedBoard,
        pool: Arc<WorkerPool>,
        color: Color,
        depth: i32,
        budget: Duration,
    ) -> VcxDecorator {
        VcxDecorator {
            inner,
            board,
            pool,
            color,
            depth,
            budget,
            sticky: AtomicBool::new(false),
        }
    }
}

impl MoveStrategy for VcxDecorator {
    fn find_move(&self, cancel: &CancelToken) -> Option<Move> {
        let board = snapshot(&self.board);
        if self.sticky.load(Ordering::Acquire) {
            let vcx = Vcx::new(self.color, self.depth - STICKY_DEPTH_DROP).with_budget(self.budget);
            if let Some(mv) = vcx.search(&board, cancel) {
                return Some(mv);
            }
            if cancel.is_cancelled() {
                return None;
            }
            warn!(color = %self.color, "vcx lost the forced win");
            self.sticky.store(false, Ordering::Release);
            return self.inner.find_move(cancel);
        }

        let vcx = Vcx::new(self.color, self.depth).with_budget(self.budget);
        race(
            &self.pool,
            cancel,
            delegate(&self.inner),
            vec![Contender::new(
                move |token| vcx.search(&board, token),
                |result| {
                    if result.is_some() {
                        debug!(color = %self.color, "vcx found a forced win");
                        self.sticky.store(true, Ordering::Release);
                    }
                },
            )],
        )
    }

    fn on_move_played(&self, pos: Pos, color: Color) {
        self.inner.on_move_played(pos, color);
    }

    fn is_winning(&self) -> bool {
        self.sticky.load(Ordering::Acquire) || self.inner.is_winning()
    }
}

/// Races the blocked-four almost-win search against the inner strategy.
///
/// The search depth comes from the book when it has an override for the
/// position.
pub struct AlmostVcxWinDecorator {
    inner: Arc<dyn MoveStrategy>,
    board: SharedBoard,
    pool: Arc<WorkerPool>,
    book: Arc<OpeningBook>,
    color: Color,
    depth: i32,
    budget: Duration,
    sticky: AtomicBool,
}

impl AlmostVcxWinDecorator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inner: Arc<dyn MoveStrategy>,
        board: SharedBoard,
        pool: Arc<WorkerPool>,
        book: Arc<OpeningBook>,
        color: Color,
        depth: i32,
        budget: Duration,
    ) -> AlmostVcxWinDecorator {
        AlmostVcxWinDecorator {
            inner,
            board,
            pool,
            book,
            color,
            depth,
            budget,
            sticky: AtomicBool::new(false),
        }
    }
}

impl MoveStrategy for AlmostVcxWinDecorator {
    fn find_move(&self, cancel: &CancelToken) -> Option<Move> {
        if self.sticky.load(Ordering::Acquire) {
            return self.inner.find_move(cancel);
        }
        let board = snapshot(&self.board);
        let depth = self.book.depth_for(&board).unwrap_or(self.depth);
        let search = AlmostVcx::new(self.color, depth).with_budget(self.budget);
        race(
            &self.pool,
            cancel,
            delegate(&self.inner),
            vec![Contender::new(
                move |token| search.search(&board, token),
                |result| {
                    if result.is_some() {
                        debug!(color = %self.color, depth, "almost-vcx found a win");
                        self.sticky.store(true, Ordering::Release);
                    }
                },
            )],
        )
    }

    fn on_move_played(&self, pos: Pos, color: Color) {
        if self.sticky.load(Ordering::Acquire) && color != self.color {
            let mut before = snapshot(&self.board);
            before.take(pos);
            let manager = ScoreManager::new(before);
            if manager.score(pos, color) < BLOCKED_FOUR && manager.score(pos, self.color) < FOUR {
                warn!(%pos, "opponent left the almost-win line");
                self.sticky.store(false, Ordering::Release);
            }
        }
        self.inner.on_move_played(pos, color);
    }

    fn is_winning(&self) -> bool {
        self.sticky.load(Ordering::Acquire) || self.inner.is_winning()
    }
}

/// Races the almost-win MCTS against the inner strategy, keeping the
/// search instance whose proof succeeded.
pub struct AlmostMctsWinDecorator {
    inner: Arc<dyn MoveStrategy>,
    board: SharedBoard,
    pool: Arc<WorkerPool>,
    color: Color,
    per_child: Duration,
    sim_depth: i32,
    proven: Mutex<Option<Arc<Mutex<AlmostMctsWin>>>>,
}

impl AlmostMctsWinDecorator {
    pub fn new(
        inner: Arc<dyn MoveStrategy>,
        board: SharedBoard,
        pool: Arc<WorkerPool>,
        color: Color,
        per_child: Duration,
        sim_depth: i32,
    ) -> AlmostMctsWinDecorator {
        AlmostMctsWinDecorator {
            inner,
            board,
            pool,
            color,
            per_child,
            sim_depth,
            proven: Mutex::new(None),
        }
    }

    fn proven(&self) -> Option<Arc<Mutex<AlmostMctsWin>>> {
        self.proven.lock().expect("almost-mcts slot poisoned").clone()
    }
}

impl MoveStrategy for AlmostMctsWinDecorator {
    fn find_move(&self, cancel: &CancelToken) -> Option<Move> {
        let instance = self.proven().unwrap_or_else(|| {
            Arc::new(Mutex::new(AlmostMctsWin::new(
                self.color,
                self.per_child,
                self.sim_depth,
            )))
        });
        let search = Arc::clone(&instance);
        let board = snapshot(&self.board);
        race(
            &self.pool,
            cancel,
            delegate(&self.inner),
            vec![Contender::new(
                move |token| {
                    search
                        .lock()
                        .expect("almost-mcts search poisoned")
                        .find(&board, token)
                },
                |result| {
                    let mut slot = self.proven.lock().expect("almost-mcts slot poisoned");
                    *slot = result.map(|_| instance);
                },
            )],
        )
    }

    fn on_move_played(&self, pos: Pos, color: Color) {
        if let Some(instance) = self.proven() {
            instance
                .lock()
                .expect("almost-mcts search poisoned")
                .on_move_played(pos, color);
        }
        self.inner.on_move_played(pos, color);
    }

    fn is_winning(&self) -> bool {
        self.proven().is_some() || self.inner.is_winning()
    }
}

/// Presents an internal-frame strategy in the players' coordinates.
pub struct ConsistentDecorator {
    inner: Arc<dyn MoveStrategy>,
    board: SharedBoard,
}

impl ConsistentDecorator {
    pub fn new(inner: Arc<dyn MoveStrategy>, board: SharedBoard) -> ConsistentDecorator {
        ConsistentDecorator { inner, board }
    }
}

impl MoveStrategy for ConsistentDecorator {
    fn find_move(&self, cancel: &CancelToken) -> Option<Move> {
        let mv = self.inner.find_move(cancel)?;
        let game = self.board.read().expect("board lock poisoned");
        Some(Move {
            pos: game.to_original(mv.pos),
            ..mv
        })
    }

    fn on_move_played(&self, pos: Pos, color: Color) {
        let internal = self.board.read().expect("board lock poisoned").to_internal(pos);
        self.inner.on_move_played(internal, color);
    }

    fn is_winning(&self) -> bool {
        self.inner.is_winning()
    }

    fn is_automated(&self) -> bool {
        self.inner.is_automated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::Fixed;
    use gomoku_core::notation::decode;
    use gomoku_core::GameBoard;

    fn shared(transcript: &str, normalize: bool) -> SharedBoard {
        GameBoard::replay(&decode(transcript).unwrap(), normalize)
            .unwrap()
            .into_shared()
    }

    fn pool() -> Arc<WorkerPool> {
        Arc::new(WorkerPool::new(4).unwrap())
    }

    #[test]
    fn vcx_wins_the_race_and_sticks() {
        let board = shared("H8 H9 I8 I9 J8 J9 K8 A1", false);
        let quiet = Move::new(Pos::at(0, 0));
        let decorator = VcxDecorator::new(
            Arc::new(Fixed::new(Some(quiet))),
            board,
            pool(),
            Color::Black,
            9,
            Duration::from_secs(10),
        );
        let mv = decorator.find_move(&CancelToken::new()).unwrap();
        assert!(mv.winning);
        assert!([Pos::at(6, 7), Pos::at(11, 7)].contains(&mv.pos));
        assert!(decorator.is_winning());

        let again = decorator.find_move(&CancelToken::new()).unwrap();
        assert!(again.winning);
    }

    #[test]
    fn quiet_position_keeps_the_inner_answer() {
        let quiet = Move::new(Pos::at(9, 9));
        let decorator = VcxDecorator::new(
            Arc::new(Fixed::new(Some(quiet))),
            shared("H8 I9", false),
            pool(),
            Color::Black,
            9,
            Duration::from_secs(10),
        );
        assert_eq!(decorator.find_move(&CancelToken::new()), Some(quiet));
        assert!(!decorator.is_winning());
    }

    #[test]
    fn lost_sticky_win_falls_back() {
        let quiet = Move::new(Pos::at(9, 9));
        let decorator = VcxDecorator::new(
            Arc::new(Fixed::new(Some(quiet))),
            shared("H8 I9", false),
            pool(),
            Color::Black,
            9,
            Duration::from_secs(10),
        );
        decorator.sticky.store(true, Ordering::SeqCst);
        assert_eq!(decorator.find_move(&CancelToken::new()), Some(quiet));
        assert!(!decorator.is_winning());
    }

    #[test]
    fn almost_vcx_forgets_a_win_after_a_quiet_reply() {
        let board = shared("H8 A1 I8 B1 J8 C1 K8", false);
        let decorator = AlmostVcxWinDecorator::new(
            Arc::new(Fixed::new(None)),
            board.clone(),
            pool(),
            Arc::new(OpeningBook::new()),
            Color::Black,
            9,
            Duration::from_secs(10),
        );
        decorator.sticky.store(true, Ordering::SeqCst);

        // blocking the four keeps the line alive
        let block = Pos::at(11, 7);
        board.write().unwrap().play(block).unwrap();
        decorator.on_move_played(block, Color::White);
        assert!(decorator.is_winning());

        let mut fresh = GameBoard::replay(&decode("H8 A1 I8 B1 J8 C1 K8").unwrap(), false).unwrap();
        let far = Pos::at(14, 0);
        fresh.play(far).unwrap();
        let board = fresh.into_shared();
        let decorator = AlmostVcxWinDecorator::new(
            Arc::new(Fixed::new(None)),
            board,
            pool(),
            Arc::new(OpeningBook::new()),
            Color::Black,
            9,
            Duration::from_secs(10),
        );
        decorator.sticky.store(true, Ordering::SeqCst);
        decorator.on_move_played(far, Color::White);
        assert!(!decorator.is_winning());
    }

    #[test]
    fn almost_mcts_keeps_its_proof() {
        let inner = Arc::new(Fixed::new(None));
        let decorator = AlmostMctsWinDecorator::new(
            inner.clone(),
            shared("H8 H9 I8 I9 J8 J9 K8 A1", false),
            pool(),
            Color::Black,
            Duration::from_millis(500),
            5,
        );
        let mv = decorator.find_move(&CancelToken::new()).unwrap();
        assert!(mv.winning);
        assert!(decorator.is_winning());

        decorator.on_move_played(mv.pos, Color::Black);
        assert_eq!(inner.heard.lock().unwrap().as_slice(), &[(mv.pos, Color::Black)]);
    }

    #[test]
    fn consistent_translates_both_ways() {
        // G7 lies south-west of the centre, so the board turns a quarter
        let board = shared("H8 G7", true);
        assert_eq!(board.read().unwrap().to_internal(Pos::at(6, 8)), Pos::at(8, 8));

        let inner = Arc::new(Fixed::new(Some(Move::new(Pos::at(8, 6)))));
        let decorator = ConsistentDecorator::new(inner.clone(), board);
        assert_eq!(decorator.find_move(&CancelToken::new()), Some(Move::new(Pos::at(8, 8))));

        decorator.on_move_played(Pos::at(6, 8), Color::White);
        assert_eq!(inner.heard.lock().unwrap().as_slice(), &[(Pos::at(8, 8), Color::White)]);
    }
}
