//! Strategies at the bottom of a decorator stack.

use std::sync::Mutex;

use gomoku_core::{Color, Move, SharedBoard};

use crate::config::NegamaxContext;
use crate::pipeline::{MoveStrategy, snapshot};
use crate::search::control::CancelToken;
use crate::search::negamax::Searcher;

/// Negamax on a snapshot of the shared board.
///
/// The searcher sits behind a mutex so its transposition table survives
/// between moves; a second caller waits for the first.
#[derive(Debug)]
pub struct ThreadSafeNegamax {
    board: SharedBoard,
    searcher: Mutex<Searcher>,
}

impl ThreadSafeNegamax {
    pub fn new(board: SharedBoard, color: Color, depth: i32, context: NegamaxContext) -> Self {
        Self {
            board,
            searcher: Mutex::new(Searcher::new(color, depth, context)),
        }
    }
}

impl MoveStrategy for ThreadSafeNegamax {
    fn find_move(&self, cancel: &CancelToken) -> Option<Move> {
        let board = snapshot(&self.board);
        let mut searcher = self.searcher.lock().expect("searcher lock poisoned");
        searcher.search(board, cancel).to_move()
    }
}

/// A person at the keyboard: the engine never answers for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanStrategy;

impl MoveStrategy for HumanStrategy {
    fn find_move(&self, _cancel: &CancelToken) -> Option<Move> {
        None
    }

    fn is_automated(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomoku_core::notation::decode;
    use gomoku_core::{GameBoard, Pos};

    #[test]
    fn negamax_reads_the_live_board() {
        let board = GameBoard::new().into_shared();
        let strategy = ThreadSafeNegamax::new(board.clone(), Color::Black, 3, NegamaxContext::Disabled);
        assert_eq!(strategy.find_move(&CancelToken::new()).map(|mv| mv.pos), Some(Pos::CENTER));

        for pos in decode("H8 H9 I8 I9 J8 J9 K8 A1").unwrap() {
            board.write().unwrap().play(pos).unwrap();
        }
        let mv = strategy.find_move(&CancelToken::new()).unwrap();
        assert!(mv.winning);
        assert!([Pos::at(6, 7), Pos::at(11, 7)].contains(&mv.pos));
    }

    #[test]
    fn human_never_answers() {
        assert_eq!(HumanStrategy.find_move(&CancelToken::new()), None);
        assert!(!HumanStrategy.is_automated());
        assert!(!HumanStrategy.is_winning());
    }
}
