//! The decision pipeline: strategies that pick the next move, stacked as
//! decorators around a negamax baseline.
//!
//! Every strategy reads the shared game board in its internal frame. Only
//! [`ConsistentDecorator`] and [`OpeningBookDecorator`] translate to and
//! from the coordinates the players actually use.

mod baseline;
mod decorators;
mod factory;
mod opening;
mod pool;
mod session;

pub use baseline::{HumanStrategy, ThreadSafeNegamax};
pub use decorators::{
    AlmostMctsWinDecorator, AlmostVcxWinDecorator, ConsistentDecorator, VcxDecorator,
};
pub use factory::{StrategyFactory, StrategyKind};
pub use opening::{OpeningBookDecorator, SecondPlayerOpeningDecorator};
pub use pool::{Contender, Task, WorkerPool, race};
pub use session::Match;

use gomoku_core::{Board, Color, Move, Pos, SharedBoard};

use crate::search::control::CancelToken;

/// Something that chooses moves for one side of a match.
pub trait MoveStrategy: Send + Sync {
    /// The next move for the side to move, or `None` when there is no
    /// answer (a human player, or a search that was cancelled early).
    fn find_move(&self, cancel: &CancelToken) -> Option<Move>;

    /// Called after every move of the match, in the original frame.
    fn on_move_played(&self, _pos: Pos, _color: Color) {}

    /// Whether the strategy is following a proven win.
    fn is_winning(&self) -> bool {
        false
    }

    /// Whether moves come from the engine rather than a person.
    fn is_automated(&self) -> bool {
        true
    }
}

/// Clone the internal-frame board out of the shared game.
pub(crate) fn snapshot(board: &SharedBoard) -> Board {
    board.read().expect("board lock poisoned").snapshot()
}
