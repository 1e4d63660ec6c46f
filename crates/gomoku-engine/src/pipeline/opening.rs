//! Opening overrides for the first and second player.

use std::sync::Arc;

use gomoku_core::notation;
use gomoku_core::{Board, Color, Move, Pos, SharedBoard};
use tracing::{debug, warn};

use crate::book::OpeningBook;
use crate::error::StrategyError;
use crate::pipeline::{MoveStrategy, snapshot};
use crate::search::control::CancelToken;
use crate::search::mcts::VcxMcts;

/// Book replies and hand-written rules for black's first moves.
///
/// Sits at the top of black's stack on a normalizing board: it reads the
/// internal frame, and translates both its own replies and the inner
/// strategy's back to the players' coordinates.
pub struct OpeningBookDecorator {
    inner: Arc<dyn MoveStrategy>,
    board: SharedBoard,
    book: Arc<OpeningBook>,
}

impl OpeningBookDecorator {
    pub fn new(
        inner: Arc<dyn MoveStrategy>,
        board: SharedBoard,
        book: Arc<OpeningBook>,
        color: Color,
    ) -> Result<OpeningBookDecorator, StrategyError> {
        if color != Color::Black {
            return Err(StrategyError::WrongColor {
                strategy: "opening book",
                expected: Color::Black,
                actual: color,
            });
        }
        if !board.read().expect("board lock poisoned").is_normalizing() {
            return Err(StrategyError::NotNormalizing);
        }
        Ok(OpeningBookDecorator { inner, board, book })
    }

    fn reply(&self, board: &Board) -> Option<Pos> {
        let step = board.steps();
        if step == 0 {
            return Some(Pos::CENTER);
        }
        if let Some(pos) = self.book.best_reply(board) {
            debug!(%pos, step, "book reply");
            return Some(pos);
        }
        let moves = board.moves();
        match step {
            2 => Some(Pos::at(6, 6)),
            4 => {
                let far_then_near = !close(moves[0], moves[1], 3) && close(moves[1], moves[3], 2);
                let scattered = !close(moves[0], moves[1], 2) && !close(moves[0], moves[3], 2);
                (far_then_near || scattered).then_some(Pos::at(5, 7))
            }
            _ => None,
        }
    }
}

fn close(a: Pos, b: Pos, distance: i32) -> bool {
    (a.x() as i32 - b.x() as i32).abs() <= distance && (a.y() as i32 - b.y() as i32).abs() <= distance
}

impl MoveStrategy for OpeningBookDecorator {
    fn find_move(&self, cancel: &CancelToken) -> Option<Move> {
        let own = {
            let game = self.board.read().expect("board lock poisoned");
            let board = game.snapshot();
            if board.side_to_move() != Color::Black {
                warn!(step = board.steps(), "opening book asked to play white");
                None
            } else {
                self.reply(&board)
                    .filter(|&pos| board.is_empty_at(pos))
                    .map(|pos| Move::new(game.to_original(pos)))
            }
        };
        if own.is_some() {
            return own;
        }
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
}

/// Offsets pulling white's first reply toward the centre, by distance.
const STEP_GAP: [i32; 8] = [0, -1, -1, -1, -1, -2, -2, -3];

/// Opening rules for white, then a short MCTS for the next few moves.
pub struct SecondPlayerOpeningDecorator {
    inner: Arc<dyn MoveStrategy>,
    board: SharedBoard,
    mcts: VcxMcts,
}

impl SecondPlayerOpeningDecorator {
    pub fn new(
        inner: Arc<dyn MoveStrategy>,
        board: SharedBoard,
        mcts: VcxMcts,
        color: Color,
    ) -> Result<SecondPlayerOpeningDecorator, StrategyError> {
        if color != Color::White {
            return Err(StrategyError::WrongColor {
                strategy: "second-player opening",
                expected: Color::White,
                actual: color,
            });
        }
        Ok(SecondPlayerOpeningDecorator { inner, board, mcts })
    }
}

fn toward_centre(coordinate: usize) -> i32 {
    let delta = coordinate as i32 - Pos::CENTER.x() as i32;
    let gap = STEP_GAP[delta.unsigned_abs() as usize];
    coordinate as i32 + if delta < 0 { -gap } else { gap }
}

fn first_reply(black: Pos) -> Option<Pos> {
    if black == Pos::CENTER {
        return Some(Pos::at(8, 7));
    }
    Pos::from_signed(toward_centre(black.x()), toward_centre(black.y()))
}

/// Replies to the third stone after black H8, white I8, keyed by the
/// third stone's `y * 100 + x`.
fn third_reply(board: &Board) -> Option<Pos> {
    if !notation::encode(board.moves()).starts_with("H8 I8") {
        return None;
    }
    let last = board.moves()[2];
    match last.y() * 100 + last.x() {
        607 | 609 => Some(Pos::at(7, 5)),
        608 => Some(Pos::at(9, 5)),
        706 => Some(Pos::at(6, 8)),
        606 | 709 => Some(Pos::at(8, 8)),
        806 => Some(Pos::at(8, 6)),
        807 => Some(Pos::at(7, 9)),
        808 | 809 => Some(Pos::at(9, 9)),
        _ => None,
    }
}

impl MoveStrategy for SecondPlayerOpeningDecorator {
    fn find_move(&self, cancel: &CancelToken) -> Option<Move> {
        let board = snapshot(&self.board);
        let step = board.steps();
        if step % 2 != 1 {
            warn!(step, "second-player opening asked to play black");
            return self.inner.find_move(cancel);
        }
        let rule = match step {
            1 => first_reply(board.moves()[0]),
            3 => third_reply(&board),
            _ => None,
        };
        if let Some(pos) = rule.filter(|&pos| board.is_empty_at(pos)) {
            debug!(%pos, step, "second-player opening rule");
            return Some(Move::new(pos));
        }
        if (4..=8).contains(&step)
            && let Some(mv) = self.mcts.search(&board, cancel)
        {
            return Some(mv);
        }
        self.inner.find_move(cancel)
    }

    fn on_move_played(&self, pos: Pos, color: Color) {
        self.inner.on_move_played(pos, color);
    }

    fn is_winning(&self) -> bool {
        self.inner.is_winning()
    }
}
