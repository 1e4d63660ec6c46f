//! A match between two strategies on one shared board.

use std::sync::{Arc, Mutex};

use gomoku_core::{Color, Move, Pos, SharedBoard};
use tracing::info;

use crate::error::{PlayError, StrategyError};
use crate::pipeline::{MoveStrategy, StrategyFactory, StrategyKind};
use crate::search::control::CancelToken;

/// Two players, the board they share, and the result once there is one.
pub struct Match {
    board: SharedBoard,
    black: Arc<dyn MoveStrategy>,
    white: Arc<dyn MoveStrategy>,
    winner: Mutex<Option<Color>>,
}

impl Match {
    pub fn new(board: SharedBoard, black: Arc<dyn MoveStrategy>, white: Arc<dyn MoveStrategy>) -> Match {
        Match {
            board,
            black,
            white,
            winner: Mutex::new(None),
        }
    }

    /// A new game between `black` and `white` built by `factory`.
    pub fn start(factory: &StrategyFactory, black: StrategyKind, white: StrategyKind) -> Result<Match, StrategyError> {
        let board = StrategyFactory::new_board(black);
        let black_strategy = factory.build(black, Color::Black, &board)?;
        let white_strategy = factory.build(white, Color::White, &board)?;
        info!(%black, %white, "match started");
        Ok(Match::new(board, black_strategy, white_strategy))
    }

    pub fn board(&self) -> &SharedBoard {
        &self.board
    }

    pub fn strategy(&self, color: Color) -> &Arc<dyn MoveStrategy> {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        }
    }

    pub fn side_to_move(&self) -> Color {
        self.board.read().expect("board lock poisoned").side_to_move()
    }

    pub fn winner(&self) -> Option<Color> {
        *self.winner.lock().expect("winner lock poisoned")
    }

    /// The moves so far, in the players' coordinates.
    pub fn transcript(&self) -> String {
        self.board.read().expect("board lock poisoned").transcript()
    }

    /// Play `pos` for the side to move and tell both strategies.
    ///
    /// Returns the winner if this move ended the game.
    pub fn play(&self, pos: Pos) -> Result<Option<Color>, PlayError> {
        let mut winner = self.winner.lock().expect("winner lock poisoned");
        if winner.is_some() {
            return Err(PlayError::GameOver);
        }
        let color = {
            let mut game = self.board.write().expect("board lock poisoned");
            let color = game.play(pos)?;
            if game.is_terminal(pos) {
                *winner = Some(color);
                info!(%color, %pos, "five in a row");
            }
            color
        };
        self.black.on_move_played(pos, color);
        self.white.on_move_played(pos, color);
        Ok(*winner)
    }

    /// Ask the side to move for its move. `None` once the game is over,
    /// for a human, or when the search was cancelled without an answer.
    pub fn think(&self, cancel: &CancelToken) -> Option<Move> {
        if self.winner().is_some() {
            return None;
        }
        self.strategy(self.side_to_move()).find_move(cancel)
    }
}
