//! Core five-in-a-row types: board, coordinates, move transcripts, and symmetry.

mod board;
mod color;
mod direction;
mod error;
mod game;
mod pos;
mod zobrist;

pub mod notation;
pub mod symmetry;

pub use board::{Board, WIN_LENGTH};
pub use color::Color;
pub use direction::Direction;
pub use error::{BoardError, NotationError};
pub use game::{GameBoard, SharedBoard};
pub use pos::{BOARD_SIZE, CELL_COUNT, Move, Pos};
pub use symmetry::{Rotation, Symmetry};
