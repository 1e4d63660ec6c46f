//! The game board shared between the players of a match.

use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::board::Board;
use crate::color::Color;
use crate::error::BoardError;
use crate::notation;
use crate::pos::Pos;
use crate::symmetry::Rotation;

/// A game board shared between a match and its strategies.
///
/// Strategies take a read lock only long enough to clone a snapshot.
pub type SharedBoard = Arc<RwLock<GameBoard>>;

/// A board for a live game, optionally normalizing its orientation.
///
/// With normalization on, the first stone away from the centre picks a
/// [`Rotation`] and every stone is stored rotated, so that equivalent
/// openings look identical to the search. The transcript always keeps the
/// coordinates the players actually used.
#[derive(Debug, Clone, Default)]
pub struct GameBoard {
    board: Board,
    origin: Vec<Pos>,
    rotation: Option<Rotation>,
    normalize: bool,
}

impl GameBoard {
    /// An empty board that stores stones as played.
    pub fn new() -> GameBoard {
        GameBoard::default()
    }

    /// An empty board that normalizes orientation.
    pub fn normalizing() -> GameBoard {
        GameBoard {
            normalize: true,
            ..GameBoard::default()
        }
    }

    /// Replay a sequence of original-frame moves onto a fresh board.
    pub fn replay(moves: &[Pos], normalize: bool) -> Result<GameBoard, BoardError> {
        let mut game = if normalize {
            GameBoard::normalizing()
        } else {
            GameBoard::new()
        };
        for &pos in moves {
            game.play(pos)?;
        }
        Ok(game)
    }

    /// Wrap the board for sharing.
    pub fn into_shared(self) -> SharedBoard {
        Arc::new(RwLock::new(self))
    }

    /// Play `pos` (original frame) for the side to move and return its color.
    pub fn play(&mut self, pos: Pos) -> Result<Color, BoardError> {
        let color = self.side_to_move();
        let rotation = match self.rotation {
            Some(rotation) => Some(rotation),
            None if !self.normalize => None,
            None if self.origin.is_empty() && pos == Pos::CENTER => None,
            None => Some(Rotation::select(pos)),
        };
        let target = rotation.map_or(pos, |r| r.translate(pos));
        self.board.place(target, color)?;
        if self.rotation.is_none()
            && let Some(rotation) = rotation
        {
            debug!(?rotation, %pos, "board orientation fixed");
        }
        self.rotation = rotation;
        self.origin.push(pos);
        Ok(color)
    }

    /// Map an original-frame cell to the internal frame.
    pub fn to_internal(&self, pos: Pos) -> Pos {
        self.rotation.map_or(pos, |r| r.translate(pos))
    }

    /// Map an internal-frame cell back to the original frame.
    pub fn to_original(&self, pos: Pos) -> Pos {
        self.rotation.map_or(pos, |r| r.detranslate(pos))
    }

    /// Return `true` if `pos` (original frame) is on the board and empty.
    pub fn is_legal(&self, pos: Pos) -> bool {
        self.board.is_empty_at(self.to_internal(pos))
    }

    /// Return `true` if the stone on `pos` (original frame) completes five.
    pub fn is_terminal(&self, pos: Pos) -> bool {
        let internal = self.to_internal(pos);
        self.board.at(internal).is_some() && self.board.is_terminal(internal)
    }

    /// The internal board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// A private copy of the internal board for a search.
    pub fn snapshot(&self) -> Board {
        self.board.clone()
    }

    /// Moves in the coordinates the players used.
    pub fn original_moves(&self) -> &[Pos] {
        &self.origin
    }

    /// The transcript in the coordinates the players used.
    pub fn transcript(&self) -> String {
        notation::encode(&self.origin)
    }

    /// The rotation in effect, if one has been chosen.
    pub fn rotation(&self) -> Option<Rotation> {
        self.rotation
    }

    /// Whether this board normalizes orientation.
    pub fn is_normalizing(&self) -> bool {
        self.normalize
    }

    /// Number of stones played.
    pub fn steps(&self) -> usize {
        self.origin.len()
    }

    /// Color of the side to move.
    pub fn side_to_move(&self) -> Color {
        Color::for_ply(self.steps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::decode;

    #[test]
    fn plain_board_keeps_coordinates() {
        let game = GameBoard::replay(&decode("H8 I9 A1").unwrap(), false).unwrap();
        assert_eq!(game.rotation(), None);
        assert_eq!(game.board().moves(), game.original_moves());
        assert_eq!(game.transcript(), "H8 I9 A1");
        assert_eq!(game.side_to_move(), Color::White);
    }

    #[test]
    fn centre_opening_defers_rotation() {
        let mut game = GameBoard::normalizing();
        game.play(Pos::CENTER).unwrap();
        assert_eq!(game.rotation(), None);

        // H9 is straight above the centre.
        game.play(Pos::at(7, 6)).unwrap();
        assert_eq!(game.rotation(), Some(Rotation::Deg90));
        assert_eq!(game.board().moves(), &[Pos::CENTER, Pos::at(8, 7)]);
        assert_eq!(game.transcript(), "H8 H9");
    }

    #[test]
    fn off_centre_opening_rotates_first_stone() {
        let mut game = GameBoard::normalizing();
        game.play(Pos::at(3, 3)).unwrap();
        let rotation = game.rotation().unwrap();
        assert_eq!(game.board().moves(), &[rotation.translate(Pos::at(3, 3))]);
        assert!(!game.is_legal(Pos::at(3, 3)));
        assert_eq!(game.to_original(game.to_internal(Pos::at(0, 9))), Pos::at(0, 9));
    }

    #[test]
    fn failed_play_leaves_state_untouched() {
        let mut game = GameBoard::normalizing();
        game.play(Pos::CENTER).unwrap();
        assert!(game.play(Pos::CENTER).is_err());
        assert_eq!(game.rotation(), None);
        assert_eq!(game.steps(), 1);
    }

    #[test]
    fn terminal_in_original_frame() {
        let moves = decode("H8 A1 I9 A2 Ja A3 Kb A4 Lc").unwrap();
        let game = GameBoard::replay(&moves, true).unwrap();
        assert!(game.is_terminal(Pos::at(11, 3)));
        assert!(!game.is_terminal(Pos::at(0, 11)));
        assert!(!game.is_terminal(Pos::at(5, 5)));
    }
}
