//! Error types for board access and transcript parsing.

use std::fmt;

use crate::pos::Pos;

/// Errors from parsing a move transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// A token is not exactly one column letter followed by one row character.
    BadToken {
        /// The offending token.
        token: String,
    },
    /// The column letter is outside `A`..`O`.
    BadColumn {
        /// The offending character.
        column: char,
    },
    /// The row character is outside `1`..`9` and `a`..`f`.
    BadRow {
        /// The offending character.
        row: char,
    },
}

impl fmt::Display for NotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotationError::BadToken { token } => {
                write!(f, "malformed move token: \"{token}\"")
            }
            NotationError::BadColumn { column } => {
                write!(f, "invalid column letter: '{column}'")
            }
            NotationError::BadRow { row } => {
                write!(f, "invalid row character: '{row}'")
            }
        }
    }
}

impl std::error::Error for NotationError {}

/// Errors from board access and mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// A coordinate lies outside the 15x15 grid.
    #[error("cell ({x}, {y}) is outside the board")]
    OutOfRange {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },
    /// A stone was placed on an occupied cell.
    #[error("cell {pos} is already occupied")]
    Occupied {
        /// The occupied cell.
        pos: Pos,
    },
    /// A stone was removed from an empty cell.
    #[error("cell {pos} is empty")]
    Vacant {
        /// The empty cell.
        pos: Pos,
    },
}

#[cfg(test)]
mod tests {
    use super::{BoardError, NotationError};
    use crate::pos::Pos;

    #[test]
    fn notation_error_display() {
        let err = NotationError::BadRow { row: 'z' };
        assert_eq!(format!("{err}"), "invalid row character: 'z'");
    }

    #[test]
    fn board_error_display() {
        let err = BoardError::OutOfRange { x: 15, y: 2 };
        assert_eq!(format!("{err}"), "cell (15, 2) is outside the board");
        let err = BoardError::Occupied { pos: Pos::CENTER };
        assert_eq!(format!("{err}"), "cell H8 is already occupied");
    }
}
