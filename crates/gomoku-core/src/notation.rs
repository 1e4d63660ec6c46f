//! Transcript notation: one token per move, column letter then row character.
//!
//! Columns run `A`..`O` from the left. Rows are counted from the bottom:
//! `1`..`9`, then `a`..`f` for rows 10 to 15, so the top row (`y = 0`) is `f`.

use std::fmt;
use std::str::FromStr;

use crate::error::NotationError;
use crate::pos::{BOARD_SIZE, Pos};

/// Column letter for `x`.
pub fn column_char(x: usize) -> char {
    debug_assert!(x < BOARD_SIZE);
    (b'A' + x as u8) as char
}

/// Row character for `y`.
pub fn row_char(y: usize) -> char {
    debug_assert!(y < BOARD_SIZE);
    let rank = BOARD_SIZE - y;
    if rank < 10 {
        (b'0' + rank as u8) as char
    } else {
        (b'a' + (rank - 10) as u8) as char
    }
}

fn parse_column(c: char) -> Result<usize, NotationError> {
    match c {
        'A'..='O' => Ok(c as usize - 'A' as usize),
        _ => Err(NotationError::BadColumn { column: c }),
    }
}

fn parse_row(c: char) -> Result<usize, NotationError> {
    let rank = match c {
        '1'..='9' => c as usize - '0' as usize,
        'a'..='f' => c as usize - 'a' as usize + 10,
        _ => return Err(NotationError::BadRow { row: c }),
    };
    Ok(BOARD_SIZE - rank)
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_char(self.x()), row_char(self.y()))
    }
}

impl FromStr for Pos {
    type Err = NotationError;

    fn from_str(token: &str) -> Result<Pos, NotationError> {
        let mut chars = token.chars();
        let (Some(column), Some(row), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(NotationError::BadToken {
                token: token.to_string(),
            });
        };
        let x = parse_column(column)?;
        let y = parse_row(row)?;
        Ok(Pos::at(x, y))
    }
}

/// Render moves as a space-separated transcript.
pub fn encode(moves: &[Pos]) -> String {
    let mut out = String::with_capacity(moves.len() * 3);
    for (i, pos) in moves.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&pos.to_string());
    }
    out
}

/// Parse a whitespace-separated transcript into moves, preserving order.
pub fn decode(transcript: &str) -> Result<Vec<Pos>, NotationError> {
    transcript.split_whitespace().map(str::parse).collect()
}
