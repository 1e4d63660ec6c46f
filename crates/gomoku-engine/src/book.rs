//! Opening book: best replies and almost-win depths keyed by the
//! symmetry-invariant shape of a position.
//!
//! Both files are line oriented. A start line reads `<transcript>,<x>:<y>`
//! and names the best reply to the transcript; a depth line reads
//! `<transcript>,<depth>` and overrides the almost-win VCX depth. Blank
//! lines are skipped.

use std::collections::HashMap;
use std::io::BufRead;

use gomoku_core::notation;
use gomoku_core::symmetry::{canonical, canonical_with_move, find_book_move};
use gomoku_core::{Board, Pos};
use tracing::info;

use crate::error::BookError;

/// Book replies and depth overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpeningBook {
    start: HashMap<String, (i32, i32)>,
    depths: HashMap<String, i32>,
}

impl OpeningBook {
    /// An empty book.
    pub fn new() -> OpeningBook {
        OpeningBook::default()
    }

    /// Add every reply in `reader` to the book. Returns the number read.
    pub fn load_start<R: BufRead>(&mut self, reader: R) -> Result<usize, BookError> {
        let mut count = 0;
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let Some((moves, field)) = split_entry(&line, index + 1)? else {
                continue;
            };
            let (x, y) = field.split_once(':').ok_or_else(|| BookError::Malformed {
                line: index + 1,
                text: line.clone(),
            })?;
            let x = parse_number(x, index + 1)?;
            let y = parse_number(y, index + 1)?;
            let best = Pos::from_signed(x, y).ok_or_else(|| BookError::Malformed {
                line: index + 1,
                text: line.clone(),
            })?;
            let (key, moved) = canonical_with_move(&moves, best);
            self.start.insert(key, moved);
            count += 1;
        }
        info!(count, "loaded opening replies");
        Ok(count)
    }

    /// Add every depth override in `reader` to the book. Returns the number
    /// read.
    pub fn load_depths<R: BufRead>(&mut self, reader: R) -> Result<usize, BookError> {
        let mut count = 0;
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let Some((moves, field)) = split_entry(&line, index + 1)? else {
                continue;
            };
            let depth = parse_number(field, index + 1)?;
            self.depths.insert(canonical(&moves), depth);
            count += 1;
        }
        info!(count, "loaded almost-win depths");
        Ok(count)
    }

    /// The book reply to `board`, in board coordinates.
    pub fn best_reply(&self, board: &Board) -> Option<Pos> {
        if self.start.is_empty() {
            return None;
        }
        find_book_move(board.moves(), |key| self.start.get(key).copied())
    }

    /// The depth override for `board`, if any.
    pub fn depth_for(&self, board: &Board) -> Option<i32> {
        if self.depths.is_empty() {
            return None;
        }
        self.depths.get(&canonical(board.moves())).copied()
    }

    /// Number of replies.
    pub fn start_len(&self) -> usize {
        self.start.len()
    }

    /// Number of depth overrides.
    pub fn depths_len(&self) -> usize {
        self.depths.len()
    }
}

/// Split a line into its decoded transcript and the field after the comma.
/// Blank lines yield `None`.
fn split_entry(line: &str, number: usize) -> Result<Option<(Vec<Pos>, &str)>, BookError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let (transcript, field) = trimmed.split_once(',').ok_or_else(|| BookError::Malformed {
        line: number,
        text: line.to_string(),
    })?;
    let moves = notation::decode(transcript).map_err(|source| BookError::Notation {
        line: number,
        source,
    })?;
    Ok(Some((moves, field.trim())))
}

fn parse_number(field: &str, line: usize) -> Result<i32, BookError> {
    field.trim().parse().map_err(|_| BookError::BadNumber {
        line,
        value: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomoku_core::notation::decode;

    fn board(transcript: &str) -> Board {
        Board::from_moves(&decode(transcript).unwrap()).unwrap()
    }

    #[test]
    fn reply_is_found_under_symmetry() {
        let mut book = OpeningBook::new();
        let read = book.load_start("H8 I8 I9,7:5\n\n".as_bytes()).unwrap();
        assert_eq!(read, 1);
        assert_eq!(book.best_reply(&board("H8 I8 I9")), Some(Pos::at(7, 5)));
        // mirrored across the vertical axis
        assert_eq!(book.best_reply(&board("H8 G8 G9")), Some(Pos::at(7, 5)));
        // rotated half a turn
        assert_eq!(book.best_reply(&board("H8 G8 G7")), Some(Pos::at(7, 9)));
        assert_eq!(book.best_reply(&board("H8 Ja")), None);
    }

    #[test]
    fn depths_are_keyed_by_shape() {
        let mut book = OpeningBook::new();
        book.load_depths("H8 I9 I8,17\n".as_bytes()).unwrap();
        assert_eq!(book.depth_for(&board("H8 I9 I8")), Some(17));
        assert_eq!(book.depth_for(&board("H8 G9 G8")), Some(17));
        assert_eq!(book.depth_for(&board("H8 I9")), None);
    }

    #[test]
    fn errors_carry_the_line_number() {
        let mut book = OpeningBook::new();
        let err = book.load_start("H8,7:6\nH8 I9\n".as_bytes()).unwrap_err();
        assert!(matches!(err, BookError::Malformed { line: 2, .. }));

        let err = book.load_depths("H8,x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, BookError::BadNumber { line: 1, .. }));

        let err = book.load_depths("Z9,3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, BookError::Notation { line: 1, .. }));
    }

    #[test]
    fn empty_book_answers_nothing() {
        let book = OpeningBook::new();
        assert_eq!(book.best_reply(&board("H8 I9")), None);
        assert_eq!(book.depth_for(&board("H8 I9")), None);
    }
}
