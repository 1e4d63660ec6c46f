//! Engine error types.

use gomoku_core::{BoardError, Color, NotationError};

/// Errors raised while loading an opening book.
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    /// A line is missing the `,` separator or its move field.
    #[error("line {line}: malformed entry `{text}`")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// A numeric field could not be parsed.
    #[error("line {line}: invalid number `{value}`")]
    BadNumber {
        /// 1-based line number.
        line: usize,
        /// The field that failed to parse.
        value: String,
    },

    /// The transcript field could not be decoded.
    #[error("line {line}: {source}")]
    Notation {
        /// 1-based line number.
        line: usize,
        /// The decoding failure.
        source: NotationError,
    },

    /// Reading the book failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Configuration errors raised while assembling a strategy.
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    /// The strategy name is not one of `human`, `fast`, `smart`.
    #[error("unknown strategy `{name}`")]
    UnknownStrategy {
        /// The name that was requested.
        name: String,
    },

    /// An opening override was asked to play the wrong color.
    #[error("{strategy} only plays {expected}, not {actual}")]
    WrongColor {
        /// The override that was misconfigured.
        strategy: &'static str,
        /// The color it supports.
        expected: Color,
        /// The color it was given.
        actual: Color,
    },

    /// The opening book needs an orientation-normalizing board.
    #[error("the opening book requires a normalizing board")]
    NotNormalizing,

    /// The worker pool could not be started.
    #[error("failed to start worker pool: {source}")]
    Pool {
        /// The underlying build failure.
        #[from]
        source: rayon::ThreadPoolBuildError,
    },
}

/// Errors raised when a move is played into a match.
#[derive(Debug, thiserror::Error)]
pub enum PlayError {
    /// The game already has a winner.
    #[error("the game is over")]
    GameOver,

    /// The board rejected the move.
    #[error(transparent)]
    Board(#[from] BoardError),
}
