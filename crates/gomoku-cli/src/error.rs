//! Protocol errors.

use gomoku_core::NotationError;
use gomoku_engine::{BookError, PlayError, StrategyError};

/// Errors that can occur while handling protocol commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A command was given without a required argument.
    #[error("`{command}` is missing an argument")]
    MissingArgument {
        /// The command that was incomplete.
        command: &'static str,
    },

    /// `setoption` named an option the engine does not have.
    #[error("unknown option: {name}")]
    UnknownOption {
        /// The option name.
        name: String,
    },

    /// An option value could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidOptionValue {
        /// The option name.
        name: String,
        /// The value that failed to parse.
        value: String,
    },

    /// A move command arrived before `new`.
    #[error("no game in progress; send `new <black> <white>` first")]
    NoGame,

    /// A move token or transcript could not be parsed.
    #[error("invalid notation: {0}")]
    Notation(#[from] NotationError),

    /// A player kind was unknown or misconfigured.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// The match rejected a move.
    #[error(transparent)]
    Play(#[from] PlayError),

    /// An opening book file was malformed.
    #[error(transparent)]
    Book(#[from] BookError),

    /// An I/O error occurred while reading input or a book file.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
