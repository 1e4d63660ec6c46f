//! Protocol command parsing.

use std::path::PathBuf;

use gomoku_core::{Pos, notation};
use gomoku_engine::StrategyKind;

use crate::error::CliError;

/// An engine option settable with `setoption`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOption {
    /// Worker threads for the next game.
    Threads(usize),
    /// File of opening replies.
    Book(PathBuf),
    /// File of almost-win depth overrides.
    DepthBook(PathBuf),
}

/// A parsed protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `new <black> <white>` -- start a game between two player kinds.
    New {
        black: StrategyKind,
        white: StrategyKind,
    },
    /// `position <moves...>` -- restart the current game from a transcript.
    Position(Vec<Pos>),
    /// `play <move>` -- play a move for the side to move.
    Play(Pos),
    /// `go` -- let the side to move think.
    Go,
    /// `stop` -- cancel the running search.
    Stop,
    /// `show` -- print the transcript and board.
    Show,
    /// `setoption name <name> value <value>`.
    SetOption(EngineOption),
    /// `quit` -- exit once the running search has stopped.
    Quit,
    /// Unrecognized command (ignored).
    Unknown(String),
}

/// Parse a single line of input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, CliError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = tokens.split_first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match head {
        "new" => parse_new(rest),
        "position" => Ok(Command::Position(notation::decode(&rest.join(" "))?)),
        "play" => {
            let token = rest.first().ok_or(CliError::MissingArgument { command: "play" })?;
            Ok(Command::Play(token.parse()?))
        }
        "go" => Ok(Command::Go),
        "stop" => Ok(Command::Stop),
        "show" => Ok(Command::Show),
        "setoption" => parse_setoption(rest),
        "quit" => Ok(Command::Quit),
        _ => Ok(Command::Unknown(head.to_string())),
    }
}

fn parse_new(tokens: &[&str]) -> Result<Command, CliError> {
    let [black, white, ..] = tokens else {
        return Err(CliError::MissingArgument { command: "new" });
    };
    Ok(Command::New {
        black: black.parse()?,
        white: white.parse()?,
    })
}

/// Parse `name <name> value <value...>`. Values may contain spaces.
fn parse_setoption(tokens: &[&str]) -> Result<Command, CliError> {
    let missing = || CliError::MissingArgument { command: "setoption" };
    let name_at = tokens.iter().position(|&t| t == "name").ok_or_else(missing)?;
    let value_at = tokens.iter().position(|&t| t == "value").ok_or_else(missing)?;
    if value_at <= name_at + 1 || value_at + 1 >= tokens.len() {
        return Err(missing());
    }
    let name = tokens[name_at + 1..value_at].join(" ").to_ascii_lowercase();
    let value = tokens[value_at + 1..].join(" ");

    let option = match name.as_str() {
        "threads" => {
            let threads = value
                .parse()
                .ok()
                .filter(|&n: &usize| n > 0)
                .ok_or_else(|| CliError::InvalidOptionValue {
                    name: name.clone(),
                    value: value.clone(),
                })?;
            EngineOption::Threads(threads)
        }
        "book" => EngineOption::Book(PathBuf::from(value)),
        "depthbook" => EngineOption::DepthBook(PathBuf::from(value)),
        _ => return Err(CliError::UnknownOption { name }),
    };
    Ok(Command::SetOption(option))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse_command("go").unwrap(), Command::Go);
        assert_eq!(parse_command("stop").unwrap(), Command::Stop);
        assert_eq!(parse_command("show").unwrap(), Command::Show);
        assert_eq!(parse_command("  quit  ").unwrap(), Command::Quit);
    }

    #[test]
    fn parse_new_game() {
        assert_eq!(
            parse_command("new smart human").unwrap(),
            Command::New {
                black: StrategyKind::Smart,
                white: StrategyKind::Human,
            }
        );
    }

    #[test]
    fn parse_new_needs_both_players() {
        assert!(matches!(
            parse_command("new fast"),
            Err(CliError::MissingArgument { command: "new" })
        ));
        assert!(matches!(parse_command("new fast wizard"), Err(CliError::Strategy(_))));
    }

    #[test]
    fn parse_position_transcript() {
        assert_eq!(
            parse_command("position H8 I9 Ha").unwrap(),
            Command::Position(vec![Pos::CENTER, Pos::at(8, 6), Pos::at(7, 5)])
        );
        assert_eq!(parse_command("position").unwrap(), Command::Position(Vec::new()));
    }

    #[test]
    fn parse_position_bad_token() {
        assert!(matches!(parse_command("position H8 Z9"), Err(CliError::Notation(_))));
    }

    #[test]
    fn parse_play() {
        assert_eq!(parse_command("play A1").unwrap(), Command::Play(Pos::at(0, 14)));
        assert!(matches!(
            parse_command("play"),
            Err(CliError::MissingArgument { command: "play" })
        ));
        assert!(matches!(parse_command("play H0"), Err(CliError::Notation(_))));
    }

    #[test]
    fn parse_setoption_threads() {
        assert_eq!(
            parse_command("setoption name Threads value 4").unwrap(),
            Command::SetOption(EngineOption::Threads(4))
        );
        assert!(matches!(
            parse_command("setoption name threads value 0"),
            Err(CliError::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn parse_setoption_paths_keep_spaces() {
        assert_eq!(
            parse_command("setoption name book value /tmp/my books/start.txt").unwrap(),
            Command::SetOption(EngineOption::Book(PathBuf::from("/tmp/my books/start.txt")))
        );
        assert_eq!(
            parse_command("setoption name depthbook value depth.txt").unwrap(),
            Command::SetOption(EngineOption::DepthBook(PathBuf::from("depth.txt")))
        );
    }

    #[test]
    fn parse_setoption_errors() {
        assert!(matches!(
            parse_command("setoption name hash value 16"),
            Err(CliError::UnknownOption { .. })
        ));
        assert!(matches!(
            parse_command("setoption name threads"),
            Err(CliError::MissingArgument { command: "setoption" })
        ));
    }

    #[test]
    fn parse_unknown_and_empty() {
        assert_eq!(parse_command("xyzzy 1 2").unwrap(), Command::Unknown("xyzzy".into()));
        assert_eq!(parse_command("").unwrap(), Command::Unknown(String::new()));
    }
}
