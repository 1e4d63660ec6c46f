//! Event-driven protocol engine: a stdin reader thread, a search thread,
//! and a main loop that owns the game.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, mpsc};

use tracing::{debug, info, warn};

use gomoku_core::{Board, Color, Move, Pos};
use gomoku_engine::{
    CancelToken, EngineConfig, Match, OpeningBook, PlayError, StrategyFactory, StrategyKind,
};

use crate::command::{Command, EngineOption, parse_command};
use crate::error::CliError;

/// Whether a search thread is running.
enum EngineState {
    Idle,
    Searching,
}

/// Events processed by the main engine loop.
enum EngineEvent {
    Command(Result<Command, CliError>),
    SearchDone(Option<Move>),
    InputClosed,
}

/// The protocol engine, holding the current match and engine options.
///
/// Searches run on their own thread so `stop` can reach them; the move
/// they return is played into the match before it is reported.
pub struct GomokuEngine {
    config: EngineConfig,
    book: OpeningBook,
    factory: Option<StrategyFactory>,
    players: Option<(StrategyKind, StrategyKind)>,
    game: Option<Arc<Match>>,
    state: EngineState,
    cancel: CancelToken,
}

impl GomokuEngine {
    /// An engine with the default configuration and an empty book.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            book: OpeningBook::new(),
            factory: None,
            players: None,
            game: None,
            state: EngineState::Idle,
            cancel: CancelToken::new(),
        }
    }

    /// Run the event loop, reading from stdin until `quit` or input closes.
    pub fn run(mut self) -> Result<(), CliError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let stdin_tx = tx.clone();
        std::thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                debug!(cmd = %trimmed, "received command");
                if stdin_tx.send(EngineEvent::Command(parse_command(trimmed))).is_err() {
                    return;
                }
            }
            let _ = stdin_tx.send(EngineEvent::InputClosed);
        });

        for event in &rx {
            match event {
                EngineEvent::Command(Ok(Command::Quit)) => {
                    if matches!(self.state, EngineState::Searching) {
                        self.cancel.cancel();
                        for event in &rx {
                            if let EngineEvent::SearchDone(mv) = event {
                                self.finish_search(mv);
                                break;
                            }
                        }
                    }
                    break;
                }
                EngineEvent::Command(Ok(cmd)) => {
                    if let Err(e) = self.handle(cmd, &tx) {
                        warn!(error = %e, "command failed");
                    }
                }
                EngineEvent::Command(Err(e)) => {
                    warn!(error = %e, "parse error");
                }
                EngineEvent::SearchDone(mv) => self.finish_search(mv),
                EngineEvent::InputClosed => break,
            }
        }

        info!("gomoku shutting down");
        Ok(())
    }

    fn handle(&mut self, cmd: Command, tx: &mpsc::Sender<EngineEvent>) -> Result<(), CliError> {
        let mutates = matches!(cmd, Command::New { .. } | Command::Position(_) | Command::Play(_));
        if mutates && matches!(self.state, EngineState::Searching) {
            warn!("search in progress, ignoring command");
            return Ok(());
        }
        match cmd {
            Command::New { black, white } => self.handle_new(black, white),
            Command::Position(moves) => self.handle_position(&moves),
            Command::Play(pos) => self.handle_play(pos),
            Command::Go => self.handle_go(tx),
            Command::Stop => {
                self.cancel.cancel();
                Ok(())
            }
            Command::Show => self.handle_show(),
            Command::SetOption(option) => self.handle_setoption(option),
            Command::Quit | Command::Unknown(_) => Ok(()),
        }
    }

    fn factory(&mut self) -> Result<&StrategyFactory, CliError> {
        let factory = match self.factory.take() {
            Some(factory) => factory,
            None => StrategyFactory::with_config(self.config.clone(), self.book.clone())?,
        };
        Ok(self.factory.insert(factory))
    }

    fn game(&self) -> Result<&Arc<Match>, CliError> {
        self.game.as_ref().ok_or(CliError::NoGame)
    }

    fn handle_new(&mut self, black: StrategyKind, white: StrategyKind) -> Result<(), CliError> {
        let game = Match::start(self.factory()?, black, white)?;
        self.players = Some((black, white));
        self.game = Some(Arc::new(game));
        Ok(())
    }

    /// Start a fresh game between the same players and replay `moves`.
    fn handle_position(&mut self, moves: &[Pos]) -> Result<(), CliError> {
        let (black, white) = self.players.ok_or(CliError::NoGame)?;
        let game = Match::start(self.factory()?, black, white)?;
        for &pos in moves {
            report_winner(game.play(pos)?);
        }
        self.game = Some(Arc::new(game));
        Ok(())
    }

    fn handle_play(&mut self, pos: Pos) -> Result<(), CliError> {
        report_winner(self.game()?.play(pos)?);
        Ok(())
    }

    fn handle_go(&mut self, tx: &mpsc::Sender<EngineEvent>) -> Result<(), CliError> {
        if matches!(self.state, EngineState::Searching) {
            warn!("go received while searching, ignoring");
            return Ok(());
        }
        let game = Arc::clone(self.game()?);
        if game.winner().is_some() {
            println!("{}", bestmove_line(None));
            return Ok(());
        }

        self.cancel = CancelToken::new();
        let cancel = self.cancel.clone();
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mv = game.think(&cancel);
            let _ = tx.send(EngineEvent::SearchDone(mv));
        });
        self.state = EngineState::Searching;
        Ok(())
    }

    fn finish_search(&mut self, mv: Option<Move>) {
        self.state = EngineState::Idle;
        println!("{}", bestmove_line(mv));
        let (Some(mv), Some(game)) = (mv, &self.game) else {
            return;
        };
        match game.play(mv.pos) {
            Ok(winner) => report_winner(winner),
            Err(e) => warn!(error = %e, pos = %mv.pos, "engine move rejected"),
        }
    }

    fn handle_show(&self) -> Result<(), CliError> {
        let game = self.game()?;
        let board = game.board().read().expect("board lock poisoned");
        let shown = Board::from_moves(board.original_moves()).map_err(PlayError::from)?;
        println!("transcript {}", board.transcript());
        print!("{shown}");
        Ok(())
    }

    fn handle_setoption(&mut self, option: EngineOption) -> Result<(), CliError> {
        match option {
            EngineOption::Threads(threads) => {
                self.config.threads = threads;
            }
            EngineOption::Book(path) => {
                let count = self.book.load_start(open(&path)?)?;
                info!(count, path = %path.display(), "opening book loaded");
            }
            EngineOption::DepthBook(path) => {
                let count = self.book.load_depths(open(&path)?)?;
                info!(count, path = %path.display(), "depth book loaded");
            }
        }
        // Takes effect from the next `new`.
        self.factory = None;
        Ok(())
    }
}

impl Default for GomokuEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn open(path: &Path) -> Result<BufReader<File>, CliError> {
    Ok(BufReader::new(File::open(path)?))
}

fn report_winner(winner: Option<Color>) {
    if let Some(color) = winner {
        println!("result {color} wins");
    }
}

/// The `bestmove` reply for a search result.
fn bestmove_line(mv: Option<Move>) -> String {
    match mv {
        Some(Move { pos, winning: true }) => format!("bestmove {pos} win"),
        Some(Move { pos, winning: false }) => format!("bestmove {pos}"),
        None => "bestmove none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    fn quick_engine() -> GomokuEngine {
        GomokuEngine::with_config(EngineConfig {
            threads: 8,
            negamax_depth: 3,
            fast_vcx_depth: 7,
            smart_vcx_depth: 7,
            vcx_budget: Duration::from_secs(2),
            ..EngineConfig::default()
        })
    }

    fn run(engine: &mut GomokuEngine, line: &str) -> Result<(), CliError> {
        let (tx, _rx) = mpsc::channel();
        engine.handle(parse_command(line)?, &tx)
    }

    fn transcript(engine: &GomokuEngine) -> String {
        engine.game.as_ref().unwrap().transcript()
    }

    #[test]
    fn bestmove_formatting() {
        assert_eq!(bestmove_line(Some(Move::winning(Pos::CENTER))), "bestmove H8 win");
        assert_eq!(bestmove_line(Some(Move::new(Pos::at(0, 14)))), "bestmove A1");
        assert_eq!(bestmove_line(None), "bestmove none");
    }

    #[test]
    fn moves_need_a_game() {
        let mut engine = quick_engine();
        assert!(matches!(run(&mut engine, "play H8"), Err(CliError::NoGame)));
        assert!(matches!(run(&mut engine, "position H8"), Err(CliError::NoGame)));
        assert!(matches!(run(&mut engine, "go"), Err(CliError::NoGame)));
    }

    #[test]
    fn play_and_position_drive_the_match() {
        let mut engine = quick_engine();
        run(&mut engine, "new human human").unwrap();
        run(&mut engine, "play H8").unwrap();
        run(&mut engine, "play I9").unwrap();
        assert_eq!(transcript(&engine), "H8 I9");

        run(&mut engine, "position H8 Ha").unwrap();
        assert_eq!(transcript(&engine), "H8 Ha");
        assert!(matches!(run(&mut engine, "play H8"), Err(CliError::Play(_))));
        run(&mut engine, "show").unwrap();
    }

    #[test]
    fn go_plays_the_engine_move() {
        let mut engine = quick_engine();
        run(&mut engine, "new fast fast").unwrap();
        run(&mut engine, "position H8 H9 I8 I9 J8 J9 K8 A1").unwrap();

        let (tx, rx) = mpsc::channel();
        engine.handle(Command::Go, &tx).unwrap();
        let Ok(EngineEvent::SearchDone(mv)) = rx.recv() else {
            panic!("search thread did not report");
        };
        assert!(mv.is_some_and(|mv| mv.winning));
        engine.finish_search(mv);
        assert!(matches!(engine.state, EngineState::Idle));
        assert!(engine.game.as_ref().unwrap().winner().is_some());
    }

    #[test]
    fn options_reset_the_factory() {
        let mut engine = quick_engine();
        run(&mut engine, "new human fast").unwrap();
        assert!(engine.factory.is_some());
        run(&mut engine, "setoption name threads value 4").unwrap();
        assert!(engine.factory.is_none());
        assert_eq!(engine.config.threads, 4);
        assert!(engine.game.is_some());
    }

    #[test]
    fn book_option_loads_the_file() {
        let path = std::env::temp_dir().join(format!("gomoku-book-{}.txt", std::process::id()));
        let mut file = File::create(&path).unwrap();
        writeln!(file, "H8 I8 I9,7:5").unwrap();
        drop(file);

        let mut engine = quick_engine();
        run(&mut engine, &format!("setoption name book value {}", path.display())).unwrap();
        assert_eq!(engine.book.start_len(), 1);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            run(&mut engine, "setoption name book value /nonexistent/book.txt"),
            Err(CliError::Io { .. })
        ));
    }
}
