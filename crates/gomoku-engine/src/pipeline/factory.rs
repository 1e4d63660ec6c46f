//! Assembles the decorator stack for each kind of player.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use gomoku_core::{Color, GameBoard, SharedBoard};
use tracing::info;

use crate::book::OpeningBook;
use crate::config::{EngineConfig, NegamaxContext};
use crate::error::StrategyError;
use crate::pipeline::{
    AlmostMctsWinDecorator, AlmostVcxWinDecorator, ConsistentDecorator, HumanStrategy,
    MoveStrategy, OpeningBookDecorator, SecondPlayerOpeningDecorator, ThreadSafeNegamax,
    VcxDecorator, WorkerPool,
};
use crate::search::mcts::VcxMcts;

/// Who plays one side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Moves are entered by a person.
    Human,
    /// Negamax with a VCX race.
    Fast,
    /// The full stack: openings, almost-win searches, VCX.
    Smart,
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(name: &str) -> Result<StrategyKind, StrategyError> {
        match name.to_ascii_lowercase().as_str() {
            "human" => Ok(StrategyKind::Human),
            "fast" => Ok(StrategyKind::Fast),
            "smart" => Ok(StrategyKind::Smart),
            _ => Err(StrategyError::UnknownStrategy {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Human => "human",
            StrategyKind::Fast => "fast",
            StrategyKind::Smart => "smart",
        };
        f.write_str(name)
    }
}

/// Builds strategies over one pool, book and configuration.
#[derive(Debug, Clone)]
pub struct StrategyFactory {
    pool: Arc<WorkerPool>,
    book: Arc<OpeningBook>,
    config: EngineConfig,
}

impl StrategyFactory {
    pub fn new(pool: Arc<WorkerPool>, book: Arc<OpeningBook>, config: EngineConfig) -> Self {
        Self { pool, book, config }
    }

    /// Start the pool described by `config`.
    pub fn with_config(config: EngineConfig, book: OpeningBook) -> Result<Self, StrategyError> {
        let pool = WorkerPool::new(config.threads)?;
        Ok(Self::new(Arc::new(pool), Arc::new(book), config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a match with this black player normalizes orientation. Only
    /// the smart first player consults the book, which needs it.
    pub fn normalizes(black: StrategyKind) -> bool {
        black == StrategyKind::Smart
    }

    /// A fresh board suited to `black`.
    pub fn new_board(black: StrategyKind) -> SharedBoard {
        if Self::normalizes(black) {
            GameBoard::normalizing().into_shared()
        } else {
            GameBoard::new().into_shared()
        }
    }

    /// The strategy playing `color` as `kind` on `board`.
    pub fn build(
        &self,
        kind: StrategyKind,
        color: Color,
        board: &SharedBoard,
    ) -> Result<Arc<dyn MoveStrategy>, StrategyError> {
        info!(%kind, %color, "building strategy");
        let normalizing = board.read().expect("board lock poisoned").is_normalizing();
        let strategy: Arc<dyn MoveStrategy> = match (kind, color) {
            (StrategyKind::Human, _) => return Ok(Arc::new(HumanStrategy)),
            (StrategyKind::Fast, _) => {
                let negamax = self.negamax(board, color, NegamaxContext::Disabled);
                self.vcx(negamax, board, color, self.config.fast_vcx_depth)
            }
            (StrategyKind::Smart, Color::Black) => return self.smart_black(board),
            (StrategyKind::Smart, Color::White) => {
                let negamax = self.negamax(board, color, NegamaxContext::Defense);
                let vcx = self.vcx(negamax, board, color, self.config.smart_vcx_depth);
                let mcts = VcxMcts::new(
                    self.config.opening_mcts_budget,
                    self.config.opening_mcts_sim_depth,
                );
                Arc::new(SecondPlayerOpeningDecorator::new(vcx, Arc::clone(board), mcts, color)?)
            }
        };
        if normalizing {
            return Ok(Arc::new(ConsistentDecorator::new(strategy, Arc::clone(board))));
        }
        Ok(strategy)
    }

    fn smart_black(&self, board: &SharedBoard) -> Result<Arc<dyn MoveStrategy>, StrategyError> {
        let color = Color::Black;
        let negamax = self.negamax(board, color, NegamaxContext::Attack);
        let almost_vcx = Arc::new(AlmostVcxWinDecorator::new(
            negamax,
            Arc::clone(board),
            Arc::clone(&self.pool),
            Arc::clone(&self.book),
            color,
            self.config.almost_vcx_depth,
            self.config.almost_vcx_budget,
        ));
        let almost_mcts = Arc::new(AlmostMctsWinDecorator::new(
            almost_vcx,
            Arc::clone(board),
            Arc::clone(&self.pool),
            color,
            self.config.almost_mcts_per_child,
            self.config.almost_mcts_sim_depth,
        ));
        let vcx = self.vcx(almost_mcts, board, color, self.config.smart_vcx_depth);
        Ok(Arc::new(OpeningBookDecorator::new(
            vcx,
            Arc::clone(board),
            Arc::clone(&self.book),
            color,
        )?))
    }

    fn negamax(&self, board: &SharedBoard, color: Color, context: NegamaxContext) -> Arc<dyn MoveStrategy> {
        Arc::new(ThreadSafeNegamax::new(
            Arc::clone(board),
            color,
            self.config.negamax_depth,
            context,
        ))
    }

    fn vcx(
        &self,
        inner: Arc<dyn MoveStrategy>,
        board: &SharedBoard,
        color: Color,
        depth: i32,
    ) -> Arc<dyn MoveStrategy> {
        Arc::new(VcxDecorator::new(
            inner,
            Arc::clone(board),
            Arc::clone(&self.pool),
            color,
            depth,
            self.config.vcx_budget,
        ))
    }
}
