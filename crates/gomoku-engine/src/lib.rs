//! Search, evaluation and the move-decision pipeline for five in a row.

pub mod book;
pub mod config;
pub mod error;
pub mod eval;
pub mod pipeline;
pub mod search;

pub use book::OpeningBook;
pub use config::{EngineConfig, NegamaxContext, VcxOptimization};
pub use error::{BookError, PlayError, StrategyError};
pub use eval::ScoreManager;
pub use pipeline::{Match, MoveStrategy, StrategyFactory, StrategyKind, WorkerPool};
pub use search::{CancelToken, SearchControl, SearchResult, Searcher};
