//! Line-oriented protocol for playing five in a row against the engine.

pub mod command;
pub mod engine;
pub mod error;

pub use command::{Command, EngineOption};
pub use engine::GomokuEngine;
pub use error::CliError;
