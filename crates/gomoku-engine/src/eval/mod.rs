//! Pattern evaluation: score tiers, per-cell scoring, and move generation.

mod evaluator;
pub mod fours;
pub mod manager;
pub mod score;
pub mod threats;

pub use fours::FourScan;
pub use manager::{ScoreManager, StoneGuard};
pub use threats::Threat;
