//! Engine configuration: search depths, time budgets, and the tagged
//! knobs that tune individual searches.

use std::time::Duration;

/// Search constants used by the decision pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker threads in the shared pool.
    pub threads: usize,
    /// Depth of the baseline negamax search.
    pub negamax_depth: i32,
    /// VCX depth wrapped around the fast strategy.
    pub fast_vcx_depth: i32,
    /// VCX depth wrapped around the smart strategies.
    pub smart_vcx_depth: i32,
    /// Default depth of the blocked-four almost-win search.
    pub almost_vcx_depth: i32,
    /// Budget for each root child in the almost-win MCTS.
    pub almost_mcts_per_child: Duration,
    /// VCX depth used by almost-win MCTS simulations.
    pub almost_mcts_sim_depth: i32,
    /// Budget of the second player's opening MCTS.
    pub opening_mcts_budget: Duration,
    /// VCX depth used by opening MCTS simulations.
    pub opening_mcts_sim_depth: i32,
    /// Wall-clock budget of a single VCX search.
    pub vcx_budget: Duration,
    /// Wall-clock budget of the blocked-four almost-win search.
    pub almost_vcx_budget: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: 16,
            negamax_depth: 9,
            fast_vcx_depth: 23,
            smart_vcx_depth: 27,
            almost_vcx_depth: 23,
            almost_mcts_per_child: Duration::from_millis(2500),
            almost_mcts_sim_depth: 9,
            opening_mcts_budget: Duration::from_secs(10),
            opening_mcts_sim_depth: 7,
            vcx_budget: Duration::from_secs(55),
            almost_vcx_budget: Duration::from_secs(45),
        }
    }
}

/// When negamax hands a node over to a VCX probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegamaxContext {
    /// Plain negamax.
    #[default]
    Disabled,
    /// Probe two plies below the root with a shallow VCX.
    Attack,
    /// Probe one ply below the root with a deeper VCX.
    Defense,
}

impl NegamaxContext {
    /// Whether the VCX probe runs at all.
    pub const fn enabled(self) -> bool {
        !matches!(self, NegamaxContext::Disabled)
    }

    /// Distance from the root at which the probe fires.
    pub const fn depth_delta(self) -> i32 {
        match self {
            NegamaxContext::Disabled => 0,
            NegamaxContext::Attack => 2,
            NegamaxContext::Defense => 1,
        }
    }

    /// Depth of the probing VCX.
    pub const fn vcx_depth(self) -> i32 {
        match self {
            NegamaxContext::Disabled => 0,
            NegamaxContext::Attack => 13,
            NegamaxContext::Defense => 19,
        }
    }

    /// Stones that must be on the board before probing.
    pub const fn start_steps(self) -> usize {
        match self {
            NegamaxContext::Disabled => 0,
            NegamaxContext::Attack | NegamaxContext::Defense => 7,
        }
    }
}

/// How widely VCX considers quiet attacking moves off the last move's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VcxOptimization {
    /// Only moves in line with the previous attack.
    #[default]
    Fast,
    /// Also any blocked-four move.
    Medium,
    /// Also any three.
    Slow,
}

impl VcxOptimization {
    /// Multiplier applied to elapsed time when deciding whether another
    /// deepening iteration fits the budget.
    pub const fn time_factor(self) -> u32 {
        match self {
            VcxOptimization::Fast => 2,
            VcxOptimization::Medium => 4,
            VcxOptimization::Slow => 8,
        }
    }

    /// Whether an off-line attack of strength `score` is still considered.
    pub const fn admits(self, score: i32) -> bool {
        use crate::eval::score::{BLOCKED_FOUR, THREE};
        match self {
            VcxOptimization::Fast => false,
            VcxOptimization::Medium => score >= BLOCKED_FOUR,
            VcxOptimization::Slow => score >= THREE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.threads, 16);
        assert_eq!(config.negamax_depth, 9);
        assert_eq!(config.smart_vcx_depth, 27);
        assert_eq!(config.almost_mcts_per_child, Duration::from_millis(2500));
        assert_eq!(config.vcx_budget, Duration::from_secs(55));
    }

    #[test]
    fn contexts_fire_at_expected_plies() {
        assert!(!NegamaxContext::Disabled.enabled());
        assert_eq!(NegamaxContext::Attack.depth_delta(), 2);
        assert_eq!(NegamaxContext::Attack.vcx_depth(), 13);
        assert_eq!(NegamaxContext::Defense.depth_delta(), 1);
        assert_eq!(NegamaxContext::Defense.vcx_depth(), 19);
    }

    #[test]
    fn optimization_tiers_widen() {
        assert!(!VcxOptimization::Fast.admits(i32::MAX));
        assert!(VcxOptimization::Medium.admits(10_000));
        assert!(!VcxOptimization::Medium.admits(1_000));
        assert!(VcxOptimization::Slow.admits(1_000));
        assert_eq!(VcxOptimization::Slow.time_factor(), 8);
    }
}
