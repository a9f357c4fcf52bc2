//! Search results shared by both engines.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::Action;

/// Outcome of one search call.
///
/// `score` is engine-specific: the exact engine reports the expected point
/// margin for the searching agent, MCTS reports its estimated win
/// probability. A result with `budget_exhausted` set is still usable; it is
/// the best line found before time ran out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// `None` for finished games and agents with nothing to do.
    pub best_action: Option<Action>,
    pub score: f64,
    pub principal_variation: Vec<Action>,
    /// Positions visited (alpha-beta) or tree nodes allocated (MCTS).
    pub nodes: u64,
    pub rollouts: u64,
    pub elapsed: Duration,
    /// Deepest completed iteration (alpha-beta) or tree depth (MCTS).
    pub depth_reached: u32,
    pub avg_rollout_depth: f64,
    pub budget_exhausted: bool,
}

impl SearchResult {
    /// A result with no move, for positions nothing can be played from.
    #[must_use]
    pub fn no_action(score: f64) -> Self {
        Self {
            best_action: None,
            score,
            principal_variation: Vec::new(),
            nodes: 0,
            rollouts: 0,
            elapsed: Duration::ZERO,
            depth_reached: 0,
            avg_rollout_depth: 0.0,
            budget_exhausted: false,
        }
    }

    #[must_use]
    pub fn has_action(&self) -> bool {
        self.best_action.is_some()
    }
}
