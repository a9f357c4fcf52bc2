//! Bounded-depth exact search and the search entry points.
//!
//! ## Overview
//!
//! - `alphabeta`: iterative-deepening alpha-beta with a transposition table
//! - `eval`: static evaluation shared with the heuristic rollout policy
//! - `ordering`: move ordering heuristics
//! - `result`: `SearchResult`, returned by both engines
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use rust_azul::core::GameState;
//! use rust_azul::search::search_exact;
//!
//! let state = GameState::new(2, 11).unwrap();
//! let result = search_exact(&state, state.current(), 2, Duration::from_secs(5)).unwrap();
//! assert!(result.best_action.is_some());
//! ```

pub mod alphabeta;
pub mod config;
pub mod eval;
pub mod ordering;
pub mod result;
pub mod tt;

use std::time::Duration;

pub use alphabeta::{max_round_plies, AlphaBetaSearch};
pub use config::SearchConfig;
pub use eval::{evaluate, win_probability, EVAL_SCALE};
pub use ordering::{action_score, order_actions};
pub use result::SearchResult;
pub use tt::{Bound, InMemoryTT, TTEntry, TTStats, TranspositionTable};

use crate::core::{GameState, PlayerId};
use crate::error::Result;
use crate::mcts::{MCTSConfig, MCTSSearch, RolloutPolicy};
use crate::rules::FastRules;

/// Alpha-beta search for `agent` with the default configuration.
///
/// `score` in the result is the expected point margin for `agent`.
pub fn search_exact(state: &GameState, agent: PlayerId, max_depth: u32, max_time: Duration) -> Result<SearchResult> {
    AlphaBetaSearch::new(FastRules::new(), SearchConfig::default()).search(state, agent, max_depth, max_time)
}

/// MCTS for `agent` with the default configuration and the given rollout
/// policy.
///
/// Runs exactly `max_rollouts` rollouts unless `max_time` runs out first.
/// `score` in the result is the estimated win probability for `agent`.
pub fn search_mcts<P>(
    state: &GameState,
    agent: PlayerId,
    max_time: Duration,
    max_rollouts: u32,
    policy: P,
) -> Result<SearchResult>
where
    P: RolloutPolicy<FastRules> + 'static,
{
    MCTSSearch::new(FastRules::new(), MCTSConfig::default())
        .with_rollout(policy)
        .search(state, agent, max_rollouts, max_time)
}
