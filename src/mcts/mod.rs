//! Monte Carlo Tree Search for rust-azul.
//!
//! ## Overview
//!
//! Drafting is perfect information, so every agent's decisions are expanded
//! in the tree. The next deal is the only hidden element: positions waiting
//! for a refill are boundary nodes that are never expanded, and each
//! rollout from one reshuffles the undrawn bag to sample a deal.
//!
//! - **Exact rollout count**: one rollout per iteration, terminal leaves included
//! - **Configurable Policies**: Selection (UCB1) and rollout (random,
//!   heuristic, external value model)
//! - **Deterministic**: the same seed reproduces the same tree
//! - **Serializable**: Tree and config can be saved/loaded
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rust_azul::core::GameState;
//! use rust_azul::mcts::{MCTSConfig, MCTSSearch};
//! use rust_azul::rules::FastRules;
//!
//! let state = GameState::new(2, 42).unwrap();
//! let mut search = MCTSSearch::new(FastRules::new(), MCTSConfig::default());
//!
//! let result = search
//!     .search(&state, state.current(), 200, Duration::from_secs(5))
//!     .unwrap();
//! assert_eq!(result.rollouts, 200);
//!
//! // Visit distribution at the root
//! for (action, prob) in search.action_probabilities() {
//!     println!("{action}: {:.2}%", prob * 100.0);
//! }
//! ```
//!
//! ## Custom Policies
//!
//! ```rust,ignore
//! use rust_azul::mcts::{HeuristicRollout, MCTSSearch, MCTSConfig};
//!
//! let search = MCTSSearch::new(engine, config)
//!     .with_rollout(HeuristicRollout::new(0.2));
//! ```

pub mod config;
pub mod node;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::{FinalSelection, MCTSConfig};
pub use node::{Edge, MCTSNode, NodeId};
pub use policy::{
    result_to_rewards, result_value, value_to_rewards, HeuristicRollout, ModelEvaluation, RandomRollout,
    Rollout, RolloutPolicy, SelectionPolicy, UCB1,
};
pub use search::MCTSSearch;
pub use stats::SearchStats;
pub use tree::{MCTSTree, TreeStats};
