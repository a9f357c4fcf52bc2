//! # rust-azul
//!
//! Position analysis core for the Azul tile-drafting game, built for
//! search: alpha-beta and MCTS over a deterministic, cheaply cloned state.
//!
//! ## Design Principles
//!
//! 1. **Explicit State**: every operation takes and returns `GameState`
//!    values. There is no process-wide "current position".
//!
//! 2. **Validate, Then Mutate**: transitions check legality and tile counts
//!    before touching the state; a failed `apply` leaves it unchanged.
//!
//! 3. **Deterministic**: a state owns its seeded RNG, so the same state and
//!    action always produce the same successor, deals included.
//!
//! ## Architecture
//!
//! - **Incremental Identity**: the Zobrist hash is cached on the state and
//!   re-XORed per transition; it keys the transposition table and the
//!   analysis cache.
//!
//! - **Persistent Data Structures**: O(1) cloning of the bag via `im-rs`.
//!
//! - **Hidden Deals**: search never looks past an unknown refill. Alpha-beta
//!   treats it as a leaf, MCTS samples it per rollout.
//!
//! ## Modules
//!
//! - `core`: Tiles, displays, boards, actions, state, RNG, constants
//! - `rules`: Legal actions, transitions, scoring, validation, `RulesEngine`
//! - `hash`: Zobrist position identity
//! - `search`: Alpha-beta, evaluation, transposition table, entry points
//! - `mcts`: Monte Carlo Tree Search with pluggable rollouts
//! - `nn`: Value model seam for MCTS leaf evaluation
//! - `position`: Position identifiers
//! - `cache`: Analysis cache seam

pub mod core;
pub mod error;
pub mod hash;
pub mod rules;
pub mod search;
pub mod mcts;
pub mod nn;
pub mod position;
pub mod cache;

// Re-export commonly used types
pub use crate::core::{
    Action, AgentBoard, Draft, GameConfig, GameRng, GameRngState, GameState, Phase, PlayerId, PlayerMap, Source,
    Tile, TileDisplay,
};

pub use crate::error::{AzulError, Result};

pub use crate::hash::position_hash;

pub use crate::rules::{apply, legal_actions, successor, validate_state, AzulRules, FastRules, GameResult, RulesEngine};

pub use crate::search::{search_exact, search_mcts, AlphaBetaSearch, SearchConfig, SearchResult};

pub use crate::mcts::{
    FinalSelection, HeuristicRollout, MCTSConfig, MCTSSearch, ModelEvaluation, RandomRollout, RolloutPolicy,
    SelectionPolicy, UCB1,
};

pub use crate::position::{format_position, parse_position};

pub use crate::cache::{analyze, AnalysisCache, AnalysisKey, InMemoryCache, SearchRequest};
