//! Analysis cache seam.
//!
//! Persisting analyses is a caller concern. The core only defines what an
//! analysis is keyed by and the lookup/store interface it consults:
//!
//! - `AnalysisKey`: Zobrist hash of the position, the agent and the search
//!   parameters
//! - `AnalysisCache`: lookup/store trait, with `InMemoryCache` for tests and
//!   single-process callers
//! - `analyze`: check the cache, run the requested engine on a miss, store
//!
//! Results cut short by the budget are returned but never stored, so a later
//! call with the same parameters gets a chance at the full search.

use std::time::Duration;

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{GameState, PlayerId};
use crate::error::{AzulError, Result};
use crate::mcts::{HeuristicRollout, RandomRollout};
use crate::search::{search_exact, search_mcts, SearchResult};

/// Rollout policy for a cached MCTS request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RolloutKind {
    Random,
    /// `HeuristicRollout` with its default exploration rate.
    Heuristic,
}

/// Engine and budget of an analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchRequest {
    Exact {
        max_depth: u32,
        max_time_ms: u64,
    },
    Mcts {
        max_rollouts: u32,
        max_time_ms: u64,
        rollout: RolloutKind,
    },
}

impl SearchRequest {
    /// Run the request against `state`.
    pub fn run(&self, state: &GameState, agent: PlayerId) -> Result<SearchResult> {
        match *self {
            SearchRequest::Exact { max_depth, max_time_ms } => {
                search_exact(state, agent, max_depth, Duration::from_millis(max_time_ms))
            }
            SearchRequest::Mcts {
                max_rollouts,
                max_time_ms,
                rollout,
            } => {
                let max_time = Duration::from_millis(max_time_ms);
                match rollout {
                    RolloutKind::Random => search_mcts(state, agent, max_time, max_rollouts, RandomRollout),
                    RolloutKind::Heuristic => {
                        search_mcts(state, agent, max_time, max_rollouts, HeuristicRollout::default())
                    }
                }
            }
        }
    }
}

/// Identity of one analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisKey {
    /// Zobrist hash of the analysed position.
    pub position: u64,
    pub agent: PlayerId,
    pub request: SearchRequest,
}

impl AnalysisKey {
    #[must_use]
    pub fn new(state: &GameState, agent: PlayerId, request: SearchRequest) -> Self {
        Self {
            position: state.zobrist(),
            agent,
            request,
        }
    }

    /// Stable string form for external key-value stores.
    pub fn storage_key(&self) -> Result<String> {
        let bytes =
            bincode::serialize(self).map_err(|_| AzulError::InvalidOperation("analysis key could not be encoded"))?;
        Ok(hex::encode(bytes))
    }
}

/// Lookup/store interface for finished analyses.
pub trait AnalysisCache {
    fn lookup(&mut self, key: &AnalysisKey) -> Option<SearchResult>;
    fn store(&mut self, key: AnalysisKey, result: SearchResult);
}

/// Hash map cache with hit/miss counters.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: FxHashMap<AnalysisKey, SearchResult>,
    hits: u64,
    misses: u64,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl AnalysisCache for InMemoryCache {
    fn lookup(&mut self, key: &AnalysisKey) -> Option<SearchResult> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    fn store(&mut self, key: AnalysisKey, result: SearchResult) {
        self.entries.insert(key, result);
    }
}

/// Analyse `state` for `agent`, reusing a cached result when one exists.
pub fn analyze(
    state: &GameState,
    agent: PlayerId,
    request: SearchRequest,
    cache: &mut dyn AnalysisCache,
) -> Result<SearchResult> {
    let key = AnalysisKey::new(state, agent, request);
    if let Some(result) = cache.lookup(&key) {
        debug!("analysis cache hit for {:016x}", key.position);
        return Ok(result);
    }

    let result = request.run(state, agent)?;
    if !result.budget_exhausted {
        cache.store(key, result.clone());
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXACT: SearchRequest = SearchRequest::Exact {
        max_depth: 1,
        max_time_ms: 30_000,
    };

    #[test]
    fn test_second_call_hits_cache() {
        let state = GameState::new(2, 4).unwrap();
        let agent = state.current();
        let mut cache = InMemoryCache::new();

        let first = analyze(&state, agent, EXACT, &mut cache).unwrap();
        let second = analyze(&state, agent, EXACT, &mut cache).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn test_key_separates_parameters() {
        let state = GameState::new(2, 4).unwrap();
        let agent = state.current();
        let mcts = SearchRequest::Mcts {
            max_rollouts: 16,
            max_time_ms: 30_000,
            rollout: RolloutKind::Random,
        };

        let a = AnalysisKey::new(&state, agent, EXACT);
        let b = AnalysisKey::new(&state, agent, mcts);
        let c = AnalysisKey::new(&state, agent.next(2), EXACT);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.storage_key().unwrap(), b.storage_key().unwrap());
        assert_eq!(a.storage_key().unwrap(), AnalysisKey::new(&state, agent, EXACT).storage_key().unwrap());
    }

    #[test]
    fn test_exhausted_results_not_stored() {
        let state = GameState::new(2, 4).unwrap();
        let agent = state.current();
        let mut cache = InMemoryCache::new();
        let request = SearchRequest::Exact {
            max_depth: 4,
            max_time_ms: 0,
        };

        let result = analyze(&state, agent, request, &mut cache).unwrap();
        assert!(result.budget_exhausted);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_mcts_request_runs() {
        let state = GameState::new(2, 4).unwrap();
        let request = SearchRequest::Mcts {
            max_rollouts: 12,
            max_time_ms: 30_000,
            rollout: RolloutKind::Heuristic,
        };
        let result = request.run(&state, state.current()).unwrap();
        assert_eq!(result.rollouts, 12);
    }
}
