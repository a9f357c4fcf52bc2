//! Search integration tests: both engines through the public entry points,
//! budgets, and the position and cache seams around them.

use std::time::Duration;

use rust_azul::cache::{analyze, InMemoryCache, RolloutKind, SearchRequest};
use rust_azul::core::{GameRng, GameState, Phase, PlayerId, ALL_TILES};
use rust_azul::mcts::{
    FinalSelection, HeuristicRollout, MCTSConfig, MCTSSearch, ModelEvaluation, RandomRollout,
};
use rust_azul::nn::{AzulEncoder, ZeroValue};
use rust_azul::position::{format_position, parse_position};
use rust_azul::rules::{apply, legal_actions, AzulRules, FastRules, RulesEngine};
use rust_azul::search::{search_exact, search_mcts, AlphaBetaSearch, SearchConfig};

const LONG: Duration = Duration::from_secs(60);

fn midgame(seed: u64, plies: usize) -> GameState {
    let mut state = GameState::new(2, seed).unwrap();
    for i in 0..plies {
        let agent = AzulRules.acting_player(&state);
        let actions = legal_actions(&state, agent);
        let action = actions[(i * 7) % actions.len()];
        apply(&mut state, &action, agent).unwrap();
    }
    state
}

// =============================================================================
// Exact Search
// =============================================================================

#[test]
fn test_exact_search_returns_legal_move() {
    let state = midgame(3, 5);
    let agent = state.current();
    let result = search_exact(&state, agent, 3, LONG).unwrap();

    let best = result.best_action.unwrap();
    assert!(legal_actions(&state, agent).contains(&best));
    assert!(result.depth_reached >= 1);
    assert!(!result.budget_exhausted);
    assert_eq!(result.rollouts, 0);
}

#[test]
fn test_exact_search_is_deterministic() {
    let state = midgame(8, 3);
    let agent = state.current();
    let a = search_exact(&state, agent, 2, LONG).unwrap();
    let b = search_exact(&state, agent, 2, LONG).unwrap();

    assert_eq!(a.best_action, b.best_action);
    assert_eq!(a.score, b.score);
    assert_eq!(a.principal_variation, b.principal_variation);
}

#[test]
fn test_exact_search_tt_is_used() {
    let state = midgame(5, 2);
    let agent = state.current();
    let mut search = AlphaBetaSearch::new(FastRules::new(), SearchConfig::default());
    search.search(&state, agent, 3, LONG).unwrap();

    let stats = search.tt_stats();
    assert!(stats.probes > 0);
    assert!(stats.stores > 0);
}

#[test]
fn test_terminal_state_has_no_action() {
    let mut state = GameState::new(2, 1).unwrap();
    let mut rng = GameRng::new(1);
    let mut plies = 0;
    while !state.is_terminal() {
        let agent = AzulRules.acting_player(&state);
        let actions = legal_actions(&state, agent);
        let action = actions[rng.gen_range_usize(0..actions.len())];
        apply(&mut state, &action, agent).unwrap();
        plies += 1;
        assert!(plies < 2_000);
    }

    let exact = search_exact(&state, PlayerId::new(0), 3, LONG).unwrap();
    assert!(exact.best_action.is_none());

    let mcts = search_mcts(&state, PlayerId::new(0), LONG, 50, RandomRollout).unwrap();
    assert!(mcts.best_action.is_none());
    assert_eq!(mcts.rollouts, 0);
}

#[test]
fn test_engines_agree_on_completed_row() {
    let mut state = GameState::new(2, 1).unwrap();
    state.edit_board(PlayerId::new(0), |board| {
        for tile in ALL_TILES {
            board.set_wall_tile(0, tile);
        }
    });
    assert!(state.is_terminal());
    assert_eq!(state.phase(), Phase::Drafting);

    for agent in PlayerId::all(2) {
        let exact = search_exact(&state, agent, 3, LONG).unwrap();
        let mcts = search_mcts(&state, agent, LONG, 20, RandomRollout).unwrap();
        assert!(exact.best_action.is_none());
        assert!(mcts.best_action.is_none());
    }
}

// =============================================================================
// MCTS
// =============================================================================

#[test]
fn test_mcts_runs_exact_rollout_budget() {
    let state = midgame(11, 4);
    let agent = state.current();

    for rollouts in [1, 17, 64] {
        let result = search_mcts(&state, agent, LONG, rollouts, HeuristicRollout::default()).unwrap();
        assert_eq!(result.rollouts, u64::from(rollouts));
        assert!(!result.budget_exhausted);
        assert!(legal_actions(&state, agent).contains(&result.best_action.unwrap()));
    }
}

#[test]
fn test_mcts_score_is_probability() {
    let state = midgame(2, 6);
    let result = search_mcts(&state, state.current(), LONG, 100, RandomRollout).unwrap();
    assert!((0.0..=1.0).contains(&result.score));
    assert!(result.avg_rollout_depth > 0.0);
}

#[test]
fn test_model_evaluation_values_leaves_without_playing() {
    let state = midgame(6, 2);
    let policy = ModelEvaluation::new(AzulEncoder::new(), ZeroValue::new(2));
    let result = search_mcts(&state, state.current(), LONG, 30, policy).unwrap();

    assert_eq!(result.rollouts, 30);
    assert_eq!(result.avg_rollout_depth, 0.0);
    assert!((result.score - 0.5).abs() < 1e-9);
}

#[test]
fn test_mcts_highest_value_selection() {
    let state = midgame(9, 3);
    let agent = state.current();
    let config = MCTSConfig::default()
        .with_final_selection(FinalSelection::HighestValue)
        .with_max_rollout_depth(30);
    let mut search = MCTSSearch::new(FastRules::new(), config);
    let result = search.search(&state, agent, 80, LONG).unwrap();

    let best = result.best_action.unwrap();
    let chosen = search
        .tree()
        .root_node()
        .edges
        .iter()
        .find(|e| e.action == best)
        .map(|e| e.mean_reward(agent))
        .unwrap();
    assert!(search
        .tree()
        .root_node()
        .edges
        .iter()
        .filter(|e| e.visits > 0)
        .all(|e| e.mean_reward(agent) <= chosen));
}

#[test]
fn test_mcts_seed_changes_search() {
    let state = midgame(4, 1);
    let agent = state.current();
    let visits = |seed| {
        let mut search = MCTSSearch::new(FastRules::new(), MCTSConfig::default().with_seed(seed));
        search.search(&state, agent, 60, LONG).unwrap();
        search.action_visits()
    };

    assert_eq!(visits(1), visits(1));
    assert_ne!(visits(1), visits(2));
}

// =============================================================================
// Positions and Cache
// =============================================================================

#[test]
fn test_search_from_identifier() {
    let state = midgame(12, 4);
    let id = format_position(&state).unwrap();
    let restored = parse_position(&id).unwrap();

    let a = search_exact(&state, state.current(), 2, LONG).unwrap();
    let b = search_exact(&restored, restored.current(), 2, LONG).unwrap();
    assert_eq!(a.best_action, b.best_action);
    assert_eq!(a.score, b.score);
}

#[test]
fn test_cache_reuses_analysis_across_identifiers() {
    let state = parse_position("initial:21").unwrap();
    let copy = parse_position(&format_position(&state).unwrap()).unwrap();
    let request = SearchRequest::Mcts {
        max_rollouts: 20,
        max_time_ms: 60_000,
        rollout: RolloutKind::Random,
    };
    let mut cache = InMemoryCache::new();

    let first = analyze(&state, state.current(), request, &mut cache).unwrap();
    let second = analyze(&copy, copy.current(), request, &mut cache).unwrap();

    assert_eq!(first, second);
    assert_eq!(cache.hits(), 1);
}
