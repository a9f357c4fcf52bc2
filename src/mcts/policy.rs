//! MCTS policies for selection and rollouts.
//!
//! Policies are trait-based to allow customization:
//! - `SelectionPolicy`: How to choose which child to explore (UCB1)
//! - `RolloutPolicy`: How to value a leaf (random playout, heuristic
//!   playout, external model)
//!
//! Rollout values are win probabilities for the agent asked about, in
//! `[0, 1]`. `value_to_rewards` spreads one value over both agents.

use crate::core::{Action, GameRng, GameState, PlayerId, PlayerMap};
use crate::error::Result;
use crate::nn::{StateEncoder, ValueNetwork};
use crate::rules::{GameResult, RulesEngine};
use crate::search::{action_score, win_probability};

use super::config::MCTSConfig;
use super::node::MCTSNode;

// =============================================================================
// Selection Policy
// =============================================================================

/// Policy for selecting which child node to explore.
pub trait SelectionPolicy: Send + Sync {
    /// Select the best edge index from a node, for the agent to move there.
    fn select(&self, node: &MCTSNode, player: PlayerId, config: &MCTSConfig) -> usize;
}

/// UCB1 (Upper Confidence Bound) selection policy.
///
/// Balances exploitation (high reward) with exploration (low visits).
/// Formula: Q(a) + c * sqrt(ln(N) / n(a))
#[derive(Clone, Debug, Default)]
pub struct UCB1;

impl SelectionPolicy for UCB1 {
    fn select(&self, node: &MCTSNode, player: PlayerId, config: &MCTSConfig) -> usize {
        if node.edges.is_empty() {
            return 0;
        }

        let ln_parent = (node.visits.max(1) as f64).ln();

        node.edges
            .iter()
            .enumerate()
            .map(|(i, edge)| {
                let exploitation = edge.mean_reward(player);
                let exploration = if edge.visits == 0 {
                    f64::INFINITY
                } else {
                    config.exploration_constant * (ln_parent / edge.visits as f64).sqrt()
                };
                (i, exploitation + exploration)
            })
            .fold((0, f64::NEG_INFINITY), |best, (i, score)| if score > best.1 { (i, score) } else { best })
            .0
    }
}

// =============================================================================
// Rollout Policy
// =============================================================================

/// Outcome of one rollout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rollout {
    /// Win probability for the agent the rollout was run for.
    pub value: f64,
    /// Actions played before the value was taken.
    pub depth: u32,
}

/// Policy for valuing a leaf of the tree.
///
/// `rollout` may play the state forward; the state is a private copy.
/// `evaluate` values a position without playing it, and is what a rollout
/// falls back on when it is cut off.
pub trait RolloutPolicy<E: RulesEngine>: Send + Sync {
    fn rollout(
        &self,
        engine: &E,
        state: &mut GameState,
        agent: PlayerId,
        rng: &mut GameRng,
        max_depth: u32,
    ) -> Result<Rollout>;

    fn evaluate(&self, state: &GameState, agent: PlayerId) -> f64 {
        win_probability(state, agent)
    }
}

/// Uniformly random playout.
#[derive(Clone, Debug, Default)]
pub struct RandomRollout;

impl<E: RulesEngine> RolloutPolicy<E> for RandomRollout {
    fn rollout(
        &self,
        engine: &E,
        state: &mut GameState,
        agent: PlayerId,
        rng: &mut GameRng,
        max_depth: u32,
    ) -> Result<Rollout> {
        play_out(
            engine,
            state,
            agent,
            rng,
            max_depth,
            |_, _, actions, rng| rng.gen_range_usize(0..actions.len()),
            |s, a| RolloutPolicy::<E>::evaluate(self, s, a),
        )
    }
}

/// Epsilon-greedy playout over the move-ordering heuristic.
///
/// With probability `epsilon` a uniformly random action is played,
/// otherwise the highest-scoring one (earliest on ties).
#[derive(Clone, Debug)]
pub struct HeuristicRollout {
    pub epsilon: f64,
}

impl Default for HeuristicRollout {
    fn default() -> Self {
        Self { epsilon: 0.1 }
    }
}

impl HeuristicRollout {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    fn pick(&self, state: &GameState, acting: PlayerId, actions: &[Action], rng: &mut GameRng) -> usize {
        if rng.gen_bool(self.epsilon) {
            return rng.gen_range_usize(0..actions.len());
        }
        let mut best = 0;
        let mut best_score = i32::MIN;
        for (i, action) in actions.iter().enumerate() {
            let score = action_score(state, acting, action);
            if score > best_score {
                best = i;
                best_score = score;
            }
        }
        best
    }
}

impl<E: RulesEngine> RolloutPolicy<E> for HeuristicRollout {
    fn rollout(
        &self,
        engine: &E,
        state: &mut GameState,
        agent: PlayerId,
        rng: &mut GameRng,
        max_depth: u32,
    ) -> Result<Rollout> {
        play_out(
            engine,
            state,
            agent,
            rng,
            max_depth,
            |s, acting, actions, rng| self.pick(s, acting, actions, rng),
            |s, a| RolloutPolicy::<E>::evaluate(self, s, a),
        )
    }
}

/// Leaf evaluation by an external value model, without playing out.
///
/// The network returns one value per agent id in `[-1, 1]`.
pub struct ModelEvaluation<N: StateEncoder, V: ValueNetwork> {
    encoder: N,
    network: V,
}

impl<N: StateEncoder, V: ValueNetwork> ModelEvaluation<N, V> {
    pub fn new(encoder: N, network: V) -> Self {
        Self { encoder, network }
    }

    #[must_use]
    pub fn encoder(&self) -> &N {
        &self.encoder
    }
}

impl<E: RulesEngine, N: StateEncoder, V: ValueNetwork> RolloutPolicy<E> for ModelEvaluation<N, V> {
    fn rollout(
        &self,
        engine: &E,
        state: &mut GameState,
        agent: PlayerId,
        _rng: &mut GameRng,
        _max_depth: u32,
    ) -> Result<Rollout> {
        let value = match engine.is_terminal(state) {
            Some(result) => result_value(&result, agent),
            None => RolloutPolicy::<E>::evaluate(self, state, agent),
        };
        Ok(Rollout { value, depth: 0 })
    }

    fn evaluate(&self, state: &GameState, agent: PlayerId) -> f64 {
        let encoded = self.encoder.encode(state, agent);
        let values = self.network.predict(&encoded);
        match values.get(agent.index()) {
            Some(&v) => ((f64::from(v) + 1.0) / 2.0).clamp(0.0, 1.0),
            None => 0.5,
        }
    }
}

/// Play `state` forward with `pick` until the game ends or `max_depth`
/// actions (0 = unlimited) have been played.
fn play_out<E: RulesEngine>(
    engine: &E,
    state: &mut GameState,
    agent: PlayerId,
    rng: &mut GameRng,
    max_depth: u32,
    mut pick: impl FnMut(&GameState, PlayerId, &[Action], &mut GameRng) -> usize,
    evaluate: impl Fn(&GameState, PlayerId) -> f64,
) -> Result<Rollout> {
    let mut depth = 0;
    loop {
        if let Some(result) = engine.is_terminal(state) {
            return Ok(Rollout {
                value: result_value(&result, agent),
                depth,
            });
        }
        if max_depth > 0 && depth >= max_depth {
            break;
        }

        let acting = engine.acting_player(state);
        let actions = engine.legal_actions(state, acting);
        if actions.is_empty() {
            break;
        }
        let idx = pick(state, acting, &actions, rng);
        engine.apply_action(state, acting, &actions[idx])?;
        depth += 1;
    }
    Ok(Rollout {
        value: evaluate(state, agent),
        depth,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Value of a finished game for `agent`: 1 win, 0.5 draw, 0 loss.
#[must_use]
pub fn result_value(result: &GameResult, agent: PlayerId) -> f64 {
    match result {
        GameResult::Winner(winner) if *winner == agent => 1.0,
        GameResult::Winner(_) => 0.0,
        GameResult::Draw => 0.5,
    }
}

/// Convert a game result to per-player rewards.
pub fn result_to_rewards(result: &GameResult, player_count: usize) -> PlayerMap<f64> {
    PlayerMap::new(player_count, |player| result_value(result, player))
}

/// Spread one agent's win probability over every agent.
///
/// Two agents only: the other agent gets the complement.
pub fn value_to_rewards(value: f64, agent: PlayerId, player_count: usize) -> PlayerMap<f64> {
    PlayerMap::new(player_count, |player| if player == agent { value } else { 1.0 - value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Draft, Phase, Source, Tile};
    use crate::mcts::node::Edge;
    use crate::nn::{AzulEncoder, ZeroValue};
    use crate::rules::FastRules;

    fn floor_draft(factory: u8) -> Action {
        Action::Draft(Draft {
            source: Source::Factory(factory),
            tile: Tile::Black,
            count: 1,
            line: None,
            to_line: 0,
            to_floor: 1,
        })
    }

    fn make_test_node() -> MCTSNode {
        let mut node = MCTSNode::root(PlayerId::new(0));

        // Edge 0: high reward, many visits
        let mut e0 = Edge::new(floor_draft(0), 2);
        e0.visits = 100;
        e0.total_reward[PlayerId::new(0)] = 80.0;

        // Edge 1: lower reward, fewer visits
        let mut e1 = Edge::new(floor_draft(1), 2);
        e1.visits = 10;
        e1.total_reward[PlayerId::new(0)] = 7.0;

        // Edge 2: unvisited (infinite exploration bonus)
        let e2 = Edge::new(floor_draft(2), 2);

        node.edges.push(e0);
        node.edges.push(e1);
        node.edges.push(e2);
        node.visits = 111;

        node
    }

    #[test]
    fn test_ucb1_selects_unvisited() {
        let node = make_test_node();
        let selected = UCB1.select(&node, PlayerId::new(0), &MCTSConfig::default());
        assert_eq!(selected, 2);
    }

    #[test]
    fn test_ucb1_exploits_without_exploration() {
        let mut node = make_test_node();
        node.edges[2].visits = 5;
        node.edges[2].total_reward[PlayerId::new(0)] = 2.0;

        for edge in node.edges.iter_mut() {
            edge.total_reward[PlayerId::new(1)] = edge.visits as f64 - edge.total_reward[PlayerId::new(0)];
        }

        // Means for agent 0 are 0.8, 0.7, 0.4
        let config = MCTSConfig::default().with_exploration(0.0);
        assert_eq!(UCB1.select(&node, PlayerId::new(0), &config), 0);
        assert_eq!(UCB1.select(&node, PlayerId::new(1), &config), 2);
    }

    #[test]
    fn test_result_to_rewards() {
        let rewards = result_to_rewards(&GameResult::Winner(PlayerId::new(1)), 2);
        assert_eq!(rewards[PlayerId::new(0)], 0.0);
        assert_eq!(rewards[PlayerId::new(1)], 1.0);

        let rewards = result_to_rewards(&GameResult::Draw, 2);
        assert_eq!(rewards[PlayerId::new(0)], 0.5);
    }

    #[test]
    fn test_value_to_rewards() {
        let rewards = value_to_rewards(0.75, PlayerId::new(1), 2);
        assert_eq!(rewards[PlayerId::new(1)], 0.75);
        assert_eq!(rewards[PlayerId::new(0)], 0.25);
    }

    #[test]
    fn test_random_rollout_plays_to_game_end() {
        let mut state = GameState::new(2, 8).unwrap();
        let mut rng = GameRng::new(1);
        let rollout = RandomRollout
            .rollout(&FastRules::new(), &mut state, PlayerId::new(0), &mut rng, 0)
            .unwrap();

        assert_eq!(state.phase(), Phase::GameOver);
        assert!(rollout.depth > 0);
        assert!([0.0, 0.5, 1.0].contains(&rollout.value));
    }

    #[test]
    fn test_rollout_depth_limit() {
        let mut state = GameState::new(2, 8).unwrap();
        let mut rng = GameRng::new(1);
        let rollout = HeuristicRollout::default()
            .rollout(&FastRules::new(), &mut state, PlayerId::new(0), &mut rng, 3)
            .unwrap();

        assert_eq!(rollout.depth, 3);
        assert!((0.0..=1.0).contains(&rollout.value));
    }

    #[test]
    fn test_heuristic_pick_is_greedy_without_epsilon() {
        let state = GameState::new(2, 8).unwrap();
        let agent = state.current();
        let actions = crate::rules::legal_actions(&state, agent);
        let mut rng = GameRng::new(3);

        let idx = HeuristicRollout::new(0.0).pick(&state, agent, &actions, &mut rng);
        let best = actions.iter().map(|a| action_score(&state, agent, a)).max().unwrap();
        assert_eq!(action_score(&state, agent, &actions[idx]), best);
    }

    #[test]
    fn test_model_evaluation_zero_value_is_even() {
        let mut state = GameState::new(2, 8).unwrap();
        let policy = ModelEvaluation::new(AzulEncoder::new(), ZeroValue::new(2));
        let mut rng = GameRng::new(1);

        let rollout = RolloutPolicy::<FastRules>::rollout(&policy, &FastRules::new(), &mut state, PlayerId::new(1), &mut rng, 0)
            .unwrap();
        assert_eq!(rollout, Rollout { value: 0.5, depth: 0 });
    }
}
