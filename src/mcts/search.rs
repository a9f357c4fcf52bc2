//! Core MCTS search algorithm.
//!
//! Every agent's decisions are expanded in the tree; drafting is perfect
//! information. The one hidden element, the next deal, is handled by stopping
//! the tree at positions waiting for a refill: rollouts from there reshuffle
//! the undrawn bag so each one samples a different deal.
//!
//! Each iteration selects down the tree with the selection policy, expands
//! at most one node and runs exactly one rollout (a terminal leaf counts as a
//! rollout of depth 0), then backpropagates the result. The time budget is
//! checked between iterations.

use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::core::{Action, GameRng, GameState, Phase, PlayerId, PlayerMap};
use crate::error::{AzulError, Result};
use crate::rules::RulesEngine;
use crate::search::SearchResult;

use super::config::{FinalSelection, MCTSConfig};
use super::node::{Edge, MCTSNode, NodeId};
use super::policy::{
    result_to_rewards, result_value, value_to_rewards, RandomRollout, RolloutPolicy, SelectionPolicy, UCB1,
};
use super::stats::SearchStats;
use super::tree::MCTSTree;

/// Main MCTS search context.
///
/// Generic over the rules engine type. Owns the search tree and
/// configuration, and provides methods to run searches.
pub struct MCTSSearch<E: RulesEngine> {
    engine: E,
    config: MCTSConfig,
    tree: MCTSTree,

    /// Expansion order and rollout randomness, reset from the config seed
    /// at the start of every search.
    rng: GameRng,

    selection: Box<dyn SelectionPolicy>,
    rollout: Box<dyn RolloutPolicy<E>>,

    /// Agent the search is run for.
    root_agent: PlayerId,

    stats: SearchStats,
}

impl<E: RulesEngine> MCTSSearch<E> {
    /// Create a new MCTS search context with UCB1 and random rollouts.
    pub fn new(engine: E, config: MCTSConfig) -> Self {
        let rng = GameRng::new(config.seed);
        let tree = MCTSTree::with_capacity(PlayerId::new(0), 2, config.max_nodes);

        Self {
            engine,
            config,
            tree,
            rng,
            selection: Box::new(UCB1),
            rollout: Box::new(RandomRollout),
            root_agent: PlayerId::new(0),
            stats: SearchStats::default(),
        }
    }

    /// Set a custom selection policy.
    pub fn with_selection<S: SelectionPolicy + 'static>(mut self, selection: S) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Set a custom rollout policy.
    pub fn with_rollout<P: RolloutPolicy<E> + 'static>(mut self, rollout: P) -> Self {
        self.rollout = Box::new(rollout);
        self
    }

    /// Run up to `max_rollouts` iterations for `agent`, stopping early when
    /// `max_time` has passed.
    ///
    /// A terminal root, or an agent with nothing to do, returns a result with
    /// no action and no rollouts.
    pub fn search(
        &mut self,
        state: &GameState,
        agent: PlayerId,
        max_rollouts: u32,
        max_time: Duration,
    ) -> Result<SearchResult> {
        if agent.index() >= state.player_count() {
            return Err(AzulError::InvalidOperation("agent index out of range"));
        }

        let start = Instant::now();
        let deadline = start.checked_add(max_time);
        self.stats.reset();
        self.rng = GameRng::new(self.config.seed);
        self.root_agent = agent;
        self.tree = MCTSTree::with_capacity(agent, state.player_count(), self.config.max_nodes);

        if let Some(result) = self.engine.is_terminal(state) {
            return Ok(SearchResult::no_action(result_value(&result, agent)));
        }

        let actions = self.engine.legal_actions(state, agent);
        if actions.is_empty() {
            return Ok(SearchResult::no_action(self.rollout.evaluate(state, agent)));
        }
        let player_count = state.player_count();
        let root = self.tree.root_node_mut();
        root.edges.extend(actions.into_iter().map(|a| Edge::new(a, player_count)));
        self.stats.nodes_expanded += 1;

        let mut exhausted = false;
        for _ in 0..max_rollouts {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                exhausted = true;
                break;
            }
            let mut sim_state = state.clone();
            self.iteration(&mut sim_state)?;
            self.stats.iterations += 1;
        }

        let elapsed = start.elapsed();
        self.stats.time_us = elapsed.as_micros() as u64;

        let (best_action, score, principal_variation) = match self.best_edge() {
            Some(edge) => {
                let mut line = vec![edge.action];
                if edge.is_expanded() {
                    line.extend(self.tree.principal_variation_from(edge.child));
                }
                (edge.action, edge.mean_reward(agent), line)
            }
            None => {
                warn!("search budget expired before the first rollout; returning first move");
                exhausted = true;
                let first = self.tree.root_node().edges[0].action;
                (first, self.rollout.evaluate(state, agent), vec![first])
            }
        };

        debug!(
            "mcts: {} rollouts, {} nodes, depth {}, avg rollout depth {:.1}, {elapsed:?}",
            self.stats.rollouts,
            self.tree.len(),
            self.stats.max_depth,
            self.stats.avg_rollout_depth()
        );

        Ok(SearchResult {
            best_action: Some(best_action),
            score,
            principal_variation,
            nodes: self.tree.len() as u64,
            rollouts: u64::from(self.stats.rollouts),
            elapsed,
            depth_reached: u32::from(self.stats.max_depth),
            avg_rollout_depth: self.stats.avg_rollout_depth(),
            budget_exhausted: exhausted,
        })
    }

    /// Single MCTS iteration: select, expand, roll out, backpropagate.
    fn iteration(&mut self, state: &mut GameState) -> Result<()> {
        let mut path: Vec<(NodeId, usize)> = Vec::new();
        let mut current = self.tree.root();

        loop {
            let node = self.tree.get(current);

            if node.is_terminal {
                let rewards = node
                    .terminal_reward
                    .clone()
                    .unwrap_or_else(|| PlayerMap::with_value(self.tree.player_count(), 0.5));
                self.stats.rollouts += 1;
                self.backpropagate(&path, &rewards);
                return Ok(());
            }

            let tree_full = self.tree.len() >= self.config.max_nodes;
            if node.is_leaf() || node.edges.is_empty() || (tree_full && node.has_unexpanded()) {
                return self.rollout_from(state, &path);
            }

            let to_move = node.to_move;

            if !node.is_fully_expanded() {
                let edge_idx = self.select_unexpanded(current);
                path.push((current, edge_idx));

                let action = self.tree.get(current).edges[edge_idx].action;
                self.engine.apply_action(state, to_move, &action)?;

                let child = self.expand_child(current, edge_idx, state);
                if self.tree.get(child).is_terminal {
                    current = child;
                    continue;
                }
                return self.rollout_from(state, &path);
            }

            let edge_idx = self.selection.select(node, to_move, &self.config);
            path.push((current, edge_idx));

            let edge = &self.tree.get(current).edges[edge_idx];
            let (action, child) = (edge.action, edge.child);
            self.engine.apply_action(state, to_move, &action)?;
            current = child;
        }
    }

    /// Reshuffle the undrawn bag, roll out and backpropagate.
    ///
    /// Each rollout draws from its own fork of the search RNG.
    fn rollout_from(&mut self, state: &mut GameState, path: &[(NodeId, usize)]) -> Result<()> {
        let mut rollout_rng = self.rng.fork();
        state.reseed(rollout_rng.next_u64());
        let rollout = self.rollout.rollout(
            &self.engine,
            state,
            self.root_agent,
            &mut rollout_rng,
            self.config.max_rollout_depth,
        )?;

        self.stats.rollouts += 1;
        self.stats.rollout_actions += u64::from(rollout.depth);

        let rewards = value_to_rewards(rollout.value, self.root_agent, self.tree.player_count());
        self.backpropagate(path, &rewards);
        Ok(())
    }

    /// Fill a freshly allocated node from its state.
    fn expand_node(&mut self, node_id: NodeId, state: &GameState) {
        let player_count = self.tree.player_count();
        self.stats.nodes_expanded += 1;

        if let Some(result) = self.engine.is_terminal(state) {
            let node = self.tree.get_mut(node_id);
            node.is_terminal = true;
            node.terminal_reward = Some(result_to_rewards(&result, player_count));
            return;
        }

        if state.phase() == Phase::RoundStart {
            self.tree.get_mut(node_id).is_boundary = true;
            return;
        }

        let player = self.tree.get(node_id).to_move;
        let actions = self.engine.legal_actions(state, player);
        let node = self.tree.get_mut(node_id);
        node.edges.extend(actions.into_iter().map(|a| Edge::new(a, player_count)));
    }

    /// Select an unexpanded edge randomly.
    fn select_unexpanded(&mut self, node_id: NodeId) -> usize {
        let unexpanded: Vec<usize> = self.tree.get(node_id).unexpanded_edges().collect();
        match unexpanded.len() {
            0 => 0,
            1 => unexpanded[0],
            n => unexpanded[self.rng.gen_range_usize(0..n)],
        }
    }

    /// Allocate and expand the child behind an edge.
    fn expand_child(&mut self, parent_id: NodeId, edge_idx: usize, state: &GameState) -> NodeId {
        let depth = self.tree.get(parent_id).depth + 1;
        let to_move = self.engine.acting_player(state);

        if depth > self.stats.max_depth {
            self.stats.max_depth = depth;
        }

        let child = MCTSNode::new(parent_id, edge_idx as u16, to_move, depth);
        let child_id = self.tree.alloc(child);
        self.tree.get_mut(parent_id).edges[edge_idx].child = child_id;

        self.expand_node(child_id, state);
        child_id
    }

    /// Backpropagate rewards through the path.
    fn backpropagate(&mut self, path: &[(NodeId, usize)], rewards: &PlayerMap<f64>) {
        if path.is_empty() {
            self.tree.root_node_mut().visits += 1;
            return;
        }

        for &(node_id, edge_idx) in path.iter().rev() {
            let node = self.tree.get_mut(node_id);
            node.visits += 1;

            let edge = &mut node.edges[edge_idx];
            edge.visits += 1;
            for (player, reward) in rewards.iter() {
                edge.total_reward[player] += *reward;
            }
        }
    }

    /// Root edge chosen by the final selection rule, if any was visited.
    fn best_edge(&self) -> Option<&Edge> {
        let root = self.tree.root_node();
        match self.config.final_selection {
            FinalSelection::MostVisited => root.best_edge_by_visits().filter(|e| e.visits > 0),
            FinalSelection::HighestValue => root.best_edge_by_reward(self.root_agent),
        }
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[must_use]
    pub fn tree(&self) -> &MCTSTree {
        &self.tree
    }

    /// Get action visit counts from root (for training).
    ///
    /// Returns (action, visit_count) pairs.
    pub fn action_visits(&self) -> Vec<(Action, u32)> {
        self.tree
            .root_node()
            .edges
            .iter()
            .map(|e| (e.action, e.visits))
            .collect()
    }

    /// Get action probabilities from root (for training).
    ///
    /// Returns (action, probability) pairs where probabilities sum to ~1.0.
    pub fn action_probabilities(&self) -> Vec<(Action, f64)> {
        let root = self.tree.root_node();
        let total: u32 = root.edges.iter().map(|e| e.visits).sum();

        if total == 0 {
            let uniform = 1.0 / root.edges.len().max(1) as f64;
            return root.edges.iter().map(|e| (e.action, uniform)).collect();
        }

        root.edges
            .iter()
            .map(|e| (e.action, e.visits as f64 / total as f64))
            .collect()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }
}
