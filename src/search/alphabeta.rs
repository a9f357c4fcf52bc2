//! Bounded-depth exact search.
//!
//! Minimax with alpha-beta pruning, iterative deepening and a transposition
//! table. Values are always from the searching agent's perspective: nodes
//! where that agent acts maximize, every other node minimizes.
//!
//! ## Depth
//!
//! Drafts cost one ply. Round-end bookkeeping is free. A position waiting
//! for the next deal is a leaf, since the refill is not known in advance.
//! Iterative deepening stops early once the depth covers every draft left
//! in the round.
//!
//! ## Budget
//!
//! The clock is checked at every node. An iteration cut short is thrown
//! away and the deepest completed one is returned. If not even depth 1
//! completes, the first ordered move is returned unsearched.

use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::core::{Action, GameState, Phase, PlayerId, TILE_COLORS};
use crate::error::{AzulError, Result};
use crate::rules::RulesEngine;

use super::config::SearchConfig;
use super::eval::{evaluate, final_margin, EVAL_SCALE};
use super::ordering::{order_actions, promote};
use super::result::SearchResult;
use super::tt::{Bound, InMemoryTT, TTEntry, TTStats, TranspositionTable};

const INF: i32 = 1_000_000;

/// Upper bound on the drafts left before the round ends.
///
/// A factory draft empties that factory and a center draft removes one
/// color from the center, so every draft consumes a factory or a color.
#[must_use]
pub fn max_round_plies(state: &GameState) -> u32 {
    match state.phase() {
        Phase::GameOver => 0,
        Phase::RoundEnd => 1,
        Phase::RoundStart => (state.factories().len() + TILE_COLORS) as u32,
        Phase::Drafting => {
            let mut colors = *state.center().counts();
            let mut factories = 0;
            for factory in state.factories().iter().filter(|f| !f.is_empty()) {
                factories += 1;
                for (tile, n) in factory.iter() {
                    colors[tile.index()] += n;
                }
            }
            factories + colors.iter().filter(|&&n| n > 0).count() as u32
        }
    }
}

/// Alpha-beta search context.
///
/// Owns the engine, the configuration and the transposition table. The
/// table is cleared at the start of every search.
pub struct AlphaBetaSearch<E: RulesEngine> {
    engine: E,
    config: SearchConfig,
    tt: InMemoryTT,

    // Per-search state
    root_agent: PlayerId,
    deadline: Option<Instant>,
    nodes: u64,
    aborted: bool,
}

impl<E: RulesEngine> AlphaBetaSearch<E> {
    pub fn new(engine: E, config: SearchConfig) -> Self {
        let tt = InMemoryTT::with_capacity(config.tt_capacity);
        Self {
            engine,
            config,
            tt,
            root_agent: PlayerId::new(0),
            deadline: None,
            nodes: 0,
            aborted: false,
        }
    }

    /// Search `state` for `agent` to at most `max_depth` drafts or until
    /// `max_time` has passed.
    ///
    /// Fails only for an agent id outside the game or an unsound transition.
    pub fn search(
        &mut self,
        state: &GameState,
        agent: PlayerId,
        max_depth: u32,
        max_time: Duration,
    ) -> Result<SearchResult> {
        if agent.index() >= state.player_count() {
            return Err(AzulError::InvalidOperation("agent index out of range"));
        }

        let start = Instant::now();
        self.tt.clear();
        self.root_agent = agent;
        self.deadline = start.checked_add(max_time);
        self.nodes = 0;
        self.aborted = false;

        if self.is_finished(state) {
            return Ok(SearchResult::no_action(f64::from(final_margin(state, agent))));
        }

        let mut actions = self.engine.legal_actions(state, agent);
        if actions.is_empty() {
            let score = f64::from(evaluate(state, agent)) / f64::from(EVAL_SCALE);
            return Ok(SearchResult::no_action(score));
        }
        if self.config.move_ordering {
            order_actions(&mut actions, state, agent, &[]);
        }

        let limit = max_depth.min(max_round_plies(state).max(1));
        let mut best: Option<(i32, Vec<Action>)> = None;
        let mut depth_reached = 0;
        let mut exhausted = false;

        for depth in 1..=limit {
            if self.out_of_time() {
                exhausted = true;
                break;
            }
            if self.config.move_ordering {
                if let Some(pv_move) = best.as_ref().and_then(|(_, pv)| pv.first()) {
                    promote(&mut actions, &[*pv_move]);
                }
            }

            let (value, pv) = self.search_root(state, &actions, depth)?;
            if self.aborted {
                exhausted = true;
                break;
            }
            trace!("depth {depth}: value {value}, pv {pv:?}, {} nodes", self.nodes);
            best = Some((value, pv));
            depth_reached = depth;
        }

        let (value, principal_variation) = match best {
            Some(found) => found,
            None => {
                warn!("search budget expired before depth 1; returning first ordered move");
                exhausted = true;
                (evaluate(state, agent), vec![actions[0]])
            }
        };

        let elapsed = start.elapsed();
        debug!(
            "alpha-beta: depth {depth_reached}/{max_depth}, {} nodes, {elapsed:?}, tt hit rate {:.2}",
            self.nodes,
            self.tt.stats().hit_rate()
        );

        Ok(SearchResult {
            best_action: principal_variation.first().copied(),
            score: f64::from(value) / f64::from(EVAL_SCALE),
            principal_variation,
            nodes: self.nodes,
            rollouts: 0,
            elapsed,
            depth_reached,
            avg_rollout_depth: 0.0,
            budget_exhausted: exhausted,
        })
    }

    fn search_root(&mut self, state: &GameState, actions: &[Action], depth: u32) -> Result<(i32, Vec<Action>)> {
        self.nodes += 1;
        let mut alpha = -INF;
        let mut best_value = -INF;
        let mut best_pv = Vec::new();

        for action in actions {
            let child = self.engine.successor(state, self.root_agent, action)?;
            let (value, line) = self.alphabeta(&child, ply_depth(action, depth), alpha, INF)?;
            if self.aborted {
                break;
            }
            // Strict comparison: ties go to the earlier move
            if value > best_value {
                best_value = value;
                best_pv = std::iter::once(*action).chain(line).collect();
            }
            alpha = alpha.max(value);
        }
        Ok((best_value, best_pv))
    }

    fn alphabeta(&mut self, state: &GameState, depth: u32, mut alpha: i32, mut beta: i32) -> Result<(i32, Vec<Action>)> {
        self.nodes += 1;
        if self.out_of_time() {
            self.aborted = true;
            return Ok((0, Vec::new()));
        }

        if self.is_finished(state) {
            return Ok((final_margin(state, self.root_agent) * EVAL_SCALE, Vec::new()));
        }

        match state.phase() {
            Phase::RoundStart => return Ok((evaluate(state, self.root_agent), Vec::new())),
            Phase::RoundEnd if depth == 0 && self.config.round_quiescence => {
                let acting = self.engine.acting_player(state);
                let settled = self.engine.successor(state, acting, &Action::EndRound)?;
                return Ok((evaluate(&settled, self.root_agent), vec![Action::EndRound]));
            }
            _ if depth == 0 => return Ok((evaluate(state, self.root_agent), Vec::new())),
            _ => {}
        }

        let key = state.zobrist();
        let (alpha_orig, beta_orig) = (alpha, beta);
        let mut tt_move = None;
        if self.config.tt_capacity > 0 {
            if let Some(entry) = self.tt.probe(key) {
                if u32::from(entry.depth) >= depth {
                    match entry.bound {
                        Bound::Exact => return Ok((entry.value, entry.best_move.into_iter().collect())),
                        Bound::Lower => alpha = alpha.max(entry.value),
                        Bound::Upper => beta = beta.min(entry.value),
                    }
                    if alpha >= beta {
                        return Ok((entry.value, entry.best_move.into_iter().collect()));
                    }
                }
                tt_move = entry.best_move;
            }
        }

        let acting = self.engine.acting_player(state);
        let mut actions = self.engine.legal_actions(state, acting);
        if actions.is_empty() {
            return Ok((evaluate(state, self.root_agent), Vec::new()));
        }
        if self.config.move_ordering {
            let hints: Vec<Action> = tt_move.into_iter().collect();
            order_actions(&mut actions, state, acting, &hints);
        }

        let maximizing = acting == self.root_agent;
        let mut best_value = if maximizing { -INF } else { INF };
        let mut best_pv: Vec<Action> = Vec::new();

        for action in &actions {
            let child = self.engine.successor(state, acting, action)?;
            let (value, line) = self.alphabeta(&child, ply_depth(action, depth), alpha, beta)?;
            if self.aborted {
                return Ok((0, Vec::new()));
            }

            let better = if maximizing { value > best_value } else { value < best_value };
            if better {
                best_value = value;
                best_pv = std::iter::once(*action).chain(line).collect();
            }
            if maximizing {
                alpha = alpha.max(value);
            } else {
                beta = beta.min(value);
            }
            if alpha >= beta {
                break;
            }
        }

        if self.config.tt_capacity > 0 {
            let bound = if best_value <= alpha_orig {
                Bound::Upper
            } else if best_value >= beta_orig {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.tt.store(
                key,
                TTEntry {
                    value: best_value,
                    depth: depth.min(u32::from(u8::MAX)) as u8,
                    bound,
                    best_move: best_pv.first().copied(),
                },
            );
        }
        Ok((best_value, best_pv))
    }

    /// A completed wall row ends the game, whatever the phase says.
    fn is_finished(&self, state: &GameState) -> bool {
        state.phase() == Phase::GameOver || self.engine.is_terminal(state).is_some()
    }

    #[inline]
    fn out_of_time(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

/// Depth left after playing `action`; pseudo actions are free.
fn ply_depth(action: &Action, depth: u32) -> u32 {
    if action.is_pseudo() {
        depth
    } else {
        depth.saturating_sub(1)
    }
}
