//! Rules engine trait used by the search engines.
//!
//! Search is generic over `RulesEngine` so the canonical enumeration and the
//! fast generator can be swapped without touching the search code:
//! - `AzulRules`: canonical `legal_actions`
//! - `FastRules`: the bitmask `MoveGenerator`
//!
//! Both apply actions through the same transition.

use crate::core::{GameState, PlayerId, Action};
use crate::error::Result;

use super::movegen::MoveGenerator;
use super::transition;

/// Result of a finished game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Equal scores and equal complete rows.
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Draw => false,
        }
    }

    /// Decide a finished game: highest score, then most complete rows.
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        let mut best: Option<(PlayerId, (i32, usize))> = None;
        let mut tied = false;
        for (agent, board) in state.boards().iter() {
            let key = (board.score(), board.completed_rows());
            match best {
                Some((_, b)) if key < b => {}
                Some((_, b)) if key == b => tied = true,
                _ => {
                    best = Some((agent, key));
                    tied = false;
                }
            }
        }
        match best {
            Some((agent, _)) if !tied => GameResult::Winner(agent),
            _ => GameResult::Draw,
        }
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_actions`: empty if the agent can't act
/// - `apply_action`: deterministic for a given state value
/// - `is_terminal`: `None` while the game continues
pub trait RulesEngine {
    /// Legal actions for an agent.
    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action>;

    /// Apply an action produced by `legal_actions`.
    fn apply_action(&self, state: &mut GameState, player: PlayerId, action: &Action) -> Result<()>;

    /// Check if the game is over.
    fn is_terminal(&self, state: &GameState) -> Option<GameResult> {
        state.is_terminal().then(|| GameResult::from_state(state))
    }

    // === Convenience Methods ===

    /// The agent whose turn it is.
    ///
    /// Round boundaries are taken by the agent who opens the next round.
    fn acting_player(&self, state: &GameState) -> PlayerId {
        state.to_move().unwrap_or_else(|| state.first_agent())
    }

    /// Clone and apply.
    fn successor(&self, state: &GameState, player: PlayerId, action: &Action) -> Result<GameState> {
        let mut next = state.clone();
        self.apply_action(&mut next, player, action)?;
        Ok(next)
    }
}

/// Canonical rules: validated application, reference enumeration.
#[derive(Clone, Copy, Debug, Default)]
pub struct AzulRules;

impl RulesEngine for AzulRules {
    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action> {
        transition::legal_actions(state, player)
    }

    fn apply_action(&self, state: &mut GameState, player: PlayerId, action: &Action) -> Result<()> {
        transition::apply(state, action, player)
    }
}

/// Search rules: bitmask generation, unvalidated application.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastRules {
    generator: MoveGenerator,
}

impl FastRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn generator(&self) -> &MoveGenerator {
        &self.generator
    }
}

impl RulesEngine for FastRules {
    fn legal_actions(&self, state: &GameState, player: PlayerId) -> Vec<Action> {
        self.generator.generate(state, player)
    }

    fn apply_action(&self, state: &mut GameState, player: PlayerId, action: &Action) -> Result<()> {
        transition::apply_unchecked(state, action, player)
    }
}
