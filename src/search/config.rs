//! Exact search configuration.

use serde::{Deserialize, Serialize};

/// Alpha-beta configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum transposition table entries (0 disables the table).
    pub tt_capacity: usize,

    /// Sort moves by heuristic score, with PV and table moves first.
    /// When off, moves are searched in generator order.
    pub move_ordering: bool,

    /// At the depth horizon, score a pending round end before evaluating
    /// instead of evaluating the unscored position.
    pub round_quiescence: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tt_capacity: 1 << 20,
            move_ordering: true,
            round_quiescence: true,
        }
    }
}

impl SearchConfig {
    pub fn with_tt_capacity(mut self, capacity: usize) -> Self {
        self.tt_capacity = capacity;
        self
    }

    pub fn with_move_ordering(mut self, enabled: bool) -> Self {
        self.move_ordering = enabled;
        self
    }

    pub fn with_round_quiescence(mut self, enabled: bool) -> Self {
        self.round_quiescence = enabled;
        self
    }
}
