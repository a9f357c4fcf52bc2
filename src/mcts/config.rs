//! MCTS configuration parameters.

use serde::{Deserialize, Serialize};

/// How the move is picked from the root once the budget is spent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalSelection {
    /// Most visits; the robust choice.
    #[default]
    MostVisited,
    /// Highest mean reward among visited edges.
    HighestValue,
}

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MCTSConfig {
    /// UCB1 exploration constant (default: sqrt(2) = 1.414).
    /// Higher values favor exploration over exploitation.
    pub exploration_constant: f64,

    /// Random seed for expansion order and rollout deals.
    /// Same seed produces deterministic searches.
    pub seed: u64,

    /// Maximum actions per rollout before it is cut off and evaluated
    /// statically (0 = play to the end of the game).
    pub max_rollout_depth: u32,

    /// Maximum nodes to allocate in the tree.
    /// Once reached, iterations keep rolling out from existing leaves.
    pub max_nodes: usize,

    /// Root move selection rule.
    pub final_selection: FinalSelection,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            seed: 42,
            max_rollout_depth: 0,
            max_nodes: 100_000,
            final_selection: FinalSelection::MostVisited,
        }
    }
}

impl MCTSConfig {
    /// Create a new config with custom exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Create a new config with custom seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_rollout_depth(mut self, depth: u32) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_final_selection(mut self, selection: FinalSelection) -> Self {
        self.final_selection = selection;
        self
    }
}
