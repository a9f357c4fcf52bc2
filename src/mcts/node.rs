//! MCTS node and edge structures.
//!
//! Uses arena-based allocation with index references (NodeId) for efficiency
//! and serializability.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Action, PlayerId, PlayerMap};

/// Index into the MCTSTree node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value representing no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// Edge representing an action from a parent node to a child.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub action: Action,

    /// Child node (NONE if not yet expanded).
    pub child: NodeId,

    pub visits: u32,

    /// Total reward accumulated through this edge, per agent.
    pub total_reward: PlayerMap<f64>,
}

impl Edge {
    pub fn new(action: Action, player_count: usize) -> Self {
        Self {
            action,
            child: NodeId::NONE,
            visits: 0,
            total_reward: PlayerMap::with_value(player_count, 0.0),
        }
    }

    /// Mean reward for an agent; 0 before the first visit.
    #[must_use]
    pub fn mean_reward(&self, player: PlayerId) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward[player] / self.visits as f64
        }
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        !self.child.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSNode {
    /// Parent node (NONE for root).
    pub parent: NodeId,

    /// Index of the edge from parent that led to this node.
    pub parent_edge_idx: u16,

    /// Agent whose decision this node is.
    pub to_move: PlayerId,

    /// Depth in tree (root = 0).
    pub depth: u16,

    pub visits: u32,

    pub is_terminal: bool,

    /// Waiting for the next deal. The tree stops here and rollouts sample
    /// the refill.
    pub is_boundary: bool,

    /// Terminal rewards (if terminal).
    pub terminal_reward: Option<PlayerMap<f64>>,

    /// Outgoing edges (available actions).
    pub edges: SmallVec<[Edge; 8]>,
}

impl MCTSNode {
    pub fn new(parent: NodeId, parent_edge_idx: u16, to_move: PlayerId, depth: u16) -> Self {
        Self {
            parent,
            parent_edge_idx,
            to_move,
            depth,
            visits: 0,
            is_terminal: false,
            is_boundary: false,
            terminal_reward: None,
            edges: SmallVec::new(),
        }
    }

    pub fn root(to_move: PlayerId) -> Self {
        Self::new(NodeId::NONE, 0, to_move, 0)
    }

    /// True if iterations stop at this node rather than descending.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.is_terminal || self.is_boundary
    }

    /// Check if all edges have been expanded.
    #[must_use]
    pub fn is_fully_expanded(&self) -> bool {
        !self.edges.is_empty() && self.edges.iter().all(|e| e.is_expanded())
    }

    #[must_use]
    pub fn has_unexpanded(&self) -> bool {
        self.edges.iter().any(|e| !e.is_expanded())
    }

    pub fn unexpanded_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_expanded())
            .map(|(i, _)| i)
    }

    /// The edge with the most visits; the earliest edge wins ties.
    #[must_use]
    pub fn best_edge_by_visits(&self) -> Option<&Edge> {
        self.edges
            .iter()
            .fold(None, |best: Option<&Edge>, e| match best {
                Some(b) if b.visits >= e.visits => Some(b),
                _ => Some(e),
            })
    }

    /// The visited edge with the highest mean reward for an agent.
    #[must_use]
    pub fn best_edge_by_reward(&self, player: PlayerId) -> Option<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.visits > 0)
            .fold(None, |best: Option<&Edge>, e| match best {
                Some(b) if b.mean_reward(player) >= e.mean_reward(player) => Some(b),
                _ => Some(e),
            })
    }
}
