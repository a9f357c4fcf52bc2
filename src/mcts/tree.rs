//! Arena-based MCTS tree.
//!
//! Uses a flat `Vec<MCTSNode>` with index-based references for efficiency,
//! cache-friendliness, and serializability.

use serde::{Deserialize, Serialize};

use super::node::{MCTSNode, NodeId};
use crate::core::{Action, PlayerId};

/// Arena-based MCTS tree.
///
/// Nodes are stored in a flat vector and referenced by `NodeId` indices.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSTree {
    nodes: Vec<MCTSNode>,

    /// The root node ID (always 0 after initialization).
    root: NodeId,

    player_count: usize,
}

impl MCTSTree {
    /// Create a tree with a root node and room for `capacity` nodes.
    pub fn with_capacity(root_player: PlayerId, player_count: usize, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.min(1 << 16));
        nodes.push(MCTSNode::root(root_player));
        Self {
            nodes,
            root: NodeId::new(0),
            player_count,
        }
    }

    pub fn new(root_player: PlayerId, player_count: usize) -> Self {
        Self::with_capacity(root_player, player_count, 1024)
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &MCTSNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node, returning its ID.
    pub fn alloc(&mut self, node: MCTSNode) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let terminal_count = self.nodes.iter().filter(|n| n.is_terminal).count();
        let boundary_count = self.nodes.iter().filter(|n| n.is_boundary).count();
        let total_edges: usize = self.nodes.iter().map(|n| n.edges.len()).sum();
        let expanded_edges: usize = self
            .nodes
            .iter()
            .flat_map(|n| n.edges.iter())
            .filter(|e| e.is_expanded())
            .count();

        TreeStats {
            node_count: self.nodes.len(),
            max_depth,
            terminal_count,
            boundary_count,
            total_edges,
            expanded_edges,
        }
    }

    /// Clear the tree and reset with a new root.
    pub fn reset(&mut self, root_player: PlayerId) {
        self.nodes.clear();
        self.nodes.push(MCTSNode::root(root_player));
        self.root = NodeId::new(0);
    }

    #[must_use]
    pub fn root_node(&self) -> &MCTSNode {
        self.get(self.root)
    }

    pub fn root_node_mut(&mut self) -> &mut MCTSNode {
        self.get_mut(self.root)
    }

    /// Follow the most-visited edge from the root while it has a child.
    #[must_use]
    pub fn principal_variation(&self) -> Vec<Action> {
        self.principal_variation_from(self.root)
    }

    /// Follow the most-visited edge from `start` while it has a child.
    #[must_use]
    pub fn principal_variation_from(&self, start: NodeId) -> Vec<Action> {
        let mut line = Vec::new();
        let mut current = start;
        while let Some(edge) = self.get(current).best_edge_by_visits() {
            if edge.visits == 0 {
                break;
            }
            line.push(edge.action);
            if !edge.is_expanded() {
                break;
            }
            current = edge.child;
        }
        line
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MCTSNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }
}

/// Statistics about the MCTS tree.
#[derive(Clone, Debug, Default)]
pub struct TreeStats {
    pub node_count: usize,
    pub max_depth: u16,
    pub terminal_count: usize,
    /// Nodes waiting on a deal.
    pub boundary_count: usize,
    pub total_edges: usize,
    /// Edges with a child node.
    pub expanded_edges: usize,
}

impl TreeStats {
    /// Average edges per node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.total_edges as f64 / self.node_count as f64
        }
    }

    /// Expanded edges over total edges.
    #[must_use]
    pub fn expansion_ratio(&self) -> f64 {
        if self.total_edges == 0 {
            0.0
        } else {
            self.expanded_edges as f64 / self.total_edges as f64
        }
    }
}
