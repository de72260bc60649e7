//! Protocol-node tree reconstruction
//!
//! The full node list arrives flat with parent ids. `NodeArena` resolves
//! those ids into indices once and answers the only structural question
//! the analysis needs: does a node sit inside `<body>`? Parent chains
//! come from attacker-influenced page content, so the upward walk is
//! hop-capped rather than trusting the chain to be acyclic.

use crate::protocol::{NodeId, ProtocolNode};
use rustc_hash::FxHashMap;

/// Parent-linked node storage for one document pass
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<ProtocolNode>,
    parent: Vec<Option<usize>>,
}

impl NodeArena {
    /// Resolve parent ids against a lookup built from the full list.
    /// A parent id with no matching node leaves the link unset.
    pub fn build(nodes: Vec<ProtocolNode>) -> Self {
        let by_node_id: FxHashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.node_id, i))
            .collect();
        let parent = nodes
            .iter()
            .map(|n| n.parent_id.and_then(|id| by_node_id.get(&id).copied()))
            .collect();
        NodeArena { nodes, parent }
    }

    pub fn get(&self, index: usize) -> &ProtocolNode {
        &self.nodes[index]
    }

    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.parent[index]
    }

    /// True when the parent chain from `index` reaches a `BODY` element
    /// (inclusive). The walk takes at most one hop per stored node; a
    /// chain longer than that must have revisited a node, so it counts
    /// as not-in-body.
    pub fn is_in_body(&self, index: usize) -> bool {
        let mut current = Some(index);
        for _ in 0..=self.nodes.len() {
            let Some(i) = current else {
                return false;
            };
            if self.nodes[i].node_name == "BODY" {
                return true;
            }
            current = self.parent[i];
        }
        false
    }

    /// Indices of every node inside `<body>`, in input order
    pub fn body_nodes(&self) -> Vec<usize> {
        (0..self.nodes.len()).filter(|&i| self.is_in_body(i)).collect()
    }
}
