//! Undirected neighbor network between agents, keyed by identity.
//!
//! Agents hold no reference to the network; only the driver owns it.

use crate::error::{Result, SimError};
use embryoid_data::AgentId;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct NeighborNetwork {
    graph: UnGraph<AgentId, ()>,
    id_map: HashMap<AgentId, NodeIndex>,
}

impl NeighborNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an agent. Re-adding a known agent is a no-op.
    pub fn add_node(&mut self, id: AgentId) -> NodeIndex {
        if let Some(&idx) = self.id_map.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id);
        self.id_map.insert(id, idx);
        idx
    }

    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.id_map.contains_key(&id)
    }

    /// Connects two registered agents. Existing edges and self-loops are ignored.
    pub fn add_edge(&mut self, a: AgentId, b: AgentId) -> Result<()> {
        let ia = *self.id_map.get(&a).ok_or(SimError::UnknownAgent(a))?;
        let ib = *self.id_map.get(&b).ok_or(SimError::UnknownAgent(b))?;
        if ia != ib && self.graph.find_edge(ia, ib).is_none() {
            self.graph.add_edge(ia, ib, ());
        }
        Ok(())
    }

    #[must_use]
    pub fn has_edge(&self, a: AgentId, b: AgentId) -> bool {
        match (self.id_map.get(&a), self.id_map.get(&b)) {
            (Some(&ia), Some(&ib)) => self.graph.find_edge(ia, ib).is_some(),
            _ => false,
        }
    }

    /// Neighbors of `id`, oldest connection first. Unknown agents have none.
    #[must_use]
    pub fn neighbors(&self, id: AgentId) -> Vec<AgentId> {
        let Some(&idx) = self.id_map.get(&id) else {
            return Vec::new();
        };
        // petgraph walks adjacency lists newest-first; edge indices give creation order.
        let mut edges: Vec<_> = self
            .graph
            .edges(idx)
            .map(|e| {
                let other = if e.source() == idx { e.target() } else { e.source() };
                (e.id(), self.graph[other])
            })
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges.into_iter().map(|(_, id)| id).collect()
    }

    #[must_use]
    pub fn degree(&self, id: AgentId) -> usize {
        self.id_map
            .get(&id)
            .map_or(0, |&idx| self.graph.neighbors(idx).count())
    }

    /// Every edge once, as identity pairs.
    pub fn edges(&self) -> impl Iterator<Item = (AgentId, AgentId)> + '_ {
        self.graph
            .raw_edges()
            .iter()
            .map(|e| (self.graph[e.source()], self.graph[e.target()]))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(n: u64) -> NeighborNetwork {
        let mut net = NeighborNetwork::new();
        for i in 0..n {
            net.add_node(AgentId(i));
        }
        net
    }

    #[test]
    fn test_neighbors_in_insertion_order() {
        let mut net = network(4);
        net.add_edge(AgentId(0), AgentId(2)).unwrap();
        net.add_edge(AgentId(0), AgentId(1)).unwrap();
        net.add_edge(AgentId(3), AgentId(0)).unwrap();
        assert_eq!(
            net.neighbors(AgentId(0)),
            vec![AgentId(2), AgentId(1), AgentId(3)]
        );
        assert_eq!(net.neighbors(AgentId(3)), vec![AgentId(0)]);
    }

    #[test]
    fn test_duplicate_edges_and_self_loops_ignored() {
        let mut net = network(2);
        net.add_edge(AgentId(0), AgentId(1)).unwrap();
        net.add_edge(AgentId(1), AgentId(0)).unwrap();
        net.add_edge(AgentId(0), AgentId(0)).unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.degree(AgentId(0)), 1);
        assert!(net.has_edge(AgentId(1), AgentId(0)));
    }

    #[test]
    fn test_unknown_agent_is_an_error() {
        let mut net = network(1);
        let err = net.add_edge(AgentId(0), AgentId(9)).unwrap_err();
        assert!(matches!(err, SimError::UnknownAgent(AgentId(9))));
        assert!(net.neighbors(AgentId(9)).is_empty());
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut net = NeighborNetwork::new();
        let a = net.add_node(AgentId(5));
        let b = net.add_node(AgentId(5));
        assert_eq!(a, b);
        assert_eq!(net.node_count(), 1);
    }
}
