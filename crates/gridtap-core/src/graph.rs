//! Weighted shortest paths over the backbone grid.
//!
//! [`GridGraph`] is a petgraph view of a [`Snapshot`](crate::Snapshot): one
//! graph node per grid node, one undirected edge per *valid* grid link,
//! weighted by the geodesic distance between the endpoints. Links referencing
//! missing nodes are skipped: the graph fails soft, exactly like the rest of
//! the planner.
//!
//! The graph is rebuilt per recomputation pass and queried many times within
//! it; [`GridGraph::distances_from`] exists so the orchestrator can replace a
//! quadratic number of point-to-point queries with one sweep per hub-link
//! endpoint.

use std::collections::HashMap;

use petgraph::algo::{astar, dijkstra};
use petgraph::graph::NodeIndex;
use petgraph::prelude::*;

use crate::units::Kilometers;
use crate::{geo, NodeId, Snapshot};

/// A shortest route between two grid nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPath {
    /// Total length of the route.
    pub distance: Kilometers,
    /// Traversed nodes in order, including both endpoints.
    pub nodes: Vec<NodeId>,
}

/// Shortest-path view of a snapshot's grid topology.
#[derive(Debug)]
pub struct GridGraph {
    graph: UnGraph<NodeId, f64>,
    index: HashMap<NodeId, NodeIndex>,
}

impl GridGraph {
    /// Build the graph from the snapshot's current nodes and links.
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut graph = UnGraph::default();
        let mut index = HashMap::with_capacity(snapshot.nodes.len());

        for node in &snapshot.nodes {
            let idx = graph.add_node(node.id);
            index.insert(node.id, idx);
        }
        for (_link, a, b) in snapshot.valid_links() {
            let weight = geo::distance(a.position, b.position).value();
            graph.add_edge(index[&a.id], index[&b.id], weight);
        }

        Self { graph, index }
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of (valid) links in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether a grid node is present in the graph.
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Shortest route between two nodes, or `None` when either id is unknown
    /// or the nodes sit in disconnected components.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Option<GridPath> {
        let start = *self.index.get(&from)?;
        let goal = *self.index.get(&to)?;

        let (cost, path) = astar(&self.graph, start, |n| n == goal, |e| *e.weight(), |_| 0.0)?;
        Some(GridPath {
            distance: Kilometers::new(cost),
            nodes: path.into_iter().map(|idx| self.graph[idx]).collect(),
        })
    }

    /// Single-source shortest distances to every reachable node. Unreachable
    /// nodes are absent from the map.
    pub fn distances_from(&self, from: NodeId) -> HashMap<NodeId, Kilometers> {
        let Some(&start) = self.index.get(&from) else {
            return HashMap::new();
        };
        dijkstra(&self.graph, start, None, |e| *e.weight())
            .into_iter()
            .map(|(idx, cost)| (self.graph[idx], Kilometers::new(cost)))
            .collect()
    }
}
