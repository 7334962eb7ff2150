//! Nodes, edges and the undirected cycle basis (spec section 3).
//!
//! Built on a petgraph-backed `Network`: an undirected graph of
//! string-named buses, with a name→index map for
//! cheap external lookups. The cycle basis is computed once at load time
//! (spec section 9) via a DFS spanning tree: each non-tree edge closes
//! exactly one cycle with the tree path between its endpoints.

use crate::error::{PownetError, PownetResult};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// One transmission edge in its canonical (source, sink) direction.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub source: String,
    pub sink: String,
    /// Column name into the transmission timeseries table for line capacity.
    pub capacity_column: String,
    /// Column name into the transmission timeseries table for susceptance.
    pub susceptance_column: String,
}

/// One cycle in the undirected cycle basis, as an ordered node sequence
/// (spec section 3: "ordered list of node sequences per cycle").
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    pub nodes: Vec<String>,
}

impl Cycle {
    /// The cycle's edges with a sign: `true` if traversed in the edge's
    /// canonical (source, sink) direction, `false` otherwise (spec section
    /// 4.6's Kirchhoff constraint).
    pub fn signed_edges(&self, network: &Network) -> PownetResult<Vec<(EdgeRecord, bool)>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for i in 0..self.nodes.len() {
            let a = &self.nodes[i];
            let b = &self.nodes[(i + 1) % self.nodes.len()];
            let (edge, forward) = network.find_edge_either_direction(a, b)?;
            out.push((edge.clone(), forward));
        }
        Ok(out)
    }
}

/// The transmission network: buses, edges and the precomputed cycle basis.
#[derive(Debug, Clone)]
pub struct Network {
    graph: UnGraph<String, ()>,
    node_index: HashMap<String, NodeIndex>,
    edges: Vec<EdgeRecord>,
    cycles: Vec<Cycle>,
}

impl Network {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            node_index: HashMap::new(),
            edges: Vec::new(),
            cycles: Vec::new(),
        }
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> PownetResult<()> {
        let name = name.into();
        if self.node_index.contains_key(&name) {
            return Err(PownetError::validation(
                "network.node",
                format!("duplicate node name '{name}'"),
            ));
        }
        let idx = self.graph.add_node(name.clone());
        self.node_index.insert(name, idx);
        Ok(())
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.node_index.keys().map(|s| s.as_str())
    }

    /// Adds an edge in canonical (source, sink) direction. Rejects self-loops
    /// and duplicate reversed edges (spec section 3).
    pub fn add_edge(&mut self, edge: EdgeRecord) -> PownetResult<()> {
        if edge.source == edge.sink {
            return Err(PownetError::validation(
                "network.edge",
                format!("self-loop edge at node '{}'", edge.source),
            ));
        }
        let source_idx = self.require_node(&edge.source)?;
        let sink_idx = self.require_node(&edge.sink)?;
        if self.find_edge_record(&edge.source, &edge.sink).is_some()
            || self.find_edge_record(&edge.sink, &edge.source).is_some()
        {
            return Err(PownetError::validation(
                "network.edge",
                format!(
                    "duplicate or reversed-duplicate edge ({}, {})",
                    edge.source, edge.sink
                ),
            ));
        }
        self.graph.add_edge(source_idx, sink_idx, ());
        self.edges.push(edge);
        Ok(())
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Installs a precomputed cycle basis, e.g. loaded from
    /// `pownet_cycle_map.json` (spec section 6).
    pub fn set_cycles(&mut self, cycles: Vec<Cycle>) {
        self.cycles = cycles;
    }

    /// Computes the undirected cycle basis via a DFS spanning tree: each
    /// non-tree edge closes one cycle with the tree path between its
    /// endpoints (spec section 9).
    pub fn compute_cycle_basis(&mut self) {
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut depth: HashMap<NodeIndex, usize> = HashMap::new();
        let mut visited: HashMap<NodeIndex, bool> = HashMap::new();
        let mut tree_edges: std::collections::HashSet<(NodeIndex, NodeIndex)> =
            std::collections::HashSet::new();

        for start in self.graph.node_indices() {
            if visited.get(&start).copied().unwrap_or(false) {
                continue;
            }
            visited.insert(start, true);
            depth.insert(start, 0);
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                for neighbor in self.graph.neighbors(node) {
                    if !visited.get(&neighbor).copied().unwrap_or(false) {
                        visited.insert(neighbor, true);
                        parent.insert(neighbor, node);
                        depth.insert(neighbor, depth[&node] + 1);
                        tree_edges.insert((node, neighbor));
                        tree_edges.insert((neighbor, node));
                        stack.push(neighbor);
                    }
                }
            }
        }

        let mut cycles = Vec::new();
        let mut seen_non_tree: std::collections::HashSet<(NodeIndex, NodeIndex)> =
            std::collections::HashSet::new();
        for edge in self.graph.edge_references() {
            let (a, b) = (edge.source(), edge.target());
            if tree_edges.contains(&(a, b)) {
                continue;
            }
            if seen_non_tree.contains(&(a, b)) || seen_non_tree.contains(&(b, a)) {
                continue;
            }
            seen_non_tree.insert((a, b));

            let mut path_a = vec![a];
            let mut cur = a;
            while let Some(&p) = parent.get(&cur) {
                path_a.push(p);
                cur = p;
            }
            let mut path_b = vec![b];
            cur = b;
            while let Some(&p) = parent.get(&cur) {
                path_b.push(p);
                cur = p;
            }

            let set_a: std::collections::HashSet<_> = path_a.iter().copied().collect();
            let lca = path_b.iter().copied().find(|n| set_a.contains(n));
            let Some(lca) = lca else { continue };

            let mut cycle_nodes: Vec<NodeIndex> = Vec::new();
            for &n in &path_a {
                cycle_nodes.push(n);
                if n == lca {
                    break;
                }
            }
            let mut back_half: Vec<NodeIndex> = Vec::new();
            for &n in &path_b {
                if n == lca {
                    break;
                }
                back_half.push(n);
            }
            back_half.reverse();
            cycle_nodes.extend(back_half);

            let names: Vec<String> = cycle_nodes
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect();
            cycles.push(Cycle { nodes: names });
        }
        self.cycles = cycles;
    }

    fn find_edge_record(&self, source: &str, sink: &str) -> Option<&EdgeRecord> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.sink == sink)
    }

    /// Finds the edge between two nodes regardless of stored direction,
    /// reporting whether `(from, to)` matches the canonical direction.
    pub fn find_edge_either_direction(
        &self,
        from: &str,
        to: &str,
    ) -> PownetResult<(&EdgeRecord, bool)> {
        if let Some(edge) = self.find_edge_record(from, to) {
            return Ok((edge, true));
        }
        if let Some(edge) = self.find_edge_record(to, from) {
            return Ok((edge, false));
        }
        Err(PownetError::validation(
            "network.cycle",
            format!("cycle references non-edge ({from}, {to})"),
        ))
    }

    fn require_node(&self, name: &str) -> PownetResult<NodeIndex> {
        self.node_index
            .get(name)
            .copied()
            .ok_or_else(|| PownetError::validation("network.node", format!("unknown node '{name}'")))
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, sink: &str) -> EdgeRecord {
        EdgeRecord {
            source: source.into(),
            sink: sink.into(),
            capacity_column: format!("{source}_{sink}"),
            susceptance_column: format!("{source}_{sink}"),
        }
    }

    #[test]
    fn rejects_self_loop() {
        let mut net = Network::new();
        net.add_node("a").unwrap();
        assert!(net.add_edge(edge("a", "a")).is_err());
    }

    #[test]
    fn rejects_reversed_duplicate() {
        let mut net = Network::new();
        net.add_node("a").unwrap();
        net.add_node("b").unwrap();
        net.add_edge(edge("a", "b")).unwrap();
        assert!(net.add_edge(edge("b", "a")).is_err());
    }

    #[test]
    fn triangle_yields_one_cycle() {
        let mut net = Network::new();
        for n in ["a", "b", "c"] {
            net.add_node(n).unwrap();
        }
        net.add_edge(edge("a", "b")).unwrap();
        net.add_edge(edge("b", "c")).unwrap();
        net.add_edge(edge("c", "a")).unwrap();
        net.compute_cycle_basis();
        assert_eq!(net.cycles().len(), 1);
        assert_eq!(net.cycles()[0].nodes.len(), 3);
    }

    #[test]
    fn tree_has_no_cycles() {
        let mut net = Network::new();
        for n in ["a", "b", "c"] {
            net.add_node(n).unwrap();
        }
        net.add_edge(edge("a", "b")).unwrap();
        net.add_edge(edge("b", "c")).unwrap();
        net.compute_cycle_basis();
        assert!(net.cycles().is_empty());
    }
}
