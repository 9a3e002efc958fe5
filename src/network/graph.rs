//! Weighted adjacency graph shared by the city and airport layers

use std::collections::BTreeMap;

/// Graph over stable integer node indices with positive edge weights
///
/// Adjacency is kept in ordered maps so every traversal is deterministic.
/// An undirected graph stores each edge in both directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedGraph {
    directed: bool,
    adjacency: BTreeMap<usize, BTreeMap<usize, f64>>,
}

impl WeightedGraph {
    pub fn undirected() -> Self {
        Self {
            directed: false,
            adjacency: BTreeMap::new(),
        }
    }

    pub fn directed() -> Self {
        Self {
            directed: true,
            adjacency: BTreeMap::new(),
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn add_node(&mut self, node: usize) {
        self.adjacency.entry(node).or_default();
    }

    /// Insert or replace the edge `from -> to` (both directions if undirected)
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) {
        self.add_node(to);
        self.adjacency.entry(from).or_default().insert(to, weight);
        if !self.directed {
            self.adjacency.entry(to).or_default().insert(from, weight);
        }
    }

    pub fn contains_node(&self, node: usize) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        let arcs: usize = self.adjacency.values().map(|n| n.len()).sum();
        if self.directed {
            arcs
        } else {
            let loops = self
                .adjacency
                .iter()
                .filter(|(node, out)| out.contains_key(*node))
                .count();
            (arcs + loops) / 2
        }
    }

    /// Outgoing neighbors with their weights, in index order
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|out| out.iter().map(|(&n, &w)| (n, w)))
    }

    pub fn weight(&self, from: usize, to: usize) -> Option<f64> {
        self.adjacency.get(&from)?.get(&to).copied()
    }

    /// Each edge once; undirected edges are reported with `from <= to`
    pub fn edges(&self) -> Vec<(usize, usize, f64)> {
        self.adjacency
            .iter()
            .flat_map(|(&from, out)| out.iter().map(move |(&to, &w)| (from, to, w)))
            .filter(|&(from, to, _)| self.directed || from <= to)
            .collect()
    }

    /// Every ordered arc; an undirected edge yields both directions
    pub fn directed_edges(&self) -> Vec<(usize, usize)> {
        self.adjacency
            .iter()
            .flat_map(|(&from, out)| out.keys().map(move |&to| (from, to)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undirected_edge_visible_both_ways() {
        let mut graph = WeightedGraph::undirected();
        graph.add_edge(0, 1, 4.0);
        assert_eq!(graph.weight(0, 1), Some(4.0));
        assert_eq!(graph.weight(1, 0), Some(4.0));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges(), vec![(0, 1, 4.0)]);
        assert_eq!(graph.directed_edges(), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_directed_edge_is_asymmetric() {
        let mut graph = WeightedGraph::directed();
        graph.add_edge(5, 9, 180.0);
        assert_eq!(graph.weight(5, 9), Some(180.0));
        assert_eq!(graph.weight(9, 5), None);
        assert!(graph.contains_node(9));
        assert_eq!(graph.neighbors(9).count(), 0);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_add_edge_replaces_weight() {
        let mut graph = WeightedGraph::directed();
        graph.add_edge(1, 2, 3.0);
        graph.add_edge(1, 2, 7.0);
        assert_eq!(graph.weight(1, 2), Some(7.0));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_neighbors_in_index_order() {
        let mut graph = WeightedGraph::undirected();
        graph.add_edge(0, 3, 1.0);
        graph.add_edge(0, 1, 2.0);
        graph.add_edge(0, 2, 3.0);
        let order: Vec<_> = graph.neighbors(0).map(|(n, _)| n).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }
}
