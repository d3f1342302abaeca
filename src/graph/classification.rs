//! Transitively-closed classification graph.
//!
//! Closure is per-node reachability: for every node, a depth-first search with
//! a visited set collects everything reachable through one or more edges.
//! Cycles terminate because each search visits a node at most once, and a node
//! on a cycle ends up as its own ancestor.

use std::collections::BTreeSet;

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;

use crate::pattern::ClassificationEdge;
use crate::symbol::Identifier;

/// Directed is-a graph with a maintained closure.
#[derive(Debug, Clone, Default)]
pub struct ClassificationGraph {
    /// Edges that reachability is computed over.
    graph: DiGraphMap<Identifier, ()>,
    /// Closed edge set keyed `(child, parent)`.
    by_child: BTreeSet<(Identifier, Identifier)>,
    /// Same edges keyed `(parent, child)`.
    by_parent: BTreeSet<(Identifier, Identifier)>,
}

impl ClassificationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert an edge. Returns `false` if it already holds, directly or by closure.
    pub fn insert(&mut self, edge: ClassificationEdge) -> bool {
        if !self.record(edge) {
            return false;
        }
        self.graph.add_edge(edge.child, edge.parent, ());
        true
    }

    fn record(&mut self, edge: ClassificationEdge) -> bool {
        if !self.by_child.insert((edge.child, edge.parent)) {
            return false;
        }
        self.by_parent.insert((edge.parent, edge.child));
        true
    }

    pub fn contains(&self, edge: &ClassificationEdge) -> bool {
        self.by_child.contains(&(edge.child, edge.parent))
    }

    /// Add every edge implied by transitivity; returns the edges added.
    ///
    /// The result is the unique minimal transitively-closed superset of the
    /// asserted edges. A second call without intervening inserts returns an
    /// empty set.
    pub fn close_transitively(&mut self) -> BTreeSet<ClassificationEdge> {
        let mut added = BTreeSet::new();
        let nodes: Vec<Identifier> = self.graph.nodes().collect();
        for node in nodes {
            let mut dfs = Dfs::empty(&self.graph);
            dfs.stack.extend(self.graph.neighbors(node));
            while let Some(reached) = dfs.next(&self.graph) {
                let edge = ClassificationEdge::new(node, reached);
                if !self.contains(&edge) {
                    added.insert(edge);
                }
            }
        }
        for edge in &added {
            self.record(*edge);
        }
        added
    }

    /// Every `parent` with `child is-a parent` in the closed set.
    pub fn ancestors(&self, child: Identifier) -> impl Iterator<Item = Identifier> + '_ {
        self.by_child
            .range((child, Identifier::MIN)..=(child, Identifier::MAX))
            .map(|&(_, parent)| parent)
    }

    /// Every `child` with `child is-a parent` in the closed set.
    pub fn descendants(&self, parent: Identifier) -> impl Iterator<Item = Identifier> + '_ {
        self.by_parent
            .range((parent, Identifier::MIN)..=(parent, Identifier::MAX))
            .map(|&(_, child)| child)
    }

    /// Every edge in the closed set, ordered by child then parent.
    pub fn edges(&self) -> impl Iterator<Item = ClassificationEdge> + '_ {
        self.by_child
            .iter()
            .map(|&(child, parent)| ClassificationEdge::new(child, parent))
    }

    pub fn len(&self) -> usize {
        self.by_child.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_child.is_empty()
    }

    /// Number of distinct identifiers that appear in any edge.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolId;

    fn id(raw: u64) -> Identifier {
        Identifier::new(SymbolId::new(raw).unwrap())
    }

    fn edge(child: u64, parent: u64) -> ClassificationEdge {
        ClassificationEdge::new(id(child), id(parent))
    }

    fn graph(edges: &[(u64, u64)]) -> ClassificationGraph {
        let mut g = ClassificationGraph::new();
        for &(c, p) in edges {
            g.insert(edge(c, p));
        }
        g
    }

    #[test]
    fn simple_chain() {
        let mut g = graph(&[(1, 2), (2, 3)]);
        let added = g.close_transitively();
        assert_eq!(added, BTreeSet::from([edge(1, 3)]));
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn diamond() {
        let mut g = graph(&[(1, 2), (1, 3), (2, 4), (3, 4)]);
        g.close_transitively();
        assert!(g.contains(&edge(1, 4)));
        assert_eq!(g.len(), 5);
    }

    #[test]
    fn cycle_terminates_and_includes_self_edges() {
        let mut g = graph(&[(1, 2), (2, 3), (3, 1)]);
        g.close_transitively();
        for a in 1..=3 {
            for b in 1..=3 {
                assert!(g.contains(&edge(a, b)), "missing {a} is-a {b}");
            }
        }
        assert_eq!(g.len(), 9);
    }

    #[test]
    fn two_node_cycle() {
        let mut g = graph(&[(1, 2), (2, 1)]);
        g.close_transitively();
        assert!(g.contains(&edge(1, 1)));
        assert!(g.contains(&edge(2, 2)));
        assert_eq!(g.len(), 4);
    }

    #[test]
    fn self_loop_closes_to_itself() {
        let mut g = graph(&[(1, 1)]);
        assert!(g.close_transitively().is_empty());
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn disconnected_edges_stay_apart() {
        let mut g = graph(&[(1, 2), (3, 4)]);
        assert!(g.close_transitively().is_empty());
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn long_chain() {
        let mut g = graph(&[(1, 2), (2, 3), (3, 4), (4, 5)]);
        let added = g.close_transitively();
        assert_eq!(added.len(), 6);
        assert_eq!(g.len(), 10);
    }

    #[test]
    fn empty_graph() {
        let mut g = ClassificationGraph::new();
        assert!(g.close_transitively().is_empty());
        assert!(g.is_empty());
    }

    #[test]
    fn closure_is_idempotent() {
        let mut g = graph(&[(1, 2), (2, 3), (3, 4)]);
        assert!(!g.close_transitively().is_empty());
        assert!(g.close_transitively().is_empty());
    }

    #[test]
    fn insert_of_implied_edge_is_not_new() {
        let mut g = graph(&[(1, 2), (2, 3)]);
        g.close_transitively();
        assert!(!g.insert(edge(1, 3)));
    }

    #[test]
    fn ancestors_and_descendants_read_the_closure() {
        let mut g = graph(&[(1, 2), (2, 3), (4, 3)]);
        g.close_transitively();
        let ancestors: Vec<Identifier> = g.ancestors(id(1)).collect();
        assert_eq!(ancestors, vec![id(2), id(3)]);
        let descendants: Vec<Identifier> = g.descendants(id(3)).collect();
        assert_eq!(descendants, vec![id(1), id(2), id(4)]);
    }

    #[test]
    fn closure_after_incremental_insert() {
        let mut g = graph(&[(1, 2)]);
        g.close_transitively();
        g.insert(edge(2, 3));
        let added = g.close_transitively();
        assert_eq!(added, BTreeSet::from([edge(1, 3)]));
    }
}
