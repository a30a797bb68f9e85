//! De Bruijn multigraph construction.
//!
//! Nodes are the distinct (k-1)-mers, numbered in the order they are first
//! seen. Every k-mer occurrence becomes its own edge prefix -> suffix, so
//! repeated k-mers give parallel edges. Adjacency lists keep insertion
//! order.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use bit_set::BitSet;
use indexmap::IndexSet;
use tracing::info;

use crate::kmer::KmerList;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// One k-mer occurrence. The id is the k-mer's index in the source list,
/// which keeps parallel edges apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Default, Clone)]
struct Adjacency {
    outgoing: Vec<EdgeId>,
    incoming: Vec<EdgeId>,
}

#[derive(Debug, Clone)]
pub struct Graph {
    k: usize,
    // shared with the walks taken over this graph
    labels: Arc<IndexSet<String>>,
    adjacency: Vec<Adjacency>,
    edges: Vec<Edge>,
}

impl Graph {
    /// One pass over the k-mers; node lookup goes through the label index so
    /// the build is linear in the number of k-mers.
    pub fn build(kmers: &KmerList) -> Self {
        let mut graph = Graph {
            k: kmers.k(),
            labels: Arc::new(IndexSet::with_capacity(kmers.len() + 1)),
            adjacency: Vec::with_capacity(kmers.len() + 1),
            edges: Vec::with_capacity(kmers.len()),
        };
        for kmer in kmers {
            let from = graph.node_for(kmer.prefix());
            let to = graph.node_for(kmer.suffix());
            graph.add_edge(from, to);
        }
        info!(
            k = graph.k,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built de Bruijn graph"
        );
        graph
    }

    fn node_for(&mut self, label: &str) -> NodeId {
        if let Some(idx) = self.labels.get_index_of(label) {
            return NodeId(idx);
        }
        let (idx, _) = Arc::make_mut(&mut self.labels).insert_full(label.to_owned());
        self.adjacency.push(Adjacency::default());
        NodeId(idx)
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId) {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge { id, from, to });
        self.adjacency[from.0].outgoing.push(id);
        self.adjacency[to.0].incoming.push(id);
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node ids in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.labels.len()).map(NodeId)
    }

    pub fn label(&self, node: NodeId) -> &str {
        &self.labels[node.0]
    }

    pub(crate) fn shared_labels(&self) -> Arc<IndexSet<String>> {
        Arc::clone(&self.labels)
    }

    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.labels.get_index_of(label).map(NodeId)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// Outgoing edges of `node` in insertion order.
    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.adjacency[node.0].outgoing
    }

    pub fn in_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.adjacency[node.0].incoming
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.adjacency[node.0].outgoing.len()
    }

    pub fn in_degree(&self, node: NodeId) -> usize {
        self.adjacency[node.0].incoming.len()
    }

    /// out-degree minus in-degree
    pub fn balance(&self, node: NodeId) -> i64 {
        self.out_degree(node) as i64 - self.in_degree(node) as i64
    }

    /// Number of parallel edges `from -> to`, by label.
    pub fn multiplicity(&self, from: &str, to: &str) -> usize {
        match (self.node_id(from), self.node_id(to)) {
            (Some(u), Some(v)) => self
                .out_edges(u)
                .iter()
                .filter(|e| self.edges[e.0].to == v)
                .count(),
            _ => 0,
        }
    }

    pub fn degree_table(&self) -> DegreeTable {
        let rows = self
            .nodes()
            .map(|node| DegreeRow {
                node,
                label: self.label(node).to_owned(),
                in_degree: self.in_degree(node),
                out_degree: self.out_degree(node),
            })
            .collect();
        DegreeTable { rows }
    }

    /// Weakly connected components among nodes with at least one edge.
    pub fn weak_components(&self) -> usize {
        let mut visited = BitSet::with_capacity(self.node_count());
        let mut queue = VecDeque::new();
        let mut components = 0;
        for start in self.nodes() {
            if visited.contains(start.0) || self.out_degree(start) + self.in_degree(start) == 0 {
                continue;
            }
            components += 1;
            visited.insert(start.0);
            queue.push_back(start);
            while let Some(node) = queue.pop_front() {
                let adjacency = &self.adjacency[node.0];
                let neighbours = adjacency
                    .outgoing
                    .iter()
                    .map(|e| self.edges[e.0].to)
                    .chain(adjacency.incoming.iter().map(|e| self.edges[e.0].from));
                for next in neighbours {
                    if visited.insert(next.0) {
                        queue.push_back(next);
                    }
                }
            }
        }
        components
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeRow {
    pub node: NodeId,
    pub label: String,
    pub in_degree: usize,
    pub out_degree: usize,
}

impl DegreeRow {
    pub fn balance(&self) -> i64 {
        self.out_degree as i64 - self.in_degree as i64
    }
}

/// Per-node degrees in node creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeTable {
    rows: Vec<DegreeRow>,
}

impl DegreeTable {
    pub fn rows(&self) -> &[DegreeRow] {
        &self.rows
    }

    pub fn total_in(&self) -> usize {
        self.rows.iter().map(|r| r.in_degree).sum()
    }

    pub fn total_out(&self) -> usize {
        self.rows.iter().map(|r| r.out_degree).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(seq: &str, k: usize) -> Graph {
        Graph::build(&KmerList::extract(seq, k).unwrap())
    }

    #[test]
    fn test_build_scenario_a() {
        let graph = graph_of("ACGTAC", 3);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
        let labels: Vec<&str> = graph.nodes().map(|n| graph.label(n)).collect();
        assert_eq!(labels, vec!["AC", "CG", "GT", "TA"]);
        assert!(graph.nodes().all(|n| graph.balance(n) == 0));
        assert_eq!(graph.weak_components(), 1);
    }

    #[test]
    fn test_parallel_edges_kept() {
        let graph = graph_of("ACGTACGTAC", 3);
        assert_eq!(graph.edge_count(), 8);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.multiplicity("AC", "CG"), 2);
        assert_eq!(graph.multiplicity("CG", "GT"), 2);
        assert_eq!(graph.multiplicity("GT", "TA"), 2);
        assert_eq!(graph.multiplicity("CG", "AC"), 0);
        assert_eq!(graph.multiplicity("AC", "ZZ"), 0);
    }

    #[test]
    fn test_adjacency_insertion_order() {
        // AAA yields a self loop on AA twice; AAC and AAG leave AA after.
        let list = KmerList::from_kmers(3, ["AAA", "AAC", "AAA", "AAG"]).unwrap();
        let graph = Graph::build(&list);
        let aa = graph.node_id("AA").unwrap();
        let ids: Vec<usize> = graph.out_edges(aa).iter().map(|e| e.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(graph.edge(EdgeId(1)).to, graph.node_id("AC").unwrap());
    }

    #[test]
    fn test_degree_sums() {
        let graph = graph_of("TTAGGCATTAGGCCAT", 4);
        let table = graph.degree_table();
        assert_eq!(table.total_in(), graph.edge_count());
        assert_eq!(table.total_out(), graph.edge_count());
        assert_eq!(table.rows().len(), graph.node_count());
    }

    #[test]
    fn test_weak_components_disjoint() {
        let list = KmerList::from_kmers(3, ["ACG", "CGA", "TTG", "TGT"]).unwrap();
        let graph = Graph::build(&list);
        assert_eq!(graph.weak_components(), 2);
    }

    #[test]
    fn test_edges_follow_direction_only_for_degrees() {
        let list = KmerList::from_kmers(3, ["ACG", "TCG"]).unwrap();
        let graph = Graph::build(&list);
        // AC -> CG <- TC is still one weak component
        assert_eq!(graph.weak_components(), 1);
        let cg = graph.node_id("CG").unwrap();
        assert_eq!(graph.in_degree(cg), 2);
        assert_eq!(graph.out_degree(cg), 0);
        assert_eq!(graph.balance(cg), -2);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_degree_sums_equal_edges(seq in "[ACGT]{2,150}", k in 2usize..9) {
                prop_assume!(k <= seq.len());
                let graph = graph_of(&seq, k);
                let table = graph.degree_table();
                prop_assert_eq!(graph.edge_count(), seq.len() - k + 1);
                prop_assert_eq!(table.total_in(), graph.edge_count());
                prop_assert_eq!(table.total_out(), graph.edge_count());
                prop_assert!(graph.nodes().all(|n| graph.label(n).len() == k - 1));
            }
        }
    }
}
