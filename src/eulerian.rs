//! Eulerian walk search.
//!
//! [`Walker`] first checks degree balance and weak connectivity without
//! touching any edge, then runs Hierholzer's algorithm. Each node keeps a
//! cursor into its outgoing list, so every edge is looked at once and the
//! traversal is O(V + E).
//!
//! ```text
//! Idle -> CheckingFeasibility -> Infeasible
//!                             -> Traversing -> ... -> Done
//! ```

use std::sync::Arc;

use bitvec::vec::BitVec;
use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::error::{AssemblyError, Result};
use crate::graph_build::{Graph, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkKind {
    /// Every node balanced, the walk returns to its start
    Circuit,
    /// One +1 source and one -1 sink
    Path,
}

/// Where a node falls given `out-degree - in-degree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceClass {
    Balanced,
    Source,
    Sink,
    Unbalanced(i64),
}

impl BalanceClass {
    pub fn of(balance: i64) -> Self {
        match balance {
            0 => BalanceClass::Balanced,
            1 => BalanceClass::Source,
            -1 => BalanceClass::Sink,
            other => BalanceClass::Unbalanced(other),
        }
    }
}

/// Outcome of a successful precondition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feasibility {
    pub kind: WalkKind,
    pub start: NodeId,
    pub sources: Vec<String>,
    pub sinks: Vec<String>,
}

/// Why no walk exists. Kept by the [`Walker`] so repeated calls report the
/// same failure.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Infeasible {
    Unbalanced {
        k: usize,
        nodes: usize,
        edges: usize,
        sources: Vec<String>,
        sinks: Vec<String>,
        unbalanced: Vec<(String, i64)>,
    },
    Disconnected {
        k: usize,
        nodes: usize,
        edges: usize,
        components: usize,
    },
}

impl From<Infeasible> for AssemblyError {
    fn from(reason: Infeasible) -> Self {
        match reason {
            Infeasible::Unbalanced {
                k,
                nodes,
                edges,
                sources,
                sinks,
                unbalanced,
            } => AssemblyError::NoEulerianWalk {
                k,
                nodes,
                edges,
                sources,
                sinks,
                unbalanced,
            },
            Infeasible::Disconnected {
                k,
                nodes,
                edges,
                components,
            } => AssemblyError::DisconnectedGraph {
                k,
                nodes,
                edges,
                components,
            },
        }
    }
}

/// Check degree balance, then weak connectivity. Nothing is mutated, so a
/// failure here leaves no partial walk behind.
///
/// The circuit start is the first-created node with an outgoing edge. For a
/// graph built from a sequence that is the sequence's first (k-1)-mer, so the
/// circuit comes back in the original rotation.
pub fn check_feasibility(graph: &Graph) -> Result<Feasibility> {
    classify(graph).map_err(AssemblyError::from)
}

fn classify(graph: &Graph) -> std::result::Result<Feasibility, Infeasible> {
    let mut sources = Vec::new();
    let mut sinks = Vec::new();
    let mut unbalanced = Vec::new();
    for node in graph.nodes() {
        if graph.in_degree(node) + graph.out_degree(node) == 0 {
            continue;
        }
        match BalanceClass::of(graph.balance(node)) {
            BalanceClass::Balanced => {}
            BalanceClass::Source => sources.push(node),
            BalanceClass::Sink => sinks.push(node),
            BalanceClass::Unbalanced(b) => unbalanced.push((graph.label(node).to_owned(), b)),
        }
    }

    let labels = |ids: &[NodeId]| -> Vec<String> {
        ids.iter().map(|&n| graph.label(n).to_owned()).collect()
    };

    let kind = match (sources.len(), sinks.len(), unbalanced.is_empty()) {
        (0, 0, true) => WalkKind::Circuit,
        (1, 1, true) => WalkKind::Path,
        _ => {
            warn!(
                sources = sources.len(),
                sinks = sinks.len(),
                unbalanced = unbalanced.len(),
                "degree balance rules out an Eulerian walk"
            );
            return Err(Infeasible::Unbalanced {
                k: graph.k(),
                nodes: graph.node_count(),
                edges: graph.edge_count(),
                sources: labels(&sources),
                sinks: labels(&sinks),
                unbalanced,
            });
        }
    };

    let start = match kind {
        WalkKind::Path => Some(sources[0]),
        WalkKind::Circuit => graph.nodes().find(|&n| graph.out_degree(n) > 0),
    };
    // only an edgeless graph has no start
    let Some(start) = start else {
        return Err(Infeasible::Unbalanced {
            k: graph.k(),
            nodes: graph.node_count(),
            edges: 0,
            sources: Vec::new(),
            sinks: Vec::new(),
            unbalanced: Vec::new(),
        });
    };

    let components = graph.weak_components();
    if components > 1 {
        warn!(components, "graph is not weakly connected");
        return Err(Infeasible::Disconnected {
            k: graph.k(),
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            components,
        });
    }

    Ok(Feasibility {
        kind,
        start,
        sources: labels(&sources),
        sinks: labels(&sinks),
    })
}

/// Nodes in walk order; `len() == edges + 1`. Labels are shared with the
/// graph the walk came from.
#[derive(Debug, Clone)]
pub struct Walk {
    kind: WalkKind,
    nodes: Vec<NodeId>,
    labels: Arc<IndexSet<String>>,
}

impl Walk {
    /// Walk over the given labels in order.
    pub fn from_labels<I, S>(kind: WalkKind, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: IndexSet<String> = IndexSet::new();
        let nodes = labels
            .into_iter()
            .map(|label| {
                let label = label.as_ref();
                match set.get_index_of(label) {
                    Some(idx) => NodeId(idx),
                    None => NodeId(set.insert_full(label.to_owned()).0),
                }
            })
            .collect();
        Walk {
            kind,
            nodes,
            labels: Arc::new(set),
        }
    }

    pub fn kind(&self) -> WalkKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn label(&self, i: usize) -> Option<&str> {
        self.nodes.get(i).map(|n| self.labels[n.0].as_str())
    }

    pub fn labels(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.nodes.iter().map(|n| self.labels[n.0].as_str())
    }

    pub fn to_labels(&self) -> Vec<String> {
        self.labels().map(str::to_owned).collect()
    }
}

impl PartialEq for Walk {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.labels().eq(other.labels())
    }
}

impl Eq for Walk {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkerState {
    Idle,
    CheckingFeasibility,
    Infeasible,
    Traversing,
    Done,
}

/// Hierholzer traversal over a borrowed graph. The consumed flags and
/// cursors live here, so the graph itself stays immutable and can be walked
/// again.
pub struct Walker<'g> {
    graph: &'g Graph,
    state: WalkerState,
    outcome: Option<std::result::Result<Feasibility, Infeasible>>,
    consumed: BitVec,
    cursor: Vec<usize>,
    stack: Vec<NodeId>,
    // popped nodes, i.e. the walk back to front
    finished: Vec<NodeId>,
}

impl<'g> Walker<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Walker {
            graph,
            state: WalkerState::Idle,
            outcome: None,
            consumed: BitVec::repeat(false, graph.edge_count()),
            cursor: vec![0; graph.node_count()],
            stack: Vec::new(),
            finished: Vec::with_capacity(graph.edge_count() + 1),
        }
    }

    pub fn state(&self) -> WalkerState {
        self.state
    }

    pub fn consumed_edges(&self) -> usize {
        self.consumed.count_ones()
    }

    /// Run the precondition check and seed the stack with the start node.
    /// Later calls hand back the first outcome and leave the traversal
    /// alone.
    pub fn check(&mut self) -> Result<Feasibility> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone().map_err(AssemblyError::from);
        }
        self.state = WalkerState::CheckingFeasibility;
        let outcome = classify(self.graph);
        match &outcome {
            Ok(feasibility) => {
                info!(
                    kind = ?feasibility.kind,
                    start = self.graph.label(feasibility.start),
                    "Eulerian walk is feasible"
                );
                self.stack.push(feasibility.start);
                self.state = WalkerState::Traversing;
            }
            Err(_) => self.state = WalkerState::Infeasible,
        }
        self.outcome = Some(outcome.clone());
        outcome.map_err(AssemblyError::from)
    }

    /// One Hierholzer step. Returns `false` once the stack is empty.
    pub fn step(&mut self) -> bool {
        if self.state != WalkerState::Traversing {
            return false;
        }
        let Some(&top) = self.stack.last() else {
            self.state = WalkerState::Done;
            return false;
        };
        let outgoing = self.graph.out_edges(top);
        let cursor = &mut self.cursor[top.0];
        if let Some(&edge) = outgoing.get(*cursor) {
            *cursor += 1;
            debug_assert!(!self.consumed[edge.0], "edge {edge} consumed twice");
            self.consumed.set(edge.0, true);
            self.stack.push(self.graph.edge(edge).to);
        } else {
            self.stack.pop();
            self.finished.push(top);
        }
        if self.stack.is_empty() {
            self.state = WalkerState::Done;
        }
        true
    }

    /// Check (or reuse the earlier check), traverse to completion and
    /// return the walk.
    pub fn run(mut self) -> Result<Walk> {
        let feasibility = self.check()?;
        let mut steps = 0usize;
        while self.step() {
            steps += 1;
        }
        Ok(self.finish(feasibility.kind, steps))
    }

    fn finish(mut self, kind: WalkKind, steps: usize) -> Walk {
        debug_assert_eq!(self.state, WalkerState::Done);
        debug_assert_eq!(self.consumed.count_ones(), self.graph.edge_count());
        debug_assert_eq!(self.finished.len(), self.graph.edge_count() + 1);
        self.finished.reverse();
        debug!(steps, walk = self.finished.len(), "Hierholzer traversal done");
        Walk {
            kind,
            nodes: self.finished,
            labels: self.graph.shared_labels(),
        }
    }
}

/// Check and traverse `graph` in one call.
pub fn find_walk(graph: &Graph) -> Result<Walk> {
    Walker::new(graph).run()
}
