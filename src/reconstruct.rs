//! Walk linearisation and the end-to-end pipeline.

use tracing::info;

use crate::eulerian::{find_walk, Walk, WalkKind};
use crate::error::{AssemblyError, Result};
use crate::graph_build::Graph;
use crate::kmer::KmerList;
use crate::stats::GraphStats;

/// First label in full, then the last symbol of every following label.
/// The result has `walk.len() + k - 2` symbols.
pub fn reconstruct(walk: &Walk, k: usize) -> Result<String> {
    reconstruct_labels(walk.labels(), k)
}

pub fn reconstruct_labels<I, S>(labels: I, k: usize) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let node_len = k.saturating_sub(1);
    let mut labels = labels.into_iter().enumerate().peekable();
    if labels.peek().is_none() {
        return Err(AssemblyError::EmptyWalk);
    }
    let mut sequence = String::new();
    for (i, label) in labels {
        let label = label.as_ref();
        if label.len() != node_len || !label.is_ascii() {
            return Err(AssemblyError::invalid_k(
                k,
                label.len(),
                format!("walk node #{i} '{label}' is not a {node_len}-symbol label"),
            ));
        }
        if i == 0 {
            sequence.push_str(label);
        } else if let Some(last) = label.chars().last() {
            sequence.push(last);
        }
    }
    Ok(sequence)
}

/// Everything the reporting side needs from one run.
#[derive(Debug, Clone)]
pub struct ReconstructionResult {
    pub sequence: String,
    pub walk: Walk,
    pub stats: GraphStats,
}

impl ReconstructionResult {
    pub fn kind(&self) -> WalkKind {
        self.walk.kind()
    }
}

/// Extract, build, walk and reconstruct in one go.
pub fn assemble(sequence: &str, k: usize) -> Result<ReconstructionResult> {
    let kmers = KmerList::extract_auto(sequence, k)?;
    assemble_kmers(&kmers)
}

/// Pipeline from an already extracted or hand-made k-mer list.
pub fn assemble_kmers(kmers: &KmerList) -> Result<ReconstructionResult> {
    let graph = Graph::build(kmers);
    let stats = GraphStats::from_graph(&graph);
    let walk = find_walk(&graph)?;
    let sequence = reconstruct(&walk, kmers.k())?;
    info!(
        k = kmers.k(),
        kind = ?walk.kind(),
        length = sequence.len(),
        "reconstructed sequence"
    );
    Ok(ReconstructionResult {
        sequence,
        walk,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruct_labels() {
        let labels = ["AC", "CG", "GT", "TA", "AC"];
        assert_eq!(reconstruct_labels(&labels, 3).unwrap(), "ACGTAC");
        assert_eq!(reconstruct_labels(["ACG"], 4).unwrap(), "ACG");
        let walk = Walk::from_labels(WalkKind::Path, ["TT", "TA", "AC"]);
        assert_eq!(reconstruct(&walk, 3).unwrap(), "TTAC");
    }

    #[test]
    fn test_reconstruct_empty_walk() {
        let walk = Walk::from_labels(WalkKind::Circuit, Vec::<String>::new());
        assert!(matches!(reconstruct(&walk, 3), Err(AssemblyError::EmptyWalk)));
    }

    #[test]
    fn test_reconstruct_rejects_wrong_label_length() {
        let err = reconstruct_labels(&["AC", "CGT"], 3).unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidParameter { .. }));
    }

    #[test]
    fn test_scenario_a() {
        let result = assemble("ACGTAC", 3).unwrap();
        assert_eq!(result.kind(), WalkKind::Circuit);
        assert_eq!(result.sequence, "ACGTAC");
        assert_eq!(result.walk.len(), 5);
        assert_eq!(result.sequence.len(), result.walk.len() + 3 - 2);
    }

    #[test]
    fn test_scenario_b_repeats() {
        let kmers = KmerList::extract("ACGTACGTAC", 3).unwrap();
        let graph = Graph::build(&kmers);
        assert!(graph.multiplicity("AC", "CG") >= 2);
        let result = assemble_kmers(&kmers).unwrap();
        assert_eq!(result.sequence, "ACGTACGTAC");
        assert_eq!(result.stats.edge_count, 8);
    }

    #[test]
    fn test_scenario_c_and_d_fail_closed() {
        let c = KmerList::from_kmers(3, ["ACG", "GTA"]).unwrap();
        assert!(matches!(
            assemble_kmers(&c),
            Err(AssemblyError::NoEulerianWalk { .. })
        ));
        let d = KmerList::from_kmers(3, ["ACA", "CAC", "GTG", "TGT"]).unwrap();
        assert!(matches!(
            assemble_kmers(&d),
            Err(AssemblyError::DisconnectedGraph { .. })
        ));
    }

    #[test]
    fn test_k2_boundary() {
        assert_eq!(assemble("AT", 2).unwrap().sequence, "AT");
        assert_eq!(assemble("AAAA", 2).unwrap().sequence, "AAAA");
        assert!(matches!(
            assemble("ACG", 4),
            Err(AssemblyError::InvalidParameter { .. })
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_round_trip(seq in "[ACGT]{2,200}", k in 2usize..12) {
                prop_assume!(k <= seq.len());
                let result = assemble(&seq, k).unwrap();
                prop_assert_eq!(&result.sequence, &seq);
                prop_assert_eq!(result.walk.len(), seq.len() - k + 2);
            }

            #[test]
            fn prop_deterministic(seq in "[ACGT]{2,200}", k in 2usize..8) {
                prop_assume!(k <= seq.len());
                let first = assemble(&seq, k).unwrap();
                let second = assemble(&seq, k).unwrap();
                prop_assert_eq!(first.walk, second.walk);
                prop_assert_eq!(first.sequence, second.sequence);
            }
        }
    }
}
