//! Error types for the assembly pipeline.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AssemblyError>;

/// Every failure the pipeline can surface. None of these are retried.
#[derive(Debug, Error, Diagnostic)]
pub enum AssemblyError {
    /// k out of range for the input, or a k-mer of the wrong length
    #[error("invalid parameter k={k} (sequence length {len}): {reason}")]
    #[diagnostic(
        code(debruijn_euler::invalid_parameter),
        help("k must satisfy 2 <= k <= sequence length and the input may only contain A, C, G, T")
    )]
    InvalidParameter {
        /// Requested k-mer length
        k: usize,
        /// Length of the offending sequence or k-mer
        len: usize,
        /// What was wrong
        reason: String,
    },

    /// Degree balance rules out any Eulerian walk
    #[error(
        "no Eulerian walk for k={k} ({nodes} nodes, {edges} edges): \
         sources {sources:?}, sinks {sinks:?}, unbalanced {unbalanced:?}"
    )]
    #[diagnostic(
        code(debruijn_euler::no_eulerian_walk),
        help("a walk needs every node balanced, or exactly one +1 source and one -1 sink; try a different k")
    )]
    NoEulerianWalk {
        k: usize,
        nodes: usize,
        edges: usize,
        /// Labels with out-degree one above in-degree
        sources: Vec<String>,
        /// Labels with in-degree one above out-degree
        sinks: Vec<String>,
        /// Labels with |balance| >= 2, paired with their balance
        unbalanced: Vec<(String, i64)>,
    },

    /// Edges spread over more than one weakly connected component
    #[error("graph for k={k} is disconnected: {components} weak components over {nodes} nodes and {edges} edges")]
    #[diagnostic(
        code(debruijn_euler::disconnected_graph),
        help("a larger k splits repeats apart; a smaller k may reconnect the graph")
    )]
    DisconnectedGraph {
        k: usize,
        nodes: usize,
        edges: usize,
        components: usize,
    },

    /// Reconstruction was handed a walk with no nodes
    #[error("cannot reconstruct a sequence from an empty walk")]
    #[diagnostic(code(debruijn_euler::empty_walk))]
    EmptyWalk,

    /// Upstream loader produced no usable sequence
    #[error("malformed input {source_name}: {reason}")]
    #[diagnostic(code(debruijn_euler::malformed_input))]
    MalformedInput {
        /// File name or other description of the input
        source_name: String,
        reason: String,
    },

    #[error("I/O error: {0}")]
    #[diagnostic(code(debruijn_euler::io))]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    #[diagnostic(code(debruijn_euler::csv))]
    Csv(#[from] csv::Error),
}

impl AssemblyError {
    pub(crate) fn invalid_k(k: usize, len: usize, reason: impl Into<String>) -> Self {
        AssemblyError::InvalidParameter {
            k,
            len,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        AssemblyError::MalformedInput {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
