//! Sequence reconstruction from k-mers through a De Bruijn graph and an
//! Eulerian walk.
//!
//! The pipeline is four stages, each taking the previous stage's value:
//!
//! 1. [`kmer::KmerList::extract`] slides a k-window over the sequence.
//! 2. [`graph_build::Graph::build`] turns every k-mer into an edge between
//!    its (k-1)-mer prefix and suffix nodes.
//! 3. [`eulerian::find_walk`] checks balance and connectivity, then runs
//!    Hierholzer's algorithm.
//! 4. [`reconstruct::reconstruct`] spells the walk back into a sequence.
//!
//! ```
//! use debruijn_euler::assemble;
//!
//! let result = assemble("ACGTACGTAC", 3).unwrap();
//! assert_eq!(result.sequence, "ACGTACGTAC");
//! ```

pub mod constants {
    include!(concat!(env!("OUT_DIR"), "/constants.rs"));
}

pub mod error;
pub mod eulerian;
pub mod graph_build;
pub mod kmer;
pub mod parser;
pub mod reconstruct;
pub mod stats;
pub mod utils;

pub use error::{AssemblyError, Result};
pub use eulerian::{check_feasibility, find_walk, Walk, WalkKind, Walker};
pub use graph_build::Graph;
pub use kmer::{Kmer, KmerList};
pub use reconstruct::{assemble, assemble_kmers, reconstruct, ReconstructionResult};
pub use stats::GraphStats;
