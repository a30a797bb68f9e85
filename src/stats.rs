use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::eulerian::BalanceClass;
use crate::graph_build::{DegreeTable, Graph};

/*
GRAPH SHAPE HANDED TO REPORTING.

1) NODE AND EDGE COUNTS
2) IN/OUT DEGREE PER NODE, CREATION ORDER
3) WEAK COMPONENT COUNT
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub k: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub components: usize,
    /// Nodes with balance exactly +1
    pub sources: usize,
    /// Nodes with balance exactly -1
    pub sinks: usize,
    /// Nodes off by more than one either way
    pub unbalanced: usize,
    pub degrees: DegreeTable,
}

impl GraphStats {
    pub fn from_graph(graph: &Graph) -> Self {
        let degrees = graph.degree_table();
        let (mut sources, mut sinks, mut unbalanced) = (0, 0, 0);
        for row in degrees.rows() {
            match BalanceClass::of(row.balance()) {
                BalanceClass::Balanced => {}
                BalanceClass::Source => sources += 1,
                BalanceClass::Sink => sinks += 1,
                BalanceClass::Unbalanced(_) => unbalanced += 1,
            }
        }
        GraphStats {
            k: graph.k(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            components: graph.weak_components(),
            sources,
            sinks,
            unbalanced,
            degrees,
        }
    }

    pub fn log_summary(&self) {
        info!(
            k = self.k,
            nodes = self.node_count,
            edges = self.edge_count,
            components = self.components,
            sources = self.sources,
            sinks = self.sinks,
            unbalanced = self.unbalanced,
            "graph statistics"
        );
    }

    /// One row per node: label, in-degree, out-degree, balance.
    pub fn write_degree_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["node", "in_degree", "out_degree", "balance"])?;
        for row in self.degrees.rows() {
            csv_writer.write_record([
                row.label.clone(),
                row.in_degree.to_string(),
                row.out_degree.to_string(),
                row.balance().to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_degree_csv_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_degree_csv(file)?;
        info!("Wrote {} rows in {}", self.node_count, path.display());
        Ok(())
    }
}
