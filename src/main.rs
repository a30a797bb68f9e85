use std::env;
use std::path::{Path, PathBuf};

use clap::Parser;
use debruijn_euler::constants::DEFAULT_K;
use debruijn_euler::utils::extract_filename;
use debruijn_euler::{assemble, parser, Graph, GraphStats, KmerList};
use miette::{IntoDiagnostic, Result};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mode: "assemble" to rebuild the sequence from its k-mers, "stats" to dump graph degrees
    mode: Option<String>,
    /// Input FASTA file (plain or compressed)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Literal sequence, used instead of --input
    #[arg(short, long)]
    sequence: Option<String>,
    /// K value
    #[arg(short, long, default_value_t = DEFAULT_K)]
    k_size: usize,
    /// Number of threads for k-mer extraction (0 = all available)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,
    /// Output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Gzip the assembled FASTA
    #[arg(long)]
    gzip: bool,
    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    if args.threads > 0 {
        env::set_var("RAYON_NUM_THREADS", args.threads.to_string());
    }

    let mode = parse_mode(args.mode.as_deref())?;
    let (stem, sequence) = load_input(&args)?;
    match mode {
        Mode::Assemble => run_assemble(&stem, &sequence, &args),
        Mode::Stats => run_stats(&stem, &sequence, &args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Assemble,
    Stats,
}

fn parse_mode(mode: Option<&str>) -> Result<Mode> {
    match mode {
        Some("assemble") => Ok(Mode::Assemble),
        Some("stats") => Ok(Mode::Stats),
        _ => Err(miette::miette!(
            "Wrong positional arguments given. Values are 'assemble' or 'stats'\n\
             Ex: if assembly: debruijn-euler assemble -i genome.fa -k 31 -o out/\n\
             Ex: if graph stats: debruijn-euler stats -s ACGTACGTAC -k 3"
        )),
    }
}

fn load_input(args: &Args) -> Result<(String, String)> {
    match (&args.input, &args.sequence) {
        (Some(path), None) => {
            let sequence = parser::load_fasta(path)?;
            Ok((extract_filename(path).to_owned(), sequence))
        }
        (None, Some(sequence)) => Ok(("sequence".to_owned(), sequence.to_ascii_uppercase())),
        _ => Err(miette::miette!("give exactly one of --input or --sequence")),
    }
}

fn run_assemble(stem: &str, sequence: &str, args: &Args) -> Result<()> {
    std::fs::create_dir_all(&args.out_dir).into_diagnostic()?;
    let result = assemble(sequence, args.k_size)?;
    result.stats.log_summary();

    let fasta_name = if args.gzip {
        format!("{stem}.assembled.fa.gz")
    } else {
        format!("{stem}.assembled.fa")
    };
    let id = format!("{stem}_k{}_{:?}", args.k_size, result.kind()).to_lowercase();
    parser::write_fasta(&args.out_dir.join(fasta_name), &id, &result.sequence)?;
    parser::write_walk(&args.out_dir.join(format!("{stem}.walk.txt")), &result.walk)?;

    if result.sequence == sequence {
        info!("Reconstruction matches the input ({} bases)", sequence.len());
    } else {
        info!(
            "Reconstruction differs from the input ({} vs {} bases)",
            result.sequence.len(),
            sequence.len()
        );
    }
    Ok(())
}

fn run_stats(stem: &str, sequence: &str, args: &Args) -> Result<()> {
    std::fs::create_dir_all(&args.out_dir).into_diagnostic()?;
    let kmers = KmerList::extract_auto(sequence, args.k_size)?;
    let graph = Graph::build(&kmers);
    let stats = GraphStats::from_graph(&graph);
    stats.log_summary();
    let csv_path: &Path = &args.out_dir.join(format!("{stem}.degrees.csv"));
    stats.write_degree_csv_file(csv_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode(Some("assemble")).unwrap(), Mode::Assemble);
        assert_eq!(parse_mode(Some("stats")).unwrap(), Mode::Stats);
        let err = parse_mode(Some("asemble")).unwrap_err();
        assert!(err.to_string().contains("'assemble' or 'stats'"));
        assert!(parse_mode(None).is_err());
    }
}
