//! FASTA input and output around the pipeline.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use seq_io::fasta::Reader;
use tracing::{debug, info};

use crate::eulerian::Walk;
use crate::error::{AssemblyError, Result};

const FASTA_LINE_WIDTH: usize = 80;

/// Read a FASTA file, plain or compressed, into one upper-case sequence.
pub fn load_fasta(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let sequence = read_fasta(file, &path.display().to_string())?;
    info!("Loaded {} bases from {}", sequence.len(), path.display());
    Ok(sequence)
}

/// Concatenate the sequence lines of every record, dropping headers and line
/// breaks. Fails with `MalformedInput` when no sequence line is found.
pub fn read_fasta<R: Read + 'static>(input: R, source_name: &str) -> Result<String> {
    let (reader, compression) = niffler::get_reader(Box::new(input))
        .map_err(|e| AssemblyError::malformed(source_name, e.to_string()))?;
    debug!(?compression, "opened {}", source_name);

    let mut fa_reader = Reader::new(reader);
    let mut sequence = Vec::new();
    let mut records = 0usize;
    while let Some(result) = fa_reader.next() {
        let record = result.map_err(|e| AssemblyError::malformed(source_name, e.to_string()))?;
        records += 1;
        for line in record.seq_lines() {
            sequence.extend(line.iter().filter(|b| !b.is_ascii_whitespace()));
        }
    }
    if sequence.is_empty() {
        return Err(AssemblyError::malformed(
            source_name,
            format!("no sequence lines found in {records} record(s)"),
        ));
    }
    sequence.make_ascii_uppercase();
    String::from_utf8(sequence)
        .map_err(|_| AssemblyError::malformed(source_name, "sequence is not valid UTF-8"))
}

/// Write one record, gzip-compressed when the file name ends in `.gz`.
pub fn write_fasta(path: &Path, id: &str, sequence: &str) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let gzipped = path.extension().is_some_and(|ext| ext == "gz");
    if gzipped {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_record(&mut encoder, id, sequence)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        write_record(&mut file, id, sequence)?;
        file.flush()?;
    }
    info!("Wrote {} bases to {}", sequence.len(), path.display());
    Ok(())
}

fn write_record<W: Write>(out: &mut W, id: &str, sequence: &str) -> Result<()> {
    writeln!(out, ">{id}")?;
    for chunk in sequence.as_bytes().chunks(FASTA_LINE_WIDTH) {
        out.write_all(chunk)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// One node label per line, in walk order.
pub fn write_walk(path: &Path, walk: &Walk) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for label in walk.labels() {
        writeln!(out, "{label}")?;
    }
    out.flush()?;
    Ok(())
}
