use std::path::Path;

pub fn extract_filename(path: &Path) -> &str {
    // File name up to the first '.', so "reads.fa.gz" gives "reads"
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("sequence");
    match filename.find('.') {
        Some(0) | None => filename,
        Some(idx) => &filename[..idx],
    }
}

pub fn nuc2int(b: &u8) -> Option<u8> {
    match b {
        b'A' | b'C' | b'T' | b'G' => Some((b / 3 - 1) % 4),
        _ => None,
    }
}

/// Offset and byte of the first symbol outside `ACGT`, if any.
pub fn first_invalid_nucleotide(seq: &[u8]) -> Option<(usize, u8)> {
    seq.iter()
        .enumerate()
        .find(|(_, b)| nuc2int(b).is_none())
        .map(|(i, b)| (i, *b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nuc2int_codes() {
        assert_eq!(nuc2int(&b'A'), Some(0));
        assert_eq!(nuc2int(&b'C'), Some(1));
        assert_eq!(nuc2int(&b'G'), Some(2));
        assert_eq!(nuc2int(&b'T'), Some(3));
        assert_eq!(nuc2int(&b'N'), None);
        assert_eq!(nuc2int(&b'a'), None);
    }

    #[test]
    fn test_first_invalid() {
        assert_eq!(first_invalid_nucleotide(b"ACGT"), None);
        assert_eq!(first_invalid_nucleotide(b"ACNT"), Some((2, b'N')));
        assert_eq!(first_invalid_nucleotide(b""), None);
    }

    #[test]
    fn test_extract_filename() {
        assert_eq!(extract_filename(Path::new("data/reads.fa.gz")), "reads");
        assert_eq!(extract_filename(Path::new("genome")), "genome");
        assert_eq!(extract_filename(Path::new(".hidden")), ".hidden");
    }
}
