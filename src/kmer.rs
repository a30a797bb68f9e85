//! K-mer extraction.
//!
//! A window of length k slides over the sequence left to right; every
//! position yields one [`Kmer`], repeats included. The list keeps that order
//! because the graph builder relies on it for a reproducible walk.

use rayon::prelude::*;
use tracing::debug;

use crate::constants::MIN_K;
use crate::error::{AssemblyError, Result};
use crate::utils::{first_invalid_nucleotide, nuc2int};

/// Sequences at least this long are extracted on the rayon pool by
/// [`KmerList::extract_auto`].
pub const PAR_EXTRACT_MIN_LEN: usize = 1 << 16;

/// One k-mer occurrence, borrowed from its [`KmerList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kmer<'a> {
    start: usize,
    text: &'a str,
}

impl<'a> Kmer<'a> {
    /// Offset in the source sequence, or the position in the input list for
    /// k-mers given explicitly.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// First k-1 symbols.
    pub fn prefix(&self) -> &'a str {
        &self.text[..self.text.len() - 1]
    }

    /// Last k-1 symbols.
    pub fn suffix(&self) -> &'a str {
        &self.text[1..]
    }
}

/// Ordered k-mer occurrences sharing a single k.
///
/// K-mer `i` is `text[i * stride..i * stride + k]`: stride 1 over the source
/// sequence for extracted lists, stride k over the concatenation for lists
/// given explicitly. Memory stays linear in the input either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerList {
    k: usize,
    stride: usize,
    count: usize,
    text: String,
}

impl KmerList {
    /// Slide a k-window over `sequence`, producing `len - k + 1` k-mers.
    pub fn extract(sequence: &str, k: usize) -> Result<Self> {
        check_k(sequence.len(), k)?;
        check_alphabet(k, sequence, first_invalid_nucleotide(sequence.as_bytes()))?;
        Ok(Self::windows(sequence, k))
    }

    /// Same output as [`KmerList::extract`]; the alphabet scan runs on the
    /// rayon pool.
    pub fn par_extract(sequence: &str, k: usize) -> Result<Self> {
        check_k(sequence.len(), k)?;
        let bytes = sequence.as_bytes();
        let invalid = bytes
            .par_iter()
            .position_first(|b| nuc2int(b).is_none())
            .map(|pos| (pos, bytes[pos]));
        check_alphabet(k, sequence, invalid)?;
        Ok(Self::windows(sequence, k))
    }

    fn windows(sequence: &str, k: usize) -> Self {
        let list = KmerList {
            k,
            stride: 1,
            count: sequence.len() - k + 1,
            text: sequence.to_owned(),
        };
        debug!(k, kmers = list.count, "extracted k-mers");
        list
    }

    /// Parallel extraction for long sequences, sequential otherwise.
    pub fn extract_auto(sequence: &str, k: usize) -> Result<Self> {
        if sequence.len() >= PAR_EXTRACT_MIN_LEN {
            Self::par_extract(sequence, k)
        } else {
            Self::extract(sequence, k)
        }
    }

    /// Build a list from k-mers given directly, in iteration order.
    /// Every item must be exactly `k` symbols from `ACGT`.
    pub fn from_kmers<I, S>(k: usize, kmers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if k < MIN_K {
            return Err(AssemblyError::invalid_k(k, 0, format!("k must be at least {MIN_K}")));
        }
        let mut text = String::new();
        let mut count = 0;
        for (i, kmer) in kmers.into_iter().enumerate() {
            let kmer = kmer.as_ref();
            if kmer.len() != k {
                return Err(AssemblyError::invalid_k(
                    k,
                    kmer.len(),
                    format!("k-mer #{i} '{kmer}' does not have length {k}"),
                ));
            }
            if let Some((pos, b)) = first_invalid_nucleotide(kmer.as_bytes()) {
                return Err(AssemblyError::invalid_k(
                    k,
                    kmer.len(),
                    format!("k-mer #{i} has symbol {:?} at offset {pos}", b as char),
                ));
            }
            text.push_str(kmer);
            count += 1;
        }
        if count == 0 {
            return Err(AssemblyError::invalid_k(k, 0, "empty k-mer set"));
        }
        Ok(KmerList {
            k,
            stride: k,
            count,
            text,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn get(&self, i: usize) -> Option<Kmer<'_>> {
        if i >= self.count {
            return None;
        }
        let offset = i * self.stride;
        Some(Kmer {
            start: i,
            text: &self.text[offset..offset + self.k],
        })
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter { list: self, next: 0 }
    }
}

pub struct Iter<'a> {
    list: &'a KmerList,
    next: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Kmer<'a>;

    fn next(&mut self) -> Option<Kmer<'a>> {
        let kmer = self.list.get(self.next)?;
        self.next += 1;
        Some(kmer)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.list.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a KmerList {
    type Item = Kmer<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_k(n: usize, k: usize) -> Result<()> {
    if k < MIN_K {
        return Err(AssemblyError::invalid_k(k, n, format!("k must be at least {MIN_K}")));
    }
    if k > n {
        return Err(AssemblyError::invalid_k(k, n, "k exceeds the sequence length"));
    }
    Ok(())
}

fn check_alphabet(k: usize, sequence: &str, invalid: Option<(usize, u8)>) -> Result<()> {
    match invalid {
        Some((pos, b)) => Err(AssemblyError::invalid_k(
            k,
            sequence.len(),
            format!("unsupported symbol {:?} at offset {pos}", b as char),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(list: &KmerList) -> Vec<&str> {
        list.iter().map(|kmer| kmer.as_str()).collect()
    }

    #[test]
    fn test_extract_scenario_a() {
        let list = KmerList::extract("ACGTAC", 3).unwrap();
        assert_eq!(texts(&list), vec!["ACG", "CGT", "GTA", "TAC"]);
        let first = list.get(0).unwrap();
        assert_eq!(first.prefix(), "AC");
        assert_eq!(first.suffix(), "CG");
        assert_eq!(list.get(3).unwrap().start(), 3);
        assert!(list.get(4).is_none());
    }

    #[test]
    fn test_extract_k_equals_len() {
        let list = KmerList::extract("ACGT", 4).unwrap();
        assert_eq!(texts(&list), vec!["ACGT"]);
    }

    #[test]
    fn test_extract_rejects_bad_k() {
        assert!(matches!(
            KmerList::extract("ACGT", 1),
            Err(AssemblyError::InvalidParameter { k: 1, .. })
        ));
        assert!(matches!(
            KmerList::extract("ACGT", 5),
            Err(AssemblyError::InvalidParameter { k: 5, len: 4, .. })
        ));
        assert!(matches!(
            KmerList::extract("", 2),
            Err(AssemblyError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_extract_rejects_ambiguous_bases() {
        let err = KmerList::extract("ACNGT", 3).unwrap_err();
        assert!(err.to_string().contains("offset 2"));
        let err = KmerList::par_extract("ACGTRCNT", 3).unwrap_err();
        assert!(err.to_string().contains("'R' at offset 4"));
    }

    #[test]
    fn test_extracted_list_shares_one_buffer() {
        let seq = "ACGT".repeat(1000);
        let list = KmerList::extract(&seq, 31).unwrap();
        assert_eq!(list.text.len(), seq.len());
        assert_eq!(list.get(5).unwrap().as_str(), &seq[5..36]);
    }

    #[test]
    fn test_par_extract_matches() {
        let seq = "ACGTTGCAAGGCTTACGATCGATCGGGATCCA".repeat(10);
        for k in [2, 3, 7, 31] {
            assert_eq!(
                KmerList::extract(&seq, k).unwrap(),
                KmerList::par_extract(&seq, k).unwrap()
            );
        }
    }

    #[test]
    fn test_from_kmers() {
        let list = KmerList::from_kmers(3, ["ACG", "CGT"]).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).unwrap().start(), 1);
        assert_eq!(list.get(1).unwrap().as_str(), "CGT");
        assert_eq!(list.iter().len(), 2);

        assert!(KmerList::from_kmers(3, ["ACG", "CG"]).is_err());
        assert!(KmerList::from_kmers(3, ["ACN"]).is_err());
        assert!(KmerList::from_kmers(1, ["A"]).is_err());
        assert!(KmerList::from_kmers(3, Vec::<&str>::new()).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_kmer_count(seq in "[ACGT]{2,120}", k in 2usize..12) {
                prop_assume!(k <= seq.len());
                let list = KmerList::extract(&seq, k).unwrap();
                prop_assert_eq!(list.len(), seq.len() - k + 1);
                prop_assert!(list.iter().all(|kmer| kmer.len() == k));
            }
        }
    }
}
