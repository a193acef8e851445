use std::sync::atomic::{AtomicU64, Ordering};

use ahash::RandomState;
use dashmap::DashMap;

use crate::vectorizer::term::TermFrequency;

/// Document statistics gathered while fitting a vectorizer.
///
/// Thread-safe: documents can be added concurrently from rayon workers.
/// It keeps, per term, the number of documents containing it and the total
/// number of occurrences across the corpus.
#[derive(Debug, Default)]
pub struct Corpus {
    /// number of added documents
    pub doc_num: AtomicU64,
    /// term -> number of documents containing it
    pub doc_freq: DashMap<Box<str>, u64, RandomState>,
    /// term -> occurrences across all documents
    pub term_total: DashMap<Box<str>, u64, RandomState>,
}

impl Clone for Corpus {
    fn clone(&self) -> Self {
        Self {
            doc_num: AtomicU64::new(self.doc_num.load(Ordering::Acquire)),
            doc_freq: self.doc_freq.clone(),
            term_total: self.term_total.clone(),
        }
    }
}

/// Snapshot of one term's corpus statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermStat {
    pub term: String,
    pub doc_freq: u64,
    pub total: u64,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            doc_num: AtomicU64::new(0),
            doc_freq: DashMap::with_hasher(RandomState::new()),
            term_total: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Add a document's term counts to the corpus
    pub fn add_document(&self, freq: &TermFrequency) {
        self.doc_num.fetch_add(1, Ordering::Relaxed);
        for (term, count) in freq.iter() {
            self.doc_freq
                .entry(term.into())
                .and_modify(|df| *df += 1)
                .or_insert(1);
            self.term_total
                .entry(term.into())
                .and_modify(|total| *total += count)
                .or_insert(count);
        }
    }

    /// Get the number of documents in the corpus
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num.load(Ordering::Relaxed)
    }

    /// Number of documents containing `term`
    pub fn get_doc_freq(&self, term: &str) -> u64 {
        self.doc_freq.get(term).map_or(0, |df| *df)
    }

    pub fn get_term_total(&self, term: &str) -> u64 {
        self.term_total.get(term).map_or(0, |total| *total)
    }

    /// Get the current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.doc_freq.len()
    }

    /// Statistics of every term, sorted by term.
    pub fn term_stats(&self) -> Vec<TermStat> {
        let mut stats: Vec<TermStat> = self
            .doc_freq
            .iter()
            .map(|entry| TermStat {
                term: entry.key().to_string(),
                doc_freq: *entry.value(),
                total: self.get_term_total(entry.key()),
            })
            .collect();
        stats.sort_by(|a, b| a.term.cmp(&b.term));
        stats
    }
}

#[cfg(test)]
mod tests {
    use rayon::prelude::*;

    use super::*;

    #[test]
    fn counts_documents_not_occurrences() {
        let corpus = Corpus::new();
        corpus.add_document(&TermFrequency::from_tokens(&["ghost", "ghost"], (1, 1)));
        corpus.add_document(&TermFrequency::from_tokens(&["ghost", "house"], (1, 1)));
        assert_eq!(corpus.get_doc_num(), 2);
        assert_eq!(corpus.get_doc_freq("ghost"), 2);
        assert_eq!(corpus.get_term_total("ghost"), 3);
        assert_eq!(corpus.get_doc_freq("missing"), 0);
    }

    #[test]
    fn parallel_fill_matches_sequential() {
        let docs: Vec<Vec<&str>> = (0..64)
            .map(|i| if i % 2 == 0 { vec!["even", "word"] } else { vec!["odd", "word"] })
            .collect();
        let corpus = Corpus::new();
        docs.par_iter()
            .for_each(|d| corpus.add_document(&TermFrequency::from_tokens(d.as_slice(), (1, 1))));
        assert_eq!(corpus.get_doc_num(), 64);
        assert_eq!(corpus.get_doc_freq("word"), 64);
        assert_eq!(corpus.get_doc_freq("even"), 32);
        let terms: Vec<String> = corpus.term_stats().into_iter().map(|s| s.term).collect();
        assert_eq!(terms, vec!["even", "odd", "word"]);
    }
}
