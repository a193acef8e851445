use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

/// TermFrequency struct
/// Manages the frequency of term occurrences in one document.
/// Terms are unigrams and, depending on the n-gram range, space-joined runs
/// of adjacent tokens.
///
/// # Examples
/// ```
/// use synopsis_recommender::vectorizer::term::TermFrequency;
/// let tokens = ["bank", "heist", "bank"];
/// let freq = TermFrequency::from_tokens(&tokens, (1, 2));
///
/// assert_eq!(freq.term_count("bank"), 2);
/// assert_eq!(freq.term_count("bank heist"), 1);
/// assert_eq!(freq.term_sum(), 5);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TermFrequency {
    term_count: HashMap<String, u64, RandomState>,
    total_term_count: u64,
}

impl TermFrequency {
    pub fn new() -> Self {
        TermFrequency {
            term_count: HashMap::with_hasher(RandomState::new()),
            total_term_count: 0,
        }
    }

    /// Count all n-grams of `tokens` with `lo <= n <= hi`.
    ///
    /// # Arguments
    /// * `tokens` - normalized tokens in document order
    /// * `ngram_range` - inclusive `(lo, hi)`; callers validate `1 <= lo <= hi`
    pub fn from_tokens<T>(tokens: &[T], ngram_range: (usize, usize)) -> Self
    where
        T: AsRef<str>,
    {
        let mut freq = Self::new();
        let (lo, hi) = ngram_range;
        for n in lo.max(1)..=hi {
            for window in tokens.windows(n) {
                let gram = window
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<&str>>()
                    .join(" ");
                freq.add_term(&gram);
            }
        }
        freq
    }

    /// Add a term
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        let count = self.term_count.entry(term.to_string()).or_insert(0);
        *count += 1;
        self.total_term_count += 1;
        self
    }

    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    #[inline]
    pub fn term_count(&self, term: &str) -> u64 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    /// Total number of counted terms, duplicates included.
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    /// Number of distinct terms.
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }

    /// Iterate over `(term, count)` in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.term_count.iter().map(|(t, c)| (t.as_str(), *c))
    }

    /// Distinct terms in arbitrary order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.term_count.keys().map(String::as_str)
    }
}
