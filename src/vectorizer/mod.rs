pub mod corpus;
pub mod serde;
pub mod term;
pub mod tfidf;

use std::marker::PhantomData;

use ::serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::text::normalizer::{NormalizerConfig, TextNormalizer};
use crate::utils::math::vector::SparseVec;
use crate::vectorizer::{
    corpus::Corpus,
    term::TermFrequency,
    tfidf::{DefaultTfIdfEngine, TfIdfEngine},
};

/// Fitting parameters of a [`TfIdfVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// minimum number of documents a term must appear in
    pub min_df: usize,
    /// maximum share of documents a term may appear in, `(0, 1]`
    pub max_df: f64,
    /// keep only the most frequent terms; `None` keeps all
    pub max_features: Option<usize>,
    /// inclusive n-gram lengths
    pub ngram_range: (usize, usize),
    pub normalizer: NormalizerConfig,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            min_df: 2,
            max_df: 0.8,
            max_features: Some(1000),
            ngram_range: (1, 2),
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_df == 0 {
            return Err(Error::InvalidConfig("min_df must be at least 1".to_string()));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.max_features == Some(0) {
            return Err(Error::InvalidConfig("max_features must be positive".to_string()));
        }
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(Error::InvalidConfig(format!(
                "invalid ngram_range ({lo}, {hi})"
            )));
        }
        Ok(())
    }
}

/// TF-IDF Vectorizer
/// Maps free text to L2-normalized TF-IDF vectors over a fixed vocabulary.
///
/// The vocabulary is learned once by [`TfIdfVectorizer::fit`] and then frozen:
/// transforming new text never adds terms, unknown terms are ignored.
/// Vocabulary index order is lexicographic term order.
///
/// The normalizer used at fit time is part of the vectorizer and of its
/// serialized form, so queries are tokenized exactly like the training corpus.
///
/// # Serialization
/// Supported through [`serde::TfIdfData`].
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer<E = DefaultTfIdfEngine>
where
    E: TfIdfEngine,
{
    pub(crate) config: VectorizerConfig,
    pub(crate) normalizer: TextNormalizer,
    /// term -> idf, in index order
    pub(crate) vocabulary: IndexMap<String, f64>,
    /// number of documents seen at fit time
    pub(crate) doc_num: u64,
    pub(crate) _marker: PhantomData<E>,
}

impl<E> PartialEq for TfIdfVectorizer<E>
where
    E: TfIdfEngine,
{
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.normalizer == other.normalizer
            && self.vocabulary == other.vocabulary
            && self.doc_num == other.doc_num
    }
}

impl<E> TfIdfVectorizer<E>
where
    E: TfIdfEngine,
{
    /// Learn the vocabulary and idf weights of `documents`.
    ///
    /// # Arguments
    /// * `config` - pruning and tokenization parameters
    /// * `documents` - raw document texts
    ///
    /// # Errors
    /// * `InvalidConfig` - bad `min_df` / `max_df` / `ngram_range`
    /// * `EmptyCorpus` - every document is empty after normalization
    /// * `EmptyVocabulary` - no term survives document-frequency pruning
    pub fn fit<S>(config: VectorizerConfig, documents: &[S]) -> Result<Self>
    where
        S: AsRef<str> + Sync,
    {
        config.validate()?;
        let normalizer = TextNormalizer::new(config.normalizer.clone());

        let tokenized: Vec<Vec<String>> = documents
            .par_iter()
            .map(|d| normalizer.tokens(d.as_ref()))
            .collect();
        if tokenized.iter().all(Vec::is_empty) {
            return Err(Error::EmptyCorpus {
                documents: documents.len(),
            });
        }

        let corpus = Corpus::new();
        tokenized.par_iter().for_each(|tokens| {
            corpus.add_document(&TermFrequency::from_tokens(tokens, config.ngram_range));
        });

        let doc_num = corpus.get_doc_num();
        let max_doc_count = config.max_df * doc_num as f64;
        let mut kept: Vec<_> = corpus
            .term_stats()
            .into_iter()
            .filter(|s| s.doc_freq >= config.min_df as u64 && s.doc_freq as f64 <= max_doc_count)
            .collect();

        if let Some(max_features) = config.max_features {
            if kept.len() > max_features {
                // stable: equal totals keep term order
                kept.sort_by(|a, b| b.total.cmp(&a.total));
                kept.truncate(max_features);
                kept.sort_by(|a, b| a.term.cmp(&b.term));
            }
        }
        if kept.is_empty() {
            return Err(Error::EmptyVocabulary {
                min_df: config.min_df,
                max_df: config.max_df,
            });
        }

        let vocabulary: IndexMap<String, f64> = kept
            .into_iter()
            .map(|s| {
                let idf = E::idf(doc_num, s.doc_freq);
                (s.term, idf)
            })
            .collect();

        tracing::debug!(
            documents = doc_num,
            candidate_terms = corpus.vocab_size(),
            vocabulary = vocabulary.len(),
            "vectorizer fitted"
        );

        Ok(Self {
            config,
            normalizer,
            vocabulary,
            doc_num,
            _marker: PhantomData,
        })
    }

    /// Vectorize raw text. Same as [`Self::transform_raw`].
    #[inline]
    pub fn transform(&self, text: &str) -> SparseVec<f64> {
        self.transform_raw(text)
    }

    /// Normalize `text` with the fitted normalizer, then vectorize.
    pub fn transform_raw(&self, text: &str) -> SparseVec<f64> {
        let tokens = self.normalizer.tokens(text);
        self.transform_tokens(&tokens)
    }

    /// Vectorize text that has already been normalized (space-separated tokens).
    pub fn transform_normalized(&self, normalized: &str) -> SparseVec<f64> {
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        self.transform_tokens(&tokens)
    }

    fn transform_tokens<T>(&self, tokens: &[T]) -> SparseVec<f64>
    where
        T: AsRef<str>,
    {
        let freq = TermFrequency::from_tokens(tokens, self.config.ngram_range);
        E::tfidf_vec(&freq, &self.vocabulary)
    }

    /// Vectorize many raw texts in parallel, preserving order.
    pub fn transform_batch<S>(&self, documents: &[S]) -> Vec<SparseVec<f64>>
    where
        S: AsRef<str> + Sync,
        E: Sync,
    {
        documents
            .par_iter()
            .map(|d| self.transform_raw(d.as_ref()))
            .collect()
    }

    /// Output dimension (vocabulary size).
    #[inline]
    pub fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &IndexMap<String, f64> {
        &self.vocabulary
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).copied()
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }
}
