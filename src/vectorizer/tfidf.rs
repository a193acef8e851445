use indexmap::IndexMap;

use crate::utils::math::vector::SparseVec;
use crate::vectorizer::term::TermFrequency;

/// TF-IDF weighting strategy used by [`TfIdfVectorizer`](super::TfIdfVectorizer).
pub trait TfIdfEngine {
    /// IDFを計算するメソッド
    /// # Arguments
    /// * `doc_num` - コーパスの文書数
    /// * `doc_freq` - その語を含む文書数
    fn idf(doc_num: u64, doc_freq: u64) -> f64;

    /// Weighted vector of one document over `vocabulary` (term -> idf, in
    /// index order). Terms outside the vocabulary are ignored.
    fn tfidf_vec(freq: &TermFrequency, vocabulary: &IndexMap<String, f64>) -> SparseVec<f64>;
}

/// デフォルトのTF-IDFエンジン
/// Smoothed idf `ln((1 + n) / (1 + df)) + 1`, raw counts, L2 normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DefaultTfIdfEngine;

impl TfIdfEngine for DefaultTfIdfEngine {
    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f64 {
        ((1.0 + doc_num as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
    }

    fn tfidf_vec(freq: &TermFrequency, vocabulary: &IndexMap<String, f64>) -> SparseVec<f64> {
        let pairs: Vec<(usize, f64)> = freq
            .iter()
            .filter_map(|(term, count)| {
                vocabulary
                    .get_full(term)
                    .map(|(idx, _, idf)| (idx, count as f64 * idf))
            })
            .collect();
        // indices come from the vocabulary itself
        let mut vec = SparseVec::from_pairs(vocabulary.len(), pairs)
            .unwrap_or_else(|| SparseVec::zeros(vocabulary.len()));
        let norm = vec.norm();
        if norm > 0.0 {
            vec.scale(1.0 / norm);
        }
        vec
    }
}
