use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the recommender.
///
/// Recoverable conditions (an empty cluster, a genre the encoder never saw)
/// are not represented here: they are handled where they occur and reported
/// as notes on the response.
#[derive(Debug, Error)]
pub enum Error {
    /// The request carried no usable synopsis.
    #[error("synopsis is required")]
    EmptySynopsis,

    /// The model bundle is absent or incomplete.
    #[error("model bundle unavailable: {reason}")]
    ModelUnavailable { reason: String },

    /// Every document became empty after normalization.
    #[error("cannot fit vectorizer: all {documents} documents are empty after normalization")]
    EmptyCorpus { documents: usize },

    /// No term survived document-frequency pruning.
    #[error("cannot fit vectorizer: no terms remain after pruning (min_df={min_df}, max_df={max_df})")]
    EmptyVocabulary { min_df: usize, max_df: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A vector was built against a different vocabulary than the model.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("persistence error at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cbor error: {0}")]
    Cbor(#[from] serde_cbor::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an error with the path of the artifact being read or written.
    pub fn at_path(self, path: impl Into<PathBuf>) -> Self {
        Error::Persistence {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Whether the calling layer should answer with a hard failure.
    pub fn is_hard_failure(&self) -> bool {
        matches!(
            self,
            Error::EmptySynopsis
                | Error::Persistence { .. }
                | Error::Io(_)
                | Error::Cbor(_)
                | Error::Csv(_)
                | Error::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_json_is_a_hard_failure() {
        let err: Error = serde_json::from_str::<u32>("{not json").unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.is_hard_failure());
    }

    #[test]
    fn recoverable_errors_are_soft() {
        assert!(!Error::ModelUnavailable { reason: "gone".into() }.is_hard_failure());
        assert!(!Error::InvalidConfig("k".into()).is_hard_failure());
        assert!(Error::EmptySynopsis.is_hard_failure());
    }
}
