//! This crate is a cluster based movie recommender over TF-IDF synopsis vectors.
pub mod catalog;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod logging;
pub mod store;
pub mod text;
pub mod train;
pub mod utils;
pub mod vectorizer;

/// Recommendation Engine
/// The top-level struct of this crate, answering recommendation requests.
///
/// It is constructed in one of two states:
/// - `Ready`: a model bundle is loaded; requests are vectorized, assigned to the
///   nearest cluster of model A (text) or model B (metadata + text), and answered
///   with a genre-diverse selection of that cluster
/// - `DegradedReady`: no bundle could be loaded; requests are answered by a
///   keyword classifier over a plain catalog
///
/// The engine holds only immutable state and is `Send + Sync`.
/// Several engines over different bundles may coexist.
pub use engine::RecommendationEngine;

/// Request / Response structures
/// - `RecommendationRequest`: synopsis plus optional metadata and the model to use
/// - `RecommendationResponse`: ranked recommendations, the predicted cluster, a
///   confidence heuristic, notes and evidence
pub use engine::{EngineState, Method, RecommendationRequest, RecommendationResponse};

/// TF-IDF Vectorizer
/// Fits a vocabulary with document-frequency pruning over a catalog's synopses
/// and converts text into L2-normalized TF-IDF vectors.
///
/// `TfIdfVectorizer<E>` is generic over the TF-IDF calculation engine `E`
/// (default `DefaultTfIdfEngine`).
///
/// # Serialization
/// Supported.
/// Only the configuration, the ordered vocabulary with idf weights and the
/// document count are stored; the text normalizer is rebuilt from its config.
pub use vectorizer::TfIdfVectorizer;

/// Serializable form of `TfIdfVectorizer`, validated on conversion back.
pub use vectorizer::serde::TfIdfData;

/// Corpus for TF-IDF Vectorizer
/// It does not store document text; it only manages:
/// - The number of documents
/// - The number of documents in which each term appears
/// - The total count of each term
///
/// # Thread Safety
/// This struct is thread-safe and can be filled concurrently from multiple threads.
/// Implemented using DashMap and atomics.
pub use vectorizer::corpus::Corpus;

/// Term Frequency structure
/// Counts term (n-gram) occurrences within a single document.
pub use vectorizer::term::TermFrequency;

/// TF IDF Calculation Engine Trait
/// By implementing this trait, you can plug different idf / weighting strategies
/// into `TfIdfVectorizer<E>`.
/// `DefaultTfIdfEngine` uses smoothed idf `ln((1+n)/(1+df)) + 1` and L2
/// normalization.
pub use vectorizer::tfidf::{DefaultTfIdfEngine, TfIdfEngine};

/// Text normalization shared by training, queries and the keyword fallback.
pub use text::normalizer::{NormalizerConfig, TextNormalizer};

/// k-means cluster model with prediction and quality metrics.
pub use cluster::{ClusterModel, Prediction};

/// Catalog of movies.
pub use catalog::{Catalog, MovieRecord};

/// Versioned model bundle storage
/// - `ModelStore`: reads and writes bundle versions under a root directory
/// - `ModelBundle`: every artifact of one training run
/// - `ModelHandle`: shared handle to a loaded bundle
pub use store::{ModelBundle, ModelHandle, ModelStore};

/// Offline training job.
pub use train::Trainer;

pub use config::{EngineConfig, TrainingConfig};
pub use error::{Error, Result};
