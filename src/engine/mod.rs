//! Request handling over a loaded bundle, or over keyword buckets when no
//! bundle can be loaded.

pub mod request;
pub mod response;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog::io::read_catalog;
use crate::catalog::retrieval::{ClusterCatalog, RetrievalSource};
use crate::catalog::Catalog;
use crate::cluster::features::combine;
use crate::cluster::ClusterModel;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::fallback::FallbackClassifier;
use crate::store::{ModelHandle, ModelStore};
use crate::text::normalizer::TextNormalizer;

pub use request::{Method, RecommendationRequest};
pub use response::{Evidence, Fallback, MethodTag, ModelEvidence, RecommendationResponse, RecommendedMovie};

/// Lifecycle of an engine.
///
/// `Unloaded` and `Loading` are only observed inside [`RecommendationEngine::start`];
/// a constructed engine is either `Ready` or `DegradedReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unloaded,
    Loading,
    Ready,
    DegradedReady,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineState::Unloaded => "unloaded",
            EngineState::Loading => "loading",
            EngineState::Ready => "ready",
            EngineState::DegradedReady => "degraded_ready",
        };
        f.write_str(s)
    }
}

struct Loaded {
    handle: ModelHandle,
    tfidf_clusters: ClusterCatalog,
    all_clusters: ClusterCatalog,
}

struct Degraded {
    catalog: Catalog,
    classifier: FallbackClassifier,
    reason: String,
}

enum Mode {
    Ready(Loaded),
    Degraded(Degraded),
}

/// Serves recommendations; immutable after construction and shared freely
/// across threads.
pub struct RecommendationEngine {
    config: EngineConfig,
    mode: Mode,
}

impl fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("state", &self.state())
            .field("total_movies", &self.catalog().len())
            .finish()
    }
}

impl RecommendationEngine {
    /// Load the current bundle under `config.bundle_root`. When it cannot be
    /// loaded, fall back to keyword buckets over the first catalog source
    /// that reads.
    ///
    /// # Errors
    /// * `ModelUnavailable` - neither a bundle nor any catalog source is usable
    pub fn start(config: EngineConfig) -> Result<Self> {
        tracing::info!(state = %EngineState::Unloaded, root = %config.bundle_root.display(), "engine starting");
        tracing::info!(state = %EngineState::Loading, "loading model bundle");
        match ModelStore::new(&config.bundle_root).load() {
            Ok(handle) => Ok(Self::from_handle(handle, config)),
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!(error = %reason, "model bundle unavailable, switching to keyword fallback");
                let (source, catalog) = resolve_catalog(&config.catalog_sources).ok_or_else(|| {
                    Error::ModelUnavailable {
                        reason: format!("{reason}; no catalog source could be read"),
                    }
                })?;
                tracing::info!(source = %source.display(), movies = catalog.len(), "fallback catalog resolved");
                Ok(Self::degraded(catalog, config, reason))
            }
        }
    }

    /// A `Ready` engine over an explicit bundle.
    pub fn from_handle(handle: ModelHandle, config: EngineConfig) -> Self {
        let catalog = &handle.catalog;
        let tfidf_labels = catalog
            .tfidf_labels()
            .unwrap_or_else(|| handle.model_tfidf.labels().to_vec());
        let all_labels = catalog
            .all_labels()
            .unwrap_or_else(|| handle.model_all.labels().to_vec());
        let tfidf_clusters = ClusterCatalog::build(
            catalog,
            &tfidf_labels,
            handle.model_tfidf.n_clusters(),
            config.retrieval.clone(),
        );
        let all_clusters = ClusterCatalog::build(
            catalog,
            &all_labels,
            handle.model_all.n_clusters(),
            config.retrieval.clone(),
        );
        tracing::info!(
            state = %EngineState::Ready,
            bundle_id = %handle.bundle_id,
            tfidf_sizes = ?tfidf_clusters.sizes(),
            all_sizes = ?all_clusters.sizes(),
            "engine ready"
        );
        Self {
            config,
            mode: Mode::Ready(Loaded {
                handle,
                tfidf_clusters,
                all_clusters,
            }),
        }
    }

    /// A `DegradedReady` engine answering from keyword buckets over `catalog`.
    pub fn degraded(catalog: Catalog, config: EngineConfig, reason: impl Into<String>) -> Self {
        let classifier = FallbackClassifier::new(&catalog, TextNormalizer::default(), config.fallback.clone());
        tracing::info!(state = %EngineState::DegradedReady, movies = catalog.len(), "engine ready in degraded mode");
        Self {
            config,
            mode: Mode::Degraded(Degraded {
                catalog,
                classifier,
                reason: reason.into(),
            }),
        }
    }

    pub fn state(&self) -> EngineState {
        match self.mode {
            Mode::Ready(_) => EngineState::Ready,
            Mode::Degraded(_) => EngineState::DegradedReady,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The bundle, when one is loaded.
    pub fn handle(&self) -> Option<&ModelHandle> {
        match &self.mode {
            Mode::Ready(l) => Some(&l.handle),
            Mode::Degraded(_) => None,
        }
    }

    /// Why the engine is degraded.
    pub fn degraded_reason(&self) -> Option<&str> {
        match &self.mode {
            Mode::Ready(_) => None,
            Mode::Degraded(d) => Some(&d.reason),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        match &self.mode {
            Mode::Ready(l) => &l.handle.catalog,
            Mode::Degraded(d) => &d.catalog,
        }
    }

    /// Answer one request.
    ///
    /// # Errors
    /// * `EmptySynopsis` - missing or blank synopsis
    /// * `DimensionMismatch` - bundle artifacts disagree (only with a hand-built handle)
    pub fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse> {
        let span = tracing::info_span!("recommend", method = %request.method, state = %self.state());
        let _guard = span.enter();

        let synopsis = request.validated_synopsis()?;
        let n = self.config.recommendations;
        match &self.mode {
            Mode::Ready(loaded) => self.recommend_loaded(loaded, request, synopsis, n),
            Mode::Degraded(degraded) => Ok(self.recommend_degraded(degraded, request, synopsis, n)),
        }
    }

    /// Parse a JSON request and always produce a response; failures are
    /// rendered through [`RecommendationResponse::from_error`].
    pub fn recommend_json(&self, json: &str) -> RecommendationResponse {
        let request: RecommendationRequest = match serde_json::from_str(json) {
            Ok(r) => r,
            Err(e) => return RecommendationResponse::from_error(&Error::from(e), Method::default()),
        };
        match self.recommend(&request) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, hard = e.is_hard_failure(), "request failed");
                RecommendationResponse::from_error(&e, request.method)
            }
        }
    }

    fn recommend_loaded(
        &self,
        loaded: &Loaded,
        request: &RecommendationRequest,
        synopsis: &str,
        n: usize,
    ) -> Result<RecommendationResponse> {
        let bundle = &loaded.handle;
        let mut notes = Vec::new();

        let (processed_text, prediction, model, clusters) = {
            let _predicting = tracing::debug_span!("predicting").entered();
            let processed_text = bundle.vectorizer.normalizer().normalize(synopsis);
            let text = bundle.vectorizer.transform_normalized(&processed_text);
            if text.is_zero() {
                notes.push("no synopsis term is in the vocabulary; the query is the zero text vector".to_string());
            }
            let (vector, model, clusters): (_, &ClusterModel, &ClusterCatalog) = match request.method {
                Method::VectorA => (text, &bundle.model_tfidf, &loaded.tfidf_clusters),
                Method::VectorB => {
                    let meta = bundle.metadata.encode(
                        request.year() as f64,
                        request.rating(),
                        synopsis,
                        request.genre(),
                    )?;
                    notes.extend(meta.note);
                    (combine(&meta.values, &text), &bundle.model_all, &loaded.all_clusters)
                }
            };
            let prediction = model.predict(&vector)?;
            (processed_text, prediction, model, clusters)
        };
        let cluster = prediction.cluster;
        let confidence = prediction.confidence();
        tracing::debug!(cluster, confidence, n_clusters = model.n_clusters(), "cluster predicted");

        let retrieval = {
            let _retrieving = tracing::debug_span!("retrieving", cluster).entered();
            clusters.retrieve(&bundle.catalog, cluster, n, &prediction.distances)
        };
        notes.extend(retrieval.notes.iter().cloned());

        let _responding = tracing::debug_span!("responding").entered();
        let recommendations = retrieval
            .positions
            .iter()
            .enumerate()
            .filter_map(|(i, &pos)| {
                let record = bundle.catalog.get(pos)?;
                let cluster_id = match request.method {
                    Method::VectorA => record.clusters.tfidf,
                    Method::VectorB => record.clusters.all,
                };
                Some(RecommendedMovie::from_record(i + 1, record, cluster_id))
            })
            .collect();
        let fallback = match retrieval.source {
            RetrievalSource::Cluster => Fallback::None,
            RetrievalSource::WholeCatalog => Fallback::WholeCatalog,
        };
        Ok(RecommendationResponse {
            recommendations,
            cluster: Some(cluster),
            confidence,
            method: request.method.into(),
            fallback,
            notes,
            cluster_analysis: clusters.stats(cluster).cloned(),
            evidence: Some(Evidence {
                processed_text,
                min_distance: prediction.min_distance(),
                cluster_distances: prediction.distances,
            }),
            model_evidence: Some(ModelEvidence::new(model, bundle.vectorizer.dim())),
            cluster_size: clusters.members(cluster).len(),
            total_movies: bundle.catalog.len(),
            error: None,
        })
    }

    fn recommend_degraded(
        &self,
        degraded: &Degraded,
        request: &RecommendationRequest,
        synopsis: &str,
        n: usize,
    ) -> RecommendationResponse {
        let _span = tracing::debug_span!("fallback").entered();
        let rec = degraded.classifier.recommend(&degraded.catalog, synopsis, n);
        let category = &degraded.classifier.categories()[rec.classification.category];
        let mut notes = vec![format!(
            "model bundle unavailable; keyword category {:?} answered",
            rec.classification.name
        )];
        notes.extend(rec.notes);

        let recommendations = rec
            .positions
            .iter()
            .enumerate()
            .filter_map(|(i, &pos)| {
                let record = degraded.catalog.get(pos)?;
                let cluster_id = match request.method {
                    Method::VectorA => record.clusters.tfidf,
                    Method::VectorB => record.clusters.all,
                };
                Some(RecommendedMovie::from_record(i + 1, record, cluster_id))
            })
            .collect();
        RecommendationResponse {
            recommendations,
            cluster: None,
            confidence: degraded.classifier.config().confidence,
            method: MethodTag::KeywordFallback,
            fallback: Fallback::KeywordClassifier,
            notes,
            cluster_analysis: None,
            evidence: None,
            model_evidence: None,
            cluster_size: category.members.len(),
            total_movies: degraded.catalog.len(),
            error: None,
        }
    }
}

/// First source in order that exists and parses.
fn resolve_catalog(sources: &[PathBuf]) -> Option<(PathBuf, Catalog)> {
    sources.iter().find_map(|path| match try_source(path) {
        Ok(catalog) => Some((path.clone(), catalog)),
        Err(e) => {
            tracing::debug!(source = %path.display(), error = %e, "catalog source skipped");
            None
        }
    })
}

fn try_source(path: &Path) -> Result<Catalog> {
    if !path.is_file() {
        return Err(Error::InvalidCatalog(format!("{} does not exist", path.display())));
    }
    let catalog = read_catalog(path)?;
    if catalog.is_empty() {
        return Err(Error::InvalidCatalog(format!("{} is empty", path.display())));
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::movie;

    fn assert_send_sync<T: Send + Sync>() {}

    fn catalog() -> Catalog {
        Catalog::new(vec![
            movie("a", 8.0, "Horror", "a ghost haunts the family house"),
            movie("b", 7.0, "Comedy", "a funny wedding goes wrong"),
            movie("c", 9.0, "Drama", "a family story of love and loss"),
        ])
        .unwrap()
    }

    #[test]
    fn engine_is_shareable() {
        assert_send_sync::<RecommendationEngine>();
    }

    #[test]
    fn degraded_engine_tags_keyword_fallback() {
        let engine = RecommendationEngine::degraded(catalog(), EngineConfig::default(), "no bundle");
        assert_eq!(engine.state(), EngineState::DegradedReady);
        let resp = engine.recommend(&RecommendationRequest::new("ghost terror")).unwrap();
        assert_eq!(resp.method, MethodTag::KeywordFallback);
        assert_eq!(resp.fallback, Fallback::KeywordClassifier);
        assert_eq!(resp.confidence, engine.config().fallback.confidence);
        assert!(!resp.notes.is_empty());
        assert_eq!(resp.recommendations.len(), 3);
        assert!(resp.evidence.is_none());
        assert!(resp.model_evidence.is_none());
    }

    #[test]
    fn blank_synopsis_renders_error() {
        let engine = RecommendationEngine::degraded(catalog(), EngineConfig::default(), "no bundle");
        assert!(matches!(
            engine.recommend(&RecommendationRequest::new(" ")),
            Err(Error::EmptySynopsis)
        ));
        let resp = engine.recommend_json(r#"{"synopsis": ""}"#);
        assert!(resp.is_error());
    }

    #[test]
    fn start_without_any_source_fails() {
        let dir = std::env::temp_dir().join("synopsis-recommender-missing-root");
        let config = EngineConfig {
            bundle_root: dir.join("models"),
            catalog_sources: vec![dir.join("nope.csv")],
            ..EngineConfig::default()
        };
        assert!(matches!(
            RecommendationEngine::start(config),
            Err(Error::ModelUnavailable { .. })
        ));
    }
}
