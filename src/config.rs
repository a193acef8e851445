use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use crate::catalog::retrieval::RetrievalConfig;
pub use crate::cluster::kmeans::KMeansConfig;
pub use crate::fallback::FallbackConfig;
pub use crate::logging::LogConfig;
pub use crate::vectorizer::VectorizerConfig;

/// Default number of recommendations per request.
pub const DEFAULT_RECOMMENDATIONS: usize = 5;

/// Default minimum members per cluster after rebalancing.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;

/// Settings of the serving side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// directory holding bundle versions and the `CURRENT` pointer
    pub bundle_root: PathBuf,
    /// catalogs tried in order when no bundle can be loaded
    pub catalog_sources: Vec<PathBuf>,
    pub recommendations: usize,
    pub retrieval: RetrievalConfig,
    pub fallback: FallbackConfig,
    pub log: LogConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bundle_root: PathBuf::from("models"),
            catalog_sources: vec![
                PathBuf::from("data/catalog_with_clusters.csv"),
                PathBuf::from("data/catalog.csv"),
                PathBuf::from("data/catalog.json"),
            ],
            recommendations: DEFAULT_RECOMMENDATIONS,
            retrieval: RetrievalConfig::default(),
            fallback: FallbackConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read overrides from the environment:
    /// `RECOMMENDER_BUNDLE_ROOT`, `RECOMMENDER_CATALOG_SOURCES` (`:`-separated),
    /// `RECOMMENDER_COUNT`, `RECOMMENDER_DIVERSITY_MIN_GENRES`, `RECOMMENDER_RATING_LEAD`,
    /// `RECOMMENDER_FALLBACK_SEED`, `LOG_LEVEL`, `LOG_JSON`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let catalog_sources = match env::var("RECOMMENDER_CATALOG_SOURCES") {
            Ok(raw) => env::split_paths(&raw).collect(),
            Err(_) => defaults.catalog_sources,
        };
        Self {
            bundle_root: PathBuf::from(env_or("RECOMMENDER_BUNDLE_ROOT", "models")),
            catalog_sources,
            recommendations: env_or_parse("RECOMMENDER_COUNT", DEFAULT_RECOMMENDATIONS),
            retrieval: RetrievalConfig {
                diversity_min_genres: env_or_parse(
                    "RECOMMENDER_DIVERSITY_MIN_GENRES",
                    defaults.retrieval.diversity_min_genres,
                ),
                rating_lead: env_or_parse("RECOMMENDER_RATING_LEAD", defaults.retrieval.rating_lead),
                ..defaults.retrieval
            },
            fallback: FallbackConfig {
                seed: env_or_parse("RECOMMENDER_FALLBACK_SEED", defaults.fallback.seed),
                ..defaults.fallback
            },
            log: LogConfig {
                log_level: env_or("LOG_LEVEL", &defaults.log.log_level),
                json: env_or_bool("LOG_JSON", defaults.log.json),
            },
        }
    }
}

/// Settings of the offline training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub n_clusters: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
    pub min_cluster_size: usize,
    pub vectorizer: VectorizerConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let kmeans = KMeansConfig::default();
        Self {
            n_clusters: kmeans.n_clusters,
            n_init: kmeans.n_init,
            max_iter: kmeans.max_iter,
            tol: kmeans.tol,
            seed: kmeans.seed,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            vectorizer: VectorizerConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// `TRAIN_CLUSTERS`, `TRAIN_N_INIT`, `TRAIN_MAX_ITER`, `TRAIN_TOL`,
    /// `TRAIN_SEED`, `TRAIN_MIN_CLUSTER_SIZE`, `TRAIN_MIN_DF`, `TRAIN_MAX_DF`,
    /// `TRAIN_MAX_FEATURES`.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            n_clusters: env_or_parse("TRAIN_CLUSTERS", d.n_clusters),
            n_init: env_or_parse("TRAIN_N_INIT", d.n_init),
            max_iter: env_or_parse("TRAIN_MAX_ITER", d.max_iter),
            tol: env_or_parse("TRAIN_TOL", d.tol),
            seed: env_or_parse("TRAIN_SEED", d.seed),
            min_cluster_size: env_or_parse("TRAIN_MIN_CLUSTER_SIZE", d.min_cluster_size),
            vectorizer: VectorizerConfig {
                min_df: env_or_parse("TRAIN_MIN_DF", d.vectorizer.min_df),
                max_df: env_or_parse("TRAIN_MAX_DF", d.vectorizer.max_df),
                // 0 disables the cap
                max_features: match env_or_parse(
                    "TRAIN_MAX_FEATURES",
                    d.vectorizer.max_features.unwrap_or(0),
                ) {
                    0 => None,
                    m => Some(m),
                },
                ..d.vectorizer
            },
        }
    }

    pub fn kmeans(&self) -> KMeansConfig {
        KMeansConfig {
            n_clusters: self.n_clusters,
            n_init: self.n_init,
            max_iter: self.max_iter,
            tol: self.tol,
            seed: self.seed,
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Failed to parse env var, using default");
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
