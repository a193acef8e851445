use serde::{Deserialize, Serialize};

use crate::catalog::stats::ClusterStats;
use crate::catalog::MovieRecord;
use crate::cluster::metrics::ClusterMetrics;
use crate::cluster::ClusterModel;
use crate::engine::request::Method;
use crate::error::Error;

pub const POSTER_PLACEHOLDER: &str = "/api/placeholder/300/450";
pub const BACKDROP_PLACEHOLDER: &str = "/api/placeholder/1920/1080";

/// How the answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodTag {
    VectorA,
    VectorB,
    KeywordFallback,
}

impl From<Method> for MethodTag {
    fn from(m: Method) -> Self {
        match m {
            Method::VectorA => MethodTag::VectorA,
            Method::VectorB => MethodTag::VectorB,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    None,
    /// predicted cluster was empty
    WholeCatalog,
    /// no model bundle; keyword buckets answered
    KeywordClassifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedMovie {
    pub rank: usize,
    pub id: String,
    pub title_en: String,
    pub title_pt: Option<String>,
    pub year: i32,
    pub rating: f64,
    pub genre: String,
    pub synopsis: String,
    pub director: String,
    pub cast: String,
    pub duration: String,
    pub cluster_id: Option<usize>,
    pub poster_url: String,
    pub backdrop_url: String,
}

impl RecommendedMovie {
    pub fn from_record(rank: usize, record: &MovieRecord, cluster_id: Option<usize>) -> Self {
        Self {
            rank,
            id: record.id.clone(),
            title_en: record.titles.en.clone(),
            title_pt: record.titles.pt.clone(),
            year: record.year,
            rating: record.rating,
            genre: record.genre_string(),
            synopsis: record.synopsis.clone(),
            director: record.director.clone(),
            cast: record.cast.clone(),
            duration: record.duration.clone(),
            cluster_id,
            poster_url: POSTER_PLACEHOLDER.to_string(),
            backdrop_url: BACKDROP_PLACEHOLDER.to_string(),
        }
    }
}

/// Why the query landed where it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub processed_text: String,
    pub cluster_distances: Vec<f64>,
    pub min_distance: f64,
}

/// Shape and training quality of the model that answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvidence {
    /// input dimension of the model (metadata columns included)
    pub n_features: usize,
    pub vocabulary_size: usize,
    pub n_clusters: usize,
    pub metrics: ClusterMetrics,
}

impl ModelEvidence {
    pub fn new(model: &ClusterModel, vocabulary_size: usize) -> Self {
        Self {
            n_features: model.dim(),
            vocabulary_size,
            n_clusters: model.n_clusters(),
            metrics: model.metrics().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<RecommendedMovie>,
    pub cluster: Option<usize>,
    /// heuristic in (0, 1]; not a probability
    pub confidence: f64,
    pub method: MethodTag,
    pub fallback: Fallback,
    pub notes: Vec<String>,
    pub cluster_analysis: Option<ClusterStats>,
    pub evidence: Option<Evidence>,
    #[serde(default)]
    pub model_evidence: Option<ModelEvidence>,
    pub cluster_size: usize,
    pub total_movies: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecommendationResponse {
    /// Render a hard failure for the calling layer.
    pub fn from_error(error: &Error, method: Method) -> Self {
        Self {
            recommendations: Vec::new(),
            cluster: None,
            confidence: 0.0,
            method: method.into(),
            fallback: Fallback::None,
            notes: Vec::new(),
            cluster_analysis: None,
            evidence: None,
            model_evidence: None,
            cluster_size: 0,
            total_movies: 0,
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_serializes_error_field() {
        let r = RecommendationResponse::from_error(&Error::EmptySynopsis, Method::VectorB);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["error"], "synopsis is required");
        assert_eq!(json["method"], "vector_b");
        assert_eq!(json["fallback"], "none");
        assert!(json["recommendations"].as_array().unwrap().is_empty());
        assert!(json["model_evidence"].is_null());
    }

    #[test]
    fn success_omits_error_field() {
        let mut r = RecommendationResponse::from_error(&Error::EmptySynopsis, Method::VectorA);
        r.error = None;
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("error").is_none());
    }
}
