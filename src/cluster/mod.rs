pub mod balance;
pub mod features;
pub mod kmeans;
pub mod metrics;

use serde::{Deserialize, Serialize};

use crate::cluster::balance::BalanceReport;
use crate::cluster::kmeans::KMeansConfig;
use crate::cluster::metrics::ClusterMetrics;
use crate::error::{Error, Result};
use crate::utils::math::vector::SparseVec;
use crate::utils::sort::argmin;

/// Confidence derived from the distance to the assigned centroid.
///
/// `1 / (1 + distance)`: 1 when the query sits on the centroid, decreasing
/// toward 0 as it moves away. This is a monotonic heuristic, **not** a
/// probability, and values are not comparable across models.
#[inline]
pub fn confidence(distance: f64) -> f64 {
    1.0 / (1.0 + distance.max(0.0))
}

/// Nearest cluster of a query and its distance to every centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub cluster: usize,
    /// Euclidean distance to each centroid, by cluster id
    pub distances: Vec<f64>,
}

impl Prediction {
    pub fn min_distance(&self) -> f64 {
        self.distances.get(self.cluster).copied().unwrap_or(f64::INFINITY)
    }

    pub fn confidence(&self) -> f64 {
        confidence(self.min_distance())
    }
}

/// Fitted k-means model: dense centroids plus the balanced training
/// assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    centroids: Vec<Vec<f64>>,
    labels: Vec<usize>,
    dim: usize,
    metrics: ClusterMetrics,
    balance: BalanceReport,
}

impl ClusterModel {
    /// Fit, rebalance undersized clusters and measure.
    pub fn fit(points: &[SparseVec<f64>], config: &KMeansConfig, min_cluster_size: usize) -> Result<Self> {
        let fitted = kmeans::fit(points, config)?;
        let mut labels = fitted.labels;
        let report = balance::balance(points, &fitted.centroids, &mut labels, min_cluster_size);
        let metrics = ClusterMetrics::compute(points, &fitted.centroids, &labels);
        let dim = points.first().map(SparseVec::len).unwrap_or(0);
        Ok(Self {
            centroids: fitted.centroids,
            labels,
            dim,
            metrics,
            balance: report,
        })
    }

    /// Nearest centroid by Euclidean distance; ties go to the lowest id.
    ///
    /// # Errors
    /// * `DimensionMismatch` - `vector` was built for another vocabulary
    pub fn predict(&self, vector: &SparseVec<f64>) -> Result<Prediction> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        let distances: Vec<f64> = self
            .centroids
            .iter()
            .map(|c| vector.distance_dense(c))
            .collect();
        let cluster = argmin(&distances)
            .ok_or_else(|| Error::ModelUnavailable { reason: "model has no centroids".to_string() })?;
        Ok(Prediction { cluster, distances })
    }

    /// Structural checks for a model read from disk.
    pub fn validate(&self) -> Result<()> {
        if self.centroids.is_empty() {
            return Err(Error::InvalidConfig("model has no centroids".to_string()));
        }
        if let Some(c) = self.centroids.iter().find(|c| c.len() != self.dim) {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: c.len(),
            });
        }
        if self.labels.iter().any(|&l| l >= self.centroids.len()) {
            return Err(Error::InvalidConfig("training label out of range".to_string()));
        }
        Ok(())
    }

    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    pub fn centroid(&self, cluster: usize) -> Option<&[f64]> {
        self.centroids.get(cluster).map(Vec::as_slice)
    }

    /// Training assignment, one label per training point.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn metrics(&self) -> &ClusterMetrics {
        &self.metrics
    }

    pub fn balance_report(&self) -> &BalanceReport {
        &self.balance
    }
}
