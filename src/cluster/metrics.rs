use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::math::vector::SparseVec;

/// Quality figures stored with a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMetrics {
    /// sum of squared distances to the assigned centroid
    pub inertia: f64,
    /// mean silhouette coefficient in `[-1, 1]`
    pub silhouette: f64,
    /// higher is better
    pub calinski_harabasz: f64,
    /// lower is better
    pub davies_bouldin: f64,
    pub sizes: Vec<usize>,
}

impl ClusterMetrics {
    pub fn compute(points: &[SparseVec<f64>], centroids: &[Vec<f64>], labels: &[usize]) -> Self {
        Self {
            inertia: inertia(points, centroids, labels),
            silhouette: silhouette(points, labels, centroids.len()),
            calinski_harabasz: calinski_harabasz(points, labels, centroids.len()),
            davies_bouldin: davies_bouldin(points, labels, centroids.len()),
            sizes: sizes(labels, centroids.len()),
        }
    }
}

pub fn sizes(labels: &[usize], k: usize) -> Vec<usize> {
    let mut sizes = vec![0; k];
    for &l in labels {
        if l < k {
            sizes[l] += 1;
        }
    }
    sizes
}

pub fn inertia(points: &[SparseVec<f64>], centroids: &[Vec<f64>], labels: &[usize]) -> f64 {
    points
        .iter()
        .zip(labels)
        .map(|(p, &l)| p.squared_distance_dense(&centroids[l]))
        .sum()
}

/// Mean silhouette with Euclidean distance.
///
/// A point alone in its cluster scores 0; the whole score is 0 when fewer than
/// two clusters are populated.
pub fn silhouette(points: &[SparseVec<f64>], labels: &[usize], k: usize) -> f64 {
    let counts = sizes(labels, k);
    if points.is_empty() || counts.iter().filter(|&&c| c > 0).count() < 2 {
        return 0.0;
    }

    let scores: Vec<f64> = (0..points.len())
        .into_par_iter()
        .map(|i| {
            let own = labels[i];
            if counts[own] < 2 {
                return 0.0;
            }
            let mut sums = vec![0.0; k];
            for (j, p) in points.iter().enumerate() {
                if j != i {
                    sums[labels[j]] += points[i].squared_distance(p).sqrt();
                }
            }
            let a = sums[own] / (counts[own] - 1) as f64;
            let b = (0..k)
                .filter(|&c| c != own && counts[c] > 0)
                .map(|c| sums[c] / counts[c] as f64)
                .fold(f64::INFINITY, f64::min);
            let denom = a.max(b);
            if denom > 0.0 { (b - a) / denom } else { 0.0 }
        })
        .collect();

    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Mean of the points carrying each label. Empty clusters stay at the origin.
fn label_means(points: &[SparseVec<f64>], labels: &[usize], counts: &[usize]) -> Vec<Vec<f64>> {
    let dim = points.first().map(SparseVec::len).unwrap_or(0);
    let mut means = vec![vec![0.0; dim]; counts.len()];
    for (p, &l) in points.iter().zip(labels) {
        if let Some(m) = means.get_mut(l) {
            p.add_into_dense(m, 1.0);
        }
    }
    for (m, &c) in means.iter_mut().zip(counts) {
        if c > 0 {
            let inv = 1.0 / c as f64;
            m.iter_mut().for_each(|v| *v *= inv);
        }
    }
    means
}

fn dense_squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Calinski-Harabasz index (variance ratio).
///
/// Between-cluster dispersion over within-cluster dispersion, each divided by
/// its degrees of freedom. Cluster means are taken from the labels, so the
/// score reflects the balanced assignment. 0 when fewer than two clusters are
/// populated or no cluster has two members; 1 when every cluster is a single
/// repeated point.
pub fn calinski_harabasz(points: &[SparseVec<f64>], labels: &[usize], k: usize) -> f64 {
    let counts = sizes(labels, k);
    let populated = counts.iter().filter(|&&c| c > 0).count();
    let n = points.len();
    if populated < 2 || n <= populated {
        return 0.0;
    }
    let means = label_means(points, labels, &counts);

    let mut overall = vec![0.0; means[0].len()];
    for p in points {
        p.add_into_dense(&mut overall, 1.0 / n as f64);
    }
    let between: f64 = means
        .iter()
        .zip(&counts)
        .filter(|&(_, &c)| c > 0)
        .map(|(m, &c)| c as f64 * dense_squared_distance(m, &overall))
        .sum();
    let within: f64 = points
        .iter()
        .zip(labels)
        .filter(|&(_, &l)| l < k)
        .map(|(p, &l)| p.squared_distance_dense(&means[l]))
        .sum();
    if within == 0.0 {
        return 1.0;
    }
    between * (n - populated) as f64 / (within * (populated - 1) as f64)
}

/// Davies-Bouldin index.
///
/// Mean over clusters of the worst `(s_i + s_j) / d(m_i, m_j)`, where `s` is
/// the mean distance of members to their cluster mean. Coinciding means add
/// nothing. 0 when fewer than two clusters are populated.
pub fn davies_bouldin(points: &[SparseVec<f64>], labels: &[usize], k: usize) -> f64 {
    let counts = sizes(labels, k);
    let live: Vec<usize> = (0..k).filter(|&c| counts[c] > 0).collect();
    if live.len() < 2 {
        return 0.0;
    }
    let means = label_means(points, labels, &counts);

    let mut scatter = vec![0.0; k];
    for (p, &l) in points.iter().zip(labels) {
        if l < k {
            scatter[l] += p.distance_dense(&means[l]);
        }
    }
    for (s, &c) in scatter.iter_mut().zip(&counts) {
        if c > 0 {
            *s /= c as f64;
        }
    }

    let total: f64 = live
        .iter()
        .map(|&i| {
            live.iter()
                .filter(|&&j| j != i)
                .map(|&j| {
                    let separation = dense_squared_distance(&means[i], &means[j]).sqrt();
                    if separation > 0.0 {
                        (scatter[i] + scatter[j]) / separation
                    } else {
                        0.0
                    }
                })
                .fold(0.0, f64::max)
        })
        .sum();
    total / live.len() as f64
}
