use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::math::vector::SparseVec;
use crate::utils::sort::argmin;

/// Parameters of a k-means fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    pub n_clusters: usize,
    /// independent k-means++ initializations; the lowest inertia wins
    pub n_init: usize,
    pub max_iter: usize,
    /// convergence bound on the total squared centroid shift
    pub tol: f64,
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }
}

/// Outcome of the best k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    pub inertia: f64,
    pub n_iter: usize,
}

/// Fit k-means on sparse points.
///
/// Lloyd iterations with k-means++ seeding, repeated `n_init` times with seeds
/// drawn from `config.seed`. The assignment step runs on rayon; every
/// reduction is sequential, so the result only depends on the inputs and the
/// seed.
///
/// # Errors
/// * `InvalidConfig` - `k == 0`, `k > points.len()` or `n_init == 0`
/// * `DimensionMismatch` - points of different dimensions
pub fn fit(points: &[SparseVec<f64>], config: &KMeansConfig) -> Result<KMeansFit> {
    let k = config.n_clusters;
    if k == 0 || k > points.len() {
        return Err(Error::InvalidConfig(format!(
            "n_clusters must be in 1..={}, got {k}",
            points.len()
        )));
    }
    if config.n_init == 0 {
        return Err(Error::InvalidConfig("n_init must be at least 1".to_string()));
    }
    let dim = points[0].len();
    if let Some(p) = points.iter().find(|p| p.len() != dim) {
        return Err(Error::DimensionMismatch {
            expected: dim,
            actual: p.len(),
        });
    }

    let mut seeder = StdRng::seed_from_u64(config.seed);
    let run_seeds: Vec<u64> = (0..config.n_init).map(|_| seeder.gen()).collect();

    let mut best: Option<KMeansFit> = None;
    for (run, seed) in run_seeds.into_iter().enumerate() {
        let fitted = lloyd(points, k, dim, config, seed);
        tracing::trace!(run, inertia = fitted.inertia, n_iter = fitted.n_iter, "k-means run");
        match &best {
            Some(b) if fitted.inertia >= b.inertia => {}
            _ => best = Some(fitted),
        }
    }
    best.ok_or_else(|| Error::InvalidConfig("no k-means run completed".to_string()))
}

/// Index of the nearest centroid and the squared distance to it.
/// Ties go to the lowest centroid id.
pub fn nearest(point: &SparseVec<f64>, centroids: &[Vec<f64>]) -> (usize, f64) {
    let dists: Vec<f64> = centroids
        .iter()
        .map(|c| point.squared_distance_dense(c))
        .collect();
    let idx = argmin(&dists).unwrap_or(0);
    (idx, dists.get(idx).copied().unwrap_or(f64::INFINITY))
}

fn assign(points: &[SparseVec<f64>], centroids: &[Vec<f64>]) -> Vec<(usize, f64)> {
    points.par_iter().map(|p| nearest(p, centroids)).collect()
}

fn lloyd(points: &[SparseVec<f64>], k: usize, dim: usize, config: &KMeansConfig, seed: u64) -> KMeansFit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = kmeans_plus_plus(points, k, &mut rng);
    let mut n_iter = 0;

    for _ in 0..config.max_iter {
        n_iter += 1;
        let assigned = assign(points, &centroids);

        let mut sums = vec![vec![0.0; dim]; k];
        let mut counts = vec![0usize; k];
        for (p, (label, _)) in points.iter().zip(&assigned) {
            p.add_into_dense(&mut sums[*label], 1.0);
            counts[*label] += 1;
        }

        // empty clusters take the points farthest from their centroids
        let mut far: Vec<usize> = (0..points.len()).collect();
        far.sort_by(|&a, &b| assigned[b].1.total_cmp(&assigned[a].1));
        let mut far = far.into_iter();

        let mut shift = 0.0;
        for c in 0..k {
            let new_centroid = if counts[c] > 0 {
                let inv = 1.0 / counts[c] as f64;
                sums[c].iter().map(|v| v * inv).collect()
            } else {
                match far.next() {
                    Some(i) => points[i].to_dense(),
                    None => centroids[c].clone(),
                }
            };
            shift += new_centroid
                .iter()
                .zip(&centroids[c])
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>();
            centroids[c] = new_centroid;
        }
        if shift <= config.tol {
            break;
        }
    }

    let assigned = assign(points, &centroids);
    let inertia: f64 = assigned.iter().map(|(_, d)| d).sum();
    KMeansFit {
        centroids,
        labels: assigned.into_iter().map(|(l, _)| l).collect(),
        inertia,
        n_iter,
    }
}

/// k-means++ seeding: the first center is uniform, each next one is drawn
/// with probability proportional to the squared distance to the closest
/// center chosen so far.
fn kmeans_plus_plus(points: &[SparseVec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut chosen = vec![rng.gen_range(0..n)];
    let mut closest: Vec<f64> = points
        .iter()
        .map(|p| p.squared_distance(&points[chosen[0]]))
        .collect();

    while chosen.len() < k {
        let total: f64 = closest.iter().sum();
        let next = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut acc = 0.0;
            let mut pick = None;
            for (i, d) in closest.iter().enumerate() {
                acc += d;
                if acc > target && *d > 0.0 {
                    pick = Some(i);
                    break;
                }
            }
            // rounding can leave `acc` just below `target`
            pick.or_else(|| closest.iter().rposition(|d| *d > 0.0)).unwrap_or(0)
        } else {
            // all remaining points coincide with a center
            let free: Vec<usize> = (0..n).filter(|i| !chosen.contains(i)).collect();
            free[rng.gen_range(0..free.len())]
        };
        chosen.push(next);
        for (i, p) in points.iter().enumerate() {
            let d = p.squared_distance(&points[next]);
            if d < closest[i] {
                closest[i] = d;
            }
        }
    }

    chosen.into_iter().map(|i| points[i].to_dense()).collect()
}
