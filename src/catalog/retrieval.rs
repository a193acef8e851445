use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::stats::ClusterStats;
use crate::catalog::Catalog;

/// Ranking knobs shared by every cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// below this many distinct primary genres, rank purely by rating
    pub diversity_min_genres: usize,
    pub representative_count: usize,
    pub top_genres: usize,
    /// highest-rated picks taken before genre repeats are skipped; 0 applies
    /// the genre rule from the first pick
    pub rating_lead: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            diversity_min_genres: 3,
            representative_count: 3,
            top_genres: 3,
            rating_lead: 0,
        }
    }
}

/// Where the retrieved entries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalSource {
    Cluster,
    /// the predicted cluster had no members
    WholeCatalog,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    /// catalog positions in result order
    pub positions: Vec<usize>,
    pub source: RetrievalSource,
    /// clusters that contributed entries after the predicted one ran short
    pub topped_up_from: Vec<usize>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct ClusterEntry {
    /// sorted by rating desc, catalog order on ties
    members: Vec<usize>,
    stats: ClusterStats,
}

/// Per-cluster member lists and statistics of one model.
/// Derived from a catalog and its labels; never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterCatalog {
    clusters: Vec<ClusterEntry>,
    /// every position, by rating desc
    whole: Vec<usize>,
    config: RetrievalConfig,
}

impl ClusterCatalog {
    /// # Arguments
    /// * `labels` - cluster id per catalog position; ids `>= k` are ignored
    /// * `k` - number of clusters of the model
    pub fn build(catalog: &Catalog, labels: &[usize], k: usize, config: RetrievalConfig) -> Self {
        let mut members = vec![Vec::new(); k];
        for (pos, &label) in labels.iter().enumerate().take(catalog.len()) {
            if let Some(m) = members.get_mut(label) {
                m.push(pos);
            }
        }
        let clusters = members
            .into_iter()
            .map(|m| {
                let members = catalog.sort_by_rating(&m);
                let stats = ClusterStats::compute(
                    catalog,
                    &members,
                    config.top_genres,
                    config.representative_count,
                );
                ClusterEntry { members, stats }
            })
            .collect();
        let all: Vec<usize> = (0..catalog.len()).collect();
        Self {
            clusters,
            whole: catalog.sort_by_rating(&all),
            config,
        }
    }

    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    pub fn members(&self, cluster: usize) -> &[usize] {
        self.clusters
            .get(cluster)
            .map(|c| c.members.as_slice())
            .unwrap_or(&[])
    }

    pub fn stats(&self, cluster: usize) -> Option<&ClusterStats> {
        self.clusters.get(cluster).map(|c| &c.stats)
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.clusters.iter().map(|c| c.members.len()).collect()
    }

    /// Up to `n` entries for `cluster`.
    ///
    /// # Arguments
    /// * `distances` - distance from the query to every centroid; decides the
    ///   order in which other clusters top up a short cluster
    pub fn retrieve(&self, catalog: &Catalog, cluster: usize, n: usize, distances: &[f64]) -> Retrieval {
        let members = self.members(cluster);
        if members.is_empty() {
            tracing::warn!(cluster, "predicted cluster is empty, ranking the whole catalog");
            return Retrieval {
                positions: self.rank(catalog, &self.whole, n),
                source: RetrievalSource::WholeCatalog,
                topped_up_from: Vec::new(),
                notes: vec![format!(
                    "cluster {cluster} has no members; recommendations were drawn from the whole catalog"
                )],
            };
        }

        let mut positions = self.rank(catalog, members, n);
        let mut topped_up_from = Vec::new();
        let mut notes = Vec::new();
        if positions.len() < n {
            let own = positions.len();
            for other in neighbour_order(distances, self.clusters.len(), cluster) {
                if positions.len() >= n {
                    break;
                }
                let extra = self.members(other);
                if extra.is_empty() {
                    continue;
                }
                let take = (n - positions.len()).min(extra.len());
                positions.extend_from_slice(&extra[..take]);
                topped_up_from.push(other);
            }
            if !topped_up_from.is_empty() {
                notes.push(format!(
                    "cluster {cluster} has only {own} movies; filled with {} from clusters {:?}",
                    positions.len() - own,
                    topped_up_from
                ));
            }
        }

        Retrieval {
            positions,
            source: RetrievalSource::Cluster,
            topped_up_from,
            notes,
        }
    }
}

impl ClusterCatalog {
    fn rank(&self, catalog: &Catalog, candidates: &[usize], n: usize) -> Vec<usize> {
        rank_diverse_with_lead(
            catalog,
            candidates,
            n,
            self.config.diversity_min_genres,
            self.config.rating_lead,
        )
    }
}

/// Clusters other than `own`, nearest centroid first; ties to the lowest id.
fn neighbour_order(distances: &[f64], k: usize, own: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..k).filter(|&c| c != own).collect();
    order.sort_by(|&a, &b| {
        let da = distances.get(a).copied().unwrap_or(f64::INFINITY);
        let db = distances.get(b).copied().unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    });
    order
}

/// Pick `n` of `candidates` (already sorted by rating desc).
///
/// With at least `min_genres` distinct primary genres, candidates whose primary
/// genre was already picked are skipped, then used to fill any shortfall in
/// rating order. Otherwise the top `n` are taken as they are.
pub fn rank_diverse(catalog: &Catalog, candidates: &[usize], n: usize, min_genres: usize) -> Vec<usize> {
    rank_diverse_with_lead(catalog, candidates, n, min_genres, 0)
}

/// [`rank_diverse`] where the first `lead` picks follow rating alone and
/// still count as seen genres.
pub fn rank_diverse_with_lead(
    catalog: &Catalog,
    candidates: &[usize],
    n: usize,
    min_genres: usize,
    lead: usize,
) -> Vec<usize> {
    let genre_of = move |p: usize| catalog.get(p).map(|r| r.primary_genre()).unwrap_or("");
    let distinct: HashSet<&str> = candidates.iter().map(|&p| genre_of(p)).collect();
    if distinct.len() < min_genres {
        return candidates.iter().copied().take(n).collect();
    }

    let mut chosen = Vec::with_capacity(n);
    let mut skipped = Vec::new();
    let mut seen = HashSet::new();
    for &p in candidates {
        if chosen.len() == n {
            break;
        }
        if seen.insert(genre_of(p)) || chosen.len() < lead {
            chosen.push(p);
        } else {
            skipped.push(p);
        }
    }
    for p in skipped {
        if chosen.len() == n {
            break;
        }
        chosen.push(p);
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::movie;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            movie("d1", 9.0, "Drama", ""),
            movie("d2", 8.9, "Drama", ""),
            movie("c1", 8.8, "Crime", ""),
            movie("d3", 8.7, "Drama", ""),
            movie("a1", 8.6, "Action", ""),
            movie("c2", 8.5, "Crime", ""),
            movie("h1", 7.0, "Horror", ""),
        ])
        .unwrap()
    }

    fn ids(catalog: &Catalog, positions: &[usize]) -> Vec<String> {
        positions.iter().map(|&p| catalog.get(p).unwrap().id.clone()).collect()
    }

    #[test]
    fn diverse_pick_skips_repeated_genres_then_fills() {
        let cat = catalog();
        let candidates = cat.sort_by_rating(&[0, 1, 2, 3, 4, 5]);
        let picked = rank_diverse(&cat, &candidates, 5, 3);
        assert_eq!(ids(&cat, &picked), vec!["d1", "c1", "a1", "d2", "d3"]);
    }

    #[test]
    fn rating_lead_takes_top_rated_before_diversity() {
        let cat = catalog();
        let candidates = cat.sort_by_rating(&[0, 1, 2, 4]);
        assert_eq!(ids(&cat, &rank_diverse(&cat, &candidates, 3, 3)), vec!["d1", "c1", "a1"]);
        assert_eq!(
            ids(&cat, &rank_diverse_with_lead(&cat, &candidates, 3, 3, 3)),
            vec!["d1", "d2", "c1"]
        );
        assert_eq!(
            ids(&cat, &rank_diverse_with_lead(&cat, &candidates, 4, 3, 3)),
            vec!["d1", "d2", "c1", "a1"]
        );

        let all: Vec<usize> = (0..cat.len()).collect();
        let config = RetrievalConfig {
            rating_lead: 3,
            ..RetrievalConfig::default()
        };
        let cc = ClusterCatalog::build(&cat, &[0; 7], 1, config);
        let r = cc.retrieve(&cat, 0, 3, &[0.0]);
        assert_eq!(r.positions, cat.sort_by_rating(&all)[..3].to_vec());
    }

    #[test]
    fn few_genres_rank_by_rating_only() {
        let cat = catalog();
        let candidates = cat.sort_by_rating(&[0, 1, 2, 3, 5]);
        let picked = rank_diverse(&cat, &candidates, 3, 3);
        assert_eq!(ids(&cat, &picked), vec!["d1", "d2", "c1"]);
    }

    #[test]
    fn short_cluster_is_topped_up_from_nearest_clusters() {
        let cat = catalog();
        let labels = [0, 0, 1, 0, 2, 1, 2];
        let cc = ClusterCatalog::build(&cat, &labels, 3, RetrievalConfig::default());
        let r = cc.retrieve(&cat, 1, 4, &[3.0, 0.5, 1.0]);
        assert_eq!(r.source, RetrievalSource::Cluster);
        assert_eq!(r.topped_up_from, vec![2]);
        assert_eq!(ids(&cat, &r.positions), vec!["c1", "c2", "a1", "h1"]);
        assert_eq!(r.notes.len(), 1);
    }

    #[test]
    fn empty_cluster_falls_back_to_whole_catalog() {
        let cat = catalog();
        let labels = [0, 0, 0, 0, 1, 1, 1];
        let cc = ClusterCatalog::build(&cat, &labels, 3, RetrievalConfig::default());
        let r = cc.retrieve(&cat, 2, 3, &[1.0, 1.0, 0.0]);
        assert_eq!(r.source, RetrievalSource::WholeCatalog);
        assert_eq!(ids(&cat, &r.positions), vec!["d1", "c1", "a1"]);
        assert!(!r.notes.is_empty());
    }

    #[test]
    fn retrieval_is_idempotent() {
        let cat = catalog();
        let labels = [0, 0, 0, 0, 0, 0, 0];
        let cc = ClusterCatalog::build(&cat, &labels, 1, RetrievalConfig::default());
        let a = cc.retrieve(&cat, 0, 5, &[0.0]);
        let b = cc.retrieve(&cat, 0, 5, &[0.0]);
        assert_eq!(a, b);
        assert_eq!(a.positions.len(), 5);
        assert_eq!(cc.stats(0).unwrap().movie_count, 7);
    }
}
