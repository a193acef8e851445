pub mod io;
pub mod retrieval;
pub mod stats;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::sort::argsort_desc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Titles {
    pub en: String,
    pub pt: Option<String>,
}

/// Cluster ids assigned at training time; not authoritative for prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterLabels {
    /// model A (synopsis text)
    pub tfidf: Option<usize>,
    /// model B (metadata + text)
    pub all: Option<usize>,
}

/// One catalog entry. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: String,
    pub rank: u32,
    pub titles: Titles,
    pub year: i32,
    pub rating: f64,
    /// ordered genres; the first one is the primary genre
    pub genre: Vec<String>,
    pub synopsis: String,
    pub director: String,
    pub cast: String,
    pub duration: String,
    pub clusters: ClusterLabels,
}

impl MovieRecord {
    /// First listed genre, or `""` when the record has none.
    pub fn primary_genre(&self) -> &str {
        self.genre.first().map(String::as_str).unwrap_or("")
    }

    /// Genres joined the way catalog files store them.
    pub fn genre_string(&self) -> String {
        self.genre.join(", ")
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genre.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}

/// Split a comma-joined genre field.
pub fn parse_genres(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ordered movie collection. Position in the catalog breaks every ranking tie.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    records: Vec<MovieRecord>,
}

impl Catalog {
    /// Build a catalog, checking id uniqueness and rating range.
    pub fn new(records: Vec<MovieRecord>) -> Result<Self> {
        let mut ids = HashSet::with_capacity(records.len());
        for (pos, r) in records.iter().enumerate() {
            if !ids.insert(r.id.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate id {:?} at row {pos}",
                    r.id
                )));
            }
            if !r.rating.is_finite() || !(0.0..=10.0).contains(&r.rating) {
                return Err(Error::InvalidCatalog(format!(
                    "rating {} of {:?} is outside [0, 10]",
                    r.rating, r.id
                )));
            }
        }
        Ok(Self { records })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&MovieRecord> {
        self.records.get(pos)
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &MovieRecord> + '_ {
        self.records.iter()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Synopses in catalog order.
    pub fn synopses(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.synopsis.as_str()).collect()
    }

    /// `positions` ordered by rating, highest first; catalog order on ties.
    pub fn sort_by_rating(&self, positions: &[usize]) -> Vec<usize> {
        let mut sorted = positions.to_vec();
        sorted.sort();
        let ratings: Vec<f64> = sorted.iter().map(|&p| self.records[p].rating).collect();
        argsort_desc(&ratings).into_iter().map(|i| sorted[i]).collect()
    }

    /// Copy of the catalog carrying both models' training labels.
    pub fn with_cluster_labels(&self, tfidf: &[usize], all: &[usize]) -> Result<Self> {
        if tfidf.len() != self.len() || all.len() != self.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                actual: tfidf.len().min(all.len()),
            });
        }
        let records = self
            .records
            .iter()
            .zip(tfidf.iter().zip(all))
            .map(|(r, (&a, &b))| MovieRecord {
                clusters: ClusterLabels {
                    tfidf: Some(a),
                    all: Some(b),
                },
                ..r.clone()
            })
            .collect();
        Ok(Self { records })
    }

    /// Training labels of model A, if every record carries one.
    pub fn tfidf_labels(&self) -> Option<Vec<usize>> {
        self.records.iter().map(|r| r.clusters.tfidf).collect()
    }

    /// Training labels of model B, if every record carries one.
    pub fn all_labels(&self) -> Option<Vec<usize>> {
        self.records.iter().map(|r| r.clusters.all).collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn movie(id: &str, rating: f64, genre: &str, synopsis: &str) -> MovieRecord {
        MovieRecord {
            id: id.to_string(),
            rank: 0,
            titles: Titles {
                en: format!("Title {id}"),
                pt: None,
            },
            year: 2000,
            rating,
            genre: parse_genres(genre),
            synopsis: synopsis.to_string(),
            director: String::new(),
            cast: String::new(),
            duration: String::new(),
            clusters: ClusterLabels::default(),
        }
    }
}
