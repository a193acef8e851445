use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    pub id: String,
    pub title_en: String,
    pub year: i32,
    pub rating: f64,
}

/// Descriptive statistics of one cluster. Informational only; never used for
/// ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    pub movie_count: usize,
    pub avg_rating: f64,
    pub avg_year: f64,
    pub year_range: Option<YearRange>,
    /// most frequent primary genres, count desc then name
    pub top_genres: Vec<GenreCount>,
    /// distinct primary genres, sorted
    pub genres: Vec<String>,
    pub dominant_genre: Option<String>,
    pub genre_diversity: usize,
    /// `1 - std / mean` of ratings (sample std); 0 for one member or zero mean
    pub rating_consistency: f64,
    pub representative_movies: Vec<Representative>,
}

impl ClusterStats {
    /// Statistics over `members`, which must already be sorted by rating desc.
    pub fn compute(catalog: &Catalog, members: &[usize], top_genres: usize, representatives: usize) -> Self {
        let records: Vec<_> = members.iter().filter_map(|&p| catalog.get(p)).collect();
        let n = records.len();
        if n == 0 {
            return Self::empty();
        }

        let ratings: Vec<f64> = records.iter().map(|r| r.rating).collect();
        let avg_rating = ratings.iter().sum::<f64>() / n as f64;
        let avg_year = records.iter().map(|r| r.year as f64).sum::<f64>() / n as f64;
        let year_range = records
            .iter()
            .map(|r| r.year)
            .fold(None, |acc: Option<YearRange>, y| {
                Some(match acc {
                    None => YearRange { min: y, max: y },
                    Some(r) => YearRange {
                        min: r.min.min(y),
                        max: r.max.max(y),
                    },
                })
            });

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for r in &records {
            *counts.entry(r.primary_genre()).or_insert(0) += 1;
        }
        let mut ranked: Vec<GenreCount> = counts
            .into_iter()
            .map(|(genre, count)| GenreCount {
                genre: genre.to_string(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
        let mut genres: Vec<String> = ranked.iter().map(|g| g.genre.clone()).collect();
        genres.sort();
        let dominant_genre = ranked.first().map(|g| g.genre.clone());
        let genre_diversity = ranked.len();
        ranked.truncate(top_genres);

        Self {
            movie_count: n,
            avg_rating,
            avg_year,
            year_range,
            top_genres: ranked,
            genres,
            dominant_genre,
            genre_diversity,
            rating_consistency: rating_consistency(&ratings),
            representative_movies: records
                .iter()
                .take(representatives)
                .map(|r| Representative {
                    id: r.id.clone(),
                    title_en: r.titles.en.clone(),
                    year: r.year,
                    rating: r.rating,
                })
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            movie_count: 0,
            avg_rating: 0.0,
            avg_year: 0.0,
            year_range: None,
            top_genres: Vec::new(),
            genres: Vec::new(),
            dominant_genre: None,
            genre_diversity: 0,
            rating_consistency: 0.0,
            representative_movies: Vec::new(),
        }
    }
}

fn rating_consistency(ratings: &[f64]) -> f64 {
    let n = ratings.len();
    if n < 2 {
        return 0.0;
    }
    let mean = ratings.iter().sum::<f64>() / n as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let var = ratings.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / (n - 1) as f64;
    1.0 - var.sqrt() / mean
}
