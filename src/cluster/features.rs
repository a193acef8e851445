use serde::{Deserialize, Serialize};

use crate::catalog::{parse_genres, MovieRecord};
use crate::error::Result;
use crate::utils::encoder::LabelEncoder;
use crate::utils::math::vector::SparseVec;
use crate::utils::scaler::StandardScaler;

/// Word count assumed for an empty synopsis.
pub const EMPTY_SYNOPSIS_WORDS: usize = 10;

/// Number of metadata columns placed before the text features.
pub const METADATA_DIM: usize = 4;

/// Whitespace token count of the raw synopsis.
pub fn word_count(synopsis: &str) -> usize {
    match synopsis.split_whitespace().count() {
        0 => EMPTY_SYNOPSIS_WORDS,
        n => n,
    }
}

/// Metadata side of model B: `[z(year), z(rating), z(word_count), genre]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEncoder {
    pub scaler: StandardScaler,
    pub genre: LabelEncoder,
}

/// Encoded metadata plus a note when the genre was not known.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMetadata {
    pub values: Vec<f64>,
    pub note: Option<String>,
}

impl MetadataEncoder {
    pub fn fit(records: &[MovieRecord]) -> Result<Self> {
        let rows: Vec<Vec<f64>> = records
            .iter()
            .map(|r| raw_numeric(r.year as f64, r.rating, &r.synopsis))
            .collect();
        Ok(Self {
            scaler: StandardScaler::fit(&rows)?,
            genre: LabelEncoder::fit(records.iter().map(|r| r.primary_genre())),
        })
    }

    /// `genre` may list several genres; only the first is encoded, as in training.
    pub fn encode(&self, year: f64, rating: f64, synopsis: &str, genre: &str) -> Result<EncodedMetadata> {
        let mut values = self.scaler.transform(&raw_numeric(year, rating, synopsis))?;
        let primary = parse_genres(genre).into_iter().next().unwrap_or_default();
        let (code, encoded) = self.genre.encode_unit(&primary);
        values.push(code);
        let note = (!encoded.is_known()).then(|| {
            format!(
                "genre {genre:?} was not seen in training; encoded as code {}",
                encoded.code()
            )
        });
        Ok(EncodedMetadata { values, note })
    }

    pub fn encode_record(&self, record: &MovieRecord) -> Result<EncodedMetadata> {
        self.encode(record.year as f64, record.rating, &record.synopsis, record.primary_genre())
    }
}

fn raw_numeric(year: f64, rating: f64, synopsis: &str) -> Vec<f64> {
    vec![year, rating, word_count(synopsis) as f64]
}

/// `metadata ++ text` as one sparse vector.
pub fn combine(metadata: &[f64], text: &SparseVec<f64>) -> SparseVec<f64> {
    let mut combined = SparseVec::from_dense(metadata);
    combined.extend_with(text);
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::movie;

    #[test]
    fn word_count_defaults_for_empty_synopsis() {
        assert_eq!(word_count("  "), EMPTY_SYNOPSIS_WORDS);
        assert_eq!(word_count("a b  c"), 3);
    }

    #[test]
    fn encodes_scaled_metadata() {
        let mut a = movie("a", 8.0, "Drama", "one two");
        a.year = 1990;
        let mut b = movie("b", 9.0, "Action", "one two three four");
        b.year = 2010;
        let enc = MetadataEncoder::fit(&[a.clone(), b]).unwrap();
        let out = enc.encode_record(&a).unwrap();
        assert_eq!(out.values, vec![-1.0, -1.0, -1.0, 1.0]);
        assert!(out.note.is_none());
    }

    #[test]
    fn unknown_genre_is_noted_not_fatal() {
        let enc = MetadataEncoder::fit(&[movie("a", 8.0, "Drama", "x")]).unwrap();
        let out = enc.encode(2000.0, 8.0, "x", "Western").unwrap();
        assert_eq!(out.values[3], 0.0);
        assert!(out.note.unwrap().contains("Western"));
    }

    #[test]
    fn listed_genres_encode_by_their_primary() {
        let enc = MetadataEncoder::fit(&[
            movie("a", 8.0, "Crime, Drama", "x"),
            movie("b", 7.0, "Drama", "x"),
        ])
        .unwrap();
        let listed = enc.encode(2000.0, 8.0, "x", "Crime, Drama").unwrap();
        let single = enc.encode(2000.0, 8.0, "x", "Crime").unwrap();
        assert!(listed.note.is_none());
        assert_eq!(listed.values, single.values);
        assert_ne!(listed.values[3], enc.encode(2000.0, 8.0, "x", "Drama").unwrap().values[3]);
    }

    #[test]
    fn combine_prepends_metadata() {
        let text = SparseVec::from_dense(&[0.0, 0.6, 0.8]);
        let v = combine(&[0.5, 0.0, -1.0, 1.0], &text);
        assert_eq!(v.len(), METADATA_DIM + 3);
        assert_eq!(v.to_dense(), vec![0.5, 0.0, -1.0, 1.0, 0.0, 0.6, 0.8]);
    }
}
