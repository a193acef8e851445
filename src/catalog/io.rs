//! Catalog files.
//!
//! Delimited files use `;` and the header
//! `id;rank;title_en;title_pt;year;rating;genre;sinopse;director;cast;duration;cluster_tfidf;cluster_all`
//! (the two cluster columns are optional on input). JSON files hold an array of
//! objects with the same field names.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{parse_genres, Catalog, ClusterLabels, MovieRecord, Titles};
use crate::error::{Error, Result};

pub const DELIMITER: u8 = b';';

/// Flat on-disk row.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogRow {
    id: String,
    #[serde(default)]
    rank: u32,
    title_en: String,
    #[serde(default)]
    title_pt: Option<String>,
    year: i32,
    rating: f64,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    sinopse: String,
    #[serde(default)]
    director: String,
    #[serde(default)]
    cast: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    cluster_tfidf: Option<usize>,
    #[serde(default)]
    cluster_all: Option<usize>,
}

impl From<CatalogRow> for MovieRecord {
    fn from(row: CatalogRow) -> Self {
        MovieRecord {
            id: row.id,
            rank: row.rank,
            titles: Titles {
                en: row.title_en,
                pt: row.title_pt.filter(|t| !t.trim().is_empty()),
            },
            year: row.year,
            rating: row.rating,
            genre: parse_genres(&row.genre),
            synopsis: row.sinopse,
            director: row.director,
            cast: row.cast,
            duration: row.duration,
            clusters: ClusterLabels {
                tfidf: row.cluster_tfidf,
                all: row.cluster_all,
            },
        }
    }
}

impl From<&MovieRecord> for CatalogRow {
    fn from(r: &MovieRecord) -> Self {
        CatalogRow {
            id: r.id.clone(),
            rank: r.rank,
            title_en: r.titles.en.clone(),
            title_pt: r.titles.pt.clone(),
            year: r.year,
            rating: r.rating,
            genre: r.genre_string(),
            sinopse: r.synopsis.clone(),
            director: r.director.clone(),
            cast: r.cast.clone(),
            duration: r.duration.clone(),
            cluster_tfidf: r.clusters.tfidf,
            cluster_all: r.clusters.all,
        }
    }
}

/// Load a catalog, choosing the format by extension (`.json`, anything else
/// is read as delimited text).
pub fn read_catalog(path: &Path) -> Result<Catalog> {
    let file = File::open(path).map_err(|e| Error::from(e).at_path(path))?;
    let reader = BufReader::new(file);
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let catalog = if is_json {
        read_json(reader)
    } else {
        read_csv(reader)
    };
    catalog.map_err(|e| match e {
        Error::InvalidCatalog(_) => e,
        other => other.at_path(path),
    })
}

pub fn read_csv<R: Read>(reader: R) -> Result<Catalog> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<CatalogRow>() {
        records.push(MovieRecord::from(row?));
    }
    Catalog::new(records)
}

pub fn read_json<R: Read>(reader: R) -> Result<Catalog> {
    let rows: Vec<CatalogRow> = serde_json::from_reader(reader)?;
    Catalog::new(rows.into_iter().map(MovieRecord::from).collect())
}

/// Write the catalog, cluster columns included.
pub fn write_csv<W: Write>(catalog: &Catalog, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);
    for record in catalog.iter() {
        wtr.serialize(CatalogRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_catalog(catalog: &Catalog, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::from(e).at_path(path))?;
    write_csv(catalog, BufWriter::new(file)).map_err(|e| e.at_path(path))
}
