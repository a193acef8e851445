//! Versioned model bundles on disk.
//!
//! ```text
//! <root>/CURRENT                        active version id
//! <root>/<version>/tfidf_vectorizer.cbor
//! <root>/<version>/kmeans_tfidf.cbor
//! <root>/<version>/kmeans_all_features.cbor
//! <root>/<version>/standard_scaler.cbor
//! <root>/<version>/label_encoder_genre.cbor
//! <root>/<version>/catalog_with_clusters.csv
//! ```
//!
//! A version directory is written completely before `CURRENT` is replaced
//! (temp file + rename), so readers see either the old or the new bundle.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::catalog::{io as catalog_io, Catalog};
use crate::cluster::features::MetadataEncoder;
use crate::cluster::ClusterModel;
use crate::error::{Error, Result};
use crate::utils::encoder::LabelEncoder;
use crate::utils::scaler::StandardScaler;
use crate::vectorizer::TfIdfVectorizer;

/// Bumped whenever an artifact payload changes shape.
pub const FORMAT_VERSION: u32 = 2;

pub const CURRENT_FILE: &str = "CURRENT";
pub const CATALOG_FILE: &str = "catalog_with_clusters.csv";

/// Everything a running engine needs, produced by one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    pub bundle_id: String,
    pub vectorizer: TfIdfVectorizer,
    /// model A, synopsis vectors
    pub model_tfidf: ClusterModel,
    /// model B, metadata + synopsis vectors
    pub model_all: ClusterModel,
    pub metadata: MetadataEncoder,
    /// training catalog with both models' labels
    pub catalog: Catalog,
}

/// Shared, immutable handle to a loaded bundle.
pub type ModelHandle = Arc<ModelBundle>;

impl ModelBundle {
    /// Cross-artifact consistency checks.
    pub fn validate(&self) -> Result<()> {
        self.model_tfidf.validate()?;
        self.model_all.validate()?;
        if self.model_tfidf.dim() != self.vectorizer.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.vectorizer.dim(),
                actual: self.model_tfidf.dim(),
            });
        }
        let expected_b = self.vectorizer.dim() + crate::cluster::features::METADATA_DIM;
        if self.model_all.dim() != expected_b {
            return Err(Error::DimensionMismatch {
                expected: expected_b,
                actual: self.model_all.dim(),
            });
        }
        for labels in [self.catalog.tfidf_labels(), self.catalog.all_labels()] {
            match labels {
                Some(l) if l.len() == self.catalog.len() => {}
                _ => {
                    return Err(Error::InvalidCatalog(
                        "bundle catalog is missing cluster labels".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Vectorizer,
    KMeansTfidf,
    KMeansAllFeatures,
    StandardScaler,
    LabelEncoderGenre,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Vectorizer,
        ArtifactKind::KMeansTfidf,
        ArtifactKind::KMeansAllFeatures,
        ArtifactKind::StandardScaler,
        ArtifactKind::LabelEncoderGenre,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Vectorizer => "tfidf_vectorizer.cbor",
            ArtifactKind::KMeansTfidf => "kmeans_tfidf.cbor",
            ArtifactKind::KMeansAllFeatures => "kmeans_all_features.cbor",
            ArtifactKind::StandardScaler => "standard_scaler.cbor",
            ArtifactKind::LabelEncoderGenre => "label_encoder_genre.cbor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub format_version: u32,
    pub bundle_id: String,
    pub kind: ArtifactKind,
}

#[derive(Serialize)]
struct ArtifactRef<'a, T> {
    header: ArtifactHeader,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Artifact<T> {
    header: ArtifactHeader,
    payload: T,
}

/// Bundle directory manager.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.root.join(version)
    }

    /// Write `bundle` as a new version and make it current.
    ///
    /// # Returns
    /// * `Result<String>` - the version id (the bundle id)
    pub fn save(&self, bundle: &ModelBundle) -> Result<String> {
        let version = bundle.bundle_id.clone();
        let dir = self.version_dir(&version);
        fs::create_dir_all(&self.root).map_err(|e| Error::from(e).at_path(&self.root))?;
        fs::create_dir(&dir).map_err(|e| Error::from(e).at_path(&dir))?;

        write_artifact(&dir, &version, ArtifactKind::Vectorizer, &bundle.vectorizer)?;
        write_artifact(&dir, &version, ArtifactKind::KMeansTfidf, &bundle.model_tfidf)?;
        write_artifact(&dir, &version, ArtifactKind::KMeansAllFeatures, &bundle.model_all)?;
        write_artifact(&dir, &version, ArtifactKind::StandardScaler, &bundle.metadata.scaler)?;
        write_artifact(&dir, &version, ArtifactKind::LabelEncoderGenre, &bundle.metadata.genre)?;
        catalog_io::write_catalog(&bundle.catalog, &dir.join(CATALOG_FILE))?;

        self.set_current(&version)?;
        tracing::info!(version = %version, dir = %dir.display(), "model bundle saved");
        Ok(version)
    }

    /// Point `CURRENT` at `version` atomically.
    pub fn set_current(&self, version: &str) -> Result<()> {
        // one temp file per writer so concurrent saves never share it
        let tmp = self
            .root
            .join(format!("{CURRENT_FILE}.{version}.{}.tmp", std::process::id()));
        let target = self.root.join(CURRENT_FILE);
        {
            let mut f = File::create(&tmp).map_err(|e| Error::from(e).at_path(&tmp))?;
            f.write_all(version.as_bytes())
                .and_then(|_| f.sync_all())
                .map_err(|e| Error::from(e).at_path(&tmp))?;
        }
        fs::rename(&tmp, &target).map_err(|e| Error::from(e).at_path(&target))?;
        Ok(())
    }

    /// Version named by `CURRENT`.
    pub fn current_version(&self) -> Result<String> {
        let path = self.root.join(CURRENT_FILE);
        let raw = fs::read_to_string(&path).map_err(|e| Error::ModelUnavailable {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        let version = raw.trim();
        if version.is_empty() {
            return Err(Error::ModelUnavailable {
                reason: format!("{} is empty", path.display()),
            });
        }
        Ok(version.to_string())
    }

    /// Version directories present under the root, sorted.
    pub fn versions(&self) -> Result<Vec<String>> {
        let mut versions = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(versions),
            Err(e) => return Err(Error::from(e).at_path(&self.root)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| Error::from(e).at_path(&self.root))?;
            if entry.path().is_dir() {
                versions.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        versions.sort();
        Ok(versions)
    }

    /// Load the current bundle.
    pub fn load(&self) -> Result<ModelHandle> {
        let version = self.current_version()?;
        self.load_version(&version)
    }

    /// Load one version. Any missing, unreadable or mismatched artifact makes
    /// the whole bundle unavailable.
    pub fn load_version(&self, version: &str) -> Result<ModelHandle> {
        let dir = self.version_dir(version);
        if !dir.is_dir() {
            return Err(Error::ModelUnavailable {
                reason: format!("bundle directory {} does not exist", dir.display()),
            });
        }

        let (vectorizer_header, vectorizer): (_, TfIdfVectorizer) =
            read_artifact(&dir, ArtifactKind::Vectorizer, None)?;
        let bundle_id = vectorizer_header.bundle_id;
        let (_, model_tfidf): (_, ClusterModel) =
            read_artifact(&dir, ArtifactKind::KMeansTfidf, Some(&bundle_id))?;
        let (_, model_all): (_, ClusterModel) =
            read_artifact(&dir, ArtifactKind::KMeansAllFeatures, Some(&bundle_id))?;
        let (_, scaler): (_, StandardScaler) =
            read_artifact(&dir, ArtifactKind::StandardScaler, Some(&bundle_id))?;
        let (_, genre): (_, LabelEncoder) =
            read_artifact(&dir, ArtifactKind::LabelEncoderGenre, Some(&bundle_id))?;

        let catalog_path = dir.join(CATALOG_FILE);
        if !catalog_path.is_file() {
            return Err(unavailable(&catalog_path, "missing catalog"));
        }
        let catalog = catalog_io::read_catalog(&catalog_path)
            .map_err(|e| unavailable(&catalog_path, &e.to_string()))?;

        let bundle = ModelBundle {
            bundle_id,
            vectorizer,
            model_tfidf,
            model_all,
            metadata: MetadataEncoder { scaler, genre },
            catalog,
        };
        bundle.validate().map_err(|e| Error::ModelUnavailable {
            reason: format!("inconsistent bundle {version}: {e}"),
        })?;
        tracing::info!(
            version,
            bundle_id = %bundle.bundle_id,
            movies = bundle.catalog.len(),
            vocabulary = bundle.vectorizer.dim(),
            "model bundle loaded"
        );
        Ok(Arc::new(bundle))
    }
}

fn unavailable(path: &Path, reason: &str) -> Error {
    Error::ModelUnavailable {
        reason: format!("{}: {reason}", path.display()),
    }
}

fn write_artifact<T: Serialize>(dir: &Path, bundle_id: &str, kind: ArtifactKind, payload: &T) -> Result<()> {
    let path = dir.join(kind.file_name());
    let artifact = ArtifactRef {
        header: ArtifactHeader {
            format_version: FORMAT_VERSION,
            bundle_id: bundle_id.to_string(),
            kind,
        },
        payload,
    };
    let file = File::create(&path).map_err(|e| Error::from(e).at_path(&path))?;
    let mut writer = BufWriter::new(file);
    serde_cbor::to_writer(&mut writer, &artifact).map_err(|e| Error::from(e).at_path(&path))?;
    writer.flush().map_err(|e| Error::from(e).at_path(&path))?;
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(
    dir: &Path,
    kind: ArtifactKind,
    bundle_id: Option<&str>,
) -> Result<(ArtifactHeader, T)> {
    let path = dir.join(kind.file_name());
    if !path.is_file() {
        return Err(unavailable(&path, "missing artifact"));
    }
    let file = File::open(&path).map_err(|e| unavailable(&path, &e.to_string()))?;
    let artifact: Artifact<T> = serde_cbor::from_reader(BufReader::new(file))
        .map_err(|e| unavailable(&path, &format!("cannot decode: {e}")))?;
    let header = artifact.header;
    if header.format_version != FORMAT_VERSION {
        return Err(unavailable(
            &path,
            &format!(
                "format version {} (expected {FORMAT_VERSION})",
                header.format_version
            ),
        ));
    }
    if header.kind != kind {
        return Err(unavailable(&path, &format!("holds a {:?} artifact", header.kind)));
    }
    if let Some(expected) = bundle_id {
        if header.bundle_id != expected {
            return Err(unavailable(
                &path,
                &format!("belongs to bundle {} (expected {expected})", header.bundle_id),
            ));
        }
    }
    Ok((header, artifact.payload))
}
