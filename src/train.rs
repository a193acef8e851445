use std::time::{SystemTime, UNIX_EPOCH};

use rayon::prelude::*;

use crate::catalog::Catalog;
use crate::cluster::features::{combine, MetadataEncoder};
use crate::cluster::ClusterModel;
use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use crate::store::ModelBundle;
use crate::utils::math::vector::SparseVec;
use crate::vectorizer::TfIdfVectorizer;

/// Offline batch job turning a catalog into a [`ModelBundle`].
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Fit the vectorizer, both cluster models and the metadata encoder.
    ///
    /// # Errors
    /// * `InvalidCatalog` - empty catalog
    /// * vectorizer and k-means configuration errors
    pub fn train(&self, catalog: &Catalog) -> Result<ModelBundle> {
        if catalog.is_empty() {
            return Err(Error::InvalidCatalog("cannot train on an empty catalog".to_string()));
        }
        let span = tracing::info_span!("train", movies = catalog.len(), clusters = self.config.n_clusters);
        let _guard = span.enter();

        let synopses = catalog.synopses();
        let vectorizer: TfIdfVectorizer = TfIdfVectorizer::fit(self.config.vectorizer.clone(), &synopses)?;
        let text_vectors = vectorizer.transform_batch(&synopses);
        tracing::info!(vocabulary = vectorizer.dim(), "vectorizer fitted");

        let kmeans = self.config.kmeans();
        let model_tfidf = ClusterModel::fit(&text_vectors, &kmeans, self.config.min_cluster_size)?;
        log_model("tfidf", &model_tfidf);

        let metadata = MetadataEncoder::fit(catalog.records())?;
        let all_vectors: Vec<SparseVec<f64>> = catalog
            .records()
            .par_iter()
            .zip(text_vectors.par_iter())
            .map(|(record, text)| {
                metadata
                    .encode_record(record)
                    .map(|m| combine(&m.values, text))
            })
            .collect::<Result<_>>()?;
        let model_all = ClusterModel::fit(&all_vectors, &kmeans, self.config.min_cluster_size)?;
        log_model("all_features", &model_all);

        let catalog = catalog.with_cluster_labels(model_tfidf.labels(), model_all.labels())?;
        Ok(ModelBundle {
            bundle_id: bundle_id(self.config.seed),
            vectorizer,
            model_tfidf,
            model_all,
            metadata,
            catalog,
        })
    }
}

fn log_model(name: &str, model: &ClusterModel) {
    let metrics = model.metrics();
    tracing::info!(
        model = name,
        clusters = model.n_clusters(),
        inertia = metrics.inertia,
        silhouette = metrics.silhouette,
        calinski_harabasz = metrics.calinski_harabasz,
        davies_bouldin = metrics.davies_bouldin,
        sizes = ?metrics.sizes,
        rebalanced = model.balance_report().moves.len(),
        "cluster model trained"
    );
}

/// Hex timestamp plus seed; also used as the version directory name.
pub fn bundle_id(seed: u64) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{nanos:x}-{seed:x}")
}
