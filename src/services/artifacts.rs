use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::classifier::TreeEnsemble;
use super::recommendations::{Recommender, SimilarityMatrix};
use super::vectorizer::TfidfVectorizer;
use crate::{config::Config, models::CatalogRow};

/// Failures loading the trained model artifacts at startup
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("incompatible artifacts: {0}")]
    Incompatible(String),
}

/// Every artifact the service needs, loaded and cross-checked
pub struct ModelArtifacts {
    pub classifier: TreeEnsemble,
    pub recommender: Recommender,
}

/// Reads and deserializes one JSON artifact
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Format {
        path: path.to_path_buf(),
        source,
    })
}

impl ModelArtifacts {
    /// Loads the classifier, catalog, similarity matrix and vectorizer named
    /// by `config`. Any missing, unreadable or mutually inconsistent artifact
    /// is an error.
    pub fn load(config: &Config) -> Result<Self, ArtifactError> {
        let start = Instant::now();

        let classifier: TreeEnsemble = load_json(&config.classifier_path())?;
        classifier.validate()?;
        tracing::info!(
            path = %config.classifier_path().display(),
            classes = ?classifier.classes(),
            trees = classifier.tree_count(),
            "Loaded classifier"
        );

        let catalog: Vec<CatalogRow> = load_json(&config.catalog_path())?;
        tracing::info!(
            path = %config.catalog_path().display(),
            rows = catalog.len(),
            "Loaded catalog"
        );

        let similarity: SimilarityMatrix = load_json(&config.similarity_path())?;
        tracing::info!(
            path = %config.similarity_path().display(),
            rows = similarity.len(),
            "Loaded similarity matrix"
        );

        let vectorizer: TfidfVectorizer = load_json(&config.vectorizer_path())?;
        tracing::info!(
            path = %config.vectorizer_path().display(),
            dimension = vectorizer.dimension(),
            "Loaded vectorizer"
        );

        let recommender = Recommender::new(catalog, similarity, vectorizer)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Model artifacts ready"
        );

        Ok(Self {
            classifier,
            recommender,
        })
    }
}
