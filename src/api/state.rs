use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::services::{Classifier, ModelArtifacts, Recommender};

/// Shared application state
///
/// Everything here is read-only after startup, so handlers share it through
/// `Arc`s without locking.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub recommender: Arc<Recommender>,
    /// Number of similar titles returned per request
    pub recommendation_count: usize,
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        recommender: Arc<Recommender>,
        recommendation_count: usize,
    ) -> Self {
        Self {
            classifier,
            recommender,
            recommendation_count,
            loaded_at: Utc::now(),
        }
    }

    /// Creates the state from freshly loaded artifacts
    pub fn from_artifacts(artifacts: ModelArtifacts, recommendation_count: usize) -> Self {
        Self::new(
            Arc::new(artifacts.classifier),
            Arc::new(artifacts.recommender),
            recommendation_count,
        )
    }
}
