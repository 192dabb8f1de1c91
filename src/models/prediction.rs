use serde::{Deserialize, Serialize};

use super::Recommendation;
use crate::error::{AppError, AppResult};

/// Body of `POST /predict`
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub title: String,
    pub country: String,
    pub release_year: i32,
    pub rating: String,
    pub listed_in: String,
    pub duration_int: i64,
}

impl PredictRequest {
    /// Rejects requests that deserialize but cannot be served
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        Ok(())
    }

    /// Fields the classifier consumes
    pub fn features(&self) -> TitleFeatures {
        TitleFeatures {
            country: self.country.clone(),
            release_year: self.release_year,
            rating: self.rating.clone(),
            listed_in: self.listed_in.clone(),
            duration_int: self.duration_int,
        }
    }
}

/// Structured record the classifier predicts a category for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleFeatures {
    pub country: String,
    pub release_year: i32,
    pub rating: String,
    pub listed_in: String,
    pub duration_int: i64,
}

/// Body of a successful `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub prediction: String,
    pub recomendados: Vec<Recommendation>,
}
