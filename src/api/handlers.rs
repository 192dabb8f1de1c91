use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::{PredictRequest, PredictResponse};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_size: usize,
    pub loaded_at: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        catalog_size: state.recommender.catalog_size(),
        loaded_at: state.loaded_at.to_rfc3339(),
    })
}

/// Predicts the category of a title and recommends similar catalog titles
pub async fn predict(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        "Processing prediction request"
    );

    let prediction = state
        .classifier
        .predict(&request.features())
        .filter(|label| !label.is_empty())
        .ok_or(AppError::Classification)?;

    let recommendations = state.recommender.recommend(
        &request.title,
        &request.country,
        &request.listed_in,
        state.recommendation_count,
    );

    tracing::info!(
        request_id = %request_id,
        model = state.classifier.name(),
        prediction = %prediction,
        path = %recommendations.path,
        recommended = recommendations.items.len(),
        "Prediction completed"
    );

    Ok(Json(PredictResponse {
        prediction,
        recomendados: recommendations.items,
    }))
}
