//! Proxy to the external crop recommendation model

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::ApiJson;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStore, CatalogStore, PredictionStore};

/// POST /api/crops/predict
/// Forward soil and climate readings to the model and return its answer as is
pub async fn predict_crop<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    ApiJson(input): ApiJson<Value>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    tracing::debug!(input = %input, "Forwarding readings to recommender");

    let recommender = state.recommender.clone();
    let answer = tokio::task::spawn_blocking(move || recommender.recommend(&input))
        .await
        .map_err(|e| ApiError::Internal(format!("Recommender task failed: {}", e)))?
        .map_err(ApiError::Recommender)?;

    Ok(Json(answer))
}
