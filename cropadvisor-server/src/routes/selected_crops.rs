//! Selected crop endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use cropadvisor_core::{PageParams, SelectedCrop};
use serde::{Deserialize, Serialize};

use super::{non_empty, parse_id, ApiJson, MessageResponse};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStore, CatalogStore, PredictionStore};

/// GET /api/selected-crops
/// Every selection, newest first
pub async fn list_selected_crops<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<SelectedCrop>>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let crops = state.prediction_store.list_selected_crops()?;
    Ok(Json(page.apply(crops)))
}

/// GET /api/selected-crops/:prediction_id
/// The current (most recent) selection for a prediction
pub async fn get_latest_for_prediction<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(prediction_id): Path<String>,
) -> Result<Json<SelectedCrop>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    tracing::debug!(%prediction_id, "Looking up selected crop");

    let id = parse_id(&prediction_id, "prediction").inspect_err(|_| {
        tracing::warn!(%prediction_id, "Invalid prediction id");
    })?;

    match state.prediction_store.latest_selected_crop(id)? {
        Some(crop) => Ok(Json(crop)),
        None => {
            tracing::warn!(%prediction_id, "No crop selected for prediction");
            Err(ApiError::SelectedCropNotFound)
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSelectedCropRequest {
    pub crop_name: Option<String>,
    pub scientific_name: Option<String>,
}

#[derive(Serialize)]
pub struct UpdateSelectedCropResponse {
    pub message: &'static str,
    pub updated: SelectedCrop,
}

/// PUT /api/selected-crops/:id
/// Change the chosen crop; the selection time moves to now
pub async fn update_selected_crop<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateSelectedCropRequest>,
) -> Result<Json<UpdateSelectedCropResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "selected crop")?;
    let mut selected = state
        .prediction_store
        .get_selected_crop(id)?
        .ok_or(ApiError::SelectedCropNotFound)?;

    if let Some(crop_name) = non_empty(&req.crop_name) {
        selected.crop_name = crop_name.to_string();
    }
    if let Some(scientific_name) = non_empty(&req.scientific_name) {
        selected.scientific_name = scientific_name.to_string();
    }
    selected.selected_at = cropadvisor_core::now();

    state.prediction_store.replace_selected_crop(&selected)?;

    Ok(Json(UpdateSelectedCropResponse {
        message: "Selected crop updated",
        updated: selected,
    }))
}

/// DELETE /api/selected-crops/:id
pub async fn delete_selected_crop<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "selected crop")?;
    if !state.prediction_store.delete_selected_crop(id)? {
        return Err(ApiError::SelectedCropNotFound);
    }

    Ok(MessageResponse::new("Selected crop deleted"))
}
