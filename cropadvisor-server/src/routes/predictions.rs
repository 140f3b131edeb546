//! Prediction endpoints

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cropadvisor_core::details::{crop_details, scientific_name_from_slug};
use cropadvisor_core::document::{apply_update, create};
use cropadvisor_core::{CropDetails, ObjectId, PageParams, PopulatedPrediction, Prediction, SelectedCrop, UserSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{non_empty, parse_id, pick, ApiJson};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStore, CatalogStore, PredictionStore};

/// Fields a client may set when recording a prediction
const PREDICTION_FIELDS: &[&str] = &["userId", "inputData", "recommendedCrops"];

#[derive(Serialize)]
pub struct CreatePredictionResponse {
    pub message: &'static str,
    pub prediction: Prediction,
}

/// POST /api/predictions
/// Store a prediction run as supplied by the caller
pub async fn create_prediction<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<CreatePredictionResponse>), ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let prediction: Prediction = create(pick(body, PREDICTION_FIELDS)?)?;
    state.prediction_store.create_prediction(&prediction)?;

    tracing::info!(
        prediction_id = %prediction.id,
        user_id = %prediction.user_id,
        recommendations = prediction.recommended_crops.len(),
        "Prediction saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatePredictionResponse {
            message: "Prediction saved",
            prediction,
        }),
    ))
}

/// GET /api/predictions
/// All predictions with the owning user's name and email
pub async fn list_predictions<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<PopulatedPrediction>>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let predictions = page.apply(state.prediction_store.list_predictions()?);

    let mut users: HashMap<ObjectId, Option<UserSummary>> = HashMap::new();
    let mut populated = Vec::with_capacity(predictions.len());
    for prediction in predictions {
        let summary = match users.get(&prediction.user_id) {
            Some(cached) => cached.clone(),
            None => {
                let summary = state
                    .account_store
                    .get_user(prediction.user_id)?
                    .map(|u| u.summary());
                users.insert(prediction.user_id, summary.clone());
                summary
            }
        };
        populated.push(prediction.populate(summary));
    }

    Ok(Json(populated))
}

/// GET /api/predictions/:id
pub async fn get_prediction<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
) -> Result<Json<Prediction>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "prediction")?;
    let prediction = state
        .prediction_store
        .get_prediction(id)?
        .ok_or(ApiError::PredictionNotFound)?;

    Ok(Json(prediction))
}

/// GET /api/predictions/user/:user_id
pub async fn list_user_predictions<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(user_id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<Prediction>>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let user_id = parse_id(&user_id, "user")?;
    let predictions = state.prediction_store.list_predictions_by_user(user_id)?;

    Ok(Json(page.apply(predictions)))
}

/// PUT /api/predictions/:id
/// Merge the body onto the stored prediction
pub async fn update_prediction<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Prediction>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "prediction")?;
    let existing = state
        .prediction_store
        .get_prediction(id)?
        .ok_or(ApiError::PredictionNotFound)?;

    let updated = apply_update(&existing, body)?;
    state.prediction_store.replace_prediction(&updated)?;

    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct DeletePredictionQuery {
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePredictionResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selections_removed: Option<u64>,
}

/// DELETE /api/predictions/:id
/// Selections are kept unless `?cascade=true`, which removes them first
pub async fn delete_prediction<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
    Query(query): Query<DeletePredictionQuery>,
) -> Result<Json<DeletePredictionResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "prediction")?;

    let selections_removed = if query.cascade {
        Some(state.prediction_store.delete_selected_crops_for_prediction(id)?)
    } else {
        None
    };

    if !state.prediction_store.delete_prediction(id)? {
        tracing::debug!(prediction_id = %id, "Delete of unknown prediction");
    }

    Ok(Json(DeletePredictionResponse {
        message: "Prediction deleted successfully",
        selections_removed,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectCropRequest {
    pub prediction_id: Option<String>,
    pub crop_name: Option<String>,
    pub scientific_name: Option<String>,
}

#[derive(Serialize)]
pub struct SelectCropResponse {
    pub message: &'static str,
    pub selected: SelectedCrop,
}

/// POST /api/predictions/select
/// Record that a user picked one recommended crop; every call adds a row
pub async fn create_selected_crop<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    ApiJson(req): ApiJson<SelectCropRequest>,
) -> Result<(StatusCode, Json<SelectCropResponse>), ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let (Some(prediction_id), Some(crop_name), Some(scientific_name)) = (
        non_empty(&req.prediction_id),
        non_empty(&req.crop_name),
        non_empty(&req.scientific_name),
    ) else {
        return Err(ApiError::Validation("All fields are required".to_string()));
    };

    let prediction_id = parse_id(prediction_id, "prediction")?;
    let selected = SelectedCrop::new(prediction_id, crop_name, scientific_name);
    state.prediction_store.create_selected_crop(&selected)?;

    Ok((
        StatusCode::CREATED,
        Json(SelectCropResponse {
            message: "Selected crop saved",
            selected,
        }),
    ))
}

/// GET /api/predictions/:id/crops/:scientific_name
/// Crop reference data, timeline and suitability for one recommended crop
pub async fn get_crop_details<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path((id, slug)): Path<(String, String)>,
) -> Result<Json<CropDetails>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "prediction")?;
    let prediction = state
        .prediction_store
        .get_prediction(id)?
        .ok_or(ApiError::PredictionNotFound)?;

    let scientific_name = scientific_name_from_slug(&slug);
    let crops = state.catalog_store.list_crops()?;
    let timelines = state.catalog_store.list_timelines()?;

    Ok(Json(crop_details(&scientific_name, &crops, &timelines, &prediction)))
}
