//! Crop catalog endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use cropadvisor_core::document::{apply_update, create};
use cropadvisor_core::{Crop, PageParams};
use serde_json::Value;

use super::{parse_id, ApiJson, MessageResponse};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStore, CatalogStore, PredictionStore};

/// POST /api/crop
/// Add a crop; scientific names are unique across the catalog
pub async fn create_crop<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<MessageResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let crop: Crop = create(body)?;

    if let Some(name) = crop.scientific_name.as_deref() {
        if state.catalog_store.find_crop_by_scientific_name(name)?.is_some() {
            return Err(ApiError::CropAlreadyExists);
        }
    }

    state.catalog_store.create_crop(&crop)?;
    tracing::info!(crop_id = %crop.id, crop_name = %crop.crop_name, "Crop added");

    Ok(MessageResponse::new("Crop created successfully."))
}

/// GET /api/crops
pub async fn list_crops<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<Crop>>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let crops = state.catalog_store.list_crops()?;
    if crops.is_empty() {
        return Err(ApiError::NoCrops);
    }

    Ok(Json(page.apply(crops)))
}

/// GET /api/crop/:id
pub async fn get_crop<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
) -> Result<Json<Crop>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "crop")?;
    let crop = state
        .catalog_store
        .get_crop(id)?
        .ok_or(ApiError::CropNotFound)?;

    Ok(Json(crop))
}

/// PUT /api/update/crop/:id
pub async fn update_crop<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<MessageResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "crop")?;
    let existing = state
        .catalog_store
        .get_crop(id)?
        .ok_or(ApiError::CropNotFound)?;

    let updated = apply_update(&existing, body)?;

    // Renaming onto another crop's scientific name would break the catalog join
    if let Some(name) = updated.scientific_name.as_deref() {
        if let Some(other) = state.catalog_store.find_crop_by_scientific_name(name)? {
            if other.id != id {
                return Err(ApiError::CropAlreadyExists);
            }
        }
    }

    state.catalog_store.replace_crop(&updated)?;

    Ok(MessageResponse::new("Crop Updated successfully."))
}

/// DELETE /api/delete/crop/:id
/// Timelines keyed by the crop's scientific name are left in place
pub async fn delete_crop<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "crop")?;
    if !state.catalog_store.delete_crop(id)? {
        return Err(ApiError::CropNotFound);
    }

    tracing::info!(crop_id = %id, "Crop removed");
    Ok(MessageResponse::new("Crop deleted successfully."))
}
