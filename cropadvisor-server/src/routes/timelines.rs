//! Crop timeline endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cropadvisor_core::catalog::same_scientific_name;
use cropadvisor_core::document::{apply_update, create};
use cropadvisor_core::{PageParams, Timeline};
use serde_json::Value;

use super::{parse_id, ApiJson, MessageResponse};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStore, CatalogStore, PredictionStore};

/// POST /api/timeline
/// One timeline per crop, and only for crops in the catalog
pub async fn create_timeline<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<Timeline>), ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let mut timeline: Timeline = create(body)?;

    if state
        .catalog_store
        .find_crop_by_scientific_name(&timeline.scientific_name)?
        .is_none()
    {
        return Err(ApiError::CropNotFound);
    }
    if state
        .catalog_store
        .find_timeline_by_scientific_name(&timeline.scientific_name)?
        .is_some()
    {
        return Err(ApiError::TimelineAlreadyExists);
    }

    timeline.sort_tasks();
    state.catalog_store.create_timeline(&timeline)?;

    tracing::info!(
        timeline_id = %timeline.id,
        scientific_name = %timeline.scientific_name,
        tasks = timeline.tasks.len(),
        "Timeline created"
    );

    Ok((StatusCode::CREATED, Json(timeline)))
}

/// GET /api/timelines
pub async fn list_timelines<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<Timeline>>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    Ok(Json(page.apply(state.catalog_store.list_timelines()?)))
}

/// GET /api/timeline/:id
pub async fn get_timeline<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
) -> Result<Json<Timeline>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "timeline")?;
    let timeline = state
        .catalog_store
        .get_timeline(id)?
        .ok_or(ApiError::TimelineNotFound)?;

    Ok(Json(timeline))
}

/// PUT /api/update/timeline/:id
/// Returns the updated timeline
pub async fn update_timeline<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<Timeline>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "timeline")?;
    let existing = state
        .catalog_store
        .get_timeline(id)?
        .ok_or(ApiError::TimelineNotFound)?;

    let mut updated = apply_update(&existing, body)?;

    if !same_scientific_name(&existing.scientific_name, &updated.scientific_name) {
        if state
            .catalog_store
            .find_crop_by_scientific_name(&updated.scientific_name)?
            .is_none()
        {
            return Err(ApiError::CropNotFound);
        }
        if state
            .catalog_store
            .find_timeline_by_scientific_name(&updated.scientific_name)?
            .is_some()
        {
            return Err(ApiError::TimelineAlreadyExists);
        }
    }

    updated.sort_tasks();
    state.catalog_store.replace_timeline(&updated)?;

    Ok(Json(updated))
}

/// DELETE /api/delete/timeline/:id
pub async fn delete_timeline<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "timeline")?;
    if !state.catalog_store.delete_timeline(id)? {
        return Err(ApiError::TimelineNotFound);
    }

    Ok(MessageResponse::new("Deleted successfully"))
}
