//! HTTP routes for the advisory server

mod admins;
mod crops;
mod predictions;
mod recommend;
mod selected_crops;
mod timelines;
mod users;

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::{header, Method};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use cropadvisor_core::ObjectId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStore, CatalogStore, PredictionStore};

/// Create the router with all routes
pub fn create_router<A, C, P>(state: Arc<AppState<A, C, P>>) -> Router
where
    A: AccountStore + 'static,
    C: CatalogStore + 'static,
    P: PredictionStore + 'static,
{
    let cors = if state.config.cors_allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        CorsLayer::new()
    };

    Router::new()
        // Predictions
        .route(
            "/api/predictions",
            post(predictions::create_prediction).get(predictions::list_predictions),
        )
        .route("/api/predictions/select", post(predictions::create_selected_crop))
        .route("/api/predictions/user/:user_id", get(predictions::list_user_predictions))
        .route(
            "/api/predictions/:id",
            get(predictions::get_prediction)
                .put(predictions::update_prediction)
                .delete(predictions::delete_prediction),
        )
        .route(
            "/api/predictions/:id/crops/:scientific_name",
            get(predictions::get_crop_details),
        )
        // Selected crops
        .route("/api/selected-crops", get(selected_crops::list_selected_crops))
        .route(
            "/api/selected-crops/:id",
            get(selected_crops::get_latest_for_prediction)
                .put(selected_crops::update_selected_crop)
                .delete(selected_crops::delete_selected_crop),
        )
        // Farmer accounts
        .route("/api/user", post(users::create_user))
        .route("/api/users", get(users::list_users))
        .route("/api/user/:id", get(users::get_user))
        .route("/api/update/user/:id", put(users::update_user))
        .route("/api/delete/user/:id", delete(users::delete_user))
        .route("/api/login", post(users::login))
        // Crop catalog
        .route("/api/crop", post(crops::create_crop))
        .route("/api/crops", get(crops::list_crops))
        .route("/api/crops/predict", post(recommend::predict_crop))
        .route("/api/crop/:id", get(crops::get_crop))
        .route("/api/update/crop/:id", put(crops::update_crop))
        .route("/api/delete/crop/:id", delete(crops::delete_crop))
        // Timelines
        .route("/api/timeline", post(timelines::create_timeline))
        .route("/api/timelines", get(timelines::list_timelines))
        .route("/api/timeline/:id", get(timelines::get_timeline))
        .route("/api/update/timeline/:id", put(timelines::update_timeline))
        .route(
            "/api/delete/timeline/:id",
            delete(timelines::delete_timeline),
        )
        // Administrators
        .route("/admin", post(admins::create_admin).get(admins::list_admins))
        .route("/admin/login", post(admins::login))
        .route("/admin/logout", post(admins::logout))
        .route("/admin/session", get(admins::session))
        .route(
            "/admin/:id",
            get(admins::get_admin)
                .put(admins::update_admin)
                .delete(admins::delete_admin),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// JSON request body whose rejections answer like every other client error
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Response body carrying only a message
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Json<Self> {
        Json(Self { message })
    }
}

/// Parse a path id, naming the resource in the error
pub(crate) fn parse_id(raw: &str, resource: &'static str) -> Result<ObjectId, ApiError> {
    ObjectId::parse(raw).map_err(|_| ApiError::InvalidId(resource))
}

/// Keep only the listed top-level keys of a JSON object body
pub(crate) fn pick(body: Value, keys: &[&str]) -> Result<Value, ApiError> {
    let Value::Object(fields) = body else {
        return Err(ApiError::Validation("Request body must be a JSON object".to_string()));
    };

    let picked: Map<String, Value> = fields
        .into_iter()
        .filter(|(k, _)| keys.contains(&k.as_str()))
        .collect();
    Ok(Value::Object(picked))
}

/// Treat missing and blank strings alike
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
