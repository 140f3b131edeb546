//! Farmer account endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use cropadvisor_core::document::{apply_update, create, redacted};
use cropadvisor_core::{ObjectId, PageParams, Role, User, UserStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{non_empty, parse_id, ApiJson, MessageResponse};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStore, CatalogStore, PredictionStore};

fn public_user(user: &User) -> Result<Value, ApiError> {
    Ok(redacted(user, &["password"])?)
}

/// POST /api/user
/// Register a farmer; email must not already be in use
pub async fn create_user<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<MessageResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let user: User = create(body)?;

    if state.account_store.find_user_by_email(&user.email)?.is_some() {
        return Err(ApiError::UserAlreadyExists);
    }

    state.account_store.create_user(&user)?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok(MessageResponse::new("User created successfully."))
}

/// GET /api/users
pub async fn list_users<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<Value>>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let users = state.account_store.list_users()?;
    if users.is_empty() {
        return Err(ApiError::NoUsers);
    }

    let users = page
        .apply(users)
        .iter()
        .map(public_user)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(users))
}

/// GET /api/user/:id
pub async fn get_user<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "user")?;
    let user = state
        .account_store
        .get_user(id)?
        .ok_or(ApiError::UserNotFound)?;

    Ok(Json(public_user(&user)?))
}

/// PUT /api/update/user/:id
/// Admin edit, including suspension through `status`
pub async fn update_user<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<MessageResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "user")?;
    let existing = state
        .account_store
        .get_user(id)?
        .ok_or(ApiError::UserNotFound)?;

    let updated = apply_update(&existing, body)?;
    state.account_store.replace_user(&updated)?;

    if updated.status != existing.status {
        tracing::info!(user_id = %id, status = ?updated.status, "User status changed");
    }

    Ok(MessageResponse::new("User Updated successfully."))
}

/// DELETE /api/delete/user/:id
/// Physical delete; the user's predictions are left in place
pub async fn delete_user<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "user")?;
    if !state.account_store.delete_user(id)? {
        return Err(ApiError::UserNotFound);
    }

    Ok(MessageResponse::new("User deleted successfully."))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedInUser {
    pub id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: LoggedInUser,
}

/// POST /api/login
/// Farmer login; no token is issued
pub async fn login<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let (Some(email), Some(password)) = (
        non_empty(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    let user = state
        .account_store
        .find_user_by_email(email)?
        .filter(|u| u.password == password)
        .ok_or(ApiError::InvalidCredentials)?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        user: LoggedInUser {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            status: user.status,
        },
    }))
}
