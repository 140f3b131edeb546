//! Administrator account endpoints

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use cropadvisor_core::document::redacted;
use cropadvisor_core::{normalize_email, Admin, AdminSummary, PageParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{non_empty, parse_id, ApiJson, MessageResponse};
use crate::auth::{bearer_token, AdminGuard, AdminIdentity, AuthVerifier};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStore, CatalogStore, PredictionStore};

/// Admin documents never leave the server with their password
fn public_admin(admin: &Admin) -> Result<Value, ApiError> {
    Ok(redacted(admin, &["password"])?)
}

#[derive(Deserialize)]
pub struct CreateAdminRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct AdminResponse {
    pub message: &'static str,
    pub admin: AdminSummary,
}

/// POST /admin
pub async fn create_admin<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    ApiJson(req): ApiJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminResponse>), ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let (Some(name), Some(email), Some(password)) = (
        non_empty(&req.name),
        non_empty(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::Validation("All fields are required".to_string()));
    };

    if state
        .account_store
        .find_admin_by_email(&normalize_email(email))?
        .is_some()
    {
        return Err(ApiError::AdminAlreadyExists);
    }

    let admin = Admin::new(Some(name.to_string()), email, password);
    state.account_store.create_admin(&admin)?;

    tracing::info!(admin_id = %admin.id, email = %admin.email, "Admin created");

    Ok((
        StatusCode::CREATED,
        Json(AdminResponse {
            message: "Admin created successfully",
            admin: admin.summary(),
        }),
    ))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoggedInAdmin {
    #[serde(flatten)]
    pub summary: AdminSummary,
    pub role: &'static str,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub admin: LoggedInAdmin,
}

/// POST /admin/login
/// Passwords are compared verbatim
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

    let admin = state
        .account_store
        .find_admin_by_email(&normalize_email(email))?
        .filter(|a| a.password == password)
        .ok_or(ApiError::InvalidCredentials)?;

    let token = state.admin_tokens.issue(&admin);
    tracing::info!(admin_id = %admin.id, "Admin logged in");

    Ok(Json(LoginResponse {
        message: "Admin login successful",
        token,
        admin: LoggedInAdmin {
            summary: admin.summary(),
            role: "admin",
        },
    }))
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub admin: AdminIdentity,
}

/// GET /admin/session
/// Resolve the bearer token to the admin it was issued to
pub async fn session<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let token = bearer_token(&headers).ok_or(ApiError::NotAuthenticated)?;
    let admin = state.admin_tokens.verify(token)?;

    Ok(Json(SessionResponse { admin }))
}

/// POST /admin/logout
pub async fn logout<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let token = bearer_token(&headers).ok_or(ApiError::NotAuthenticated)?;
    if !state.admin_tokens.revoke(token) {
        return Err(ApiError::NotAuthenticated);
    }

    Ok(MessageResponse::new("Admin logged out"))
}

/// GET /admin
pub async fn list_admins<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    _guard: AdminGuard,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<Value>>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let admins = page.apply(state.account_store.list_admins()?);
    let admins = admins
        .iter()
        .map(public_admin)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(admins))
}

/// GET /admin/:id
pub async fn get_admin<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    _guard: AdminGuard,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "admin")?;
    let admin = state
        .account_store
        .get_admin(id)?
        .ok_or(ApiError::AdminNotFound)?;

    Ok(Json(public_admin(&admin)?))
}

#[derive(Deserialize)]
pub struct UpdateAdminRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// PUT /admin/:id
/// Only the fields present in the body change
pub async fn update_admin<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    _guard: AdminGuard,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateAdminRequest>,
) -> Result<Json<AdminResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "admin")?;
    let mut admin = state
        .account_store
        .get_admin(id)?
        .ok_or(ApiError::AdminNotFound)?;

    if let Some(name) = non_empty(&req.name) {
        admin.name = name.to_string();
    }
    if let Some(email) = non_empty(&req.email) {
        admin.email = normalize_email(email);
    }
    if let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) {
        admin.password = password.to_string();
    }
    admin.updated_at = cropadvisor_core::now();

    state.account_store.replace_admin(&admin)?;

    Ok(Json(AdminResponse {
        message: "Admin updated",
        admin: admin.summary(),
    }))
}

/// DELETE /admin/:id
/// Tokens issued to the admin stop working
pub async fn delete_admin<A, C, P>(
    State(state): State<Arc<AppState<A, C, P>>>,
    _guard: AdminGuard,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    let id = parse_id(&id, "admin")?;
    if !state.account_store.delete_admin(id)? {
        return Err(ApiError::AdminNotFound);
    }
    state.admin_tokens.revoke_admin(id);

    Ok(MessageResponse::new("Admin deleted"))
}
