//! Admin tokens
//!
//! Login hands out `admin-token-<unix millis>`. Issued tokens are remembered
//! with an expiry so they can be checked server-side through [`AuthVerifier`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use cropadvisor_core::{Admin, ObjectId};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{AccountStore, CatalogStore, PredictionStore};

pub const TOKEN_PREFIX: &str = "admin-token-";

/// Who a valid admin token belongs to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIdentity {
    pub admin_id: ObjectId,
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Checks bearer tokens presented on admin routes
pub trait AuthVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AdminIdentity, ApiError>;
}

/// In-memory registry of issued admin tokens
pub struct AdminTokenRegistry {
    issued: RwLock<IssuedTokens>,
    ttl: Duration,
}

#[derive(Default)]
struct IssuedTokens {
    by_token: HashMap<String, AdminIdentity>,
    /// Millis of the newest token; tokens never share a timestamp
    last_millis: i64,
}

impl AdminTokenRegistry {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            issued: RwLock::new(IssuedTokens::default()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Issue a token for an admin who just logged in
    pub fn issue(&self, admin: &Admin) -> String {
        let now = Utc::now();
        let mut issued = self.issued.write().unwrap();

        let millis = now.timestamp_millis().max(issued.last_millis + 1);
        issued.last_millis = millis;
        let token = format!("{}{}", TOKEN_PREFIX, millis);

        let identity = AdminIdentity {
            admin_id: admin.id,
            email: admin.email.clone(),
            issued_at: now,
            expires_at: now + self.ttl,
        };

        issued.by_token.retain(|_, id| id.expires_at > now);
        issued.by_token.insert(token.clone(), identity);
        token
    }

    /// Forget a token; returns whether it was known
    pub fn revoke(&self, token: &str) -> bool {
        self.issued.write().unwrap().by_token.remove(token).is_some()
    }

    /// Forget every token of an admin (e.g. when the admin is deleted)
    pub fn revoke_admin(&self, admin_id: ObjectId) {
        self.issued
            .write()
            .unwrap()
            .by_token
            .retain(|_, id| id.admin_id != admin_id);
    }
}

impl AuthVerifier for AdminTokenRegistry {
    fn verify(&self, token: &str) -> Result<AdminIdentity, ApiError> {
        let issued = self.issued.read().unwrap();
        match issued.by_token.get(token) {
            Some(identity) if identity.expires_at > Utc::now() => Ok(identity.clone()),
            _ => Err(ApiError::NotAuthenticated),
        }
    }
}

/// Extract a bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Admin session extractor
///
/// Always verifies when a token is required by configuration; otherwise the
/// route stays open and the identity is attached only if a valid token was sent.
pub struct AdminGuard(pub Option<AdminIdentity>);

#[async_trait]
impl<A, C, P> FromRequestParts<Arc<AppState<A, C, P>>> for AdminGuard
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<A, C, P>>,
    ) -> Result<Self, Self::Rejection> {
        let identity = bearer_token(&parts.headers).map(|t| state.admin_tokens.verify(t));

        match identity {
            Some(Ok(identity)) => Ok(AdminGuard(Some(identity))),
            Some(Err(e)) if state.config.require_admin_auth => Err(e),
            None if state.config.require_admin_auth => Err(ApiError::NotAuthenticated),
            _ => Ok(AdminGuard(None)),
        }
    }
}
