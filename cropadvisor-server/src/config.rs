//! Server configuration

use std::env;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// SQLite database file; in-memory stores when unset
    pub database_path: Option<String>,

    /// Base URL of the external crop recommendation service
    pub recommender_url: String,

    /// Lifetime of issued admin tokens
    pub admin_token_ttl_minutes: i64,

    /// Require an admin token on admin management routes
    pub require_admin_auth: bool,

    /// Allow cross-origin requests from any origin
    pub cors_allow_any: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            database_path: None,
            recommender_url: "http://127.0.0.1:5000".to_string(),
            admin_token_ttl_minutes: 24 * 60,
            require_admin_auth: false,
            cors_allow_any: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: load("PORT", defaults.port),
            database_path: env::var("DATABASE_PATH").ok().filter(|p| !p.is_empty()),
            recommender_url: load("RECOMMENDER_URL", defaults.recommender_url),
            admin_token_ttl_minutes: load("ADMIN_TOKEN_TTL_MINUTES", defaults.admin_token_ttl_minutes),
            require_admin_auth: load("REQUIRE_ADMIN_AUTH", defaults.require_admin_auth),
            cors_allow_any: load("CORS_ALLOW_ANY", defaults.cors_allow_any),
        }
    }
}

fn load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            tracing::debug!("{key} not set, using default: {default}");
            default
        }
    }
}
