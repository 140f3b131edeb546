//! Crop Advisory Server
//!
//! REST backend for the crop advisory platform: farmer and admin accounts,
//! the crop catalog with task timelines, stored predictions and the crops
//! farmers select from them.

pub mod auth;
pub mod config;
pub mod error;
pub mod recommender;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::{AdminGuard, AdminIdentity, AdminTokenRegistry, AuthVerifier};
pub use config::Config;
pub use error::ApiError;
pub use recommender::{HttpRecommender, Recommender};
pub use state::AppState;
pub use store::{
    AccountStore, CatalogStore, InMemoryAccountStore, InMemoryCatalogStore,
    InMemoryPredictionStore, PredictionStore, SqliteStore,
};
