//! Application state shared by all handlers

use std::sync::Arc;

use crate::auth::AdminTokenRegistry;
use crate::config::Config;
use crate::recommender::Recommender;
use crate::store::{AccountStore, CatalogStore, PredictionStore};

/// Advisory server state
pub struct AppState<A, C, P>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    pub account_store: Arc<A>,
    pub catalog_store: Arc<C>,
    pub prediction_store: Arc<P>,
    pub admin_tokens: AdminTokenRegistry,
    pub recommender: Arc<dyn Recommender>,
    pub config: Config,
}

impl<A, C, P> AppState<A, C, P>
where
    A: AccountStore,
    C: CatalogStore,
    P: PredictionStore,
{
    pub fn new(
        config: Config,
        account_store: Arc<A>,
        catalog_store: Arc<C>,
        prediction_store: Arc<P>,
        recommender: Arc<dyn Recommender>,
    ) -> Self {
        Self {
            admin_tokens: AdminTokenRegistry::new(config.admin_token_ttl_minutes),
            account_store,
            catalog_store,
            prediction_store,
            recommender,
            config,
        }
    }
}
