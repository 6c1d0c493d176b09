pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use karmafeed_core::{Module, ServiceError};
use karmafeed_sql::SQLStore;

pub use service::{FeedConfig, FeedService};

/// Feed Module — posts, threaded comments, likes, and the karma ledger.
pub struct FeedModule {
    service: Arc<FeedService>,
}

impl FeedModule {
    pub fn new(sql: Arc<dyn SQLStore>, config: FeedConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            service: Arc::new(FeedService::new(sql, config)?),
        })
    }

    /// Handle to the underlying service, for callers outside the HTTP
    /// layer (seeding, maintenance commands).
    pub fn service(&self) -> Arc<FeedService> {
        Arc::clone(&self.service)
    }
}

impl Module for FeedModule {
    fn name(&self) -> &str {
        "feed"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
