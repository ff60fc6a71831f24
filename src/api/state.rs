use std::sync::Arc;

use crate::config::{Config, RetryPolicy};
use crate::db::CatalogStore;
use crate::models::BucketGranularity;
use crate::services::{RecommendationService, SnapshotLoader, SnapshotStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommendations: RecommendationService,
    pub loader: Arc<SnapshotLoader>,
}

impl AppState {
    /// Wires the loader and the recommendation service to one snapshot store
    pub fn new(
        store: Arc<dyn CatalogStore>,
        granularity: BucketGranularity,
        retry: RetryPolicy,
        limit: usize,
    ) -> Self {
        let snapshots = SnapshotStore::new();
        let loader = Arc::new(SnapshotLoader::new(
            store,
            snapshots.clone(),
            granularity,
            retry,
        ));

        Self {
            recommendations: RecommendationService::new(snapshots, limit),
            loader,
        }
    }

    pub fn from_config(store: Arc<dyn CatalogStore>, config: &Config) -> Self {
        Self::new(
            store,
            config.bucket_granularity,
            config.retry_policy(),
            config.recommendation_limit,
        )
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        self.recommendations.snapshots()
    }
}
