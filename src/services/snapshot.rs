//! Snapshot lifecycle
//!
//! A `Snapshot` is one immutable generation of every index, built together
//! from a single scan of the catalog store. `SnapshotStore` publishes the
//! active generation behind a lock that is held only to clone or replace the
//! `Arc`, so requests never wait on a load and always read one generation
//! end to end. `SnapshotLoader` owns the catalog store and performs refreshes
//! with bounded retry and backoff.
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use super::{
    customer_index::CustomerIndex, directory::CustomerDirectory,
    personalization::PersonalizationIndex, popularity::PopularityIndex,
    products::ProductCatalog, ranking::BuildStats, similarity::SimilarityIndex,
};
use crate::{
    config::RetryPolicy,
    db::{CatalogStore, CatalogTables},
    error::{AppError, AppResult},
    models::BucketGranularity,
};

/// One internally consistent generation of all indices
#[derive(Debug)]
pub struct Snapshot {
    generation: u64,
    loaded_at: DateTime<Utc>,
    granularity: BucketGranularity,
    products: Arc<ProductCatalog>,
    customers: CustomerDirectory,
    popularity: PopularityIndex,
    personalization: PersonalizationIndex,
    similarity: SimilarityIndex,
}

impl Snapshot {
    pub fn build(generation: u64, tables: CatalogTables, granularity: BucketGranularity) -> Self {
        let (products, duplicate_products) = ProductCatalog::build(tables.products);
        if duplicate_products > 0 {
            tracing::warn!(
                generation,
                duplicates = duplicate_products,
                "Duplicate product rows ignored"
            );
        }
        let products = Arc::new(products);

        let customers = CustomerDirectory::build(tables.customers);

        let (popularity, stats) =
            PopularityIndex::build(tables.popularity, granularity, products.clone());
        log_build_stats(generation, "popularity", stats);

        let (personalization, stats) =
            PersonalizationIndex::build(tables.personalization, products.clone());
        log_build_stats(generation, "personalization", stats);

        let (similarity, stats) = SimilarityIndex::build(tables.similarity, products.clone());
        log_build_stats(generation, "similarity", stats);

        Self {
            generation,
            loaded_at: Utc::now(),
            granularity,
            products,
            customers,
            popularity,
            personalization,
            similarity,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn granularity(&self) -> BucketGranularity {
        self.granularity
    }

    pub fn products(&self) -> &ProductCatalog {
        &self.products
    }

    pub fn customers(&self) -> &CustomerDirectory {
        &self.customers
    }

    pub fn popularity(&self) -> &PopularityIndex {
        &self.popularity
    }

    pub fn personalization(&self) -> &PersonalizationIndex {
        &self.personalization
    }

    pub fn similarity(&self) -> &SimilarityIndex {
        &self.similarity
    }
}

fn log_build_stats(generation: u64, table: &str, stats: BuildStats) {
    if stats.dropped() > 0 {
        tracing::warn!(
            generation,
            table,
            rows = stats.rows,
            duplicates = stats.duplicates,
            non_finite = stats.non_finite,
            "Dropped rows while building index"
        );
    }
}

/// Holder of the active snapshot
#[derive(Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that starts out serving `snapshot`
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Some(Arc::new(snapshot)))),
        }
    }

    /// The active generation, if any has been loaded
    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }

    pub async fn generation(&self) -> Option<u64> {
        self.current.read().await.as_ref().map(|s| s.generation())
    }

    /// Replaces the active snapshot and returns it
    pub async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let previous = self.current.write().await.replace(snapshot.clone());

        tracing::info!(
            generation = snapshot.generation(),
            previous_generation = previous.as_ref().map(|s| s.generation()),
            customers = snapshot.customers().len(),
            products = snapshot.products().len(),
            popularity_buckets = snapshot.popularity().bucket_count(),
            personalized_customers = snapshot.personalization().customer_count(),
            similar_customers = snapshot.similarity().customer_count(),
            "Published catalog snapshot"
        );

        snapshot
    }
}

/// Loads snapshots from the catalog store and publishes them
pub struct SnapshotLoader {
    store: Arc<dyn CatalogStore>,
    snapshots: SnapshotStore,
    granularity: BucketGranularity,
    retry: RetryPolicy,
    /// Serializes refreshes so generations are published in order
    refresh_lock: Mutex<()>,
}

impl SnapshotLoader {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        snapshots: SnapshotStore,
        granularity: BucketGranularity,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            snapshots,
            granularity,
            retry,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Loads a new generation and swaps it in
    ///
    /// On failure the previously published snapshot, if any, stays active.
    pub async fn refresh(&self) -> AppResult<Arc<Snapshot>> {
        let _guard = self.refresh_lock.lock().await;

        let tables = self.scan_with_retry().await?;
        let generation = self.snapshots.generation().await.map_or(1, |g| g + 1);
        let granularity = self.granularity;

        let snapshot =
            tokio::task::spawn_blocking(move || Snapshot::build(generation, tables, granularity))
                .await
                .map_err(|e| AppError::Internal(format!("Snapshot build failed: {}", e)))?;

        Ok(self.snapshots.publish(snapshot).await)
    }

    async fn scan_with_retry(&self) -> AppResult<CatalogTables> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match CatalogTables::scan(self.store.as_ref()).await {
                Ok(tables) => {
                    if attempt > 1 {
                        tracing::info!(
                            store = self.store.name(),
                            attempt,
                            "Catalog store recovered"
                        );
                    }
                    return Ok(tables);
                }
                Err(e) if e.is_store_failure() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff_after(attempt);
                    tracing::warn!(
                        store = self.store.name(),
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        backoff_ms = delay.as_millis() as u64,
                        error = %e,
                        "Catalog scan failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        store = self.store.name(),
                        attempt,
                        error = %e,
                        "Catalog scan failed, keeping current snapshot"
                    );
                    return Err(match e {
                        AppError::DataUnavailable(_) => e,
                        e if e.is_store_failure() => AppError::DataUnavailable(format!(
                            "catalog store {} unreadable after {} attempts: {}",
                            self.store.name(),
                            attempt,
                            e
                        )),
                        e => e,
                    });
                }
            }
        }
    }

    /// Spawns a task that refreshes every `period`
    ///
    /// The first refresh happens one period after spawning; failures are
    /// logged and the next tick tries again.
    pub fn spawn_periodic_refresh(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh().await {
                    tracing::warn!(error = %e, "Periodic snapshot refresh failed");
                }
            }
        })
    }
}
