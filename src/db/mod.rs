//! Catalog store abstraction
//!
//! The serving layer reads the precomputed tables through a pluggable
//! `CatalogStore`. Every method is a bulk scan of one logical table; filtering
//! and ranking happen in memory when a snapshot is built, never per request.
use crate::{
    error::AppResult,
    models::{Customer, PersonalizationEntry, PopularityEntry, Product, SimilarityEntry},
};

pub mod directory;
pub mod memory;
pub mod postgres;

pub use directory::DirectoryCatalogStore;
pub use memory::InMemoryCatalogStore;
pub use postgres::{create_pool, PostgresCatalogStore};

/// Logical table names shared by every backend
pub const CUSTOMERS_TABLE: &str = "customers";
pub const PRODUCTS_TABLE: &str = "products";
pub const POPULARITY_TABLE: &str = "popularity";
pub const PERSONALIZATION_TABLE: &str = "personalization";
pub const SIMILARITY_TABLE: &str = "similarity";

/// Read-only access to the tables produced by the offline batch job
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn scan_customers(&self) -> AppResult<Vec<Customer>>;

    async fn scan_products(&self) -> AppResult<Vec<Product>>;

    async fn scan_popularity(&self) -> AppResult<Vec<PopularityEntry>>;

    async fn scan_personalization(&self) -> AppResult<Vec<PersonalizationEntry>>;

    async fn scan_similarity(&self) -> AppResult<Vec<SimilarityEntry>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Raw contents of every table, as scanned in one load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogTables {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub popularity: Vec<PopularityEntry>,
    pub personalization: Vec<PersonalizationEntry>,
    pub similarity: Vec<SimilarityEntry>,
}

impl CatalogTables {
    /// Scans all tables; any failing table fails the whole load
    pub async fn scan(store: &dyn CatalogStore) -> AppResult<Self> {
        let (customers, products, popularity, personalization, similarity) = tokio::try_join!(
            store.scan_customers(),
            store.scan_products(),
            store.scan_popularity(),
            store.scan_personalization(),
            store.scan_similarity(),
        )?;

        tracing::debug!(
            store = store.name(),
            customers = customers.len(),
            products = products.len(),
            popularity = popularity.len(),
            personalization = personalization.len(),
            similarity = similarity.len(),
            "Scanned catalog tables"
        );

        Ok(Self {
            customers,
            products,
            popularity,
            personalization,
            similarity,
        })
    }
}
