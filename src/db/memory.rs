use std::sync::Arc;

use super::{CatalogStore, CatalogTables};
use crate::{
    error::AppResult,
    models::{Customer, PersonalizationEntry, PopularityEntry, Product, SimilarityEntry},
};

/// Catalog store over fixed in-process tables
///
/// Used by embedding callers that already hold the batch output in memory,
/// and by tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    tables: Arc<CatalogTables>,
}

impl InMemoryCatalogStore {
    pub fn new(tables: CatalogTables) -> Self {
        Self {
            tables: Arc::new(tables),
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn scan_customers(&self) -> AppResult<Vec<Customer>> {
        Ok(self.tables.customers.clone())
    }

    async fn scan_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.tables.products.clone())
    }

    async fn scan_popularity(&self) -> AppResult<Vec<PopularityEntry>> {
        Ok(self.tables.popularity.clone())
    }

    async fn scan_personalization(&self) -> AppResult<Vec<PersonalizationEntry>> {
        Ok(self.tables.personalization.clone())
    }

    async fn scan_similarity(&self) -> AppResult<Vec<SimilarityEntry>> {
        Ok(self.tables.similarity.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
