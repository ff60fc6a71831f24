use std::sync::Arc;

use super::{
    products::ProductCatalog,
    ranking::{top, BuildStats, RankedTable},
};
use crate::models::{CustomerId, CustomerProductScore, Product};

/// Lookup of a ranked product list keyed by customer
///
/// Unknown customers and customers without rows both yield an empty list;
/// the fallback policy lives in the recommendation service.
pub trait CustomerIndex: Send + Sync {
    fn for_customer(&self, customer_id: &CustomerId, limit: usize) -> Vec<Product>;

    /// Number of customers with at least one scored product
    fn customer_count(&self) -> usize;

    /// Index name for logging
    fn kind(&self) -> &'static str;
}

/// Per-customer scores ranked once at build time
#[derive(Debug, Clone)]
pub struct CustomerScores {
    table: RankedTable<CustomerId>,
    products: Arc<ProductCatalog>,
}

impl CustomerScores {
    pub fn build(
        rows: Vec<CustomerProductScore>,
        products: Arc<ProductCatalog>,
    ) -> (Self, BuildStats) {
        let (table, stats) = RankedTable::build(
            rows.into_iter()
                .map(|row| (row.customer_id, row.product_id, row.score)),
        );

        (Self { table, products }, stats)
    }

    pub fn ranked(&self, customer_id: &CustomerId, limit: usize) -> Vec<Product> {
        self.table
            .get(customer_id)
            .map(|list| self.products.resolve_all(top(list, limit)))
            .unwrap_or_default()
    }

    pub fn customer_count(&self) -> usize {
        self.table.len()
    }
}
