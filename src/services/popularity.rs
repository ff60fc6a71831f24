use std::sync::Arc;

use super::{
    products::ProductCatalog,
    ranking::{top, BuildStats, RankedTable},
};
use crate::models::{BucketGranularity, DateBucket, PopularityEntry, Product};

/// Globally popular products per date bucket
#[derive(Debug, Clone)]
pub struct PopularityIndex {
    table: RankedTable<DateBucket>,
    products: Arc<ProductCatalog>,
}

impl PopularityIndex {
    /// Rows are re-bucketed with `granularity`, so a table written at day
    /// granularity can be served by week or month.
    pub fn build(
        rows: Vec<PopularityEntry>,
        granularity: BucketGranularity,
        products: Arc<ProductCatalog>,
    ) -> (Self, BuildStats) {
        let (table, stats) = RankedTable::build(rows.into_iter().map(|row| {
            (granularity.bucket_of(row.bucket), row.product_id, row.score)
        }));

        (Self { table, products }, stats)
    }

    /// Bucket whose data answers a lookup: the bucket itself, else the nearest
    /// earlier one with rows
    pub fn serving_bucket(&self, bucket: DateBucket) -> Option<DateBucket> {
        self.table.at_or_before(&bucket).map(|(served, _)| *served)
    }

    /// Top `limit` products for the bucket
    ///
    /// Empty when no bucket at or before `bucket` has data; that is a normal
    /// cold-start condition, not an error.
    pub fn top_popular(&self, bucket: DateBucket, limit: usize) -> Vec<Product> {
        match self.table.at_or_before(&bucket) {
            Some((served, list)) => {
                if *served != bucket {
                    tracing::debug!(
                        requested = %bucket,
                        served = %served,
                        "Popularity bucket empty, using nearest earlier bucket"
                    );
                }
                self.products.resolve_all(top(list, limit))
            }
            None => {
                tracing::debug!(requested = %bucket, "No popularity data at or before bucket");
                Vec::new()
            }
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.table.len()
    }
}
