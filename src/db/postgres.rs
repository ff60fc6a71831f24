//! PostgreSQL-backed catalog store
//!
//! Expected schema, written by the offline batch job:
//!
//! ```sql
//! CREATE TABLE customers       (customer_id TEXT NOT NULL);
//! CREATE TABLE products        (product_id TEXT PRIMARY KEY, name TEXT NOT NULL);
//! CREATE TABLE popularity      (bucket DATE NOT NULL, product_id TEXT NOT NULL, score DOUBLE PRECISION NOT NULL);
//! CREATE TABLE personalization (customer_id TEXT NOT NULL, product_id TEXT NOT NULL, score DOUBLE PRECISION NOT NULL);
//! CREATE TABLE similarity      (customer_id TEXT NOT NULL, product_id TEXT NOT NULL, score DOUBLE PRECISION NOT NULL);
//! ```
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use super::CatalogStore;
use crate::{
    error::AppResult,
    models::{
        Customer, CustomerId, CustomerProductScore, PersonalizationEntry, PopularityEntry,
        Product, ProductId, SimilarityEntry,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Connections are opened lazily so an unreachable database surfaces as a
/// scan failure, which the snapshot loader retries with backoff.
pub fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(database_url)?;

    Ok(pool)
}

#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn scan_scores(&self, sql: &str) -> AppResult<Vec<CustomerProductScore>> {
        let rows: Vec<ScoreRow> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(score_from_row).collect())
    }
}

type ScoreRow = (String, String, f64);
type PopularityRow = (NaiveDate, String, f64);

fn customer_from_row((id,): (String,)) -> Customer {
    Customer {
        customer_id: CustomerId::new(id),
    }
}

fn product_from_row((id, name): (String, String)) -> Product {
    Product {
        id: ProductId::new(id),
        name,
    }
}

fn popularity_from_row((bucket, product_id, score): PopularityRow) -> PopularityEntry {
    PopularityEntry {
        bucket,
        product_id: ProductId::new(product_id),
        score,
    }
}

fn score_from_row((customer_id, product_id, score): ScoreRow) -> CustomerProductScore {
    CustomerProductScore {
        customer_id: CustomerId::new(customer_id),
        product_id: ProductId::new(product_id),
        score,
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn scan_customers(&self) -> AppResult<Vec<Customer>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT customer_id::text FROM customers")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(customer_from_row).collect())
    }

    async fn scan_products(&self) -> AppResult<Vec<Product>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT product_id::text, name FROM products")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(product_from_row).collect())
    }

    async fn scan_popularity(&self) -> AppResult<Vec<PopularityEntry>> {
        let rows: Vec<PopularityRow> = sqlx::query_as(
            "SELECT bucket, product_id::text, score::float8 FROM popularity",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(popularity_from_row).collect())
    }

    async fn scan_personalization(&self) -> AppResult<Vec<PersonalizationEntry>> {
        self.scan_scores(
            "SELECT customer_id::text, product_id::text, score::float8 FROM personalization",
        )
        .await
    }

    async fn scan_similarity(&self) -> AppResult<Vec<SimilarityEntry>> {
        self.scan_scores(
            "SELECT customer_id::text, product_id::text, score::float8 FROM similarity",
        )
        .await
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
