//! Directory-backed catalog store
//!
//! Each logical table is one JSON array file under the root directory, e.g.
//! `customers.json` or `popularity.json`. The batch job rewrites the directory
//! and the service picks the new files up on the next refresh.
//!
//! A file that is not a JSON array fails the table. Individual rows that do
//! not decode (null keys, missing fields) are skipped with a warning.
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;

use super::{
    CatalogStore, CUSTOMERS_TABLE, PERSONALIZATION_TABLE, POPULARITY_TABLE, PRODUCTS_TABLE,
    SIMILARITY_TABLE,
};
use crate::{
    error::{AppError, AppResult},
    models::{Customer, PersonalizationEntry, PopularityEntry, Product, SimilarityEntry},
};

#[derive(Debug, Clone)]
pub struct DirectoryCatalogStore {
    root: PathBuf,
}

impl DirectoryCatalogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.json", table))
    }

    async fn read_table<T: DeserializeOwned>(&self, table: &str) -> AppResult<Vec<T>> {
        let path = self.table_path(table);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::DataUnavailable(format!(
                    "table {} not found at {}",
                    table,
                    path.display()
                )));
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let values: Vec<Value> = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(
                table = table,
                path = %path.display(),
                error = %e,
                "Failed to parse table file"
            );
            AppError::Malformed {
                table: table.to_string(),
                message: e.to_string(),
            }
        })?;

        let rows = decode_rows(table, values);
        tracing::debug!(table = table, rows = rows.len(), "Read table file");

        Ok(rows)
    }
}

/// Decodes each row on its own, dropping the ones that do not fit `T`
fn decode_rows<T: DeserializeOwned>(table: &str, values: Vec<Value>) -> Vec<T> {
    let total = values.len();
    let mut first_error = None;

    let rows: Vec<T> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(row) => Some(row),
            Err(e) => {
                first_error.get_or_insert(e);
                None
            }
        })
        .collect();

    if let Some(error) = first_error {
        tracing::warn!(
            table = table,
            skipped = total - rows.len(),
            error = %error,
            "Skipped undecodable table rows"
        );
    }

    rows
}

#[async_trait::async_trait]
impl CatalogStore for DirectoryCatalogStore {
    async fn scan_customers(&self) -> AppResult<Vec<Customer>> {
        self.read_table(CUSTOMERS_TABLE).await
    }

    async fn scan_products(&self) -> AppResult<Vec<Product>> {
        self.read_table(PRODUCTS_TABLE).await
    }

    async fn scan_popularity(&self) -> AppResult<Vec<PopularityEntry>> {
        self.read_table(POPULARITY_TABLE).await
    }

    async fn scan_personalization(&self) -> AppResult<Vec<PersonalizationEntry>> {
        self.read_table(PERSONALIZATION_TABLE).await
    }

    async fn scan_similarity(&self) -> AppResult<Vec<SimilarityEntry>> {
        self.read_table(SIMILARITY_TABLE).await
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}
