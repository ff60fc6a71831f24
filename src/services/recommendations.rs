use chrono::NaiveDate;
use std::sync::Arc;

use super::{
    customer_index::CustomerIndex,
    snapshot::{Snapshot, SnapshotStore},
};
use crate::{
    error::{AppError, AppResult},
    models::{CustomerId, ListSource, Product, Recommendations},
};

/// Serves the popular, personalized and similar-customer lists
///
/// Each call reads exactly one snapshot generation. Personalized and similar
/// lists that come back empty are replaced with the popular list for the
/// bucket, and the substitution is reported in the result and the logs.
#[derive(Clone)]
pub struct RecommendationService {
    snapshots: SnapshotStore,
    limit: usize,
}

impl RecommendationService {
    pub fn new(snapshots: SnapshotStore, limit: usize) -> Self {
        Self { snapshots, limit }
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Known customer ids for the dashboard selector
    pub async fn list_customer_ids(&self) -> AppResult<Vec<CustomerId>> {
        let snapshot = self.active_snapshot().await?;
        Ok(snapshot.customers().list_customer_ids().to_vec())
    }

    /// Recommendations for a customer and delivery date
    ///
    /// Both inputs are validated before any snapshot or index is touched.
    pub async fn recommend(
        &self,
        customer_id: Option<&str>,
        delivery_date: Option<NaiveDate>,
    ) -> AppResult<Recommendations> {
        let (customer_id, delivery_date) = validate_request(customer_id, delivery_date)?;
        let snapshot = self.active_snapshot().await?;
        Ok(self.recommend_from(&snapshot, customer_id, delivery_date))
    }

    /// Pure read of one snapshot; identical inputs give identical output
    pub fn recommend_from(
        &self,
        snapshot: &Snapshot,
        customer_id: CustomerId,
        delivery_date: NaiveDate,
    ) -> Recommendations {
        let bucket = snapshot.granularity().bucket_of(delivery_date);
        let popular = snapshot.popularity().top_popular(bucket, self.limit);
        let popular_bucket = snapshot.popularity().serving_bucket(bucket);

        let (personalized, personalized_source) =
            self.with_fallback(snapshot.personalization(), &customer_id, &popular);
        let (similar, similar_source) =
            self.with_fallback(snapshot.similarity(), &customer_id, &popular);

        tracing::debug!(
            customer_id = %customer_id,
            bucket = %bucket,
            generation = snapshot.generation(),
            popular = popular.len(),
            personalized = personalized.len(),
            similar = similar.len(),
            "Recommendations computed"
        );

        Recommendations {
            customer_id,
            delivery_date,
            bucket,
            popular_bucket,
            generation: snapshot.generation(),
            popular,
            personalized,
            similar,
            personalized_source,
            similar_source,
        }
    }

    fn with_fallback(
        &self,
        index: &dyn CustomerIndex,
        customer_id: &CustomerId,
        popular: &[Product],
    ) -> (Vec<Product>, ListSource) {
        let ranked = index.for_customer(customer_id, self.limit);
        if !ranked.is_empty() {
            return (ranked, ListSource::Model);
        }

        tracing::info!(
            customer_id = %customer_id,
            list = index.kind(),
            cold_start = true,
            fallback_len = popular.len(),
            "No scores for customer, serving popular items"
        );

        (popular.to_vec(), ListSource::PopularFallback)
    }

    async fn active_snapshot(&self) -> AppResult<Arc<Snapshot>> {
        self.snapshots.current().await.ok_or_else(|| {
            AppError::DataUnavailable("No catalog snapshot has been loaded".to_string())
        })
    }
}

fn validate_request(
    customer_id: Option<&str>,
    delivery_date: Option<NaiveDate>,
) -> AppResult<(CustomerId, NaiveDate)> {
    let customer_id = customer_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("customer_id is required".to_string()))?;

    let delivery_date = delivery_date
        .ok_or_else(|| AppError::InvalidRequest("delivery_date is required".to_string()))?;

    Ok((CustomerId::new(customer_id), delivery_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CatalogTables;
    use crate::models::{
        BucketGranularity, Customer, CustomerProductScore, PopularityEntry, ProductId,
    };

    const DAY: BucketGranularity = BucketGranularity::Day;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn score(customer: &str, product: &str, score: f64) -> CustomerProductScore {
        CustomerProductScore {
            customer_id: CustomerId::new(customer),
            product_id: ProductId::new(product),
            score,
        }
    }

    fn popularity(product: &str, score: f64) -> PopularityEntry {
        PopularityEntry {
            bucket: date(2024, 5, 1),
            product_id: ProductId::new(product),
            score,
        }
    }

    fn tables() -> CatalogTables {
        CatalogTables {
            customers: vec![
                Customer {
                    customer_id: CustomerId::new("C1"),
                },
                Customer {
                    customer_id: CustomerId::new("C2"),
                },
            ],
            products: vec![],
            popularity: vec![
                popularity("P1", 10.0),
                popularity("P2", 10.0),
                popularity("P3", 5.0),
            ],
            personalization: vec![score("C2", "P7", 0.9), score("C2", "P8", 0.4)],
            similarity: vec![score("C2", "P5", 2.0)],
        }
    }

    fn service(limit: usize) -> RecommendationService {
        let snapshot = Snapshot::build(1, tables(), DAY);
        RecommendationService::new(SnapshotStore::with_snapshot(snapshot), limit)
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_cold_start_customer_gets_popular_lists() {
        let result = service(2)
            .recommend(Some("C1"), Some(date(2024, 5, 1)))
            .await
            .unwrap();

        assert_eq!(ids(&result.popular), vec!["P1", "P2"]);
        assert_eq!(result.personalized, result.popular);
        assert_eq!(result.similar, result.popular);
        assert_eq!(result.personalized_source, ListSource::PopularFallback);
        assert_eq!(result.similar_source, ListSource::PopularFallback);
        assert_eq!(result.bucket.to_string(), "2024-05-01");
    }

    #[tokio::test]
    async fn test_known_customer_gets_model_lists() {
        let result = service(2)
            .recommend(Some("C2"), Some(date(2024, 5, 1)))
            .await
            .unwrap();

        assert_eq!(ids(&result.personalized), vec!["P7", "P8"]);
        assert_eq!(ids(&result.similar), vec!["P5"]);
        assert_eq!(result.personalized_source, ListSource::Model);
        assert_eq!(result.similar_source, ListSource::Model);
        assert_eq!(result.popular.len(), 2);
    }

    #[tokio::test]
    async fn test_every_list_bounded_by_limit() {
        for limit in 1..=4 {
            let result = service(limit)
                .recommend(Some("C2"), Some(date(2024, 5, 3)))
                .await
                .unwrap();
            assert!(result.popular.len() <= limit);
            assert!(result.personalized.len() <= limit);
            assert!(result.similar.len() <= limit);
        }
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let service = service(3);
        let first = service
            .recommend(Some("C2"), Some(date(2024, 5, 1)))
            .await
            .unwrap();
        let second = service
            .recommend(Some("C2"), Some(date(2024, 5, 1)))
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_customer_id_is_trimmed() {
        let result = service(2)
            .recommend(Some("  C2 "), Some(date(2024, 5, 1)))
            .await
            .unwrap();
        assert_eq!(result.customer_id, CustomerId::new("C2"));
    }

    #[tokio::test]
    async fn test_missing_inputs_rejected_before_snapshot_access() {
        // No snapshot loaded: a lookup would fail with DataUnavailable
        let service = RecommendationService::new(SnapshotStore::new(), 5);

        let blank = service.recommend(Some(""), Some(date(2024, 5, 1))).await;
        assert!(matches!(blank, Err(AppError::InvalidRequest(_))));

        let whitespace = service.recommend(Some("   "), Some(date(2024, 5, 1))).await;
        assert!(matches!(whitespace, Err(AppError::InvalidRequest(_))));

        let no_customer = service.recommend(None, Some(date(2024, 5, 1))).await;
        assert!(matches!(no_customer, Err(AppError::InvalidRequest(_))));

        let no_date = service.recommend(Some("C1"), None).await;
        assert!(matches!(no_date, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_no_snapshot_is_data_unavailable() {
        let service = RecommendationService::new(SnapshotStore::new(), 5);

        let result = service.recommend(Some("C1"), Some(date(2024, 5, 1))).await;
        assert!(matches!(result, Err(AppError::DataUnavailable(_))));
        assert!(matches!(
            service.list_customer_ids().await,
            Err(AppError::DataUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_list_customer_ids() {
        let ids = service(5).list_customer_ids().await.unwrap();
        assert_eq!(ids, vec![CustomerId::new("C1"), CustomerId::new("C2")]);
    }

    #[tokio::test]
    async fn test_no_popularity_data_yields_empty_lists() {
        let snapshot = Snapshot::build(1, CatalogTables::default(), DAY);
        let service = RecommendationService::new(SnapshotStore::with_snapshot(snapshot), 5);

        let result = service
            .recommend(Some("C1"), Some(date(2024, 5, 1)))
            .await
            .unwrap();
        assert!(result.popular.is_empty());
        assert!(result.personalized.is_empty());
        assert!(result.similar.is_empty());
        assert!(result.personalized_source.is_cold_start());
        assert_eq!(result.popular_bucket, None);
    }

    #[tokio::test]
    async fn test_reports_earlier_popular_bucket() {
        let result = service(2)
            .recommend(Some("C1"), Some(date(2024, 5, 9)))
            .await
            .unwrap();

        assert_eq!(result.bucket.to_string(), "2024-05-09");
        assert_eq!(
            result.popular_bucket.map(|b| b.to_string()),
            Some("2024-05-01".to_string())
        );
        assert_eq!(ids(&result.popular), vec!["P1", "P2"]);
    }

    /// Tables whose every product id carries the generation tag
    fn sentinel_tables(tag: &str) -> CatalogTables {
        let product = |n: u32| format!("{}-P{}", tag, n);
        CatalogTables {
            customers: vec![Customer {
                customer_id: CustomerId::new("C1"),
            }],
            products: vec![],
            popularity: (1..=3)
                .map(|n| PopularityEntry {
                    bucket: date(2024, 5, 1),
                    product_id: ProductId::new(product(n)),
                    score: f64::from(n),
                })
                .collect(),
            personalization: vec![score("C1", &product(7), 1.0)],
            similarity: vec![score("C1", &product(8), 1.0)],
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_requests_never_mix_generations_during_refresh() {
        let snapshots = SnapshotStore::with_snapshot(Snapshot::build(
            1,
            sentinel_tables("g1"),
            DAY,
        ));
        let service = RecommendationService::new(snapshots.clone(), 3);

        let refresher = tokio::spawn({
            let snapshots = snapshots.clone();
            async move {
                for generation in 2..=50u64 {
                    let tag = format!("g{}", generation);
                    snapshots
                        .publish(Snapshot::build(
                            generation,
                            sentinel_tables(&tag),
                            DAY,
                        ))
                        .await;
                    tokio::task::yield_now().await;
                }
            }
        });

        let mut readers = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..100 {
                    let result = service
                        .recommend(Some("C1"), Some(date(2024, 5, 1)))
                        .await
                        .unwrap();
                    let tag = format!("g{}-", result.generation);
                    let all = result
                        .popular
                        .iter()
                        .chain(&result.personalized)
                        .chain(&result.similar);
                    for product in all {
                        assert!(
                            product.id.as_str().starts_with(&tag),
                            "{} not from generation {}",
                            product.id,
                            result.generation
                        );
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }

        refresher.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
