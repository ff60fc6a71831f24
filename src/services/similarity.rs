use std::sync::Arc;

use super::{
    customer_index::{CustomerIndex, CustomerScores},
    products::ProductCatalog,
    ranking::BuildStats,
};
use crate::models::{CustomerId, Product, SimilarityEntry};

/// Products favored by each customer's nearest neighbors
///
/// Scores are the neighbor-weighted purchase frequencies materialized by the
/// batch job; this index only ranks and serves them.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    scores: CustomerScores,
}

impl SimilarityIndex {
    pub fn build(rows: Vec<SimilarityEntry>, products: Arc<ProductCatalog>) -> (Self, BuildStats) {
        let (scores, stats) = CustomerScores::build(rows, products);
        (Self { scores }, stats)
    }
}

impl CustomerIndex for SimilarityIndex {
    fn for_customer(&self, customer_id: &CustomerId, limit: usize) -> Vec<Product> {
        self.scores.ranked(customer_id, limit)
    }

    fn customer_count(&self) -> usize {
        self.scores.customer_count()
    }

    fn kind(&self) -> &'static str {
        "similar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerProductScore, ProductId};

    #[test]
    fn test_neighbor_scores_ranked_with_names() {
        let (catalog, _) = ProductCatalog::build(vec![Product {
            id: ProductId::new("P2"),
            name: "Regency Cakestand".to_string(),
        }]);
        let rows = vec![
            CustomerProductScore {
                customer_id: CustomerId::new("C1"),
                product_id: ProductId::new("P1"),
                score: 1.5,
            },
            CustomerProductScore {
                customer_id: CustomerId::new("C1"),
                product_id: ProductId::new("P2"),
                score: 4.0,
            },
        ];
        let (index, stats) = SimilarityIndex::build(rows, Arc::new(catalog));
        assert_eq!(stats.rows, 2);

        let products = index.for_customer(&CustomerId::new("C1"), 5);
        assert_eq!(products[0].name, "Regency Cakestand");
        assert_eq!(products[1].name, "P1");
        assert_eq!(index.kind(), "similar");
    }

    #[test]
    fn test_cold_start_customer_is_empty() {
        let (index, _) = SimilarityIndex::build(vec![], Arc::new(ProductCatalog::default()));
        assert!(index.for_customer(&CustomerId::new("C1"), 5).is_empty());
        assert_eq!(index.customer_count(), 0);
    }
}
