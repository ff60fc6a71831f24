use std::sync::Arc;

use super::{
    customer_index::{CustomerIndex, CustomerScores},
    products::ProductCatalog,
    ranking::BuildStats,
};
use crate::models::{CustomerId, PersonalizationEntry, Product};

/// Products predicted for each customer, ranked by affinity score
#[derive(Debug, Clone)]
pub struct PersonalizationIndex {
    scores: CustomerScores,
}

impl PersonalizationIndex {
    pub fn build(
        rows: Vec<PersonalizationEntry>,
        products: Arc<ProductCatalog>,
    ) -> (Self, BuildStats) {
        let (scores, stats) = CustomerScores::build(rows, products);
        (Self { scores }, stats)
    }
}

impl CustomerIndex for PersonalizationIndex {
    fn for_customer(&self, customer_id: &CustomerId, limit: usize) -> Vec<Product> {
        self.scores.ranked(customer_id, limit)
    }

    fn customer_count(&self) -> usize {
        self.scores.customer_count()
    }

    fn kind(&self) -> &'static str {
        "personalized"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerProductScore, ProductId};

    fn row(customer: &str, product: &str, score: f64) -> PersonalizationEntry {
        CustomerProductScore {
            customer_id: CustomerId::new(customer),
            product_id: ProductId::new(product),
            score,
        }
    }

    fn index() -> PersonalizationIndex {
        let (index, _) = PersonalizationIndex::build(
            vec![
                row("C1", "P5", 0.2),
                row("C1", "P3", 0.9),
                row("C1", "P4", 0.9),
                row("C2", "P1", 0.5),
            ],
            Arc::new(ProductCatalog::default()),
        );
        index
    }

    #[test]
    fn test_ranked_by_affinity_then_id() {
        let products = index().for_customer(&CustomerId::new("C1"), 10);
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P3", "P4", "P5"]);
    }

    #[test]
    fn test_limit_respected() {
        assert_eq!(index().for_customer(&CustomerId::new("C1"), 2).len(), 2);
    }

    #[test]
    fn test_unknown_customer_is_empty() {
        let index = index();
        assert!(index.for_customer(&CustomerId::new("C404"), 10).is_empty());
        assert_eq!(index.customer_count(), 2);
    }
}
