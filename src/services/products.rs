use std::collections::HashMap;

use crate::models::{Product, ProductId};

/// Display attributes for every product in a snapshot
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<ProductId, Product>,
}

impl ProductCatalog {
    /// Builds the catalog; a repeated product id keeps its first row
    pub fn build(rows: Vec<Product>) -> (Self, usize) {
        let mut products = HashMap::with_capacity(rows.len());
        let mut duplicates = 0;

        for product in rows {
            if products.contains_key(&product.id) {
                duplicates += 1;
                continue;
            }
            products.insert(product.id.clone(), product);
        }

        (Self { products }, duplicates)
    }

    /// Display-ready product; unknown ids are shown by their id
    pub fn resolve(&self, id: &ProductId) -> Product {
        self.products
            .get(id)
            .cloned()
            .unwrap_or_else(|| Product::unnamed(id.clone()))
    }

    pub fn resolve_all(&self, ids: &[ProductId]) -> Vec<Product> {
        ids.iter().map(|id| self.resolve(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
