use std::collections::BTreeSet;

use crate::models::{Customer, CustomerId};

/// Known customer identifiers, sorted and deduplicated
///
/// Only used to populate the dashboard's customer selector; recommendation
/// requests for ids outside the directory are still served (cold start).
#[derive(Debug, Clone, Default)]
pub struct CustomerDirectory {
    ids: Vec<CustomerId>,
}

impl CustomerDirectory {
    pub fn build(rows: Vec<Customer>) -> Self {
        let ids: BTreeSet<CustomerId> = rows.into_iter().map(|row| row.customer_id).collect();
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn list_customer_ids(&self) -> &[CustomerId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
