use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CustomerId, DateBucket, Product};

/// Where a per-customer list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSource {
    /// Scores precomputed for this customer
    Model,
    /// Cold start: the popular list was substituted
    PopularFallback,
}

impl ListSource {
    pub fn is_cold_start(self) -> bool {
        self == ListSource::PopularFallback
    }
}

/// The three ranked lists served for one customer and delivery date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub customer_id: CustomerId,
    pub delivery_date: NaiveDate,
    pub bucket: DateBucket,
    /// Bucket the popular list was read from; earlier than `bucket` when the
    /// requested bucket has no data, `None` when no bucket qualifies
    pub popular_bucket: Option<DateBucket>,
    /// Snapshot generation every list was read from
    pub generation: u64,
    pub popular: Vec<Product>,
    pub personalized: Vec<Product>,
    pub similar: Vec<Product>,
    pub personalized_source: ListSource,
    pub similar_source: ListSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_source_serializes_snake_case() {
        let json = serde_json::to_string(&ListSource::PopularFallback).unwrap();
        assert_eq!(json, r#""popular_fallback""#);
        assert!(ListSource::PopularFallback.is_cold_start());
        assert!(!ListSource::Model.is_cold_start());
    }
}
