use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Keys arrive from the upstream batch job as text, integers, or floats when
/// the source column was numeric with nulls
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawKey> for String {
    fn from(raw: RawKey) -> Self {
        match raw {
            RawKey::Text(s) => s,
            RawKey::Int(n) => n.to_string(),
            // `Display` renders integral floats without a fraction: 12346.0 -> "12346"
            RawKey::Float(n) => n.to_string(),
        }
    }
}

/// Identifier of a customer, normalized to its string form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawKey", into = "String")]
pub struct CustomerId(String);

/// Identifier of a product, normalized to its string form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawKey", into = "String")]
pub struct ProductId(String);

macro_rules! string_key {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<RawKey> for $name {
            fn from(raw: RawKey) -> Self {
                Self(raw.into())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_key!(CustomerId);
string_key!(ProductId);

/// Row of the customers table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
}

/// Product with its display attributes, as returned to the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(alias = "product_id")]
    pub id: ProductId,
    pub name: String,
}

impl Product {
    /// Display stand-in for a scored product missing from the products table
    pub fn unnamed(id: ProductId) -> Self {
        let name = id.to_string();
        Self { id, name }
    }
}

/// Row of the popularity table: one score per product per date bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularityEntry {
    pub bucket: NaiveDate,
    pub product_id: ProductId,
    pub score: f64,
}

/// Row of a per-customer score table
///
/// Absence of a row means "no signal" for that pair, never a zero score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProductScore {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub score: f64,
}

/// Predicted affinity of a customer for a product
pub type PersonalizationEntry = CustomerProductScore;

/// Neighbor-weighted score aggregated from a customer's nearest neighbors
pub type SimilarityEntry = CustomerProductScore;
