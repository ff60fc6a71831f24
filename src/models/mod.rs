mod bucket;
mod catalog;
mod recommendation;

pub use bucket::{BucketGranularity, DateBucket};
pub use catalog::{
    Customer, CustomerId, CustomerProductScore, PersonalizationEntry, PopularityEntry, Product,
    ProductId, SimilarityEntry,
};
pub use recommendation::{ListSource, Recommendations};
