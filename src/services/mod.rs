pub mod customer_index;
pub mod directory;
pub mod personalization;
pub mod popularity;
pub mod products;
pub mod ranking;
pub mod recommendations;
pub mod similarity;
pub mod snapshot;

pub use customer_index::CustomerIndex;
pub use directory::CustomerDirectory;
pub use personalization::PersonalizationIndex;
pub use popularity::PopularityIndex;
pub use products::ProductCatalog;
pub use recommendations::RecommendationService;
pub use similarity::SimilarityIndex;
pub use snapshot::{Snapshot, SnapshotLoader, SnapshotStore};
