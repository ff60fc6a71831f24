//! Recommendation serving for the wholesale dashboard
//!
//! Precomputed popularity, personalization and similar-customer tables are
//! loaded from a catalog store into immutable snapshots and served as three
//! ranked product lists per customer and delivery date.
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
