//! Ranked-list construction shared by every index
//!
//! Rows are grouped by key once at snapshot build time and each group is
//! sorted by score descending, ties broken by product id ascending. Lookups
//! afterwards are a map read plus a slice truncation.
use std::collections::{hash_map::Entry, BTreeMap, HashMap};

use crate::models::ProductId;

/// Counters describing what a table build dropped
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub rows: usize,
    /// Rows repeating an existing (key, product) pair; the highest score is kept
    pub duplicates: usize,
    /// Rows with NaN or infinite scores
    pub non_finite: usize,
}

impl BuildStats {
    pub fn dropped(&self) -> usize {
        self.duplicates + self.non_finite
    }
}

/// Per-key product lists, each already in rank order
#[derive(Debug, Clone)]
pub struct RankedTable<K> {
    lists: BTreeMap<K, Vec<ProductId>>,
}

impl<K: Ord> RankedTable<K> {
    pub fn build(rows: impl IntoIterator<Item = (K, ProductId, f64)>) -> (Self, BuildStats) {
        let mut stats = BuildStats::default();
        let mut grouped: BTreeMap<K, HashMap<ProductId, f64>> = BTreeMap::new();

        for (key, product_id, score) in rows {
            stats.rows += 1;
            if !score.is_finite() {
                stats.non_finite += 1;
                continue;
            }

            match grouped.entry(key).or_default().entry(product_id) {
                Entry::Occupied(mut existing) => {
                    stats.duplicates += 1;
                    if score > *existing.get() {
                        existing.insert(score);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(score);
                }
            }
        }

        let lists = grouped
            .into_iter()
            .map(|(key, scores)| (key, rank(scores)))
            .collect();

        (Self { lists }, stats)
    }

    /// Full ranked list for a key; `None` when the key has no rows
    pub fn get(&self, key: &K) -> Option<&[ProductId]> {
        self.lists.get(key).map(Vec::as_slice)
    }

    /// Ranked list of the greatest key not after `key`
    pub fn at_or_before(&self, key: &K) -> Option<(&K, &[ProductId])> {
        self.lists
            .range(..=key)
            .next_back()
            .map(|(k, list)| (k, list.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

fn rank(scores: HashMap<ProductId, f64>) -> Vec<ProductId> {
    let mut scored: Vec<(ProductId, f64)> = scores.into_iter().collect();
    scored.sort_by(|(a_id, a_score), (b_id, b_score)| {
        b_score.total_cmp(a_score).then_with(|| a_id.cmp(b_id))
    });
    scored.into_iter().map(|(id, _)| id).collect()
}

/// First `limit` entries of a ranked list
pub fn top(list: &[ProductId], limit: usize) -> &[ProductId] {
    &list[..list.len().min(limit)]
}
