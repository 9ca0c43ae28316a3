//! Cache writer: full pool replacement
//!
//! `write()` clears the previous pool and commits the new one as a single
//! atomic batch. Between the clear and the commit the pool is observably
//! empty; readers treat an empty pool as a valid state, not an error.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use photostore::{BatchOp, Store};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::keys;
use crate::model::PhotoRecord;

/// Rebuilds the cached pool from Dataset Loader output
pub struct PoolWriter {
    store: Arc<dyn Store>,
}

impl PoolWriter {
    /// Create a writer over `store`
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Replace the whole pool with the dataset's current contents.
    ///
    /// Parses the dataset first, so a configuration error aborts before any
    /// store state is touched. Returns the number of photos loaded.
    pub async fn write(&self, dataset: &Dataset) -> Result<usize> {
        let records = dataset.load()?;
        self.write_records(&records).await
    }

    /// Replace the whole pool with the given records.
    ///
    /// Duplicate urls resolve to the last occurrence; records with a zero
    /// show budget never enter the pool.
    pub async fn write_records(&self, records: &[PhotoRecord]) -> Result<usize> {
        let pool = build_pool(records);
        let ops = build_batch(&pool)?;

        self.clear_cache().await?;
        self.store.apply_batch(ops).await?;

        Ok(pool.len())
    }

    async fn clear_cache(&self) -> Result<()> {
        self.store.delete_key(keys::PHOTOS_KEY).await?;
        self.store.delete_key(keys::CATEGORY_NAMES_KEY).await?;

        let stale = self.store.scan_keys(keys::CATEGORY_KEY_PREFIX).await?;
        debug!(keys = stale.len(), "clearing previous category sets");
        for key in stale {
            self.store.delete_key(&key).await?;
        }
        Ok(())
    }
}

fn build_pool(records: &[PhotoRecord]) -> BTreeMap<String, PhotoRecord> {
    let mut pool = BTreeMap::new();
    for record in records {
        if record.shows == 0 {
            // never servable; as the latest occurrence it also overrides
            // any earlier budget for the same url
            pool.remove(&record.url);
        } else {
            pool.insert(record.url.clone(), record.clone());
        }
    }
    pool
}

fn build_batch(pool: &BTreeMap<String, PhotoRecord>) -> Result<Vec<BatchOp>> {
    let mut ops = Vec::with_capacity(pool.len() + 1);
    let mut category_names = BTreeSet::new();
    let mut category_members: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for (url, record) in pool {
        ops.push(BatchOp::HashSet {
            key: keys::PHOTOS_KEY.to_string(),
            field: url.clone(),
            value: record.encode()?,
        });
        for category in &record.categories {
            category_names.insert(category.clone());
            category_members
                .entry(category)
                .or_default()
                .push(url.clone());
        }
    }

    ops.push(BatchOp::SetAdd {
        key: keys::CATEGORY_NAMES_KEY.to_string(),
        members: category_names.into_iter().collect(),
    });
    for (category, members) in category_members {
        ops.push(BatchOp::SetAdd {
            key: keys::category_key(category),
            members,
        });
    }

    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, shows: u32, categories: &[&str]) -> PhotoRecord {
        PhotoRecord::new(url, shows, categories.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_build_pool_last_occurrence_wins() {
        let pool = build_pool(&[
            record("x.png", 3, &["cats"]),
            record("x.png", 2, &["dogs"]),
        ]);

        assert_eq!(pool.len(), 1);
        let survivor = &pool["x.png"];
        assert_eq!(survivor.shows, 2);
        assert!(survivor.categories.contains("dogs"));
        assert!(!survivor.categories.contains("cats"));
    }

    #[test]
    fn test_build_pool_skips_zero_budget() {
        let pool = build_pool(&[record("a.png", 0, &["cats"]), record("b.png", 1, &[])]);

        assert!(!pool.contains_key("a.png"));
        assert!(pool.contains_key("b.png"));
    }

    #[test]
    fn test_build_pool_zero_budget_duplicate_removes_earlier() {
        let pool = build_pool(&[record("a.png", 2, &["cats"]), record("a.png", 0, &[])]);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_build_batch_structures() {
        let pool = build_pool(&[
            record("a.png", 2, &["cats"]),
            record("b.png", 1, &["cats", "dogs"]),
        ]);
        let ops = build_batch(&pool).unwrap();

        assert!(ops.iter().any(|op| matches!(
            op,
            BatchOp::HashSet { key, field, .. } if key == keys::PHOTOS_KEY && field == "a.png"
        )));
        assert!(ops.iter().any(|op| matches!(
            op,
            BatchOp::SetAdd { key, members } if key == keys::CATEGORY_NAMES_KEY
                && members.len() == 2
        )));
        assert!(ops.iter().any(|op| matches!(
            op,
            BatchOp::SetAdd { key, members } if key == "category::cats" && members.len() == 2
        )));
        assert!(ops.iter().any(|op| matches!(
            op,
            BatchOp::SetAdd { key, members } if key == "category::dogs"
                && members == &vec!["b.png".to_string()]
        )));
    }
}
