//! Cache reader / eviction engine
//!
//! Serves a random photo from the whole pool or from a category subset,
//! then spends one show of its budget: decrement while shows remain,
//! evict on the last one. The caller always observes the pre-decrement
//! record.
//!
//! The fetch-decide-mutate sequence for a url runs under that url's lock,
//! so two concurrent serves of the same photo cannot both spend its last
//! show. Eviction itself is a series of idempotent store calls; re-running
//! it for an already-evicted url is a no-op.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use photostore::Store;
use rand::Rng;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

use crate::error::Result;
use crate::keys;
use crate::model::PhotoRecord;
use crate::stats::PoolStats;

/// Redraw limit for the whole-pool path when drawn urls vanish mid-serve
const MAX_DRAWS: usize = 3;

/// Serves random photos and applies the decrement-or-evict rule
pub struct PoolReader {
    store: Arc<dyn Store>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    stats: PoolStats,
}

impl PoolReader {
    /// Create a reader over `store`
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            stats: PoolStats::new(),
        }
    }

    /// Serve statistics
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Serve a random photo.
    ///
    /// With a non-empty category set, only photos tagged with at least one
    /// of the requested categories are considered; otherwise the whole pool
    /// is. An empty pool (or an unmatched category set) yields the null
    /// photo, never an error.
    pub async fn serve(&self, categories: Option<&BTreeSet<String>>) -> Result<PhotoRecord> {
        match categories {
            Some(requested) if !requested.is_empty() => {
                self.serve_from_categories(requested).await
            }
            _ => self.serve_from_pool().await,
        }
    }

    /// Serve a random photo tagged with any of the requested categories
    pub async fn serve_from_categories(
        &self,
        categories: &BTreeSet<String>,
    ) -> Result<PhotoRecord> {
        let category_keys: Vec<String> =
            categories.iter().map(|name| keys::category_key(name)).collect();
        let mut candidates = self.store.set_union(&category_keys).await?;

        while !candidates.is_empty() {
            let url = draw(&mut candidates);
            if let Some(record) = self.try_serve(&url).await? {
                return Ok(record);
            }
            warn!(
                url = %url,
                "url listed in a category set but missing from the photo table; skipping"
            );
        }

        self.stats.record_null_serve();
        Ok(PhotoRecord::null_object())
    }

    /// Serve a random photo from the whole pool
    pub async fn serve_from_pool(&self) -> Result<PhotoRecord> {
        for _ in 0..MAX_DRAWS {
            let Some(url) = self.store.hash_random_field(keys::PHOTOS_KEY).await? else {
                break;
            };
            if let Some(record) = self.try_serve(&url).await? {
                return Ok(record);
            }
            warn!(url = %url, "drawn photo vanished before serving; redrawing");
        }

        self.stats.record_null_serve();
        Ok(PhotoRecord::null_object())
    }

    /// Fetch the record for `url` and spend one show, all under the url's
    /// lock. `None` means the url is no longer in the photo table.
    async fn try_serve(&self, url: &str) -> Result<Option<PhotoRecord>> {
        let _guard = self.lock_url(url).await;

        let Some(raw) = self.store.hash_get(keys::PHOTOS_KEY, url).await? else {
            return Ok(None);
        };
        let record = PhotoRecord::decode(&raw)?;

        if record.shows <= 1 {
            self.evict(&record).await?;
            self.stats.record_eviction();
        } else {
            let mut updated = record.clone();
            updated.shows -= 1;
            self.store
                .hash_set(keys::PHOTOS_KEY, &record.url, &updated.encode()?)
                .await?;
        }

        self.stats.record_serve();
        Ok(Some(record))
    }

    /// Remove `record` from every category set it belongs to, drop
    /// categories left empty, then remove it from the photo table.
    async fn evict(&self, record: &PhotoRecord) -> Result<()> {
        let member = [record.url.clone()];
        for category in &record.categories {
            let category_key = keys::category_key(category);
            self.store.set_remove(&category_key, &member).await?;
            if self.store.set_card(&category_key).await? == 0 {
                self.store
                    .set_remove(keys::CATEGORY_NAMES_KEY, &[category.clone()])
                    .await?;
            }
        }
        self.store.hash_del(keys::PHOTOS_KEY, &record.url).await?;

        self.locks.lock().await.remove(&record.url);
        Ok(())
    }

    async fn lock_url(&self, url: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(url.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

fn draw(candidates: &mut Vec<String>) -> String {
    let idx = rand::rng().random_range(0..candidates.len());
    candidates.swap_remove(idx)
}
