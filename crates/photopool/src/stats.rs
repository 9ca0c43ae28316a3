//! Serve statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for pool serve activity
#[derive(Debug, Default)]
pub struct PoolStats {
    serves: AtomicU64,
    evictions: AtomicU64,
    null_serves: AtomicU64,
}

/// Point-in-time copy of [`PoolStats`]
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PoolStatsSnapshot {
    /// Photos served
    pub serves: u64,
    /// Photos evicted after their last show
    pub evictions: u64,
    /// Serves answered with the null photo
    pub null_serves: u64,
}

impl PoolStats {
    /// Create a new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a served photo
    pub fn record_serve(&self) {
        self.serves.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an eviction
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a serve answered with the null photo
    pub fn record_null_serve(&self) {
        self.null_serves.fetch_add(1, Ordering::Relaxed);
    }

    /// Total photos served
    pub fn serves(&self) -> u64 {
        self.serves.load(Ordering::Relaxed)
    }

    /// Total evictions
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Total null serves
    pub fn null_serves(&self) -> u64 {
        self.null_serves.load(Ordering::Relaxed)
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            serves: self.serves(),
            evictions: self.evictions(),
            null_serves: self.null_serves(),
        }
    }
}
