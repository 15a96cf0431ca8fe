//! Summary caching using Moka.
//!
//! Provides in-memory caching of computed group summaries. Writers call
//! [`SummaryCache::invalidate`] after changing a group's expenses, payments
//! or membership; the TTL bounds staleness for writers that do not.

use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

use tabsplit_shared::config::CacheConfig;
use tabsplit_shared::types::GroupId;

use crate::balance::Summary;

/// Default cache capacity (number of groups).
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache of computed summaries keyed by group.
///
/// Thread-safe and cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct SummaryCache {
    cache: Cache<GroupId, Arc<Summary>>,
}

impl SummaryCache {
    /// Creates a cache with default settings.
    ///
    /// Default: 1000 groups max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of groups to cache
    /// * `ttl_secs` - Time-to-live in seconds for each entry
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Creates a cache from application configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_config(config.max_capacity, config.ttl_secs)
    }

    /// Returns the cached summary of a group, if present and fresh.
    #[must_use]
    pub fn get(&self, group: &GroupId) -> Option<Arc<Summary>> {
        self.cache.get(group)
    }

    /// Stores a group's summary.
    pub fn insert(&self, group: GroupId, summary: Arc<Summary>) {
        self.cache.insert(group, summary);
    }

    /// Drops the cached summary of a group.
    pub fn invalidate(&self, group: &GroupId) {
        self.cache.invalidate(group);
    }

    /// Drops every cached summary.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    ///
    /// Moka handles this in the background; calling it makes
    /// `entry_count` and expirations visible sooner.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new()
    }
}
