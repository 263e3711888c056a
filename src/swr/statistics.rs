//! Statistics fetcher bound to the dashboard statistics endpoint.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::api::ApiClient;
use crate::cache::{keys, CacheManager, CacheTtl};
use crate::models::Statistics;

use super::fetcher::{fetch_fn, CachedFetcher, FetchFn, FetcherOptions};

/// Construction parameters for a `StatisticsFetcher`.
#[derive(Debug, Clone, Default)]
pub struct StatisticsOptions {
    /// Scope to one condominium; `None` selects the cross-condominium
    /// aggregate ("master") view.
    pub condominium_id: Option<String>,
    /// Usually gated on "scope id known" by the caller.
    pub enabled: bool,
    pub refetch_interval: Option<Duration>,
}

/// Specialization of `CachedFetcher` for the statistics endpoint.
///
/// The cache key follows the scope: `statistics_<id>` when scoped,
/// `statistics_master` otherwise. TTL, staleness, forced refresh and
/// polling behave exactly as in the generic fetcher.
pub struct StatisticsFetcher {
    inner: CachedFetcher<Statistics>,
    api: ApiClient,
    condominium_id: Option<String>,
}

impl StatisticsFetcher {
    pub fn new(cache: Arc<CacheManager>, api: ApiClient, options: StatisticsOptions) -> Self {
        let mut fetcher_options = FetcherOptions::new(
            keys::statistics_key(options.condominium_id.as_deref()),
            CacheTtl::STATISTICS,
        );
        fetcher_options.enabled = options.enabled;
        fetcher_options.refetch_interval = options.refetch_interval;

        let fetch = Self::make_fetch(&api, options.condominium_id.clone());
        Self {
            inner: CachedFetcher::new(cache, fetcher_options, fetch),
            api,
            condominium_id: options.condominium_id,
        }
    }

    fn make_fetch(api: &ApiClient, condominium_id: Option<String>) -> FetchFn<Statistics> {
        let api = api.clone();
        fetch_fn(move || {
            let api = api.clone();
            let condominium_id = condominium_id.clone();
            async move { api.fetch_statistics(condominium_id.as_deref()).await }
        })
    }

    /// Switch scope. Re-keys the cache entry and swaps the fetch closure so
    /// a later background refresh queries the new scope, then loads.
    pub fn set_scope(&mut self, condominium_id: Option<String>) {
        if condominium_id == self.condominium_id {
            return;
        }
        self.condominium_id = condominium_id.clone();
        self.inner
            .set_fetch(Self::make_fetch(&self.api, condominium_id.clone()));
        self.inner
            .set_key(keys::statistics_key(condominium_id.as_deref()));
    }

    pub fn condominium_id(&self) -> Option<&str> {
        self.condominium_id.as_deref()
    }

    // =========================================================================
    // Delegation to the generic fetcher
    // =========================================================================

    pub fn activate(&mut self) {
        self.inner.activate();
    }

    pub fn refetch(&mut self) {
        self.inner.refetch();
    }

    pub fn invalidate(&mut self) {
        self.inner.invalidate();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.inner.set_enabled(enabled);
    }

    pub fn tick(&mut self) {
        self.inner.tick();
    }

    pub fn poll(&mut self) {
        self.inner.poll();
    }

    pub async fn settle(&mut self) {
        self.inner.settle().await;
    }

    pub fn stats(&self) -> Option<&Statistics> {
        self.inner.data()
    }

    pub fn loading(&self) -> bool {
        self.inner.loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.inner.error()
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.inner.last_fetch()
    }

    pub fn is_stale(&self) -> bool {
        self.inner.is_stale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<CacheManager>, ApiClient) {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(CacheManager::new(store));
        let api = ApiClient::new("http://localhost:1").unwrap();
        (cache, api)
    }

    fn master_stats() -> Statistics {
        Statistics {
            total_users: 120,
            condominiums: Some(3),
            ..Default::default()
        }
    }

    fn scoped_stats() -> Statistics {
        Statistics {
            total_users: 40,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unscoped_uses_master_key() {
        let (cache, api) = setup();
        cache.set("statistics_master", &master_stats(), CacheTtl::STATISTICS);

        let options = StatisticsOptions {
            enabled: true,
            ..Default::default()
        };
        let mut fetcher = StatisticsFetcher::new(cache, api, options);

        fetcher.activate();
        fetcher.settle().await;

        let stats = fetcher.stats().unwrap();
        assert_eq!(stats.total_users, 120);
        assert!(stats.is_master());
        assert!(fetcher.error().is_none());
    }

    #[tokio::test]
    async fn test_scoped_uses_scoped_key() {
        let (cache, api) = setup();
        cache.set("statistics_condo-7", &scoped_stats(), CacheTtl::STATISTICS);

        let options = StatisticsOptions {
            condominium_id: Some("condo-7".to_string()),
            enabled: true,
            ..Default::default()
        };
        let mut fetcher = StatisticsFetcher::new(cache, api, options);

        fetcher.activate();
        fetcher.settle().await;

        let stats = fetcher.stats().unwrap();
        assert_eq!(stats.total_users, 40);
        assert!(!stats.is_master());
    }

    #[tokio::test]
    async fn test_set_scope_switches_cache_entry() {
        let (cache, api) = setup();
        cache.set("statistics_master", &master_stats(), CacheTtl::STATISTICS);
        cache.set("statistics_condo-9", &scoped_stats(), CacheTtl::STATISTICS);

        let options = StatisticsOptions {
            enabled: true,
            ..Default::default()
        };
        let mut fetcher = StatisticsFetcher::new(cache, api, options);

        fetcher.activate();
        fetcher.settle().await;
        assert_eq!(fetcher.stats().unwrap().total_users, 120);

        fetcher.set_scope(Some("condo-9".to_string()));
        fetcher.settle().await;
        assert_eq!(fetcher.stats().unwrap().total_users, 40);
        assert_eq!(fetcher.condominium_id(), Some("condo-9"));
    }
}
