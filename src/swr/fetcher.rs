//! Generic stale-while-revalidate fetcher.
//!
//! A `CachedFetcher` owns the transient view state for one cache key: the
//! last known value, whether a load is in flight, and the last error. It
//! serves cached data immediately and refreshes in the background only when
//! the entry's TTL has lapsed, so views never flicker to an empty state
//! while a refresh runs.
//!
//! The fetcher is driven by discrete events (`Activate`, `KeyChanged`,
//! `Refetch`, `Invalidate`, `TimerFired`) dispatched into a single handler.
//! Loads run as spawned tasks and report through an MPSC channel; the owner
//! drains outcomes with `poll` from its event loop, or awaits quiescence
//! with `settle`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::cache::CacheManager;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the load-outcome channel.
/// A fetcher rarely has more than two loads in flight; 32 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Error message used when a fetch failure carries no message of its own.
const GENERIC_FETCH_ERROR: &str = "request failed";

// ============================================================================
// Types
// ============================================================================

/// The injected fetch function: produces one fresh value per call.
pub type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;

/// Wrap an async closure into a `FetchFn`.
pub fn fetch_fn<T, Fut>(f: impl Fn() -> Fut + Send + Sync + 'static) -> FetchFn<T>
where
    Fut: std::future::Future<Output = anyhow::Result<T>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Where the fetcher currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not yet activated.
    Idle,
    /// First load, nothing to show yet.
    Loading,
    /// Background refresh while previous data stays visible.
    Refreshing,
    /// Last load succeeded.
    Ready,
    /// Last load failed; `error` is set.
    Error,
}

/// Events accepted by the dispatch handler.
#[derive(Debug, Clone)]
pub enum FetcherEvent {
    /// The owning view came up; load from cache, refresh if stale.
    Activate,
    /// The cache key changed (e.g. a filter or scope switch).
    KeyChanged(String),
    /// Explicit refresh, bypassing the cache short-circuit.
    Refetch,
    /// Drop the cache entry and refetch (after a mutation).
    Invalidate,
    /// Periodic timer fired; refresh only if the TTL has lapsed.
    TimerFired,
}

/// Construction parameters for a `CachedFetcher`.
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    pub cache_key: String,
    pub ttl: Duration,
    /// Gate for auth-dependent fetchers: while false, no load runs.
    pub enabled: bool,
    /// Check cadence for timer-driven revalidation. The timer only causes a
    /// network call when the cache entry has actually expired.
    pub refetch_interval: Option<Duration>,
}

impl FetcherOptions {
    pub fn new(cache_key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache_key: cache_key.into(),
            ttl,
            enabled: true,
            refetch_interval: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_refetch_interval(mut self, interval: Duration) -> Self {
        self.refetch_interval = Some(interval);
        self
    }
}

/// Result of one load attempt, tagged with the generation that started it.
struct LoadOutcome<T> {
    generation: u64,
    result: Result<T, String>,
}

// ============================================================================
// Fetcher
// ============================================================================

pub struct CachedFetcher<T> {
    cache: Arc<CacheManager>,
    key: String,
    ttl: Duration,
    enabled: bool,
    refetch_interval: Option<Duration>,
    fetch: FetchFn<T>,

    // View state
    data: Option<T>,
    error: Option<String>,
    last_fetch: Option<DateTime<Utc>>,
    phase: Phase,

    // Load bookkeeping. Each load carries the generation current at start;
    // outcomes from superseded generations are dropped unseen.
    generation: u64,
    in_flight: usize,
    outcome_tx: mpsc::Sender<LoadOutcome<T>>,
    outcome_rx: mpsc::Receiver<LoadOutcome<T>>,
    last_timer_check: Option<Instant>,
}

impl<T> CachedFetcher<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    pub fn new(cache: Arc<CacheManager>, options: FetcherOptions, fetch: FetchFn<T>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            cache,
            key: options.cache_key,
            ttl: options.ttl,
            enabled: options.enabled,
            refetch_interval: options.refetch_interval,
            fetch,
            data: None,
            error: None,
            last_fetch: None,
            phase: Phase::Idle,
            generation: 0,
            in_flight: 0,
            outcome_tx,
            outcome_rx,
            last_timer_check: None,
        }
    }

    // =========================================================================
    // Event dispatch
    // =========================================================================

    pub fn dispatch(&mut self, event: FetcherEvent) {
        match event {
            FetcherEvent::Activate => {
                self.last_timer_check = Some(Instant::now());
                self.begin_load(false);
            }
            FetcherEvent::KeyChanged(key) => {
                if key != self.key {
                    self.key = key;
                    self.begin_load(false);
                }
            }
            FetcherEvent::Refetch => self.begin_load(true),
            FetcherEvent::Invalidate => {
                self.cache.remove(&self.key);
                self.data = None;
                self.begin_load(true);
            }
            FetcherEvent::TimerFired => {
                if !self.cache.is_valid(&self.key) {
                    self.begin_load(true);
                }
            }
        }
    }

    pub fn activate(&mut self) {
        self.dispatch(FetcherEvent::Activate);
    }

    pub fn refetch(&mut self) {
        self.dispatch(FetcherEvent::Refetch);
    }

    pub fn invalidate(&mut self) {
        self.dispatch(FetcherEvent::Invalidate);
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.dispatch(FetcherEvent::KeyChanged(key.into()));
    }

    /// Replace the fetch function. Loads that fire after this call use the
    /// new function; a changed filter parameter never runs through a stale
    /// closure captured at construction time.
    pub fn set_fetch(&mut self, fetch: FetchFn<T>) {
        self.fetch = fetch;
    }

    /// Enable or disable the fetcher. Enabling activates it.
    pub fn set_enabled(&mut self, enabled: bool) {
        let was_enabled = self.enabled;
        self.enabled = enabled;
        if enabled && !was_enabled {
            self.dispatch(FetcherEvent::Activate);
        }
    }

    /// Drive timer-based revalidation from the owner's event loop. Cheap to
    /// call every iteration; dispatches `TimerFired` at most once per
    /// configured interval.
    pub fn tick(&mut self) {
        let Some(interval) = self.refetch_interval else {
            return;
        };
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        let due = match self.last_timer_check {
            Some(last) => now.duration_since(last) >= interval,
            None => {
                self.last_timer_check = Some(now);
                false
            }
        };
        if due {
            self.last_timer_check = Some(now);
            self.dispatch(FetcherEvent::TimerFired);
        }
    }

    // =========================================================================
    // Load machinery
    // =========================================================================

    fn begin_load(&mut self, force: bool) {
        if !self.enabled {
            return;
        }

        if !force {
            if let Some(value) = self.cache.get::<T>(&self.key) {
                // Cached data is shown immediately, never withheld
                self.data = Some(value);
                self.error = None;
                self.last_fetch = Some(Utc::now());
                self.phase = Phase::Ready;
                if self.cache.is_valid(&self.key) {
                    return; // fresh enough, no network call
                }
            }
        }

        // Keep showing whatever we have while the load runs
        self.phase = if self.data.is_some() {
            Phase::Refreshing
        } else {
            Phase::Loading
        };

        self.generation += 1;
        let generation = self.generation;
        let fut = (self.fetch)();
        let tx = self.outcome_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = fut.await.map_err(|e| {
                let message = e.to_string();
                if message.is_empty() {
                    GENERIC_FETCH_ERROR.to_string()
                } else {
                    message
                }
            });
            // Receiver gone means the owning view was torn down; the result
            // is dropped with no visible effect.
            let _ = tx.send(LoadOutcome { generation, result }).await;
        });
    }

    fn apply(&mut self, outcome: LoadOutcome<T>) {
        self.in_flight = self.in_flight.saturating_sub(1);

        if outcome.generation != self.generation {
            debug!(key = %self.key, "Dropping superseded load result");
            return;
        }

        match outcome.result {
            Ok(value) => {
                self.cache.set(&self.key, &value, self.ttl);
                self.data = Some(value);
                self.error = None;
                self.last_fetch = Some(Utc::now());
                self.phase = Phase::Ready;
            }
            Err(message) => {
                self.error = Some(message);
                // Stale-but-present beats empty: only clear the value when
                // no cache entry backs it at all (e.g. after a key switch).
                if !self.cache.has_entry(&self.key) {
                    self.data = None;
                }
                self.phase = Phase::Error;
            }
        }
    }

    /// Apply any finished loads without blocking. Call from the owner's
    /// event loop.
    pub fn poll(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome);
        }
    }

    /// Wait until every in-flight load has reported, applying outcomes in
    /// arrival order.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.outcome_rx.recv().await {
                Some(outcome) => self.apply(outcome),
                None => break,
            }
        }
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a load is in flight (first load or background refresh).
    pub fn loading(&self) -> bool {
        matches!(self.phase, Phase::Loading | Phase::Refreshing)
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    /// Data has been shown at least once and the backing entry has lapsed.
    pub fn is_stale(&self) -> bool {
        self.last_fetch.is_some() && !self.cache.is_valid(&self.key)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cache_key(&self) -> &str {
        &self.key
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::{self, CacheEntry};
    use crate::store::{CacheStore, MemoryStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache_with_store() -> (Arc<CacheManager>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Arc::new(CacheManager::new(store.clone())), store)
    }

    /// Fetch function returning `value` and counting invocations.
    fn counting_fetch(value: i64, calls: Arc<AtomicUsize>) -> FetchFn<i64> {
        fetch_fn(move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            }
        })
    }

    fn failing_fetch(message: &'static str) -> FetchFn<i64> {
        fetch_fn(move || async move { Err(anyhow::anyhow!(message)) })
    }

    fn write_backdated(store: &MemoryStore, store_key: &str, value: i64, ttl: Duration, age: Duration) {
        let mut entry = CacheEntry::new(value, ttl);
        entry.timestamp = chrono::Utc::now().timestamp_millis() - age.as_millis() as i64;
        store
            .set(store_key, &entry::encode(&entry).unwrap())
            .unwrap();
    }

    #[tokio::test]
    async fn test_valid_cache_hit_skips_fetch() {
        let (cache, _) = cache_with_store();
        cache.set("stats", &41, Duration::from_secs(60));

        let calls = Arc::new(AtomicUsize::new(0));
        let opts = FetcherOptions::new("stats", Duration::from_secs(60));
        let mut fetcher = CachedFetcher::new(cache, opts, counting_fetch(99, calls.clone()));

        fetcher.activate();
        // Cached value is visible synchronously, no load in flight
        assert_eq!(fetcher.data(), Some(&41));
        assert!(!fetcher.loading());
        assert!(fetcher.last_fetch().is_some());

        fetcher.settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_and_writes_through() {
        let (cache, store) = cache_with_store();

        let calls = Arc::new(AtomicUsize::new(0));
        let opts = FetcherOptions::new("stats", Duration::from_secs(60));
        let mut fetcher =
            CachedFetcher::new(cache.clone(), opts, counting_fetch(7, calls.clone()));

        fetcher.activate();
        assert_eq!(fetcher.data(), None);
        assert!(fetcher.loading());
        assert_eq!(fetcher.phase(), Phase::Loading);

        fetcher.settle().await;
        assert_eq!(fetcher.data(), Some(&7));
        assert!(!fetcher.loading());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The result was written through to the shared store
        assert_eq!(cache.get::<i64>("stats"), Some(7));
        assert!(store.get("condocache_stats").is_some());
    }

    #[tokio::test]
    async fn test_stale_cache_shows_old_value_while_refreshing() {
        let (cache, store) = cache_with_store();
        // Entry exists but lapsed: 2 min TTL, written 3 min ago
        write_backdated(
            &store,
            "condocache_reports",
            5,
            Duration::from_secs(120),
            Duration::from_secs(180),
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let opts = FetcherOptions::new("reports", Duration::from_secs(120));
        let mut fetcher = CachedFetcher::new(cache, opts, counting_fetch(6, calls.clone()));

        fetcher.activate();
        // Lazy expiry consumed the stale entry, so there is nothing to show
        // yet, but the fetch was started
        assert!(fetcher.loading());

        fetcher.settle().await;
        assert_eq!(fetcher.data(), Some(&6));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refetch_keeps_data_visible_no_flicker() {
        let (cache, _) = cache_with_store();
        cache.set("stats", &1, Duration::from_secs(60));

        let calls = Arc::new(AtomicUsize::new(0));
        let opts = FetcherOptions::new("stats", Duration::from_secs(60));
        let mut fetcher = CachedFetcher::new(cache, opts, counting_fetch(2, calls.clone()));

        fetcher.activate();
        fetcher.refetch();
        // Old value stays visible during the forced refresh
        assert_eq!(fetcher.data(), Some(&1));
        assert_eq!(fetcher.phase(), Phase::Refreshing);
        assert!(fetcher.loading());

        fetcher.settle().await;
        assert_eq!(fetcher.data(), Some(&2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_fetch_even_when_valid() {
        let (cache, store) = cache_with_store();
        cache.set("stats", &1, Duration::from_secs(60));

        let calls = Arc::new(AtomicUsize::new(0));
        let opts = FetcherOptions::new("stats", Duration::from_secs(60));
        let mut fetcher =
            CachedFetcher::new(cache.clone(), opts, counting_fetch(2, calls.clone()));

        fetcher.activate();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        fetcher.invalidate();
        // Entry dropped and in-memory value cleared before the reload
        assert_eq!(fetcher.data(), None);
        assert!(store.get("condocache_stats").is_none());
        assert!(fetcher.loading());

        fetcher.settle().await;
        assert_eq!(fetcher.data(), Some(&2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get::<i64>("stats"), Some(2));
    }

    #[tokio::test]
    async fn test_failure_without_cache_clears_data() {
        let (cache, _) = cache_with_store();

        let opts = FetcherOptions::new("stats", Duration::from_secs(60));
        let mut fetcher = CachedFetcher::new(cache, opts, failing_fetch("backend down"));

        fetcher.activate();
        fetcher.settle().await;

        assert_eq!(fetcher.data(), None);
        assert_eq!(fetcher.error(), Some("backend down"));
        assert_eq!(fetcher.phase(), Phase::Error);
        assert!(!fetcher.loading());
    }

    #[tokio::test]
    async fn test_failure_with_entry_present_keeps_stale_data() {
        let (cache, _) = cache_with_store();
        cache.set("stats", &41, Duration::from_secs(60));

        let opts = FetcherOptions::new("stats", Duration::from_secs(60));
        let mut fetcher = CachedFetcher::new(cache, opts, failing_fetch("backend down"));

        fetcher.activate();
        assert_eq!(fetcher.data(), Some(&41));

        fetcher.refetch();
        fetcher.settle().await;

        // Error surfaced alongside the old value, not instead of it
        assert_eq!(fetcher.data(), Some(&41));
        assert_eq!(fetcher.error(), Some("backend down"));
    }

    #[tokio::test]
    async fn test_key_change_failure_does_not_leak_old_data() {
        let (cache, _) = cache_with_store();
        cache.set("reports_aberta", &1, Duration::from_secs(60));

        let opts = FetcherOptions::new("reports_aberta", Duration::from_secs(60));
        let mut fetcher = CachedFetcher::new(cache, opts, failing_fetch("timeout"));

        fetcher.activate();
        assert_eq!(fetcher.data(), Some(&1));

        fetcher.set_key("reports_andamento");
        fetcher.settle().await;

        // The andamento list has no entry; aberta data must not stand in
        assert_eq!(fetcher.data(), None);
        assert_eq!(fetcher.error(), Some("timeout"));
    }

    #[tokio::test]
    async fn test_superseded_load_is_dropped() {
        let (cache, _) = cache_with_store();

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_inner = calls.clone();
        // First call resolves slowly with 1, later calls instantly with 2
        let fetch: FetchFn<i64> = fetch_fn(move || {
            let n = calls_inner.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(1)
                } else {
                    Ok(2)
                }
            }
        });

        let opts = FetcherOptions::new("stats", Duration::from_secs(60));
        let mut fetcher = CachedFetcher::new(cache, opts, fetch);

        fetcher.activate(); // slow load, generation 1
        fetcher.refetch(); // fast load, generation 2
        fetcher.settle().await;

        // The slow first result resolved last but belongs to a superseded
        // generation, so the fast value stands
        assert_eq!(fetcher.data(), Some(&2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_set_fetch_takes_effect_on_next_load() {
        let (cache, _) = cache_with_store();

        let calls = Arc::new(AtomicUsize::new(0));
        let opts = FetcherOptions::new("stats", Duration::from_secs(60));
        let mut fetcher =
            CachedFetcher::new(cache, opts, counting_fetch(1, calls.clone()));

        fetcher.activate();
        fetcher.settle().await;
        assert_eq!(fetcher.data(), Some(&1));

        // Filter changed: swap the closure, the key stays
        fetcher.set_fetch(counting_fetch(2, calls.clone()));
        fetcher.refetch();
        fetcher.settle().await;
        assert_eq!(fetcher.data(), Some(&2));
    }

    #[tokio::test]
    async fn test_disabled_fetcher_does_nothing() {
        let (cache, _) = cache_with_store();

        let calls = Arc::new(AtomicUsize::new(0));
        let opts = FetcherOptions::new("stats", Duration::from_secs(60)).disabled();
        let mut fetcher = CachedFetcher::new(cache, opts, counting_fetch(1, calls.clone()));

        fetcher.activate();
        fetcher.settle().await;
        assert_eq!(fetcher.data(), None);
        assert_eq!(fetcher.phase(), Phase::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Enabling is the activation signal (e.g. scope id became known)
        fetcher.set_enabled(true);
        fetcher.settle().await;
        assert_eq!(fetcher.data(), Some(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tick_fetches_only_after_ttl_lapse() {
        let (cache, _) = cache_with_store();

        let calls = Arc::new(AtomicUsize::new(0));
        let opts = FetcherOptions::new("stats", Duration::from_secs(60))
            .with_refetch_interval(Duration::from_millis(20));
        let mut fetcher =
            CachedFetcher::new(cache.clone(), opts, counting_fetch(1, calls.clone()));

        fetcher.activate();
        fetcher.settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Entry still valid: the timer checks but does not fetch
        tokio::time::sleep(Duration::from_millis(30)).await;
        fetcher.tick();
        fetcher.settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Entry gone: the next due tick triggers a forced load
        cache.remove("stats");
        tokio::time::sleep(Duration::from_millis(30)).await;
        fetcher.tick();
        fetcher.settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_two_fetchers_share_the_store() {
        let (cache, _) = cache_with_store();

        let calls_a = Arc::new(AtomicUsize::new(0));
        let calls_b = Arc::new(AtomicUsize::new(0));

        let opts = FetcherOptions::new("statistics_master", Duration::from_secs(300));
        let mut a = CachedFetcher::new(cache.clone(), opts.clone(), counting_fetch(10, calls_a.clone()));
        let mut b = CachedFetcher::new(cache.clone(), opts, counting_fetch(99, calls_b.clone()));

        a.activate();
        a.settle().await;
        assert_eq!(a.data(), Some(&10));

        // B reads the entry A wrote; its own fetch never runs
        b.activate();
        b.settle().await;
        assert_eq!(b.data(), Some(&10));
        assert_eq!(calls_b.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_is_stale_tracks_entry_validity() {
        let (cache, store) = cache_with_store();

        let calls = Arc::new(AtomicUsize::new(0));
        let opts = FetcherOptions::new("stats", Duration::from_secs(60));
        let mut fetcher =
            CachedFetcher::new(cache.clone(), opts, counting_fetch(1, calls.clone()));

        assert!(!fetcher.is_stale()); // nothing fetched yet

        fetcher.activate();
        fetcher.settle().await;
        assert!(!fetcher.is_stale());

        // Backdate the entry past its TTL without touching the fetcher
        write_backdated(
            &store,
            "condocache_stats",
            1,
            Duration::from_secs(60),
            Duration::from_secs(120),
        );
        assert!(fetcher.is_stale());
    }
}
