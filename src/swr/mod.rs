//! Stale-while-revalidate data fetchers.
//!
//! A fetcher pairs one cache key with one fetch function and owns the
//! transient state a view renders from: data, loading, error, staleness.
//! Cached values are served immediately; the network only runs when the
//! entry's TTL has lapsed or a refresh is forced.
//!
//! - `CachedFetcher`: the generic machinery, keyed by caller
//! - `StatisticsFetcher`: bound to the statistics endpoint, keyed by scope

pub mod fetcher;
pub mod statistics;

pub use fetcher::{fetch_fn, CachedFetcher, FetchFn, FetcherEvent, FetcherOptions, Phase};
pub use statistics::{StatisticsFetcher, StatisticsOptions};
