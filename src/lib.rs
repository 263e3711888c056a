//! condocache - client-side data layer for the condominium dashboard.
//!
//! Views render from `CachedFetcher` state and never talk to the backend
//! directly: a fetcher serves cached data immediately, refreshes it in the
//! background when its TTL has lapsed, and keeps stale data visible when a
//! refresh fails. All entries live under one namespace in an injected
//! key-value store, so logout can wipe exactly this app's data.
//!
//! Typical wiring:
//!
//! ```no_run
//! use std::sync::Arc;
//! use condocache::api::ApiClient;
//! use condocache::cache::CacheManager;
//! use condocache::config::Config;
//! use condocache::store::LocalStore;
//! use condocache::swr::{StatisticsFetcher, StatisticsOptions};
//!
//! # async fn wire() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let store = Arc::new(LocalStore::open(&config.cache_dir()?)?);
//! let cache = Arc::new(CacheManager::new(store));
//! let api = ApiClient::new(config.api_base_url.clone())?;
//!
//! let mut stats = StatisticsFetcher::new(
//!     cache,
//!     api,
//!     StatisticsOptions {
//!         condominium_id: config.condominium_id.clone(),
//!         enabled: true,
//!         ..Default::default()
//!     },
//! );
//! stats.activate();
//! stats.settle().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod store;
pub mod swr;

pub use api::{ApiClient, ApiError};
pub use cache::{CacheManager, CacheTtl};
pub use config::Config;
pub use store::{CacheStore, LocalStore, MemoryStore, StoreError};
pub use swr::{CachedFetcher, FetcherOptions, StatisticsFetcher, StatisticsOptions};
