//! TTL-based local caching for dashboard data.
//!
//! Entries are stored as JSON envelopes (`{ data, timestamp, ttl }`) under a
//! fixed namespace prefix in an injected key-value store. Expired entries
//! are deleted lazily on the next read rather than swept on a timer; bulk
//! sweeps exist for capacity pressure (`clear_expired`) and logout
//! (`clear_all`).
//!
//! Per-category TTLs live in `keys`:
//! - statistics: 5 minutes, scoped per condominium plus a "master" aggregate
//! - reports, reservations, deliveries: 2 minutes
//! - users: 10 minutes

pub mod entry;
pub mod keys;
pub mod manager;

pub use entry::{CacheEntry, EntryError};
pub use keys::CacheTtl;
pub use manager::CacheManager;
