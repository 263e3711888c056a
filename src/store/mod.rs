//! Persistent key-value storage backing the cache.
//!
//! The cache manager is written against the `CacheStore` trait so the
//! storage medium can be swapped out:
//!
//! - `LocalStore`: file-per-key storage under the platform cache directory
//! - `MemoryStore`: in-memory storage for tests and server-side contexts
//!
//! Stores are synchronous and string-valued. A store that has no usable
//! medium (no home directory, unwritable root) degrades to a silent no-op
//! rather than failing: `get` returns `None`, `set` and `remove` do nothing.

pub mod local;
pub mod memory;

use thiserror::Error;

pub use local::LocalStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store capacity exceeded")]
    Full,

    #[error("storage error: {0}")]
    Io(String),
}

/// String-keyed persistent storage contract.
///
/// `get` and `remove` are infallible by design: a broken or absent medium
/// reads as empty. Only `set` reports failure, so the cache manager can run
/// capacity remediation.
pub trait CacheStore: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value stored under `key`. Missing keys are not an error.
    fn remove(&self, key: &str);

    /// Enumerate every key currently present in the store.
    ///
    /// Returned keys are storage-side names: they are valid inputs for
    /// `get`/`remove` on the same store.
    fn keys(&self) -> Vec<String>;
}
