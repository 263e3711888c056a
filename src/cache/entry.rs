//! Cache entry envelope and its JSON codec.

use std::time::Duration;

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EntryError {
    #[error("malformed cache entry: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A stored payload together with its write time and validity window.
///
/// Serialized shape is `{ "data": <T>, "timestamp": <ms-epoch>, "ttl": <ms> }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Milliseconds since epoch at write time.
    pub timestamp: i64,
    /// Validity window in milliseconds, starting at `timestamp`.
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            timestamp: Utc::now().timestamp_millis(),
            ttl: ttl.as_millis() as u64,
        }
    }

    pub fn age_ms(&self) -> i64 {
        Utc::now().timestamp_millis() - self.timestamp
    }

    /// An entry is expired once its age exceeds the TTL. Negative ages
    /// (clock skew) read as fresh.
    pub fn is_expired(&self) -> bool {
        self.age_ms() > self.ttl as i64
    }

    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }
}

pub fn encode<T: Serialize>(entry: &CacheEntry<T>) -> Result<String, EntryError> {
    Ok(serde_json::to_string(entry)?)
}

pub fn decode<T: DeserializeOwned>(text: &str) -> Result<CacheEntry<T>, EntryError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let entry = CacheEntry::new(vec![1, 2, 3], Duration::from_secs(60));
        let text = encode(&entry).unwrap();

        let decoded: CacheEntry<Vec<i32>> = decode(&text).unwrap();
        assert_eq!(decoded.data, vec![1, 2, 3]);
        assert_eq!(decoded.timestamp, entry.timestamp);
        assert_eq!(decoded.ttl, 60_000);
    }

    #[test]
    fn test_wire_shape() {
        let entry = CacheEntry::new(7, Duration::from_millis(500));
        let text = encode(&entry).unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["data"], 7);
        assert_eq!(value["ttl"], 500);
        assert!(value["timestamp"].is_i64());
    }

    #[test]
    fn test_fresh_entry_is_valid() {
        let entry = CacheEntry::new("x", Duration::from_secs(60));
        assert!(entry.is_valid());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_backdated_entry_expires() {
        let mut entry = CacheEntry::new("x", Duration::from_secs(120));
        entry.timestamp = Utc::now().timestamp_millis() - 3 * 60 * 1000;
        assert!(entry.is_expired());
    }

    #[test]
    fn test_clock_skew_reads_fresh() {
        let mut entry = CacheEntry::new("x", Duration::from_secs(1));
        entry.timestamp = Utc::now().timestamp_millis() + 60_000;
        assert!(entry.is_valid());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode::<i32>("not json").is_err());
        assert!(decode::<i32>("{\"data\":1}").is_err()); // missing fields
    }
}
