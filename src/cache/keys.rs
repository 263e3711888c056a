//! Canonical cache keys and per-category TTL policy.

use std::time::Duration;

/// Key prefix separating this app's entries from anything else sharing the
/// same store.
pub const DEFAULT_PREFIX: &str = "condocache_";

/// Cache key for the resident roster.
pub const USERS_KEY: &str = "users";

/// Cache key for the delivery queue.
pub const DELIVERIES_KEY: &str = "deliveries";

/// Cache key for common-area reservations.
pub const RESERVATIONS_KEY: &str = "reservations";

/// Cache key for published announcements.
pub const ANNOUNCEMENTS_KEY: &str = "announcements";

/// Cache TTL configuration per data category.
///
/// Statistics and user rosters change slowly; operational queues (reports,
/// reservations, deliveries) need fresher data.
pub struct CacheTtl;

impl CacheTtl {
    pub const STATISTICS: Duration = Duration::from_secs(5 * 60); // 5 min
    pub const REPORTS: Duration = Duration::from_secs(2 * 60); // 2 min
    pub const RESERVATIONS: Duration = Duration::from_secs(2 * 60); // 2 min
    pub const DELIVERIES: Duration = Duration::from_secs(2 * 60); // 2 min
    pub const USERS: Duration = Duration::from_secs(10 * 60); // 10 min
    pub const ANNOUNCEMENTS: Duration = Duration::from_secs(5 * 60); // 5 min
}

/// Statistics key, scoped per condominium when an id is given and falling
/// back to the cross-condominium aggregate ("master") view otherwise.
pub fn statistics_key(condominium_id: Option<&str>) -> String {
    match condominium_id {
        Some(id) => format!("statistics_{}", id),
        None => "statistics_master".to_string(),
    }
}

/// Reports key, optionally narrowed to a status filter.
///
/// Distinct filters are distinct entries: invalidating one does not touch
/// the others.
pub fn reports_key(status: Option<&str>) -> String {
    match status {
        Some(status) => format!("reports_{}", status),
        None => "reports".to_string(),
    }
}
