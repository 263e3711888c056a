use serde::{Deserialize, Serialize};

/// Dashboard statistics snapshot.
///
/// Scoped to one condominium when fetched with a scope id; the master
/// variant aggregates across every condominium and additionally carries
/// `condominiums`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "totalUsers")]
    pub total_users: i64,
    #[serde(rename = "activeReports")]
    pub active_reports: i64,
    #[serde(rename = "pendingDeliveries")]
    pub pending_deliveries: i64,
    #[serde(rename = "reservationsToday")]
    pub reservations_today: i64,
    #[serde(rename = "publishedAnnouncements")]
    pub published_announcements: i64,
    /// Only present on the cross-condominium aggregate view.
    #[serde(rename = "totalCondominiums", skip_serializing_if = "Option::is_none")]
    pub condominiums: Option<i64>,
}

impl Statistics {
    pub fn is_master(&self) -> bool {
        self.condominiums.is_some()
    }
}
