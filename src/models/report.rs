use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a resident report. Wire values are the API's
/// Portuguese status strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "aberta")]
    Open,
    #[serde(rename = "andamento")]
    InProgress,
    #[serde(rename = "resolvida")]
    Resolved,
}

impl ReportStatus {
    /// Wire value, also used as the cache-key suffix for filtered lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Open => "aberta",
            ReportStatus::InProgress => "andamento",
            ReportStatus::Resolved => "resolvida",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ReportStatus,
    #[serde(rename = "condominiumId")]
    pub condominium_id: String,
    #[serde(rename = "unitLabel")]
    pub unit_label: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "resolvedAt")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn is_open(&self) -> bool {
        !matches!(self.status, ReportStatus::Resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&ReportStatus::Open).unwrap(),
            "\"aberta\""
        );
        let status: ReportStatus = serde_json::from_str("\"andamento\"").unwrap();
        assert_eq!(status, ReportStatus::InProgress);
        assert_eq!(status.as_str(), "andamento");
    }
}
