use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notice published by the administration to residents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[serde(rename = "condominiumId")]
    pub condominium_id: Option<String>,
    #[serde(rename = "authorName")]
    pub author_name: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
}
