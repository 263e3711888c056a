use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A booking of a shared space (party hall, barbecue area, gym slot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    #[serde(rename = "spaceName")]
    pub space_name: String,
    #[serde(rename = "residentName")]
    pub resident_name: String,
    #[serde(rename = "condominiumId")]
    pub condominium_id: String,
    #[serde(rename = "startsAt")]
    pub starts_at: DateTime<Utc>,
    #[serde(rename = "endsAt")]
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub confirmed: bool,
}
