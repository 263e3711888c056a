use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A package logged at the front desk, waiting for pickup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: i64,
    #[serde(rename = "recipientName")]
    pub recipient_name: String,
    #[serde(rename = "unitLabel")]
    pub unit_label: String,
    #[serde(rename = "condominiumId")]
    pub condominium_id: String,
    pub carrier: Option<String>,
    #[serde(rename = "receivedAt")]
    pub received_at: DateTime<Utc>,
    #[serde(rename = "pickedUpAt")]
    pub picked_up_at: Option<DateTime<Utc>>,
}

impl Delivery {
    pub fn is_pending(&self) -> bool {
        self.picked_up_at.is_none()
    }
}
