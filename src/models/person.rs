use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Resident,
    Staff,
    Admin,
}

/// A resident or staff member registered in a condominium.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(rename = "condominiumId")]
    pub condominium_id: Option<String>,
    #[serde(rename = "unitLabel")]
    pub unit_label: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl User {
    pub fn display_unit(&self) -> String {
        match &self.unit_label {
            Some(unit) => unit.clone(),
            None => "-".to_string(),
        }
    }
}
