use serde::{Deserialize, Serialize};

/// A footballer in the squad.
///
/// Identified by `id`; `squad_number` is a secondary key assumed unique among
/// stored players. Serialized with camelCase field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub squad_number: i32,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub abbr_position: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub starting11: bool,
}
