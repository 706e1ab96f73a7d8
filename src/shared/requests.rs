use uuid::Uuid;

use super::game_state::Position;
use super::map::Grid;
use super::Attributes;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct GenerateMapRequest {
    pub map_size: String,
    #[serde(default)]
    pub room_sizes: Vec<String>,
    #[serde(default)]
    pub corridor_width: u32,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct LogoutRequest {
    pub session_token: String,
}

/// `effects` and `placement_constraints` arrive as JSON-encoded strings.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
    pub description: String,
    pub appearance: String,
    pub effects: String,
    pub placement_constraints: String,
    pub project_map_id: Uuid,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meta_data: Attributes,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateNpcRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
    pub project_map_id: Uuid,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default)]
pub struct UpdateNpcRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SaveGameRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub map_state: Grid,
    #[serde(default)]
    pub player_position: Position,
    #[serde(default)]
    pub inventory: Vec<String>,
    /// Maps the save is attached to. Their items make up the loaded inventory.
    #[serde(default)]
    pub map_ids: Vec<Uuid>,
}
