use uuid::Uuid;

use super::game_state::Position;
use super::map::{Grid, RoomDescriptor};
use super::Attributes;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct GenerateMapResponse {
    pub map_id: Uuid,
    pub map_layout: Grid,
    pub rooms: Vec<RoomDescriptor>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct RegisterUserResponse {
    pub success: bool,
    pub user_id: Uuid,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub session_token: String,
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct LogoutResponse {
    pub message: String,
    pub success: bool,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemResponse {
    pub item_id: Uuid,
    pub status: String,
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub item_id: Uuid,
    pub name: String,
    pub description: String,
    pub meta_data: Attributes,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemResponse {
    pub success: bool,
    pub updated_item: ItemView,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct DeleteItemResponse {
    pub success: bool,
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct CreateNpcResponse {
    pub success: bool,
    pub npc_id: Uuid,
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct NpcView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub attributes: Attributes,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct UpdateNpcResponse {
    pub success: bool,
    pub npc: NpcView,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct DeleteNpcResponse {
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveGameResponse {
    pub success: bool,
    pub message: String,
    pub game_state_id: Uuid,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub meta_data: Attributes,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadGameResponse {
    pub game_state_id: Uuid,
    pub user_id: Uuid,
    pub map_state: Grid,
    pub inventory_items: Vec<InventoryItem>,
    pub player_position: Position,
}

/// Base64-encoded PNG.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FetchMapResponse {
    pub map_image: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
