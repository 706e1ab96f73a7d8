use std::sync::Arc;

use log::info;
use maze::shared::requests::SaveGameRequest;
use maze::shared::responses::{InventoryItem, LoadGameResponse, SaveGameResponse};
use maze::shared::SavedGame;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::store::{NewGameState, Store};

/// Save games. A save belongs to a user and may be linked to maps; the
/// items placed on those maps are returned as the inventory on load.
pub struct GameService {
    store: Arc<dyn Store>,
}

impl GameService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn save(&self, request: &SaveGameRequest) -> Result<SaveGameResponse, ServiceError> {
        if self.store.find_user(request.user_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("No user found with ID: {}", request.user_id)));
        }
        for &map_id in &request.map_ids {
            if self.store.find_map(map_id).await?.is_none() {
                return Err(ServiceError::NotFound(format!("Map with ID {map_id} does not exist.")));
            }
        }

        let state = self.store.create_game_state(NewGameState {
            user_id: request.user_id,
            data: SavedGame {
                map_state: request.map_state.clone(),
                player_position: request.player_position,
                inventory: request.inventory.clone(),
            },
            map_ids: request.map_ids.clone(),
        }).await?;

        info!("saved game state {} for user {}", state.id, state.user_id);
        Ok(SaveGameResponse {
            success: true,
            message: "Game state saved successfully.".to_string(),
            game_state_id: state.id,
        })
    }

    pub async fn load(&self, game_state_id: Uuid) -> Result<LoadGameResponse, ServiceError> {
        let state = self.store.find_game_state(game_state_id).await?
            .ok_or_else(|| ServiceError::NotFound("Game state not found".to_string()))?;

        let mut inventory_items = Vec::new();
        for &map_id in &state.map_ids {
            inventory_items.extend(self.store.items_on_map(map_id).await?.into_iter().map(|item| InventoryItem {
                id: item.id,
                name: item.name,
                description: item.description,
                meta_data: item.meta_data,
            }));
        }

        Ok(LoadGameResponse {
            game_state_id: state.id,
            user_id: state.user_id,
            map_state: state.data.map_state,
            inventory_items,
            player_position: state.data.player_position,
        })
    }
}
