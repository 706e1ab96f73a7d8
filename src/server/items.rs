use std::sync::Arc;

use log::info;
use maze::shared::requests::{CreateItemRequest, UpdateItemRequest};
use maze::shared::responses::{CreateItemResponse, DeleteItemResponse, ItemView, UpdateItemResponse};
use maze::shared::Attributes;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::store::{ItemChanges, ItemRecord, NewItem, Store};

pub struct ItemService {
    store: Arc<dyn Store>,
}

impl ItemService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// `effects` and `placementConstraints` must be valid JSON; they are
    /// stored parsed, next to `appearance`, as the item's metadata.
    pub async fn create(&self, request: &CreateItemRequest) -> Result<CreateItemResponse, ServiceError> {
        let effects = parse_json("effects", &request.effects)?;
        let placement_constraints = parse_json("placementConstraints", &request.placement_constraints)?;

        if self.store.find_map(request.project_map_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Map with ID {} does not exist.", request.project_map_id)));
        }

        let mut meta_data = Attributes::new();
        meta_data.insert("effects".to_string(), effects);
        meta_data.insert("appearance".to_string(), Value::String(request.appearance.clone()));
        meta_data.insert("placementConstraints".to_string(), placement_constraints);

        let item = self.store.create_item(NewItem {
            project_map_id: request.project_map_id,
            name: request.name.clone(),
            description: request.description.clone(),
            meta_data,
        }).await?;

        info!("created item {} on map {}", item.id, item.project_map_id);
        Ok(CreateItemResponse {
            item_id: item.id,
            status: "success".to_string(),
            message: "Item created successfully.".to_string(),
        })
    }

    /// Name and metadata are replaced; a missing description keeps the old one.
    pub async fn update(&self, item_id: Uuid, request: &UpdateItemRequest) -> Result<UpdateItemResponse, ServiceError> {
        let existing = self.store.find_item(item_id).await?
            .ok_or_else(|| not_found(item_id))?;

        let changes = ItemChanges {
            name: request.name.clone(),
            description: request.description.clone().unwrap_or(existing.description),
            meta_data: request.meta_data.clone(),
        };
        let updated = self.store.update_item(item_id, changes).await?
            .ok_or_else(|| not_found(item_id))?;

        Ok(UpdateItemResponse { success: true, updated_item: view(updated) })
    }

    pub async fn delete(&self, item_id: Uuid) -> Result<DeleteItemResponse, ServiceError> {
        self.store.delete_item(item_id).await?
            .ok_or_else(|| not_found(item_id))?;

        info!("deleted item {}", item_id);
        Ok(DeleteItemResponse {
            success: true,
            message: format!("Item with ID {item_id} was successfully deleted."),
        })
    }
}

fn parse_json(field: &str, raw: &str) -> Result<Value, ServiceError> {
    serde_json::from_str(raw)
        .map_err(|e| ServiceError::Validation(format!("{field} is not valid JSON: {e}")))
}

fn not_found(item_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Item with ID {item_id} not found."))
}

fn view(item: ItemRecord) -> ItemView {
    ItemView {
        item_id: item.id,
        name: item.name,
        description: item.description,
        meta_data: item.meta_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewMap};
    use serde_json::json;

    async fn setup() -> (Arc<MemoryStore>, ItemService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let map = store.create_map(NewMap {
            name: "m".to_string(),
            description: String::new(),
            cells: vec![vec![0; 2]; 2],
        }).await.unwrap();
        (store.clone(), ItemService::new(store), map.id)
    }

    fn create_request(map_id: Uuid) -> CreateItemRequest {
        CreateItemRequest {
            name: "Potion".to_string(),
            description: "Heals".to_string(),
            appearance: "red flask".to_string(),
            effects: r#"{"heal": 10}"#.to_string(),
            placement_constraints: r#"["floor"]"#.to_string(),
            project_map_id: map_id,
        }
    }

    #[tokio::test]
    async fn create_stores_parsed_metadata() {
        let (store, items, map_id) = setup().await;
        let response = items.create(&create_request(map_id)).await.unwrap();
        assert_eq!(response.status, "success");

        let stored = store.find_item(response.item_id).await.unwrap().unwrap();
        assert_eq!(stored.meta_data["effects"], json!({"heal": 10}));
        assert_eq!(stored.meta_data["appearance"], json!("red flask"));
        assert_eq!(stored.meta_data["placementConstraints"], json!(["floor"]));
    }

    #[tokio::test]
    async fn create_rejects_bad_json_and_unknown_maps() {
        let (_, items, map_id) = setup().await;

        let mut bad = create_request(map_id);
        bad.effects = "{not json".to_string();
        assert!(matches!(items.create(&bad).await, Err(ServiceError::Validation(_))));

        let orphan = create_request(Uuid::new_v4());
        assert!(matches!(items.create(&orphan).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_keeps_description_when_omitted() {
        let (_, items, map_id) = setup().await;
        let created = items.create(&create_request(map_id)).await.unwrap();

        let mut meta_data = Attributes::new();
        meta_data.insert("charges".to_string(), json!(3));
        let response = items.update(created.item_id, &UpdateItemRequest {
            name: "Big Potion".to_string(),
            description: None,
            meta_data: meta_data.clone(),
        }).await.unwrap();

        assert!(response.success);
        assert_eq!(response.updated_item.name, "Big Potion");
        assert_eq!(response.updated_item.description, "Heals");
        assert_eq!(response.updated_item.meta_data, meta_data);
    }

    #[tokio::test]
    async fn update_and_delete_missing_items_are_not_found() {
        let (_, items, _) = setup().await;
        let request = UpdateItemRequest { name: "x".to_string(), description: None, meta_data: Attributes::new() };
        assert!(matches!(items.update(Uuid::new_v4(), &request).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(items.delete(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_the_item() {
        let (store, items, map_id) = setup().await;
        let created = items.create(&create_request(map_id)).await.unwrap();
        let response = items.delete(created.item_id).await.unwrap();
        assert!(response.success);
        assert_eq!(store.find_item(created.item_id).await.unwrap(), None);
    }
}
