use std::sync::Arc;

use log::info;
use maze::shared::requests::{CreateNpcRequest, UpdateNpcRequest};
use maze::shared::responses::{CreateNpcResponse, DeleteNpcResponse, NpcView, UpdateNpcResponse};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::store::{NewNpc, NpcChanges, Store};

pub struct NpcService {
    store: Arc<dyn Store>,
}

impl NpcService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: &CreateNpcRequest) -> Result<CreateNpcResponse, ServiceError> {
        if self.store.find_map(request.project_map_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Map with ID {} does not exist.", request.project_map_id)));
        }

        let npc = self.store.create_npc(NewNpc {
            project_map_id: request.project_map_id,
            name: request.name.clone(),
            description: request.description.clone(),
            attributes: request.attributes.clone(),
        }).await?;

        info!("created npc {} on map {}", npc.id, npc.project_map_id);
        Ok(CreateNpcResponse {
            success: true,
            npc_id: npc.id,
            message: "NPC created successfully.".to_string(),
        })
    }

    /// Only the fields present in the request change. An empty attribute
    /// object leaves the stored attributes alone.
    pub async fn update(&self, npc_id: Uuid, request: &UpdateNpcRequest) -> Result<UpdateNpcResponse, ServiceError> {
        let existing = self.store.find_npc(npc_id).await?
            .ok_or_else(|| not_found(npc_id))?;

        let changes = NpcChanges {
            name: request.name.clone().unwrap_or(existing.name),
            description: request.description.clone().or(existing.description),
            attributes: if request.attributes.is_empty() {
                existing.attributes
            } else {
                request.attributes.clone()
            },
        };
        let npc = self.store.update_npc(npc_id, changes).await?
            .ok_or_else(|| not_found(npc_id))?;

        Ok(UpdateNpcResponse {
            success: true,
            npc: NpcView {
                id: npc.id,
                name: npc.name,
                description: npc.description,
                attributes: npc.attributes,
            },
        })
    }

    pub async fn delete(&self, npc_id: Uuid) -> Result<DeleteNpcResponse, ServiceError> {
        self.store.delete_npc(npc_id).await?
            .ok_or_else(|| not_found(npc_id))?;

        info!("deleted npc {}", npc_id);
        Ok(DeleteNpcResponse { message: format!("NPC with ID {npc_id} has been successfully deleted.") })
    }
}

fn not_found(npc_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("NPC with ID {npc_id} not found."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewMap};
    use maze::shared::Attributes;
    use serde_json::json;

    async fn setup() -> (Arc<MemoryStore>, NpcService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let map = store.create_map(NewMap {
            name: "m".to_string(),
            description: String::new(),
            cells: vec![vec![0]],
        }).await.unwrap();
        (store.clone(), NpcService::new(store), map.id)
    }

    fn attributes(key: &str, value: serde_json::Value) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(key.to_string(), value);
        attributes
    }

    #[tokio::test]
    async fn create_requires_an_existing_map() {
        let (store, npcs, map_id) = setup().await;
        let created = npcs.create(&CreateNpcRequest {
            name: "Guard".to_string(),
            description: None,
            attributes: attributes("hp", json!(20)),
            project_map_id: map_id,
        }).await.unwrap();
        assert!(created.success);
        assert_eq!(store.find_npc(created.npc_id).await.unwrap().unwrap().name, "Guard");

        let orphan = npcs.create(&CreateNpcRequest {
            name: "Ghost".to_string(),
            description: None,
            attributes: Attributes::new(),
            project_map_id: Uuid::new_v4(),
        }).await;
        assert!(matches!(orphan, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_only_touches_given_fields() {
        let (_, npcs, map_id) = setup().await;
        let created = npcs.create(&CreateNpcRequest {
            name: "Guard".to_string(),
            description: Some("Watches the gate".to_string()),
            attributes: attributes("hp", json!(20)),
            project_map_id: map_id,
        }).await.unwrap();

        let renamed = npcs.update(created.npc_id, &UpdateNpcRequest {
            name: Some("Captain".to_string()),
            ..Default::default()
        }).await.unwrap();
        assert_eq!(renamed.npc.name, "Captain");
        assert_eq!(renamed.npc.description.as_deref(), Some("Watches the gate"));
        assert_eq!(renamed.npc.attributes, attributes("hp", json!(20)));

        let buffed = npcs.update(created.npc_id, &UpdateNpcRequest {
            attributes: attributes("hp", json!(50)),
            ..Default::default()
        }).await.unwrap();
        assert_eq!(buffed.npc.name, "Captain");
        assert_eq!(buffed.npc.attributes, attributes("hp", json!(50)));
    }

    #[tokio::test]
    async fn missing_npcs_are_not_found() {
        let (_, npcs, _) = setup().await;
        assert!(matches!(npcs.update(Uuid::new_v4(), &UpdateNpcRequest::default()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(npcs.delete(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }
}
