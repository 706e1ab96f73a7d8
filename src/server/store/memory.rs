use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{
    GameStateRecord, ItemChanges, ItemRecord, MapRecord, NewGameState, NewItem, NewMap, NewNpc,
    NewUser, NpcChanges, NpcRecord, Store, StoreError, UserRecord,
};

/// Process-local store. Used when no database is configured and by tests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    maps: RwLock<HashMap<Uuid, MapRecord>>,
    items: RwLock<HashMap<Uuid, ItemRecord>>,
    npcs: RwLock<HashMap<Uuid, NpcRecord>>,
    game_states: RwLock<HashMap<Uuid, GameStateRecord>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with [`StoreError::Database`].
    #[cfg(test)]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    #[cfg(test)]
    pub fn map_count(&self) -> usize {
        self.maps.read().len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        self.check()?;
        let mut users = self.users.write();
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate(user.email));
        }
        let record = UserRecord { id: Uuid::new_v4(), email: user.email, password_hash: user.password_hash };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        self.check()?;
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.check()?;
        Ok(self.users.read().values().find(|user| user.email == email).cloned())
    }

    async fn create_map(&self, map: NewMap) -> Result<MapRecord, StoreError> {
        self.check()?;
        let record = MapRecord {
            id: Uuid::new_v4(),
            name: map.name,
            description: map.description,
            cells: map.cells,
        };
        self.maps.write().insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_map(&self, id: Uuid) -> Result<Option<MapRecord>, StoreError> {
        self.check()?;
        Ok(self.maps.read().get(&id).cloned())
    }

    async fn create_item(&self, item: NewItem) -> Result<ItemRecord, StoreError> {
        self.check()?;
        let record = ItemRecord {
            id: Uuid::new_v4(),
            project_map_id: item.project_map_id,
            name: item.name,
            description: item.description,
            meta_data: item.meta_data,
        };
        self.items.write().insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_item(&self, id: Uuid) -> Result<Option<ItemRecord>, StoreError> {
        self.check()?;
        Ok(self.items.read().get(&id).cloned())
    }

    async fn update_item(&self, id: Uuid, changes: ItemChanges) -> Result<Option<ItemRecord>, StoreError> {
        self.check()?;
        let mut items = self.items.write();
        let Some(item) = items.get_mut(&id) else {
            return Ok(None);
        };
        item.name = changes.name;
        item.description = changes.description;
        item.meta_data = changes.meta_data;
        Ok(Some(item.clone()))
    }

    async fn delete_item(&self, id: Uuid) -> Result<Option<ItemRecord>, StoreError> {
        self.check()?;
        Ok(self.items.write().remove(&id))
    }

    async fn items_on_map(&self, map_id: Uuid) -> Result<Vec<ItemRecord>, StoreError> {
        self.check()?;
        let mut items: Vec<ItemRecord> = self.items.read()
            .values()
            .filter(|item| item.project_map_id == map_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn create_npc(&self, npc: NewNpc) -> Result<NpcRecord, StoreError> {
        self.check()?;
        let record = NpcRecord {
            id: Uuid::new_v4(),
            project_map_id: npc.project_map_id,
            name: npc.name,
            description: npc.description,
            attributes: npc.attributes,
        };
        self.npcs.write().insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_npc(&self, id: Uuid) -> Result<Option<NpcRecord>, StoreError> {
        self.check()?;
        Ok(self.npcs.read().get(&id).cloned())
    }

    async fn update_npc(&self, id: Uuid, changes: NpcChanges) -> Result<Option<NpcRecord>, StoreError> {
        self.check()?;
        let mut npcs = self.npcs.write();
        let Some(npc) = npcs.get_mut(&id) else {
            return Ok(None);
        };
        npc.name = changes.name;
        npc.description = changes.description;
        npc.attributes = changes.attributes;
        Ok(Some(npc.clone()))
    }

    async fn delete_npc(&self, id: Uuid) -> Result<Option<NpcRecord>, StoreError> {
        self.check()?;
        Ok(self.npcs.write().remove(&id))
    }

    async fn create_game_state(&self, state: NewGameState) -> Result<GameStateRecord, StoreError> {
        self.check()?;
        let record = GameStateRecord {
            id: Uuid::new_v4(),
            user_id: state.user_id,
            data: state.data,
            map_ids: state.map_ids,
            created_at: Utc::now(),
        };
        self.game_states.write().insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_game_state(&self, id: Uuid) -> Result<Option<GameStateRecord>, StoreError> {
        self.check()?;
        Ok(self.game_states.read().get(&id).cloned())
    }
}
