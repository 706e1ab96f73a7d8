//! Persistence port.
//!
//! Services only ever see `Arc<dyn Store>`. The server picks [`PgStore`] when
//! a database URL is configured and [`MemoryStore`] otherwise; tests always
//! use [`MemoryStore`].

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use maze::shared::{Attributes, Grid, SavedGame};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A unique key (user email) is already taken.
    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db) = err.as_database_error() {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::Duplicate(db.message().to_string());
            }
        }
        StoreError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cells: Grid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMap {
    pub name: String,
    pub description: String,
    pub cells: Grid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub id: Uuid,
    pub project_map_id: Uuid,
    pub name: String,
    pub description: String,
    pub meta_data: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub project_map_id: Uuid,
    pub name: String,
    pub description: String,
    pub meta_data: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemChanges {
    pub name: String,
    pub description: String,
    pub meta_data: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpcRecord {
    pub id: Uuid,
    pub project_map_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNpc {
    pub project_map_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpcChanges {
    pub name: String,
    pub description: Option<String>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameStateRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub data: SavedGame,
    pub map_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGameState {
    pub user_id: Uuid,
    pub data: SavedGame,
    pub map_ids: Vec<Uuid>,
}

/// Every `create_*` call inserts a fresh record under a new id; nothing is
/// deduplicated. `update_*` and `delete_*` return `None` when the id is
/// unknown.
#[async_trait]
pub trait Store: Send + Sync {
    // Users
    /// Fails with [`StoreError::Duplicate`] when the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    // Maps
    async fn create_map(&self, map: NewMap) -> Result<MapRecord, StoreError>;
    async fn find_map(&self, id: Uuid) -> Result<Option<MapRecord>, StoreError>;

    // Items
    async fn create_item(&self, item: NewItem) -> Result<ItemRecord, StoreError>;
    async fn find_item(&self, id: Uuid) -> Result<Option<ItemRecord>, StoreError>;
    async fn update_item(&self, id: Uuid, changes: ItemChanges) -> Result<Option<ItemRecord>, StoreError>;
    async fn delete_item(&self, id: Uuid) -> Result<Option<ItemRecord>, StoreError>;
    async fn items_on_map(&self, map_id: Uuid) -> Result<Vec<ItemRecord>, StoreError>;

    // NPCs
    async fn create_npc(&self, npc: NewNpc) -> Result<NpcRecord, StoreError>;
    async fn find_npc(&self, id: Uuid) -> Result<Option<NpcRecord>, StoreError>;
    async fn update_npc(&self, id: Uuid, changes: NpcChanges) -> Result<Option<NpcRecord>, StoreError>;
    async fn delete_npc(&self, id: Uuid) -> Result<Option<NpcRecord>, StoreError>;

    // Game states
    async fn create_game_state(&self, state: NewGameState) -> Result<GameStateRecord, StoreError>;
    async fn find_game_state(&self, id: Uuid) -> Result<Option<GameStateRecord>, StoreError>;
}
