use async_trait::async_trait;
use chrono::Utc;
use log::info;
use maze::shared::{Attributes, Grid, SavedGame};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use super::{
    GameStateRecord, ItemChanges, ItemRecord, MapRecord, NewGameState, NewItem, NewMap, NewNpc,
    NewUser, NpcChanges, NpcRecord, Store, StoreError, UserRecord,
};

const SCHEMA: &str = include_str!("../../../sql/schema.sql");

/// Postgres-backed store. Grids, metadata and save data live in JSONB columns.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    /// Creates any missing tables. Only run when `apply_schema` is set.
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("database schema applied");
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, StoreError> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
    })
}

fn map_from_row(row: &PgRow) -> Result<MapRecord, StoreError> {
    let cells: Json<Grid> = row.try_get("cells")?;
    Ok(MapRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        cells: cells.0,
    })
}

fn item_from_row(row: &PgRow) -> Result<ItemRecord, StoreError> {
    let meta_data: Json<Attributes> = row.try_get("meta_data")?;
    Ok(ItemRecord {
        id: row.try_get("id")?,
        project_map_id: row.try_get("project_map_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        meta_data: meta_data.0,
    })
}

fn npc_from_row(row: &PgRow) -> Result<NpcRecord, StoreError> {
    let attributes: Json<Attributes> = row.try_get("attributes")?;
    Ok(NpcRecord {
        id: row.try_get("id")?,
        project_map_id: row.try_get("project_map_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        attributes: attributes.0,
    })
}

fn game_state_from_row(row: &PgRow) -> Result<GameStateRecord, StoreError> {
    let data: Json<SavedGame> = row.try_get("data")?;
    Ok(GameStateRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        data: data.0,
        map_ids: row.try_get("map_ids")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let record = UserRecord { id: Uuid::new_v4(), email: user.email, password_hash: user.password_hash };
        sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3)")
            .bind(record.id)
            .bind(&record.email)
            .bind(&record.password_hash)
            .execute(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query("SELECT id, email, password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query("SELECT id, email, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn create_map(&self, map: NewMap) -> Result<MapRecord, StoreError> {
        let record = MapRecord {
            id: Uuid::new_v4(),
            name: map.name,
            description: map.description,
            cells: map.cells,
        };
        sqlx::query("INSERT INTO maps (id, name, description, cells) VALUES ($1, $2, $3, $4)")
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.description)
            .bind(Json(&record.cells))
            .execute(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_map(&self, id: Uuid) -> Result<Option<MapRecord>, StoreError> {
        sqlx::query("SELECT id, name, description, cells FROM maps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(map_from_row)
            .transpose()
    }

    async fn create_item(&self, item: NewItem) -> Result<ItemRecord, StoreError> {
        let record = ItemRecord {
            id: Uuid::new_v4(),
            project_map_id: item.project_map_id,
            name: item.name,
            description: item.description,
            meta_data: item.meta_data,
        };
        sqlx::query(
            "INSERT INTO items (id, project_map_id, name, description, meta_data) VALUES ($1, $2, $3, $4, $5)",
        )
            .bind(record.id)
            .bind(record.project_map_id)
            .bind(&record.name)
            .bind(&record.description)
            .bind(Json(&record.meta_data))
            .execute(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_item(&self, id: Uuid) -> Result<Option<ItemRecord>, StoreError> {
        sqlx::query("SELECT id, project_map_id, name, description, meta_data FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(item_from_row)
            .transpose()
    }

    async fn update_item(&self, id: Uuid, changes: ItemChanges) -> Result<Option<ItemRecord>, StoreError> {
        sqlx::query(
            "UPDATE items SET name = $2, description = $3, meta_data = $4 WHERE id = $1 \
             RETURNING id, project_map_id, name, description, meta_data",
        )
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(Json(&changes.meta_data))
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(item_from_row)
            .transpose()
    }

    async fn delete_item(&self, id: Uuid) -> Result<Option<ItemRecord>, StoreError> {
        sqlx::query("DELETE FROM items WHERE id = $1 RETURNING id, project_map_id, name, description, meta_data")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(item_from_row)
            .transpose()
    }

    async fn items_on_map(&self, map_id: Uuid) -> Result<Vec<ItemRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, project_map_id, name, description, meta_data FROM items \
             WHERE project_map_id = $1 ORDER BY name, id",
        )
            .bind(map_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn create_npc(&self, npc: NewNpc) -> Result<NpcRecord, StoreError> {
        let record = NpcRecord {
            id: Uuid::new_v4(),
            project_map_id: npc.project_map_id,
            name: npc.name,
            description: npc.description,
            attributes: npc.attributes,
        };
        sqlx::query(
            "INSERT INTO npcs (id, project_map_id, name, description, attributes) VALUES ($1, $2, $3, $4, $5)",
        )
            .bind(record.id)
            .bind(record.project_map_id)
            .bind(&record.name)
            .bind(&record.description)
            .bind(Json(&record.attributes))
            .execute(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_npc(&self, id: Uuid) -> Result<Option<NpcRecord>, StoreError> {
        sqlx::query("SELECT id, project_map_id, name, description, attributes FROM npcs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(npc_from_row)
            .transpose()
    }

    async fn update_npc(&self, id: Uuid, changes: NpcChanges) -> Result<Option<NpcRecord>, StoreError> {
        sqlx::query(
            "UPDATE npcs SET name = $2, description = $3, attributes = $4 WHERE id = $1 \
             RETURNING id, project_map_id, name, description, attributes",
        )
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(Json(&changes.attributes))
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(npc_from_row)
            .transpose()
    }

    async fn delete_npc(&self, id: Uuid) -> Result<Option<NpcRecord>, StoreError> {
        sqlx::query("DELETE FROM npcs WHERE id = $1 RETURNING id, project_map_id, name, description, attributes")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(npc_from_row)
            .transpose()
    }

    async fn create_game_state(&self, state: NewGameState) -> Result<GameStateRecord, StoreError> {
        let record = GameStateRecord {
            id: Uuid::new_v4(),
            user_id: state.user_id,
            data: state.data,
            map_ids: state.map_ids,
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO game_states (id, user_id, data, map_ids, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
            .bind(record.id)
            .bind(record.user_id)
            .bind(Json(&record.data))
            .bind(&record.map_ids)
            .bind(record.created_at)
            .execute(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_game_state(&self, id: Uuid) -> Result<Option<GameStateRecord>, StoreError> {
        sqlx::query("SELECT id, user_id, data, map_ids, created_at FROM game_states WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(game_state_from_row)
            .transpose()
    }
}
