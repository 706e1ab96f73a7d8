use std::sync::Arc;

use log::{debug, info};
use maze::shared::map::blank_grid;
use maze::shared::requests::GenerateMapRequest;
use maze::shared::responses::GenerateMapResponse;
use maze::shared::{CellKind, MapSize};

use crate::config::SharedConfig;
use crate::error::ServiceError;
use crate::store::{NewMap, Store};

/// Creates map records whose grid is a uniform field of
/// [`CellKind::Unknown`].
///
/// `room_sizes` and `corridor_width` are accepted but not used: no rooms are
/// carved and the returned room list is always empty.
pub struct MapGenerator {
    store: Arc<dyn Store>,
    config: SharedConfig,
}

impl MapGenerator {
    pub fn new(store: Arc<dyn Store>, config: SharedConfig) -> Self {
        Self { store, config }
    }

    pub async fn generate(&self, request: &GenerateMapRequest) -> Result<GenerateMapResponse, ServiceError> {
        let size: MapSize = request.map_size.parse()?;
        debug!(
            "generating {} map (ignoring {} room sizes, corridor width {})",
            size,
            request.room_sizes.len(),
            request.corridor_width
        );

        let defaults = self.config.read().map_defaults.clone();
        match size.cells() {
            Some(cells) if cells <= defaults.max_cells => {}
            _ => {
                return Err(ServiceError::Validation(format!(
                    "map size {} exceeds the limit of {} cells",
                    size, defaults.max_cells
                )))
            }
        }

        let grid = blank_grid(size, CellKind::Unknown);
        let record = self.store.create_map(NewMap {
            name: defaults.name,
            description: defaults.description,
            cells: grid,
        }).await?;

        info!("created {} map {}", size, record.id);
        Ok(GenerateMapResponse {
            map_id: record.id,
            map_layout: record.cells,
            rooms: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::MemoryStore;
    use parking_lot::RwLock;

    fn generator() -> (Arc<MemoryStore>, MapGenerator) {
        let store = Arc::new(MemoryStore::new());
        let config = Arc::new(RwLock::new(Config::default()));
        (store.clone(), MapGenerator::new(store, config))
    }

    fn request(map_size: &str, room_sizes: &[&str], corridor_width: u32) -> GenerateMapRequest {
        GenerateMapRequest {
            map_size: map_size.to_string(),
            room_sizes: room_sizes.iter().map(|s| s.to_string()).collect(),
            corridor_width,
        }
    }

    #[tokio::test]
    async fn test_three_by_two() {
        let (_, generator) = generator();
        let response = generator.generate(&request("3x2", &["2x2"], 1)).await.unwrap();
        assert_eq!(response.map_layout, vec![vec![0, 0, 0], vec![0, 0, 0]]);
        assert!(response.rooms.is_empty());
    }

    #[tokio::test]
    async fn test_single_cell() {
        let (_, generator) = generator();
        let response = generator.generate(&request("1x1", &[], 0)).await.unwrap();
        assert_eq!(response.map_layout, vec![vec![0]]);
        assert!(response.rooms.is_empty());
    }

    #[tokio::test]
    async fn test_dimensions_and_fill() {
        let (_, generator) = generator();
        for (width, height) in [(1, 7), (7, 1), (10, 10), (25, 4)] {
            let response = generator
                .generate(&request(&format!("{width}x{height}"), &["5x5", "3x4"], 2))
                .await
                .unwrap();
            assert_eq!(response.map_layout.len(), height);
            assert!(response.map_layout.iter().all(|row| row.len() == width));
            assert!(response.map_layout.iter().flatten().all(|&cell| cell == u8::from(CellKind::Unknown)));
            assert!(response.rooms.is_empty());
        }
    }

    #[tokio::test]
    async fn test_generation_is_not_deduplicated() {
        let (store, generator) = generator();
        let first = generator.generate(&request("4x4", &[], 1)).await.unwrap();
        let second = generator.generate(&request("4x4", &[], 1)).await.unwrap();
        assert_ne!(first.map_id, second.map_id);
        assert_eq!(store.map_count(), 2);
    }

    #[tokio::test]
    async fn test_record_is_persisted_with_configured_defaults() {
        let (store, generator) = generator();
        let response = generator.generate(&request("2x3", &[], 1)).await.unwrap();
        let record = store.find_map(response.map_id).await.unwrap().unwrap();
        assert_eq!(record.name, "Generated Map");
        assert_eq!(record.description, "A procedurally generated map");
        assert_eq!(record.cells, response.map_layout);
    }

    #[tokio::test]
    async fn test_malformed_sizes_create_nothing() {
        let (store, generator) = generator();
        for size in ["10", "ax10", "0x5", "5x0", "", "3x2x1"] {
            let err = generator.generate(&request(size, &[], 1)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{size:?} gave {err:?}");
        }
        assert_eq!(store.map_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_maps_are_rejected() {
        let (store, generator) = generator();
        let too_many = Config::default().map_defaults.max_cells + 1;
        for size in [format!("{}x1", usize::MAX), format!("{}x2", usize::MAX), format!("{too_many}x1"), "100000x100000".to_string()] {
            let err = generator.generate(&request(&size, &[], 1)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{size:?} gave {err:?}");
        }
        assert_eq!(store.map_count(), 0);
    }

    #[tokio::test]
    async fn test_cell_limit_is_inclusive_and_configurable() {
        let store = Arc::new(MemoryStore::new());
        let mut config = Config::default();
        config.map_defaults.max_cells = 12;
        let generator = MapGenerator::new(store.clone(), Arc::new(RwLock::new(config)));

        let response = generator.generate(&request("4x3", &[], 1)).await.unwrap();
        assert_eq!(response.map_layout.len(), 3);
        assert!(matches!(generator.generate(&request("13x1", &[], 1)).await, Err(ServiceError::Validation(_))));
        assert_eq!(store.map_count(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let (store, generator) = generator();
        store.set_unavailable(true);
        let err = generator.generate(&request("2x2", &[], 1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }
}
