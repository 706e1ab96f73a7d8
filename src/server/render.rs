use std::io::Cursor;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use log::debug;
use maze::shared::map::blank_grid;
use maze::shared::responses::FetchMapResponse;
use maze::shared::{CellKind, Grid, MapSize};
use uuid::Uuid;

use crate::config::SharedConfig;
use crate::error::ServiceError;
use crate::store::Store;

/// Serves map images for saved games.
///
/// The picture is a placeholder: a floor-filled grid of the configured size,
/// not the saved map itself.
pub struct RenderService {
    store: Arc<dyn Store>,
    config: SharedConfig,
}

impl RenderService {
    pub fn new(store: Arc<dyn Store>, config: SharedConfig) -> Self {
        Self { store, config }
    }

    pub async fn fetch(&self, game_state_id: Uuid) -> Result<FetchMapResponse, ServiceError> {
        let state = self.store.find_game_state(game_state_id).await?;
        if state.map_or(true, |state| state.map_ids.is_empty()) {
            return Err(ServiceError::NotFound("GameState or Map not found for the provided ID.".to_string()));
        }

        let render = self.config.read().render.clone();
        let size = MapSize {
            width: render.placeholder_width.max(1) as usize,
            height: render.placeholder_height.max(1) as usize,
        };
        let png = render_png(&blank_grid(size, CellKind::Floor), render.cell_pixels.max(1))?;
        debug!("rendered {} byte map image for game state {}", png.len(), game_state_id);

        Ok(FetchMapResponse { map_image: STANDARD.encode(png) })
    }
}

/// Largest image `render_png` will allocate, in pixels.
const MAX_IMAGE_PIXELS: u64 = 4096 * 4096;

/// Draws every cell as a `cell_pixels` square. Values outside the cell
/// enumeration are drawn as unknown.
pub fn render_png(grid: &Grid, cell_pixels: u32) -> Result<Vec<u8>, ServiceError> {
    let rows = grid.len().max(1);
    let cols = grid.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let side = |cells: usize| {
        u32::try_from(cells)
            .ok()
            .and_then(|cells| cells.checked_mul(cell_pixels))
            .ok_or_else(|| ServiceError::Render(format!("{cells} cells of {cell_pixels}px do not fit in an image")))
    };
    let (width, height) = (side(cols)?, side(rows)?);
    if u64::from(width) * u64::from(height) > MAX_IMAGE_PIXELS {
        return Err(ServiceError::Render(format!(
            "{width}x{height} image exceeds {MAX_IMAGE_PIXELS} pixels"
        )));
    }
    let mut image = RgbaImage::from_pixel(width, height, color_of(CellKind::Unknown));

    // Both sides fit in u32, so every cell offset below does too.
    for (y, row) in grid.iter().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            let color = color_of(CellKind::try_from(value).unwrap_or(CellKind::Unknown));
            let (left, top) = (x as u32 * cell_pixels, y as u32 * cell_pixels);
            for py in top..top + cell_pixels {
                for px in left..left + cell_pixels {
                    image.put_pixel(px, py, color);
                }
            }
        }
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(|e| ServiceError::Render(e.to_string()))?;
    Ok(bytes)
}

fn color_of(kind: CellKind) -> Rgba<u8> {
    let color = kind.color();
    Rgba([color.r, color.g, color.b, color.a])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{MemoryStore, NewGameState, NewMap};
    use maze::shared::SavedGame;
    use parking_lot::RwLock;

    #[test]
    fn png_has_one_square_per_cell() {
        let grid = vec![vec![0, 1, 3], vec![5, 6, 42]];
        let png = render_png(&grid, 4).unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();

        assert_eq!(image.dimensions(), (12, 8));
        assert_eq!(*image.get_pixel(5, 1), color_of(CellKind::Floor));
        assert_eq!(*image.get_pixel(11, 3), color_of(CellKind::Wall));
        assert_eq!(*image.get_pixel(0, 7), color_of(CellKind::Start));
        assert_eq!(*image.get_pixel(11, 7), color_of(CellKind::Unknown));
    }

    #[test]
    fn oversized_images_are_render_errors() {
        let grid = vec![vec![0, 1, 3], vec![5, 6, 0]];
        assert!(matches!(render_png(&grid, u32::MAX), Err(ServiceError::Render(_))));
        assert!(matches!(render_png(&grid, u32::MAX / 2), Err(ServiceError::Render(_))));
        assert!(matches!(render_png(&vec![vec![0]], 5000), Err(ServiceError::Render(_))));
    }

    #[tokio::test]
    async fn fetch_with_huge_cell_pixels_fails_cleanly() {
        let (service, state_id) = service_with_state(true).await;
        service.config.write().render.cell_pixels = u32::MAX;
        assert!(matches!(service.fetch(state_id).await, Err(ServiceError::Render(_))));
    }

    async fn service_with_state(map_ids_for_state: bool) -> (RenderService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let map = store.create_map(NewMap {
            name: "m".to_string(),
            description: String::new(),
            cells: vec![vec![0]],
        }).await.unwrap();
        let state = store.create_game_state(NewGameState {
            user_id: Uuid::new_v4(),
            data: SavedGame::default(),
            map_ids: if map_ids_for_state { vec![map.id] } else { Vec::new() },
        }).await.unwrap();
        let config = Arc::new(RwLock::new(Config::default()));
        (RenderService::new(store, config), state.id)
    }

    #[tokio::test]
    async fn fetch_returns_base64_png_of_placeholder() {
        let (service, state_id) = service_with_state(true).await;
        let response = service.fetch(state_id).await.unwrap();

        let png = STANDARD.decode(response.map_image).unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgba8();
        let render = Config::default().render;
        assert_eq!(
            image.dimensions(),
            (render.placeholder_width * render.cell_pixels, render.placeholder_height * render.cell_pixels)
        );
        assert!(image.pixels().all(|p| *p == color_of(CellKind::Floor)));
    }

    #[tokio::test]
    async fn fetch_needs_a_state_with_maps() {
        let (service, state_id) = service_with_state(false).await;
        assert!(matches!(service.fetch(state_id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.fetch(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }
}
