pub mod cell;
pub mod map;
pub mod game_state;
pub mod requests;
pub mod responses;

pub use cell::CellKind;
pub use map::{Grid, MapSize, RoomDescriptor};
pub use game_state::{Position, SavedGame};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Free-form JSON object used for item metadata and NPC attributes.
pub type Attributes = serde_json::Map<String, serde_json::Value>;
