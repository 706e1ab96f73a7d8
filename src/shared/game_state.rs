use super::map::Grid;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// Everything a save game stores besides its owner and linked maps.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    #[serde(default)]
    pub map_state: Grid,
    #[serde(default)]
    pub player_position: Position,
    #[serde(default)]
    pub inventory: Vec<String>,
}
