use std::fmt;
use std::str::FromStr;

use super::cell::CellKind;

/// Rows of cell values, `grid[y][x]`.
pub type Grid = Vec<Vec<u8>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MapSize {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapSizeError {
    #[error("map size must look like \"<width>x<height>\", got {0:?}")]
    Format(String),
    #[error("map dimension {0:?} is not a number")]
    NotANumber(String),
    #[error("map dimensions must be positive, got {width}x{height}")]
    Empty { width: usize, height: usize },
}

impl FromStr for MapSize {
    type Err = MapSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.trim().split('x').collect();
        let [width, height] = tokens[..] else {
            return Err(MapSizeError::Format(s.to_string()));
        };

        let parse = |token: &str| {
            token
                .trim()
                .parse::<usize>()
                .map_err(|_| MapSizeError::NotANumber(token.to_string()))
        };
        let (width, height) = (parse(width)?, parse(height)?);

        if width == 0 || height == 0 {
            return Err(MapSizeError::Empty { width, height });
        }
        Ok(MapSize { width, height })
    }
}

impl MapSize {
    /// `width * height`, or `None` when that does not fit in a `usize`.
    pub fn cells(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }
}

impl fmt::Display for MapSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A placed rectangular room. Generation never places any, so responses
/// always carry an empty list of these.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoomDescriptor {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// `size.height` rows of `size.width` cells, all set to `fill`.
pub fn blank_grid(size: MapSize, fill: CellKind) -> Grid {
    vec![vec![u8::from(fill); size.width]; size.height]
}
