use super::Color;

/// Value stored in one grid cell.
///
/// Generation currently only ever writes [`CellKind::Unknown`]; the other
/// kinds exist so clients and saved games can use the full enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CellKind {
    Unknown,
    Floor,
    Corridor,
    Wall,
    Door,
    Start,
    End,
}

impl CellKind {
    pub const ALL: [CellKind; 7] = [
        CellKind::Unknown,
        CellKind::Floor,
        CellKind::Corridor,
        CellKind::Wall,
        CellKind::Door,
        CellKind::Start,
        CellKind::End,
    ];

    /// Colour used when drawing the cell.
    pub fn color(self) -> Color {
        let (r, g, b) = match self {
            CellKind::Unknown => (20, 20, 24),
            CellKind::Floor => (196, 178, 140),
            CellKind::Corridor => (150, 130, 100),
            CellKind::Wall => (70, 70, 80),
            CellKind::Door => (140, 80, 30),
            CellKind::Start => (60, 180, 75),
            CellKind::End => (200, 50, 50),
        };
        Color { r, g, b, a: 255 }
    }
}

impl From<CellKind> for u8 {
    fn from(kind: CellKind) -> u8 {
        match kind {
            CellKind::Unknown => 0,
            CellKind::Floor => 1,
            CellKind::Corridor => 2,
            CellKind::Wall => 3,
            CellKind::Door => 4,
            CellKind::Start => 5,
            CellKind::End => 6,
        }
    }
}

impl TryFrom<u8> for CellKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        CellKind::ALL
            .into_iter()
            .find(|kind| u8::from(*kind) == value)
            .ok_or(value)
    }
}
