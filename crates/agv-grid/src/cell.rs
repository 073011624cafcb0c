//! Cell kinds and their integer codes.

use std::fmt;

/// What occupies one grid cell.
///
/// The discriminants are the interchange codes used by every map file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum CellType {
    #[default]
    Empty           = 0,
    Obstacle        = 1,
    ChargingStation = 2,
    Workstation     = 3,
    PathMarker      = 9,
}

impl CellType {
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellType::Empty),
            1 => Some(CellType::Obstacle),
            2 => Some(CellType::ChargingStation),
            3 => Some(CellType::Workstation),
            9 => Some(CellType::PathMarker),
            _ => None,
        }
    }

    #[inline]
    pub fn is_passable(self) -> bool {
        self != CellType::Obstacle
    }

    /// Chargers and workstations; path marking never paints over these.
    #[inline]
    pub fn is_station(self) -> bool {
        matches!(self, CellType::ChargingStation | CellType::Workstation)
    }

    /// Cost of stepping *into* a cell of this kind, in tenths of a unit.
    ///
    /// | Cell            | Cost |
    /// |-----------------|------|
    /// | Empty           | 1.0  |
    /// | ChargingStation | 0.8  |
    /// | Workstation     | 1.2  |
    /// | PathMarker      | 0.9  |
    ///
    /// `None` for obstacles.
    #[inline]
    pub fn traversal_cost(self) -> Option<u32> {
        match self {
            CellType::Empty => Some(10),
            CellType::ChargingStation => Some(8),
            CellType::Workstation => Some(12),
            CellType::PathMarker => Some(9),
            CellType::Obstacle => None,
        }
    }
}

impl TryFrom<u8> for CellType {
    type Error = String;
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        CellType::from_code(code).ok_or_else(|| format!("unknown cell code {code}"))
    }
}

impl From<CellType> for u8 {
    fn from(cell: CellType) -> u8 {
        cell.code()
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellType::Empty => "empty",
            CellType::Obstacle => "obstacle",
            CellType::ChargingStation => "charging",
            CellType::Workstation => "workstation",
            CellType::PathMarker => "path",
        };
        f.write_str(name)
    }
}
