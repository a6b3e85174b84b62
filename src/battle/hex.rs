//! Hex coordinate system for the arena (cube coordinates)
//!
//! Cube coordinates keep distance and neighbor math symmetric. The arena
//! itself is a rectangle of columns and rows, so conversions to and from
//! odd-row offset coordinates live here too.

use serde::{Deserialize, Serialize};

use crate::core::error::BattleError;

/// Cube hex coordinate, `q + r + s == 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct HexCoord {
    q: i32,
    r: i32,
    s: i32,
}

impl HexCoord {
    /// Build from axial `(q, r)`; `s` is derived
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    /// Build from full cube coordinates, `None` if they don't sum to zero
    pub fn from_cube(q: i32, r: i32, s: i32) -> Option<Self> {
        (q + r + s == 0).then_some(Self { q, r, s })
    }

    /// Convert odd-row offset `(col, row)` to cube
    pub fn from_offset(col: i32, row: i32) -> Self {
        let q = col - (row - (row & 1)) / 2;
        Self::new(q, row)
    }

    /// Convert to odd-row offset `(col, row)`
    pub fn to_offset(&self) -> (i32, i32) {
        let col = self.q + (self.r - (self.r & 1)) / 2;
        (col, self.r)
    }

    pub fn q(&self) -> i32 {
        self.q
    }

    pub fn r(&self) -> i32 {
        self.r
    }

    pub fn s(&self) -> i32 {
        self.s
    }

    /// Canonical string key, `"q,r,s"`
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Cube distance in hex steps
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s - other.s).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Neighbor one step away in `direction`
    pub fn neighbor(&self, direction: HexDirection) -> Self {
        let (dq, dr) = direction.offset();
        Self::new(self.q + dq, self.r + dr)
    }

    /// All 6 neighbors, always in `HexDirection::ALL` order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::ALL.map(|d| self.neighbor(d))
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.q, self.r, self.s)
    }
}

impl std::str::FromStr for HexCoord {
    type Err = BattleError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| BattleError::InvalidHexKey(format!("'{key}': {reason}"));
        let parts: Vec<i32> = key
            .split(',')
            .map(|p| p.trim().parse::<i32>().map_err(|e| invalid(e.to_string())))
            .collect::<Result<_, _>>()?;
        match parts.as_slice() {
            [q, r, s] => HexCoord::from_cube(*q, *r, *s)
                .ok_or_else(|| invalid("components do not sum to zero".into())),
            _ => Err(invalid("needs three components".into())),
        }
    }
}

/// The six hex directions
///
/// The order of `ALL` is the exploration order for neighbors and pathfinding,
/// which is what makes equal-length path choices reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexDirection {
    #[default]
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    pub const ALL: [HexDirection; 6] = [
        HexDirection::East,
        HexDirection::NorthEast,
        HexDirection::NorthWest,
        HexDirection::West,
        HexDirection::SouthWest,
        HexDirection::SouthEast,
    ];

    /// Axial `(dq, dr)` step for this direction
    pub const fn offset(&self) -> (i32, i32) {
        match self {
            HexDirection::East => (1, 0),
            HexDirection::NorthEast => (1, -1),
            HexDirection::NorthWest => (0, -1),
            HexDirection::West => (-1, 0),
            HexDirection::SouthWest => (-1, 1),
            HexDirection::SouthEast => (0, 1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            HexDirection::East => HexDirection::West,
            HexDirection::NorthEast => HexDirection::SouthWest,
            HexDirection::NorthWest => HexDirection::SouthEast,
            HexDirection::West => HexDirection::East,
            HexDirection::SouthWest => HexDirection::NorthEast,
            HexDirection::SouthEast => HexDirection::NorthWest,
        }
    }
}
