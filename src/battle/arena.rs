//! Arena shape: a rectangle of hexes banded into deploy rows
//!
//! Row 0 is the top edge. The first `ENEMY_DEPLOY_ROWS` rows are the enemy
//! deploy band, the last `PLAYER_DEPLOY_ROWS` rows are the player deploy
//! band, and whatever lies between is the neutral corridor.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::battle::constants::{ARENA_DEPTH, ENEMY_DEPLOY_ROWS, PLAYER_DEPLOY_ROWS};
use crate::battle::hex::HexCoord;
use crate::battle::units::Side;

/// Immutable arena geometry for one battle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ArenaDims", into = "ArenaDims")]
pub struct Arena {
    width: u32,
    depth: u32,
    player_width: u32,
    enemy_width: u32,
    hexes: AHashSet<HexCoord>,
}

/// Serialized form; the hex set is rebuilt on load
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ArenaDims {
    player_width: u32,
    enemy_width: u32,
    depth: u32,
}

impl From<ArenaDims> for Arena {
    fn from(dims: ArenaDims) -> Self {
        Arena::with_depth(dims.player_width, dims.enemy_width, dims.depth)
    }
}

impl From<Arena> for ArenaDims {
    fn from(arena: Arena) -> Self {
        ArenaDims {
            player_width: arena.player_width,
            enemy_width: arena.enemy_width,
            depth: arena.depth,
        }
    }
}

impl PartialEq for Arena {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.depth == other.depth
            && self.player_width == other.player_width
            && self.enemy_width == other.enemy_width
    }
}

impl Arena {
    /// Arena sized for the given per-side deployment widths
    ///
    /// The arena is as wide as the wider side; each side's deploy zone is
    /// centered inside it.
    pub fn new(player_width: u32, enemy_width: u32) -> Self {
        Self::with_depth(player_width, enemy_width, ARENA_DEPTH)
    }

    pub fn with_depth(player_width: u32, enemy_width: u32, depth: u32) -> Self {
        let width = player_width.max(enemy_width);
        let hexes = (0..depth as i32)
            .flat_map(|row| (0..width as i32).map(move |col| HexCoord::from_offset(col, row)))
            .collect();
        Self {
            width,
            depth,
            player_width,
            enemy_width,
            hexes,
        }
    }

    /// Same width for both sides
    pub fn square(width: u32) -> Self {
        Self::new(width, width)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn side_width(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_width,
            Side::Enemy => self.enemy_width,
        }
    }

    /// Every hex in the arena, the walkable set for pathfinding
    pub fn hexes(&self) -> &AHashSet<HexCoord> {
        &self.hexes
    }

    pub fn contains(&self, hex: HexCoord) -> bool {
        self.hexes.contains(&hex)
    }

    /// Hex at offset `(col, row)` if it lies inside the arena
    pub fn hex_at(&self, col: u32, row: u32) -> Option<HexCoord> {
        (col < self.width && row < self.depth).then(|| HexCoord::from_offset(col as i32, row as i32))
    }

    /// Rows of a side's deploy band, frontmost (closest to the enemy) first
    pub fn deploy_rows(&self, side: Side) -> Vec<u32> {
        match side {
            Side::Enemy => (0..ENEMY_DEPLOY_ROWS.min(self.depth)).rev().collect(),
            Side::Player => {
                let first = self.depth.saturating_sub(PLAYER_DEPLOY_ROWS);
                (first..self.depth).collect()
            }
        }
    }

    /// Columns of a side's deploy zone, left to right
    pub fn deploy_columns(&self, side: Side) -> std::ops::Range<u32> {
        let side_width = self.side_width(side).min(self.width);
        let start = (self.width - side_width) / 2;
        start..start + side_width
    }

    /// Whether `hex` lies in the side's deploy zone
    pub fn in_deploy_zone(&self, side: Side, hex: HexCoord) -> bool {
        if !self.contains(hex) {
            return false;
        }
        let (col, row) = hex.to_offset();
        self.deploy_rows(side).contains(&(row as u32)) && self.deploy_columns(side).contains(&(col as u32))
    }

    /// Fixed reinforcement entry hex for a side
    ///
    /// Player reinforcements enter at the center of the rearmost row, enemy
    /// reinforcements at the center of row 0. Row 0 is the grid's front edge
    /// as seen from the player, which is the back of the enemy's own band,
    /// so `deploy_rows` lists it last for the enemy.
    pub fn spawn_hex(&self, side: Side) -> HexCoord {
        let row = match side {
            Side::Player => self.depth.saturating_sub(1),
            Side::Enemy => 0,
        };
        HexCoord::from_offset((self.width / 2) as i32, row as i32)
    }
}
