//! Two-way spatial index: unit -> hex and hex -> unit
//!
//! Both maps are only ever changed together through `place`, `remove` and
//! `move_to`, so they stay exact inverses of each other.

use ahash::{AHashMap, AHashSet};

use crate::battle::hex::HexCoord;
use crate::core::error::{BattleError, Result};
use crate::core::types::UnitId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccupancyIndex {
    unit_positions: AHashMap<UnitId, HexCoord>,
    hex_occupants: AHashMap<HexCoord, UnitId>,
}

impl OccupancyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `unit` on an empty `hex`
    pub fn place(&mut self, unit: UnitId, hex: HexCoord) -> Result<()> {
        if self.unit_positions.contains_key(&unit) {
            return Err(BattleError::AlreadyPlaced(unit));
        }
        if let Some(&occupant) = self.hex_occupants.get(&hex) {
            return Err(BattleError::HexOccupied { hex, occupant });
        }
        self.unit_positions.insert(unit, hex);
        self.hex_occupants.insert(hex, unit);
        Ok(())
    }

    /// Take `unit` off the field; returns the hex it stood on
    pub fn remove(&mut self, unit: UnitId) -> Option<HexCoord> {
        let hex = self.unit_positions.remove(&unit)?;
        self.hex_occupants.remove(&hex);
        Some(hex)
    }

    /// Move a placed unit to an empty hex; returns the hex it left
    pub fn move_to(&mut self, unit: UnitId, to: HexCoord) -> Result<HexCoord> {
        if let Some(&occupant) = self.hex_occupants.get(&to) {
            return Err(BattleError::HexOccupied { hex: to, occupant });
        }
        let from = self
            .unit_positions
            .get_mut(&unit)
            .map(|pos| std::mem::replace(pos, to))
            .ok_or(BattleError::NotOnField(unit))?;
        self.hex_occupants.remove(&from);
        self.hex_occupants.insert(to, unit);
        Ok(from)
    }

    pub fn position(&self, unit: UnitId) -> Option<HexCoord> {
        self.unit_positions.get(&unit).copied()
    }

    pub fn occupant(&self, hex: HexCoord) -> Option<UnitId> {
        self.hex_occupants.get(&hex).copied()
    }

    pub fn is_occupied(&self, hex: HexCoord) -> bool {
        self.hex_occupants.contains_key(&hex)
    }

    pub fn len(&self) -> usize {
        self.unit_positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unit_positions.is_empty()
    }

    /// Every occupied hex except the one `unit` stands on
    pub fn occupied_except(&self, unit: UnitId) -> AHashSet<HexCoord> {
        self.hex_occupants
            .iter()
            .filter(|(_, occupant)| **occupant != unit)
            .map(|(&hex, _)| hex)
            .collect()
    }

    /// Both maps agree entry for entry
    pub fn is_consistent(&self) -> bool {
        self.unit_positions.len() == self.hex_occupants.len()
            && self
                .unit_positions
                .iter()
                .all(|(unit, hex)| self.hex_occupants.get(hex) == Some(unit))
    }
}
