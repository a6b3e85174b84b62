//! Insertion-ordered unit collection for one side
//!
//! Targeting ties go to whichever enemy was added to the field first, so the
//! iteration order here is part of the simulation's determinism.

use ahash::AHashMap;

use crate::battle::units::CombatUnit;
use crate::core::types::UnitId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideRoster {
    order: Vec<UnitId>,
    units: AHashMap<UnitId, CombatUnit>,
}

impl SideRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit; a unit already present is replaced in place
    pub fn insert(&mut self, unit: CombatUnit) {
        let id = unit.id;
        if self.units.insert(id, unit).is_none() {
            self.order.push(id);
        }
    }

    pub fn remove(&mut self, id: UnitId) -> Option<CombatUnit> {
        let unit = self.units.remove(&id)?;
        self.order.retain(|&existing| existing != id);
        Some(unit)
    }

    pub fn get(&self, id: UnitId) -> Option<&CombatUnit> {
        self.units.get(&id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut CombatUnit> {
        self.units.get_mut(&id)
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Unit ids in insertion order
    pub fn ids(&self) -> &[UnitId] {
        &self.order
    }

    /// Units in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &CombatUnit> {
        self.order.iter().filter_map(|id| self.units.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
