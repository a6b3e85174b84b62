//! Authoritative battle state
//!
//! One `BattleState` per battle: built by the deployment resolver, mutated in
//! place by `battle_tick`, dropped once its result has been read.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::battle::arena::Arena;
use crate::battle::hex::HexCoord;
use crate::battle::occupancy::OccupancyIndex;
use crate::battle::roster::SideRoster;
use crate::battle::units::{CombatUnit, Side};
use crate::core::error::{BattleError, Result};
use crate::core::types::{Tick, UnitId};

/// Terminal outcome of a battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    pub winner: Side,
    pub surviving_enemies: Vec<CombatUnit>,
    /// Field units plus reinforcements that never got to deploy
    pub surviving_allies: Vec<CombatUnit>,
    /// Filled in by the meta-game after the fact, never by the simulation
    pub reward: Option<u32>,
}

impl BattleResult {
    /// Result for a battle that hit the tick cap: enemy wins, nobody survives
    pub fn timeout() -> Self {
        Self {
            winner: Side::Enemy,
            surviving_enemies: Vec::new(),
            surviving_allies: Vec::new(),
            reward: None,
        }
    }

    pub fn player_won(&self) -> bool {
        self.winner == Side::Player
    }

    pub fn surviving_ally_ids(&self) -> Vec<UnitId> {
        self.surviving_allies.iter().map(|u| u.id).collect()
    }

    pub fn surviving_enemy_ids(&self) -> Vec<UnitId> {
        self.surviving_enemies.iter().map(|u| u.id).collect()
    }
}

/// Complete battle state
#[derive(Debug, Clone, PartialEq)]
pub struct BattleState {
    arena: Arena,
    occupancy: OccupancyIndex,
    player_units: SideRoster,
    enemy_units: SideRoster,
    reinforcement_queue: VecDeque<CombatUnit>,
    enemy_reinforcement_queue: VecDeque<CombatUnit>,
    tick: Tick,
    result: Option<BattleResult>,
}

impl BattleState {
    pub fn new(arena: Arena) -> Self {
        Self {
            arena,
            occupancy: OccupancyIndex::new(),
            player_units: SideRoster::new(),
            enemy_units: SideRoster::new(),
            reinforcement_queue: VecDeque::new(),
            enemy_reinforcement_queue: VecDeque::new(),
            tick: 0,
            result: None,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn occupancy(&self) -> &OccupancyIndex {
        &self.occupancy
    }

    /// Field units of one side, in insertion order
    pub fn roster(&self, side: Side) -> &SideRoster {
        match side {
            Side::Player => &self.player_units,
            Side::Enemy => &self.enemy_units,
        }
    }

    /// Units of one side still waiting to enter the field
    pub fn queue(&self, side: Side) -> &VecDeque<CombatUnit> {
        match side {
            Side::Player => &self.reinforcement_queue,
            Side::Enemy => &self.enemy_reinforcement_queue,
        }
    }

    pub fn position(&self, id: UnitId) -> Option<HexCoord> {
        self.occupancy.position(id)
    }

    /// Look a field unit up on either side
    pub fn unit(&self, id: UnitId) -> Option<(Side, &CombatUnit)> {
        Side::BOTH
            .into_iter()
            .find_map(|side| self.roster(side).get(id).map(|u| (side, u)))
    }

    /// A side is alive while it has anyone on the field or in its queue
    pub fn is_side_alive(&self, side: Side) -> bool {
        !self.roster(side).is_empty() || !self.queue(side).is_empty()
    }

    /// Put a unit onto the field at `hex`
    ///
    /// Timers are left as they are; deployment resets them before calling.
    pub fn place_unit(&mut self, side: Side, mut unit: CombatUnit, hex: HexCoord) -> Result<()> {
        if !self.arena.contains(hex) {
            return Err(BattleError::OutOfArena(hex));
        }
        if self.unit(unit.id).is_some() {
            return Err(BattleError::AlreadyPlaced(unit.id));
        }
        self.occupancy.place(unit.id, hex)?;
        unit.hex = Some(hex);
        self.roster_mut(side).insert(unit);
        Ok(())
    }

    /// Append a unit to the back of a side's reinforcement queue
    pub fn enqueue_reinforcement(&mut self, side: Side, mut unit: CombatUnit) {
        unit.hex = None;
        self.queue_mut(side).push_back(unit);
    }

    /// Check every structural invariant the engine relies on
    pub fn check_invariants(&self) -> bool {
        if !self.occupancy.is_consistent() {
            return false;
        }
        let fielded = self.player_units.len() + self.enemy_units.len();
        if self.occupancy.len() != fielded {
            return false;
        }
        let field_ok = Side::BOTH.into_iter().all(|side| {
            self.roster(side).iter().all(|unit| {
                unit.lives > 0
                    && unit.hex.is_some()
                    && unit.hex == self.occupancy.position(unit.id)
                    && !self.roster(side.opponent()).contains(unit.id)
            })
        });
        let queue_ok = Side::BOTH
            .into_iter()
            .all(|side| self.queue(side).iter().all(|u| u.hex.is_none() && self.unit(u.id).is_none()));
        field_ok && queue_ok
    }

    /// Snapshot survivors into a result with the given winner
    pub(crate) fn build_result(&self, winner: Side) -> BattleResult {
        let survivors = |side: Side| -> Vec<CombatUnit> {
            self.roster(side)
                .iter()
                .chain(self.queue(side).iter())
                .cloned()
                .collect()
        };
        BattleResult {
            winner,
            surviving_enemies: survivors(Side::Enemy),
            surviving_allies: survivors(Side::Player),
            reward: None,
        }
    }

    pub(crate) fn roster_mut(&mut self, side: Side) -> &mut SideRoster {
        match side {
            Side::Player => &mut self.player_units,
            Side::Enemy => &mut self.enemy_units,
        }
    }

    pub(crate) fn queue_mut(&mut self, side: Side) -> &mut VecDeque<CombatUnit> {
        match side {
            Side::Player => &mut self.reinforcement_queue,
            Side::Enemy => &mut self.enemy_reinforcement_queue,
        }
    }

    pub(crate) fn unit_mut(&mut self, side: Side, id: UnitId) -> Option<&mut CombatUnit> {
        self.roster_mut(side).get_mut(id)
    }

    /// Step a field unit to an empty hex; returns the hex it left
    pub(crate) fn move_unit(&mut self, side: Side, id: UnitId, to: HexCoord) -> Result<HexCoord> {
        let from = self.occupancy.move_to(id, to)?;
        if let Some(unit) = self.roster_mut(side).get_mut(id) {
            unit.hex = Some(to);
        }
        Ok(from)
    }

    /// Take a unit off the field for good
    pub(crate) fn remove_unit(&mut self, side: Side, id: UnitId) -> Option<CombatUnit> {
        self.occupancy.remove(id);
        let mut unit = self.roster_mut(side).remove(id)?;
        unit.hex = None;
        Some(unit)
    }

    pub(crate) fn advance_tick(&mut self) -> Tick {
        self.tick += 1;
        self.tick
    }

    pub(crate) fn set_result(&mut self, result: BattleResult) {
        self.result = Some(result);
    }
}
