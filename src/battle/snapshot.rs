//! Read-only projection of a battle for renderers
//!
//! Snapshots carry what a renderer draws and nothing else: no timers, no
//! index maps. `capture_snapshot` is a pure function of the state, so it is
//! safe to call at battle start or at any point mid-battle.

use serde::{Deserialize, Serialize};

use crate::battle::hex::HexCoord;
use crate::battle::state::BattleState;
use crate::battle::units::{CombatUnit, Side, UnitRole};
use crate::core::types::{Tick, UnitId};

/// One unit on the field as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaUnit {
    pub id: UnitId,
    pub side: Side,
    pub def_id: String,
    pub role: UnitRole,
    pub hex: HexCoord,
    /// `"q,r,s"` form of `hex`
    pub hex_key: String,
    pub hp: f64,
    pub max_hp: f64,
    pub lives: u32,
    pub max_lives: u32,
}

impl ArenaUnit {
    fn project(side: Side, unit: &CombatUnit) -> Option<Self> {
        let hex = unit.hex?;
        Some(Self {
            id: unit.id,
            side,
            def_id: unit.profile.def_id.clone(),
            role: unit.profile.role,
            hex,
            hex_key: hex.key(),
            hp: unit.stats.hp,
            max_hp: unit.stats.max_hp,
            lives: unit.lives,
            max_lives: unit.max_lives,
        })
    }
}

/// Whole-arena picture at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub tick: Tick,
    pub width: u32,
    pub depth: u32,
    pub player_width: u32,
    pub enemy_width: u32,
    /// Player field units then enemy field units, each in roster order
    pub units: Vec<ArenaUnit>,
    pub player_reinforcements: Vec<UnitId>,
    pub enemy_reinforcements: Vec<UnitId>,
    pub winner: Option<Side>,
}

impl ArenaSnapshot {
    pub fn unit(&self, id: UnitId) -> Option<&ArenaUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn side_units(&self, side: Side) -> impl Iterator<Item = &ArenaUnit> {
        self.units.iter().filter(move |u| u.side == side)
    }
}

/// Project the current battle state
pub fn capture_snapshot(state: &BattleState) -> ArenaSnapshot {
    let arena = state.arena();
    let units = Side::BOTH
        .into_iter()
        .flat_map(|side| {
            state
                .roster(side)
                .iter()
                .filter_map(move |unit| ArenaUnit::project(side, unit))
        })
        .collect();
    let queued = |side: Side| -> Vec<UnitId> { state.queue(side).iter().map(|u| u.id).collect() };

    ArenaSnapshot {
        tick: state.tick(),
        width: arena.width(),
        depth: arena.depth(),
        player_width: arena.side_width(Side::Player),
        enemy_width: arena.side_width(Side::Enemy),
        units,
        player_reinforcements: queued(Side::Player),
        enemy_reinforcements: queued(Side::Enemy),
        winner: state.result().map(|r| r.winner),
    }
}
