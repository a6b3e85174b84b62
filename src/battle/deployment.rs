//! Deployment: turning rosters and placement choices into a starting state
//!
//! Player units go where the player asked if that hex is valid and free,
//! otherwise into the reinforcement queue. Enemies are laid out automatically.

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::battle::arena::Arena;
use crate::battle::hex::HexCoord;
use crate::battle::state::BattleState;
use crate::battle::units::{CombatUnit, DeployBand, Side};
use crate::core::types::UnitId;

/// Desired starting hex per player unit; may be partial or empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    placements: AHashMap<UnitId, HexCoord>,
}

impl Deployment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `unit` to start on `hex`, replacing any earlier choice
    pub fn place(&mut self, unit: UnitId, hex: HexCoord) {
        self.placements.insert(unit, hex);
    }

    pub fn with(mut self, unit: UnitId, hex: HexCoord) -> Self {
        self.place(unit, hex);
        self
    }

    pub fn unplace(&mut self, unit: UnitId) -> Option<HexCoord> {
        self.placements.remove(&unit)
    }

    pub fn get(&self, unit: UnitId) -> Option<HexCoord> {
        self.placements.get(&unit).copied()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Everything needed to start one battle
#[derive(Debug, Clone)]
pub struct BattleSetup {
    /// Player units with equipment and upgrades already applied
    pub player_units: Vec<CombatUnit>,
    /// Enemy units already expanded from the wave
    pub enemy_units: Vec<CombatUnit>,
    pub deployment: Deployment,
    pub player_width: u32,
    pub enemy_width: u32,
}

/// Build the initial battle state
///
/// Every unit has its timers zeroed and stale position cleared first, so unit
/// values carried over from an earlier battle start fresh.
pub fn build_battle_state(setup: BattleSetup) -> BattleState {
    let BattleSetup {
        player_units,
        enemy_units,
        deployment,
        player_width,
        enemy_width,
    } = setup;
    let arena = Arena::new(player_width, enemy_width);
    let enemy_slots = enemy_slots(&arena);
    let mut state = BattleState::new(arena);

    for mut unit in player_units {
        unit.reset_for_deploy();
        let desired = deployment.get(unit.id).filter(|&hex| {
            state.arena().in_deploy_zone(Side::Player, hex) && !state.occupancy().is_occupied(hex)
        });
        match desired {
            Some(hex) => place_or_queue(&mut state, Side::Player, unit, hex),
            None => {
                if let Some(hex) = deployment.get(unit.id) {
                    warn!(unit = %unit.id, hex = %hex, "Requested hex unavailable, unit held in reserve");
                }
                state.enqueue_reinforcement(Side::Player, unit);
            }
        }
    }

    let mut slots = enemy_slots.into_iter();
    for mut unit in enemy_units {
        unit.reset_for_deploy();
        match slots.next() {
            Some(hex) => place_or_queue(&mut state, Side::Enemy, unit, hex),
            None => state.enqueue_reinforcement(Side::Enemy, unit),
        }
    }

    debug!(
        player_fielded = state.roster(Side::Player).len(),
        player_queued = state.queue(Side::Player).len(),
        enemy_fielded = state.roster(Side::Enemy).len(),
        enemy_queued = state.queue(Side::Enemy).len(),
        "Battle state built"
    );
    state
}

fn place_or_queue(state: &mut BattleState, side: Side, unit: CombatUnit, hex: HexCoord) {
    let id = unit.id;
    if let Err(e) = state.place_unit(side, unit.clone(), hex) {
        warn!(unit = %id, ?side, error = %e, "Placement rejected, unit held in reserve");
        state.enqueue_reinforcement(side, unit);
    }
}

/// Enemy deploy hexes in fill order: column by column, top row first
fn enemy_slots(arena: &Arena) -> Vec<HexCoord> {
    let mut rows = arena.deploy_rows(Side::Enemy);
    rows.sort_unstable();
    arena
        .deploy_columns(Side::Enemy)
        .flat_map(|col| rows.iter().filter_map(move |&row| arena.hex_at(col, row)))
        .collect()
}

/// Player deploy columns from the center outward, left before right
fn center_out_columns(arena: &Arena) -> Vec<u32> {
    let columns = arena.deploy_columns(Side::Player);
    let twice_center = (columns.start + columns.end).saturating_sub(1) as i64;
    let mut ordered: Vec<u32> = columns.collect();
    ordered.sort_by_key(|&col| ((2 * col as i64 - twice_center).abs(), col));
    ordered
}

/// Default player layout by role
///
/// Tanks and animals take the front row first, then melee, fodder and glass
/// cannons. Ranged units take the rear row. Anyone who did not fit gets any
/// free player hex, front rows first. Units beyond the zone's capacity are
/// left out and will start in reserve.
pub fn default_deployment(units: &[CombatUnit], arena: &Arena) -> Deployment {
    let columns = center_out_columns(arena);
    let rows = arena.deploy_rows(Side::Player);
    let mut deployment = Deployment::new();
    let (Some(&front), Some(&rear)) = (rows.first(), rows.last()) else {
        return deployment;
    };

    let band = |b: DeployBand| -> Vec<&CombatUnit> {
        units.iter().filter(|u| u.profile.role.deploy_band() == b).collect()
    };
    let front_units: Vec<&CombatUnit> = band(DeployBand::Vanguard)
        .into_iter()
        .chain(band(DeployBand::Line))
        .collect();
    let rear_units = band(DeployBand::Rear);

    let mut used: AHashSet<HexCoord> = AHashSet::new();
    let mut leftovers: VecDeque<&CombatUnit> = VecDeque::new();

    let single_row = rear == front;
    let mut groups = vec![(front, front_units)];
    let mut unplaced_rear = Vec::new();
    if single_row {
        unplaced_rear = rear_units;
    } else {
        groups.push((rear, rear_units));
    }
    for (row, group) in groups {
        let mut hexes = columns.iter().filter_map(|&col| arena.hex_at(col, row));
        for unit in group {
            match hexes.next() {
                Some(hex) => {
                    deployment.place(unit.id, hex);
                    used.insert(hex);
                }
                None => leftovers.push_back(unit),
            }
        }
    }
    leftovers.extend(unplaced_rear);

    let free = rows
        .iter()
        .flat_map(|&row| columns.iter().filter_map(move |&col| arena.hex_at(col, row)))
        .filter(|hex| !used.contains(hex));
    for (unit, hex) in leftovers.into_iter().zip(free) {
        deployment.place(unit.id, hex);
    }
    deployment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::constants::ARENA_DEPTH;
    use crate::battle::units::test_support::unit;
    use crate::battle::units::UnitRole;

    fn with_role(id: u32, role: UnitRole) -> CombatUnit {
        let mut u = unit(id, 10.0, 1.0, 1.0);
        u.profile.role = role;
        if role == UnitRole::Ranged {
            u.profile.attack_range = 3;
        }
        u
    }

    fn offset(deployment: &Deployment, id: u32) -> Option<(i32, i32)> {
        deployment.get(UnitId(id)).map(|h| h.to_offset())
    }

    const FRONT: i32 = ARENA_DEPTH as i32 - 2;
    const REAR: i32 = ARENA_DEPTH as i32 - 1;

    #[test]
    fn test_center_out_order() {
        assert_eq!(center_out_columns(&Arena::square(5)), vec![2, 1, 3, 0, 4]);
        assert_eq!(center_out_columns(&Arena::square(4)), vec![1, 2, 0, 3]);
        assert_eq!(center_out_columns(&Arena::new(3, 7)), vec![3, 2, 4]);
    }

    #[test]
    fn test_default_layout_by_role() {
        let units = vec![
            with_role(1, UnitRole::Melee),
            with_role(2, UnitRole::Ranged),
            with_role(3, UnitRole::Tank),
            with_role(4, UnitRole::Animal),
            with_role(5, UnitRole::Fodder),
        ];
        let deployment = default_deployment(&units, &Arena::square(5));

        assert_eq!(offset(&deployment, 3), Some((2, FRONT)));
        assert_eq!(offset(&deployment, 4), Some((1, FRONT)));
        assert_eq!(offset(&deployment, 1), Some((3, FRONT)));
        assert_eq!(offset(&deployment, 5), Some((0, FRONT)));
        assert_eq!(offset(&deployment, 2), Some((2, REAR)));
    }

    #[test]
    fn test_default_layout_overflow_takes_free_hexes() {
        let units: Vec<CombatUnit> = (0..5).map(|id| with_role(id, UnitRole::Ranged)).collect();
        let deployment = default_deployment(&units, &Arena::square(3));

        assert_eq!(offset(&deployment, 0), Some((1, REAR)));
        assert_eq!(offset(&deployment, 1), Some((0, REAR)));
        assert_eq!(offset(&deployment, 2), Some((2, REAR)));
        assert_eq!(offset(&deployment, 3), Some((1, FRONT)));
        assert_eq!(offset(&deployment, 4), Some((0, FRONT)));
    }

    #[test]
    fn test_front_overflow_spills_into_rear_row() {
        let mut units: Vec<CombatUnit> = (0..4).map(|id| with_role(id, UnitRole::Melee)).collect();
        units.push(with_role(4, UnitRole::Ranged));
        let deployment = default_deployment(&units, &Arena::square(3));

        assert_eq!(offset(&deployment, 2), Some((2, FRONT)));
        assert_eq!(offset(&deployment, 4), Some((1, REAR)));
        assert_eq!(offset(&deployment, 3), Some((0, REAR)));
    }

    #[test]
    fn test_default_layout_caps_at_zone_size() {
        let units: Vec<CombatUnit> = (0..10).map(|id| with_role(id, UnitRole::Melee)).collect();
        let deployment = default_deployment(&units, &Arena::square(3));
        assert_eq!(deployment.len(), 6);
        assert!(deployment.get(UnitId(9)).is_none());
    }

    #[test]
    fn test_default_layout_is_deterministic() {
        let units: Vec<CombatUnit> = (0..8)
            .map(|id| with_role(id, if id % 3 == 0 { UnitRole::Ranged } else { UnitRole::Melee }))
            .collect();
        let arena = Arena::square(5);
        assert_eq!(default_deployment(&units, &arena), default_deployment(&units, &arena));
    }

    #[test]
    fn test_build_respects_valid_placements() {
        let arena = Arena::square(5);
        let good = arena.hex_at(1, FRONT as u32).unwrap();
        let enemy_zone = arena.hex_at(1, 0).unwrap();
        let deployment = Deployment::new()
            .with(UnitId(1), good)
            .with(UnitId(2), good)
            .with(UnitId(3), enemy_zone);

        let state = build_battle_state(BattleSetup {
            player_units: vec![
                unit(1, 10.0, 1.0, 1.0),
                unit(2, 10.0, 1.0, 1.0),
                unit(3, 10.0, 1.0, 1.0),
                unit(4, 10.0, 1.0, 1.0),
            ],
            enemy_units: vec![],
            deployment,
            player_width: 5,
            enemy_width: 5,
        });

        assert_eq!(state.position(UnitId(1)), Some(good));
        let queued: Vec<UnitId> = state.queue(Side::Player).iter().map(|u| u.id).collect();
        assert_eq!(queued, vec![UnitId(2), UnitId(3), UnitId(4)]);
        assert!(state.check_invariants());
    }

    #[test]
    fn test_build_fills_enemy_columns_top_first() {
        let enemies: Vec<CombatUnit> = (10..17).map(|id| unit(id, 10.0, 1.0, 1.0)).collect();
        let state = build_battle_state(BattleSetup {
            player_units: vec![],
            enemy_units: enemies,
            deployment: Deployment::new(),
            player_width: 5,
            enemy_width: 3,
        });

        let placed: Vec<(i32, i32)> = state
            .roster(Side::Enemy)
            .iter()
            .map(|u| u.hex.unwrap().to_offset())
            .collect();
        assert_eq!(placed, vec![(1, 0), (1, 1), (2, 0), (2, 1), (3, 0), (3, 1)]);
        let queued: Vec<UnitId> = state.queue(Side::Enemy).iter().map(|u| u.id).collect();
        assert_eq!(queued, vec![UnitId(16)]);
    }

    #[test]
    fn test_build_resets_carry_over() {
        let mut veteran = unit(1, 10.0, 1.0, 1.0);
        veteran.cooldown_timer = 0.8;
        veteran.move_timer = 0.4;
        veteran.hex = Some(HexCoord::new(40, 40));
        let mut enemy = unit(2, 10.0, 1.0, 1.0);
        enemy.cooldown_timer = 3.0;

        let arena = Arena::square(5);
        let state = build_battle_state(BattleSetup {
            player_units: vec![veteran],
            enemy_units: vec![enemy],
            deployment: default_deployment(&[unit(1, 10.0, 1.0, 1.0)], &arena),
            player_width: 5,
            enemy_width: 5,
        });

        let placed = state.roster(Side::Player).get(UnitId(1)).unwrap();
        assert_eq!(placed.cooldown_timer, 0.0);
        assert_eq!(placed.move_timer, 0.0);
        assert_eq!(placed.hex.map(|h| h.to_offset()), Some((2, FRONT)));
        assert_eq!(state.roster(Side::Enemy).get(UnitId(2)).unwrap().cooldown_timer, 0.0);
    }
}
