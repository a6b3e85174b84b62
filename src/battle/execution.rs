//! Battle execution loop
//!
//! Each tick: movement -> attack -> death -> reinforcement -> win check.
//! Every phase runs to completion for both sides before the next starts.

use tracing::{debug, info, trace, warn};

use crate::battle::constants::{MAX_TICKS, TICK_DT, TIMER_EPSILON};
use crate::battle::events::{BattleEvent, EventSink, NullSink};
use crate::battle::hex::HexCoord;
use crate::battle::pathfinding::bfs_next_step;
use crate::battle::state::{BattleResult, BattleState};
use crate::battle::units::Side;
use crate::core::types::{Tick, UnitId};

/// Whether an accumulated timer has reached `threshold`
fn timer_ready(timer: f64, threshold: f64) -> bool {
    timer + TIMER_EPSILON >= threshold
}

/// Nearest living unit of `side`'s opponent, optionally limited to `range`
///
/// Ties go to the enemy that entered the field first.
fn nearest_enemy(
    state: &BattleState,
    side: Side,
    from: HexCoord,
    range: Option<u32>,
) -> Option<(UnitId, HexCoord, u32)> {
    state
        .roster(side.opponent())
        .iter()
        .filter(|enemy| !enemy.is_down())
        .filter_map(|enemy| {
            let hex = enemy.hex?;
            let distance = from.distance(&hex);
            Some((enemy.id, hex, distance))
        })
        .filter(|&(_, _, distance)| range.map_or(true, |r| distance <= r))
        .min_by_key(|&(_, _, distance)| distance)
}

/// Advance the battle by one tick
///
/// Returns `true` while the battle continues. A finished battle is left
/// untouched and returns `false`. Hitting `MAX_TICKS` without a decision ends
/// the battle with the timeout result on that same tick.
pub fn battle_tick(state: &mut BattleState, sink: &mut dyn EventSink) -> bool {
    if state.is_finished() {
        return false;
    }

    let tick = state.advance_tick();
    if tick == 1 {
        info!(
            player_units = state.roster(Side::Player).len(),
            enemy_units = state.roster(Side::Enemy).len(),
            player_queued = state.queue(Side::Player).len(),
            enemy_queued = state.queue(Side::Enemy).len(),
            "Battle started"
        );
    }

    // ===== PHASE 1: MOVEMENT =====
    phase_movement(state, sink, tick);

    // ===== PHASE 2: ATTACK =====
    phase_attack(state, sink, tick);

    // ===== PHASE 3: DEATH =====
    phase_death(state, sink, tick);

    // ===== PHASE 4: REINFORCEMENT =====
    phase_reinforcement(state, sink, tick);

    // ===== PHASE 5: WIN CHECK =====
    if !phase_win_check(state, sink, tick) {
        return false;
    }

    if tick >= MAX_TICKS {
        finish_by_timeout(state, sink, tick);
        return false;
    }
    true
}

/// Run ticks until the battle ends, discarding events
pub fn run_battle(state: &mut BattleState) -> BattleResult {
    run_battle_with(state, &mut NullSink)
}

/// Run ticks until the battle ends, forwarding every event to `sink`
pub fn run_battle_with(state: &mut BattleState, sink: &mut dyn EventSink) -> BattleResult {
    while battle_tick(state, sink) {}
    state.result().cloned().unwrap_or_else(BattleResult::timeout)
}

fn phase_movement(state: &mut BattleState, sink: &mut dyn EventSink, tick: Tick) {
    for side in Side::BOTH {
        let ids = state.roster(side).ids().to_vec();
        for id in ids {
            let Some(unit) = state.roster(side).get(id) else {
                continue;
            };
            let Some(hex) = unit.hex else {
                continue;
            };
            let range = unit.profile.attack_range;
            let step_interval = unit.profile.step_interval();

            let Some((_, target_hex, distance)) = nearest_enemy(state, side, hex, None) else {
                continue;
            };
            if distance <= range {
                continue;
            }
            let Some(interval) = step_interval else {
                continue;
            };

            let Some(unit) = state.unit_mut(side, id) else {
                continue;
            };
            unit.move_timer += TICK_DT;
            if !timer_ready(unit.move_timer, interval) {
                continue;
            }
            unit.move_timer = 0.0;

            let blocked = state.occupancy().occupied_except(id);
            let Some(next) = bfs_next_step(hex, target_hex, &blocked, state.arena().hexes()) else {
                trace!(unit = %id, "No path to target");
                continue;
            };
            if state.occupancy().is_occupied(next) {
                continue;
            }
            if let Ok(from) = state.move_unit(side, id, next) {
                trace!(unit = %id, from = %from, to = %next, "Unit moved");
                sink.emit(BattleEvent::UnitMoved {
                    tick,
                    unit_id: id,
                    side,
                    from,
                    to: next,
                });
            }
        }
    }
}

fn phase_attack(state: &mut BattleState, sink: &mut dyn EventSink, tick: Tick) {
    for side in Side::BOTH {
        let ids = state.roster(side).ids().to_vec();
        for id in ids {
            let Some(unit) = state.unit_mut(side, id) else {
                continue;
            };
            unit.cooldown_timer += TICK_DT;
            if !timer_ready(unit.cooldown_timer, unit.stats.cooldown) {
                continue;
            }
            let Some(hex) = unit.hex else {
                continue;
            };
            let attack = unit.stats.attack;
            let cooldown = unit.stats.cooldown;
            let range = unit.profile.attack_range;
            let melee = unit.profile.is_melee();

            // No target keeps the charge
            let Some((target_id, target_hex, _)) = nearest_enemy(state, side, hex, Some(range)) else {
                continue;
            };

            if let Some(unit) = state.unit_mut(side, id) {
                unit.cooldown_timer = (unit.cooldown_timer - cooldown).max(0.0);
            }
            let Some(target) = state.unit_mut(side.opponent(), target_id) else {
                continue;
            };
            let target_hp = target.take_damage(attack);
            trace!(attacker = %id, target = %target_id, damage = attack, target_hp, "Attack");

            let event = if melee {
                BattleEvent::MeleeAttack {
                    tick,
                    attacker_id: id,
                    target_id,
                    damage: attack,
                    target_hp,
                }
            } else {
                BattleEvent::RangedAttack {
                    tick,
                    attacker_id: id,
                    target_id,
                    from: hex,
                    to: target_hex,
                    damage: attack,
                    target_hp,
                }
            };
            sink.emit(event);
        }
    }
}

fn phase_death(state: &mut BattleState, sink: &mut dyn EventSink, tick: Tick) {
    for side in Side::BOTH {
        let fallen: Vec<UnitId> = state
            .roster(side)
            .iter()
            .filter(|u| u.is_down())
            .map(|u| u.id)
            .collect();

        for id in fallen {
            let Some(unit) = state.unit_mut(side, id) else {
                continue;
            };
            let lives_remaining = unit.lose_life();
            let Some(hex) = unit.hex else {
                continue;
            };
            debug!(unit = %id, ?side, lives_remaining, "Unit died");
            sink.emit(BattleEvent::UnitDied {
                tick,
                unit_id: id,
                side,
                hex,
                lives_remaining,
            });
            if lives_remaining == 0 {
                state.remove_unit(side, id);
            }
        }
    }
}

fn phase_reinforcement(state: &mut BattleState, sink: &mut dyn EventSink, tick: Tick) {
    for side in Side::BOTH {
        if state.queue(side).is_empty() {
            continue;
        }
        let spawn = state.arena().spawn_hex(side);
        if !state.arena().contains(spawn) || state.occupancy().is_occupied(spawn) {
            continue;
        }
        let Some(mut unit) = state.queue_mut(side).pop_front() else {
            continue;
        };
        unit.reset_for_deploy();
        let id = unit.id;
        match state.place_unit(side, unit.clone(), spawn) {
            Ok(()) => {
                debug!(unit = %id, ?side, hex = %spawn, "Reinforcement arrived");
                sink.emit(BattleEvent::Reinforcement {
                    tick,
                    unit_id: id,
                    side,
                    hex: spawn,
                });
            }
            Err(e) => {
                warn!(unit = %id, ?side, error = %e, "Reinforcement could not be placed");
                state.queue_mut(side).push_front(unit);
            }
        }
    }
}

/// Returns `false` once a side has nothing left on the field or in its queue
fn phase_win_check(state: &mut BattleState, sink: &mut dyn EventSink, tick: Tick) -> bool {
    let player_alive = state.is_side_alive(Side::Player);
    let enemy_alive = state.is_side_alive(Side::Enemy);
    if player_alive && enemy_alive {
        return true;
    }

    // Mutual wipe falls through to the enemy
    let winner = if player_alive { Side::Player } else { Side::Enemy };
    let result = state.build_result(winner);
    info!(
        tick,
        ?winner,
        surviving_allies = result.surviving_allies.len(),
        surviving_enemies = result.surviving_enemies.len(),
        "Battle ended"
    );
    sink.emit(BattleEvent::BattleEnd { tick, winner });
    state.set_result(result);
    false
}

fn finish_by_timeout(state: &mut BattleState, sink: &mut dyn EventSink, tick: Tick) {
    info!(tick, "Battle timed out, enemy wins by default");
    sink.emit(BattleEvent::BattleEnd {
        tick,
        winner: Side::Enemy,
    });
    state.set_result(BattleResult::timeout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::arena::Arena;
    use crate::battle::units::test_support::unit;
    use crate::battle::units::CombatUnit;

    fn hex(col: i32, row: i32) -> HexCoord {
        HexCoord::from_offset(col, row)
    }

    fn state_with(players: Vec<(CombatUnit, HexCoord)>, enemies: Vec<(CombatUnit, HexCoord)>) -> BattleState {
        let mut state = BattleState::new(Arena::square(5));
        for (u, h) in players {
            state.place_unit(Side::Player, u, h).unwrap();
        }
        for (u, h) in enemies {
            state.place_unit(Side::Enemy, u, h).unwrap();
        }
        state
    }

    fn stationary(mut u: CombatUnit) -> CombatUnit {
        u.profile.move_speed = 0.0;
        u
    }

    #[test]
    fn test_tick_counts_up() {
        let mut state = state_with(
            vec![(stationary(unit(1, 10.0, 1.0, 1.0)), hex(0, 7))],
            vec![(stationary(unit(2, 10.0, 1.0, 1.0)), hex(4, 0))],
        );
        for expected in 1..=5 {
            assert!(battle_tick(&mut state, &mut NullSink));
            assert_eq!(state.tick(), expected);
            assert!(state.result().is_none());
        }
    }

    #[test]
    fn test_adjacent_duel() {
        let player = hex(2, 4);
        let enemy = player.neighbors()[0];
        let mut state = state_with(
            vec![(unit(1, 10.0, 5.0, 1.0), player)],
            vec![(unit(2, 10.0, 3.0, 1.0), enemy)],
        );
        let mut events: Vec<BattleEvent> = Vec::new();
        let result = run_battle_with(&mut state, &mut events);

        assert_eq!(state.tick(), 20);
        assert_eq!(result.winner, Side::Player);
        assert_eq!(result.surviving_allies.len(), 1);
        assert_eq!(result.surviving_allies[0].stats.hp, 4.0);
        assert!(result.surviving_enemies.is_empty());

        let attack_ticks: Vec<Tick> = events
            .iter()
            .filter(|e| matches!(e, BattleEvent::MeleeAttack { .. }))
            .map(|e| e.tick())
            .collect();
        assert_eq!(attack_ticks, vec![10, 10, 20, 20]);
        assert!(events.last().unwrap().is_battle_end());
    }

    #[test]
    fn test_cooldown_charge_kept_without_target() {
        let mut state = state_with(
            vec![(stationary(unit(1, 10.0, 1.0, 1.0)), hex(0, 7))],
            vec![(stationary(unit(2, 10.0, 1.0, 1.0)), hex(4, 0))],
        );
        for _ in 0..15 {
            battle_tick(&mut state, &mut NullSink);
        }
        let timer = state.roster(Side::Player).get(UnitId(1)).unwrap().cooldown_timer;
        assert!((timer - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_banked_charge_fires_on_contact() {
        // Enemy walks into range; the player's banked charge fires immediately
        let mut state = state_with(
            vec![(stationary(unit(1, 100.0, 1.0, 1.0)), hex(2, 4))],
            vec![(stationary(unit(2, 100.0, 1.0, 1.0)), hex(2, 2))],
        );
        for _ in 0..20 {
            battle_tick(&mut state, &mut NullSink);
        }
        let mut mover = state.roster(Side::Enemy).get(UnitId(2)).unwrap().clone();
        mover.profile.move_speed = 10.0;
        state.roster_mut(Side::Enemy).insert(mover);

        let mut events: Vec<BattleEvent> = Vec::new();
        battle_tick(&mut state, &mut events);
        assert!(events.iter().any(|e| matches!(e, BattleEvent::UnitMoved { unit_id: UnitId(2), .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, BattleEvent::MeleeAttack { attacker_id: UnitId(1), .. })));
    }

    #[test]
    fn test_unit_steps_after_interval() {
        let mut state = state_with(
            vec![(unit(1, 10.0, 1.0, 1.0), hex(2, 7))],
            vec![(stationary(unit(2, 10.0, 1.0, 1.0)), hex(2, 0))],
        );
        let mut events: Vec<BattleEvent> = Vec::new();
        for _ in 0..9 {
            battle_tick(&mut state, &mut events);
        }
        assert!(events.is_empty());

        battle_tick(&mut state, &mut events);
        assert_eq!(events.len(), 1);
        match &events[0] {
            BattleEvent::UnitMoved { tick, unit_id, from, to, .. } => {
                assert_eq!(*tick, 10);
                assert_eq!(*unit_id, UnitId(1));
                assert_eq!(*from, hex(2, 7));
                assert_eq!(from.distance(to), 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(state.roster(Side::Player).get(UnitId(1)).unwrap().move_timer, 0.0);
        assert!(state.check_invariants());
    }

    #[test]
    fn test_ranged_attack_event() {
        let mut archer = stationary(unit(1, 10.0, 2.0, 1.0));
        archer.profile.attack_range = 3;
        let mut state = state_with(
            vec![(archer, hex(2, 5))],
            vec![(stationary(unit(2, 10.0, 1.0, 5.0)), hex(2, 3))],
        );
        let mut events: Vec<BattleEvent> = Vec::new();
        for _ in 0..10 {
            battle_tick(&mut state, &mut events);
        }
        let ranged: Vec<&BattleEvent> = events
            .iter()
            .filter(|e| matches!(e, BattleEvent::RangedAttack { .. }))
            .collect();
        assert_eq!(ranged.len(), 1);
        if let BattleEvent::RangedAttack { from, to, target_hp, .. } = ranged[0] {
            assert_eq!(*from, hex(2, 5));
            assert_eq!(*to, hex(2, 3));
            assert_eq!(*target_hp, 8.0);
        }
    }

    #[test]
    fn test_nearest_target_tie_goes_to_first_added() {
        let center = hex(2, 4);
        let neighbors = center.neighbors();
        let mut state = state_with(
            vec![(stationary(unit(1, 50.0, 1.0, 1.0)), center)],
            vec![
                (stationary(unit(7, 50.0, 0.0, 9.0)), neighbors[3]),
                (stationary(unit(3, 50.0, 0.0, 9.0)), neighbors[0]),
            ],
        );
        let mut events: Vec<BattleEvent> = Vec::new();
        for _ in 0..10 {
            battle_tick(&mut state, &mut events);
        }
        assert!(events
            .iter()
            .any(|e| matches!(e, BattleEvent::MeleeAttack { target_id: UnitId(7), .. })));
    }

    #[test]
    fn test_multi_life_knockdown() {
        let player = hex(2, 4);
        let mut tough = stationary(unit(2, 5.0, 0.0, 9.0));
        tough.max_lives = 2;
        tough.lives = 2;
        let enemy_hex = player.neighbors()[1];
        let mut state = state_with(
            vec![(stationary(unit(1, 50.0, 5.0, 1.0)), player)],
            vec![(tough, enemy_hex)],
        );

        let mut events: Vec<BattleEvent> = Vec::new();
        for _ in 0..10 {
            battle_tick(&mut state, &mut events);
        }
        let enemy = state.roster(Side::Enemy).get(UnitId(2)).unwrap();
        assert_eq!(enemy.lives, 1);
        assert_eq!(enemy.stats.hp, 5.0);
        assert_eq!(state.position(UnitId(2)), Some(enemy_hex));
        assert!(events
            .iter()
            .any(|e| matches!(e, BattleEvent::UnitDied { lives_remaining: 1, .. })));

        let result = run_battle_with(&mut state, &mut events);
        assert_eq!(result.winner, Side::Player);
        assert_eq!(state.tick(), 20);
        assert!(state.position(UnitId(2)).is_none());
        assert!(events
            .iter()
            .any(|e| matches!(e, BattleEvent::UnitDied { lives_remaining: 0, .. })));
    }

    #[test]
    fn test_reinforcement_enters_at_spawn() {
        let mut state = state_with(
            vec![(stationary(unit(1, 10.0, 1.0, 1.0)), hex(0, 7))],
            vec![],
        );
        state.enqueue_reinforcement(Side::Enemy, stationary(unit(5, 10.0, 1.0, 1.0)));

        let mut events: Vec<BattleEvent> = Vec::new();
        assert!(battle_tick(&mut state, &mut events));
        let spawn = state.arena().spawn_hex(Side::Enemy);
        assert_eq!(state.position(UnitId(5)), Some(spawn));
        assert!(state.queue(Side::Enemy).is_empty());
        assert!(matches!(
            events.as_slice(),
            [BattleEvent::Reinforcement { tick: 1, unit_id: UnitId(5), side: Side::Enemy, .. }]
        ));
    }

    #[test]
    fn test_one_reinforcement_per_side_per_tick() {
        let mut state = state_with(vec![], vec![(stationary(unit(9, 10.0, 1.0, 1.0)), hex(0, 0))]);
        state.enqueue_reinforcement(Side::Player, unit(1, 10.0, 1.0, 1.0));
        state.enqueue_reinforcement(Side::Player, unit(2, 10.0, 1.0, 1.0));

        battle_tick(&mut state, &mut NullSink);
        assert_eq!(state.roster(Side::Player).len(), 1);
        assert_eq!(state.queue(Side::Player).len(), 1);
        assert!(state.check_invariants());
    }

    #[test]
    fn test_mutual_wipe_goes_to_enemy() {
        let player = hex(2, 4);
        let mut state = state_with(
            vec![(unit(1, 5.0, 5.0, 1.0), player)],
            vec![(unit(2, 5.0, 5.0, 1.0), player.neighbors()[2])],
        );
        let result = run_battle(&mut state);
        assert_eq!(state.tick(), 10);
        assert_eq!(result.winner, Side::Enemy);
        assert!(result.surviving_allies.is_empty());
        assert!(result.surviving_enemies.is_empty());
    }

    #[test]
    fn test_finished_battle_does_not_tick() {
        let mut state = state_with(vec![(unit(1, 5.0, 5.0, 1.0), hex(0, 7))], vec![]);
        assert!(!battle_tick(&mut state, &mut NullSink));
        assert_eq!(state.tick(), 1);
        assert!(!battle_tick(&mut state, &mut NullSink));
        assert_eq!(state.tick(), 1);
        assert!(state.result().unwrap().player_won());
    }

    #[test]
    fn test_timeout_at_cap() {
        let mut state = state_with(
            vec![(stationary(unit(1, 10.0, 1.0, 1.0)), hex(0, 7))],
            vec![(stationary(unit(2, 10.0, 1.0, 1.0)), hex(4, 0))],
        );
        let mut events: Vec<BattleEvent> = Vec::new();
        let result = run_battle_with(&mut state, &mut events);

        assert_eq!(state.tick(), MAX_TICKS);
        assert_eq!(result, BattleResult::timeout());
        assert!(matches!(
            events.as_slice(),
            [BattleEvent::BattleEnd { tick, winner: Side::Enemy }] if *tick == MAX_TICKS
        ));
    }
}
