//! Battle events and the sinks that receive them
//!
//! Events are one-way facts: the renderer consumes them, nothing in the
//! simulation ever reads them back.

use serde::{Deserialize, Serialize};

use crate::battle::hex::HexCoord;
use crate::battle::units::Side;
use crate::core::types::{Tick, UnitId};

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    UnitMoved {
        tick: Tick,
        unit_id: UnitId,
        side: Side,
        from: HexCoord,
        to: HexCoord,
    },
    MeleeAttack {
        tick: Tick,
        attacker_id: UnitId,
        target_id: UnitId,
        damage: f64,
        target_hp: f64,
    },
    RangedAttack {
        tick: Tick,
        attacker_id: UnitId,
        target_id: UnitId,
        from: HexCoord,
        to: HexCoord,
        damage: f64,
        target_hp: f64,
    },
    UnitDied {
        tick: Tick,
        unit_id: UnitId,
        side: Side,
        hex: HexCoord,
        lives_remaining: u32,
    },
    Reinforcement {
        tick: Tick,
        unit_id: UnitId,
        side: Side,
        hex: HexCoord,
    },
    BattleEnd {
        tick: Tick,
        winner: Side,
    },
}

impl BattleEvent {
    pub fn tick(&self) -> Tick {
        match self {
            BattleEvent::UnitMoved { tick, .. }
            | BattleEvent::MeleeAttack { tick, .. }
            | BattleEvent::RangedAttack { tick, .. }
            | BattleEvent::UnitDied { tick, .. }
            | BattleEvent::Reinforcement { tick, .. }
            | BattleEvent::BattleEnd { tick, .. } => *tick,
        }
    }

    /// The unit the event is about (the attacker for attacks)
    pub fn unit_id(&self) -> Option<UnitId> {
        match self {
            BattleEvent::UnitMoved { unit_id, .. }
            | BattleEvent::UnitDied { unit_id, .. }
            | BattleEvent::Reinforcement { unit_id, .. } => Some(*unit_id),
            BattleEvent::MeleeAttack { attacker_id, .. }
            | BattleEvent::RangedAttack { attacker_id, .. } => Some(*attacker_id),
            BattleEvent::BattleEnd { .. } => None,
        }
    }

    pub fn is_battle_end(&self) -> bool {
        matches!(self, BattleEvent::BattleEnd { .. })
    }
}

/// Receiver for events emitted by the tick engine
pub trait EventSink {
    fn emit(&mut self, event: BattleEvent);
}

impl EventSink for Vec<BattleEvent> {
    fn emit(&mut self, event: BattleEvent) {
        self.push(event);
    }
}

/// Discards everything; used for headless runs and skip
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: BattleEvent) {}
}

/// Adapts a closure into a sink
pub struct FnSink<F>(pub F);

impl<F: FnMut(BattleEvent)> EventSink for FnSink<F> {
    fn emit(&mut self, event: BattleEvent) {
        (self.0)(event)
    }
}
