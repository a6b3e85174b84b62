//! Two ways to consume a battle: record it up front, or stream it live
//!
//! Both are plain drivers around `battle_tick`. Skipping is just ticking with
//! a `NullSink`, so a skipped battle ends exactly where an animated one would.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{TICK_DT, TIMER_EPSILON};
use crate::battle::events::{BattleEvent, EventSink, NullSink};
use crate::battle::execution::battle_tick;
use crate::battle::snapshot::{capture_snapshot, ArenaSnapshot};
use crate::battle::state::{BattleResult, BattleState};
use crate::core::types::Tick;

/// A fully simulated battle, ready for playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleLog {
    /// State before the first recorded tick
    pub initial: ArenaSnapshot,
    /// `ticks[i]` holds the events of tick `initial.tick + i + 1`, possibly none
    pub ticks: Vec<Vec<BattleEvent>>,
    pub total_ticks: Tick,
    pub result: BattleResult,
}

impl BattleLog {
    pub fn event_count(&self) -> usize {
        self.ticks.iter().map(Vec::len).sum()
    }

    /// Every event in emission order
    pub fn events(&self) -> impl Iterator<Item = &BattleEvent> {
        self.ticks.iter().flatten()
    }
}

/// Run a battle to completion, keeping every tick's events
pub fn record_battle(state: &mut BattleState) -> BattleLog {
    let initial = capture_snapshot(state);
    let mut ticks = Vec::new();
    while !state.is_finished() {
        let mut events: Vec<BattleEvent> = Vec::new();
        battle_tick(state, &mut events);
        ticks.push(events);
    }
    BattleLog {
        initial,
        ticks,
        total_ticks: state.tick(),
        result: state.result().cloned().unwrap_or_else(BattleResult::timeout),
    }
}

/// Replays a recorded log against wall-clock time
///
/// `speed` scales elapsed time: 2.0 plays twice as fast, 0.5 half as fast.
#[derive(Debug, Clone)]
pub struct LogPlayer<'a> {
    log: &'a BattleLog,
    cursor: usize,
    accumulator: f64,
}

impl<'a> LogPlayer<'a> {
    pub fn new(log: &'a BattleLog) -> Self {
        Self {
            log,
            cursor: 0,
            accumulator: 0.0,
        }
    }

    /// Ticks played so far
    pub fn ticks_played(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.log.ticks.len()
    }

    /// Play every tick whose simulated time has now elapsed
    pub fn advance(&mut self, elapsed: f64, speed: f64) -> Vec<&'a BattleEvent> {
        let log = self.log;
        self.accumulator += (elapsed * speed).max(0.0);
        let mut out = Vec::new();
        while !self.is_finished() && self.accumulator + TIMER_EPSILON >= TICK_DT {
            self.accumulator -= TICK_DT;
            out.extend(log.ticks[self.cursor].iter());
            self.cursor += 1;
        }
        if self.is_finished() {
            self.accumulator = 0.0;
        }
        out
    }

    /// Drain every remaining tick at once
    pub fn skip_to_end(&mut self) -> Vec<&'a BattleEvent> {
        let log = self.log;
        let out = log.ticks[self.cursor.min(log.ticks.len())..]
            .iter()
            .flatten()
            .collect();
        self.cursor = log.ticks.len();
        self.accumulator = 0.0;
        out
    }
}

/// A battle simulated one tick per frame while the caller renders it
#[derive(Debug, Clone)]
pub struct LiveBattle {
    state: BattleState,
}

impl LiveBattle {
    pub fn new(state: BattleState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn result(&self) -> Option<&BattleResult> {
        self.state.result()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn snapshot(&self) -> ArenaSnapshot {
        capture_snapshot(&self.state)
    }

    /// Simulate one tick, streaming its events into `sink`
    pub fn advance(&mut self, sink: &mut dyn EventSink) -> bool {
        battle_tick(&mut self.state, sink)
    }

    /// Finish the battle headlessly and hand back its final picture
    pub fn skip(&mut self) -> ArenaSnapshot {
        let start = self.state.tick();
        while battle_tick(&mut self.state, &mut NullSink) {}
        tracing::debug!(from_tick = start, to_tick = self.state.tick(), "Skipped to end of battle");
        self.snapshot()
    }

    pub fn into_state(self) -> BattleState {
        self.state
    }
}
