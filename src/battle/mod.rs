//! Battle system - deterministic auto-battles on a small hex arena
//!
//! Two armies start in opposite deploy bands and close on each other. Each
//! tick every unit walks toward its nearest enemy or hits it, the fallen lose
//! lives, reinforcements enter from the rear, and the battle ends once one
//! side has nobody left on the field or in reserve.
//!
//! Nothing here is random: the same starting state always produces the same
//! event stream, which is what lets a recorded battle, a live one and a
//! skipped one agree.

pub mod arena;
pub mod catalog;
pub mod constants;
pub mod deployment;
pub mod events;
pub mod execution;
pub mod hex;
pub mod occupancy;
pub mod pathfinding;
pub mod playback;
pub mod roster;
pub mod snapshot;
pub mod state;
pub mod units;
pub mod wave;

// Re-exports for convenient access
pub use arena::Arena;
pub use catalog::{UnitCatalog, UnitDef};
pub use constants::*;
pub use deployment::{build_battle_state, default_deployment, BattleSetup, Deployment};
pub use events::{BattleEvent, EventSink, FnSink, NullSink};
pub use execution::{battle_tick, run_battle, run_battle_with};
pub use hex::{HexCoord, HexDirection};
pub use occupancy::OccupancyIndex;
pub use pathfinding::bfs_next_step;
pub use playback::{record_battle, BattleLog, LiveBattle, LogPlayer};
pub use roster::SideRoster;
pub use snapshot::{capture_snapshot, ArenaSnapshot, ArenaUnit};
pub use state::{BattleResult, BattleState};
pub use units::{CombatStats, CombatUnit, DeployBand, Side, UnitProfile, UnitRole};
pub use wave::{expand_wave, generate_wave, StatModifier, WaveEntry, WaveSpec};
