//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Stable identifier for a combat unit
///
/// Ids are plain integers so that two battles built from the same inputs
/// produce byte-identical states and event streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Simulation tick counter
pub type Tick = u64;

/// Hands out sequential unit ids
#[derive(Debug, Clone, Default)]
pub struct UnitIdAllocator {
    next: u32,
}

impl UnitIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start allocating at `first`
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    /// Start allocating after the highest id already in use
    pub fn after<'a>(ids: impl IntoIterator<Item = &'a UnitId>) -> Self {
        let next = ids.into_iter().map(|id| id.0.saturating_add(1)).max().unwrap_or(0);
        Self { next }
    }

    /// Next id in sequence, sticking at `u32::MAX` once the range is spent
    pub fn next_id(&mut self) -> UnitId {
        let id = UnitId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}
