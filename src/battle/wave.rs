//! Enemy waves: composition, expansion into units, procedural generation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::catalog::UnitCatalog;
use crate::battle::constants::{
    WAVE_BASE_BUDGET, WAVE_BUDGET_PER_WAVE, WAVE_MODIFIER_START, WAVE_MODIFIER_STEP,
};
use crate::battle::units::CombatUnit;
use crate::core::types::UnitIdAllocator;

/// `count` copies of one enemy definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveEntry {
    pub enemy_id: String,
    pub count: u32,
}

impl WaveEntry {
    pub fn new(enemy_id: impl Into<String>, count: u32) -> Self {
        Self {
            enemy_id: enemy_id.into(),
            count,
        }
    }
}

/// Uniform multiplier applied to every unit of a wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub hp: f64,
    pub attack: f64,
}

impl Default for StatModifier {
    fn default() -> Self {
        Self { hp: 1.0, attack: 1.0 }
    }
}

impl StatModifier {
    pub fn uniform(factor: f64) -> Self {
        Self {
            hp: factor,
            attack: factor,
        }
    }

    pub fn apply(&self, unit: &mut CombatUnit) {
        unit.stats.max_hp *= self.hp;
        unit.stats.hp *= self.hp;
        unit.stats.attack *= self.attack;
    }
}

/// Enemy composition for one battle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    pub entries: Vec<WaveEntry>,
    #[serde(default)]
    pub modifier: Option<StatModifier>,
}

impl WaveSpec {
    /// Total units the wave asks for, unknown ids included
    pub fn unit_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.count)).sum()
    }
}

/// Turn a wave into concrete enemy units, in entry order
///
/// Entries naming an unknown definition are dropped with a warning so a bad
/// data row shrinks the wave instead of aborting the battle.
pub fn expand_wave(
    catalog: &UnitCatalog,
    wave: &WaveSpec,
    ids: &mut UnitIdAllocator,
) -> Vec<CombatUnit> {
    let mut units = Vec::new();
    for entry in &wave.entries {
        let Some(def) = catalog.get(&entry.enemy_id) else {
            tracing::warn!(enemy_id = %entry.enemy_id, count = entry.count, "Skipping unknown wave entry");
            continue;
        };
        for _ in 0..entry.count {
            let mut unit = CombatUnit::from_def(ids.next_id(), def);
            if let Some(modifier) = &wave.modifier {
                modifier.apply(&mut unit);
            }
            units.push(unit);
        }
    }
    units
}

/// Cost budget available to a wave
pub fn wave_budget(wave_number: u32) -> u32 {
    WAVE_BUDGET_PER_WAVE
        .saturating_mul(wave_number.saturating_sub(1))
        .saturating_add(WAVE_BASE_BUDGET)
}

/// Stat modifier for a wave, `None` before `WAVE_MODIFIER_START`
pub fn wave_modifier(wave_number: u32) -> Option<StatModifier> {
    (wave_number >= WAVE_MODIFIER_START).then(|| {
        let steps = (wave_number - WAVE_MODIFIER_START + 1) as f64;
        StatModifier::uniform(1.0 + WAVE_MODIFIER_STEP * steps)
    })
}

/// Build a random wave that spends the wave's cost budget
///
/// Units are drawn uniformly from the affordable catalog entries until nothing
/// fits the remaining budget. Entries appear in the order their definition was
/// first drawn. Free (cost 0) definitions are never drawn.
pub fn generate_wave<R: Rng>(catalog: &UnitCatalog, wave_number: u32, rng: &mut R) -> WaveSpec {
    let mut remaining = wave_budget(wave_number);
    let mut entries: Vec<WaveEntry> = Vec::new();

    loop {
        let affordable: Vec<_> = catalog
            .all()
            .iter()
            .filter(|def| def.cost > 0 && def.cost <= remaining)
            .collect();
        if affordable.is_empty() {
            break;
        }
        let def = affordable[rng.gen_range(0..affordable.len())];
        remaining -= def.cost;
        match entries.iter_mut().find(|e| e.enemy_id == def.id) {
            Some(entry) => entry.count += 1,
            None => entries.push(WaveEntry::new(def.id.clone(), 1)),
        }
    }

    let wave = WaveSpec {
        entries,
        modifier: wave_modifier(wave_number),
    };
    tracing::debug!(
        wave_number,
        units = wave.unit_count(),
        leftover_budget = remaining,
        "Generated wave"
    );
    wave
}
