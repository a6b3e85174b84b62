//! Unit definitions loaded from TOML
//!
//! The catalog is the static half of a unit: base stats, role and the wave
//! generator's price. `CombatUnit::from_def` turns an entry into a live unit.

use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::units::UnitRole;
use crate::core::error::{BattleError, Result};

const BUILTIN_UNITS: &str = include_str!("../../data/units.toml");

fn default_lives() -> u32 {
    1
}

/// Static definition of a unit type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDef {
    pub id: String,
    pub name: String,
    pub role: UnitRole,
    pub hp: f64,
    pub attack: f64,
    /// Seconds between attacks
    pub cooldown: f64,
    /// Hex steps per second
    pub move_speed: f64,
    pub attack_range: u32,
    #[serde(default = "default_lives")]
    pub lives: u32,
    /// Wave budget price
    #[serde(default)]
    pub cost: u32,
}

impl UnitDef {
    fn validate(&self) -> Result<()> {
        let invalid = |what: &str| BattleError::InvalidConfig(format!("unit '{}': {}", self.id, what));
        if self.id.is_empty() {
            return Err(BattleError::InvalidConfig("unit with empty id".into()));
        }
        if self.hp <= 0.0 {
            return Err(invalid("hp must be positive"));
        }
        if self.attack < 0.0 {
            return Err(invalid("attack must not be negative"));
        }
        if self.cooldown <= 0.0 {
            return Err(invalid("cooldown must be positive"));
        }
        if self.move_speed < 0.0 {
            return Err(invalid("move_speed must not be negative"));
        }
        if self.attack_range == 0 {
            return Err(invalid("attack_range must be at least 1"));
        }
        if self.lives == 0 {
            return Err(invalid("lives must be at least 1"));
        }
        Ok(())
    }
}

/// TOML file layout
#[derive(Debug, Deserialize)]
struct TomlCatalog {
    units: Vec<UnitDef>,
}

/// Ordered collection of unit definitions
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    defs: Vec<UnitDef>,
    by_id: AHashMap<String, usize>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::parse_toml(BUILTIN_UNITS)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a catalog from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let data: TomlCatalog = toml::from_str(content)?;
        let mut catalog = Self::new();
        for def in data.units {
            catalog.add(def)?;
        }
        Ok(catalog)
    }

    /// Add a definition; ids must be unique
    pub fn add(&mut self, def: UnitDef) -> Result<()> {
        def.validate()?;
        if self.by_id.contains_key(&def.id) {
            return Err(BattleError::InvalidConfig(format!("duplicate unit id '{}'", def.id)));
        }
        self.by_id.insert(def.id.clone(), self.defs.len());
        self.defs.push(def);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&UnitDef> {
        self.by_id.get(id).map(|&idx| &self.defs[idx])
    }

    /// Like `get`, but a missing id is an error
    pub fn require(&self, id: &str) -> Result<&UnitDef> {
        self.get(id).ok_or_else(|| BattleError::UnknownUnitDef(id.to_string()))
    }

    /// Definitions in file order
    pub fn all(&self) -> &[UnitDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
