//! Battle setup configuration
//!
//! Everything a headless run needs to build a battle from scratch. The
//! simulation rules themselves are fixed (see `battle::constants`); this only
//! decides arena sizing and which wave is fought.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::battle::constants::{DEFAULT_ARENA_WIDTH, MAX_ARENA_WIDTH, MAX_WAVE_NUMBER};
use crate::core::error::{BattleError, Result};

/// Configuration for a single battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Deployment width of the player side, in hex columns
    pub player_width: u32,

    /// Deployment width of the enemy side, in hex columns
    ///
    /// May differ from the player width. The arena is as wide as the wider
    /// of the two and each side is centered inside it.
    pub enemy_width: u32,

    /// Wave number fed to the wave generator (1-based)
    ///
    /// Higher waves get a larger cost budget and, past
    /// `WAVE_MODIFIER_START`, a uniform stat modifier.
    pub wave_number: u32,

    /// Seed for wave generation. Same seed = same enemy composition.
    pub seed: u64,

    /// Optional path to a unit catalog TOML file. `None` uses the built-in
    /// catalog.
    pub catalog_path: Option<PathBuf>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            player_width: DEFAULT_ARENA_WIDTH,
            enemy_width: DEFAULT_ARENA_WIDTH,
            wave_number: 1,
            seed: 42,
            catalog_path: None,
        }
    }
}

impl BattleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check the config for values the arena cannot represent
    pub fn validate(&self) -> Result<()> {
        for (side, width) in [("player", self.player_width), ("enemy", self.enemy_width)] {
            if width == 0 {
                return Err(BattleError::InvalidConfig(format!(
                    "{side}_width must be at least 1"
                )));
            }
            if width > MAX_ARENA_WIDTH {
                return Err(BattleError::InvalidConfig(format!(
                    "{side}_width ({width}) exceeds the maximum of {MAX_ARENA_WIDTH}"
                )));
            }
        }

        if self.wave_number == 0 {
            return Err(BattleError::InvalidConfig(
                "wave_number is 1-based and must be at least 1".into(),
            ));
        }
        if self.wave_number > MAX_WAVE_NUMBER {
            return Err(BattleError::InvalidConfig(format!(
                "wave_number ({}) exceeds the maximum of {MAX_WAVE_NUMBER}",
                self.wave_number
            )));
        }

        Ok(())
    }
}
