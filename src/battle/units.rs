//! Combat units and the two sides that field them

use serde::{Deserialize, Serialize};

use crate::battle::catalog::UnitDef;
use crate::battle::hex::HexCoord;
use crate::core::types::UnitId;

/// Which army a unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    /// Tick processing order: player side first
    pub const BOTH: [Side; 2] = [Side::Player, Side::Enemy];

    pub fn opponent(&self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// Battlefield role, drives the default deployment layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRole {
    Tank,
    Animal,
    Melee,
    Fodder,
    GlassCannon,
    Ranged,
}

/// Which band of the deploy zone a role prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployBand {
    /// Front row, ahead of everyone else
    Vanguard,
    /// Front row, after the vanguard
    Line,
    /// Rearmost row
    Rear,
}

impl UnitRole {
    pub fn deploy_band(&self) -> DeployBand {
        match self {
            UnitRole::Tank | UnitRole::Animal => DeployBand::Vanguard,
            UnitRole::Melee | UnitRole::Fodder | UnitRole::GlassCannon => DeployBand::Line,
            UnitRole::Ranged => DeployBand::Rear,
        }
    }
}

/// Definition-level facts about a unit, resolved once at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitProfile {
    pub def_id: String,
    pub role: UnitRole,
    /// Hex steps per second
    pub move_speed: f64,
    /// Attack reach in hexes; 1 means melee
    pub attack_range: u32,
}

impl UnitProfile {
    pub fn is_melee(&self) -> bool {
        self.attack_range == 1
    }

    /// Seconds between steps, `None` for units that never move
    pub fn step_interval(&self) -> Option<f64> {
        (self.move_speed > 0.0).then(|| 1.0 / self.move_speed)
    }
}

/// Live combat stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub hp: f64,
    pub max_hp: f64,
    pub attack: f64,
    /// Seconds between attacks
    pub cooldown: f64,
}

impl CombatStats {
    pub fn new(max_hp: f64, attack: f64, cooldown: f64) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            attack,
            cooldown,
        }
    }
}

/// One fighting entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatUnit {
    pub id: UnitId,
    pub profile: UnitProfile,
    pub stats: CombatStats,
    /// Seconds accumulated toward the next attack
    pub cooldown_timer: f64,
    /// Seconds accumulated toward the next step
    pub move_timer: f64,
    pub lives: u32,
    pub max_lives: u32,
    /// Current position; `None` while queued
    pub hex: Option<HexCoord>,
}

impl CombatUnit {
    pub fn new(id: UnitId, mut profile: UnitProfile, stats: CombatStats, max_lives: u32) -> Self {
        let max_lives = max_lives.max(1);
        profile.attack_range = profile.attack_range.max(1);
        Self {
            id,
            profile,
            stats,
            cooldown_timer: 0.0,
            move_timer: 0.0,
            lives: max_lives,
            max_lives,
            hex: None,
        }
    }

    /// Fresh unit at full strength from a catalog definition
    pub fn from_def(id: UnitId, def: &UnitDef) -> Self {
        Self::new(
            id,
            UnitProfile {
                def_id: def.id.clone(),
                role: def.role,
                move_speed: def.move_speed,
                attack_range: def.attack_range,
            },
            CombatStats::new(def.hp, def.attack, def.cooldown),
            def.lives,
        )
    }

    pub fn is_down(&self) -> bool {
        self.stats.hp <= 0.0
    }

    /// Clear per-battle carry-over before the unit enters the field
    pub fn reset_for_deploy(&mut self) {
        self.cooldown_timer = 0.0;
        self.move_timer = 0.0;
        self.hex = None;
    }

    /// Apply one hit, clamping at zero; returns hp left
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        self.stats.hp = (self.stats.hp - amount).max(0.0);
        self.stats.hp
    }

    /// Spend one life; returns lives remaining
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        if self.lives > 0 {
            self.stats.hp = self.stats.max_hp;
        }
        self.lives
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::unit;
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Player.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent(), Side::Player);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut u = unit(1, 10.0, 5.0, 1.0);
        assert_eq!(u.take_damage(4.0), 6.0);
        assert_eq!(u.take_damage(100.0), 0.0);
        assert!(u.is_down());
    }

    #[test]
    fn test_lose_life_restores_hp() {
        let mut u = unit(1, 10.0, 5.0, 1.0);
        u.max_lives = 2;
        u.lives = 2;
        u.take_damage(10.0);
        assert_eq!(u.lose_life(), 1);
        assert_eq!(u.stats.hp, 10.0);
        u.take_damage(10.0);
        assert_eq!(u.lose_life(), 0);
        assert_eq!(u.stats.hp, 0.0);
        assert_eq!(u.lose_life(), 0);
    }

    #[test]
    fn test_reset_for_deploy() {
        let mut u = unit(1, 10.0, 5.0, 1.0);
        u.cooldown_timer = 0.7;
        u.move_timer = 0.3;
        u.hex = Some(HexCoord::new(1, 1));
        u.reset_for_deploy();
        assert_eq!(u.cooldown_timer, 0.0);
        assert_eq!(u.move_timer, 0.0);
        assert!(u.hex.is_none());
    }

    #[test]
    fn test_roles_map_to_bands() {
        assert_eq!(UnitRole::Animal.deploy_band(), DeployBand::Vanguard);
        assert_eq!(UnitRole::GlassCannon.deploy_band(), DeployBand::Line);
        assert_eq!(UnitRole::Ranged.deploy_band(), DeployBand::Rear);
    }

    #[test]
    fn test_stationary_unit_has_no_step_interval() {
        let mut u = unit(1, 10.0, 5.0, 1.0);
        assert_eq!(u.profile.step_interval(), Some(1.0));
        u.profile.move_speed = 0.0;
        assert_eq!(u.profile.step_interval(), None);
    }

    #[test]
    fn test_lives_minimum_one() {
        let u = CombatUnit::new(UnitId(0), unit(0, 1.0, 1.0, 1.0).profile, CombatStats::new(1.0, 1.0, 1.0), 0);
        assert_eq!(u.lives, 1);
    }

    #[test]
    fn test_range_minimum_one_is_melee() {
        let mut profile = unit(0, 1.0, 1.0, 1.0).profile;
        profile.attack_range = 0;
        let u = CombatUnit::new(UnitId(0), profile, CombatStats::new(1.0, 1.0, 1.0), 1);
        assert_eq!(u.profile.attack_range, 1);
        assert!(u.profile.is_melee());

        let mut archer = u.clone();
        archer.profile.attack_range = 3;
        assert!(!archer.profile.is_melee());
    }
}
