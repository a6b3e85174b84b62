//! Hex Skirmish - deterministic hex-grid auto-battle simulation

pub mod battle;
pub mod core;
