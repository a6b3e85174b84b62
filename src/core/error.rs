use thiserror::Error;

use crate::battle::hex::HexCoord;
use crate::core::types::UnitId;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Unknown unit definition: {0}")]
    UnknownUnitDef(String),

    #[error("Hex {hex} is already occupied by unit {occupant}")]
    HexOccupied { hex: HexCoord, occupant: UnitId },

    #[error("Hex {0} is outside the arena")]
    OutOfArena(HexCoord),

    #[error("Unit {0} is already on the field")]
    AlreadyPlaced(UnitId),

    #[error("Unit {0} is not on the field")]
    NotOnField(UnitId),

    #[error("Invalid hex key {0}")]
    InvalidHexKey(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BattleError>;
