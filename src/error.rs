//! Error types
//!
//! Configuration problems are fatal and surface when a game is created.
//! Spawn problems are absorbed by the simulation (a skipped spawn).

use thiserror::Error;

use crate::sim::EntityKind;

/// Invalid or unreadable tuning
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{category:?} spawner has an empty key list")]
    EmptyKeyList { category: EntityKind },

    #[error("{field}: min {min} is greater than max {max}")]
    InvalidRange { field: &'static str, min: f32, max: f32 },

    #[error("{field} must be positive")]
    NonPositive { field: &'static str },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("entity pool capacity must be at least 1")]
    ZeroPoolCapacity,

    #[error("{category:?} spawner inset {inset} leaves no room on a {width}px screen")]
    InsetTooWide {
        category: EntityKind,
        inset: i32,
        width: f32,
    },

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read tuning: {0}")]
    Io(#[from] std::io::Error),
}

/// A spawn attempt that produced no entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("entity pool exhausted")]
    PoolExhausted,
}
