//! Dino Dodge - A falling-asteroid arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, game state)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Leaderboard persistence
//! - `error`: Configuration and spawn errors

pub mod error;
pub mod highscores;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, SpawnError};
pub use highscores::HighScores;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default screen dimensions
    pub const SCREEN_WIDTH: f32 = 1024.0;
    pub const SCREEN_HEIGHT: f32 = 768.0;
    /// Height of the ground strip the player runs on
    pub const GROUND_HEIGHT: f32 = 100.0;
    /// Entities this far below the bottom edge get retired
    pub const RETIRE_MARGIN: f32 = 50.0;

    /// Player defaults - 24x24 sprite frame drawn at 3x
    pub const PLAYER_FRAME_SIZE: f32 = 24.0;
    pub const PLAYER_SCALE: f32 = 3.0;
    /// Pixels per tick
    pub const PLAYER_SPEED: f32 = 4.0;

    /// Maximum live hazards + collectibles
    pub const POOL_CAPACITY: usize = 64;

    /// Delay between death and the GameOver scene
    pub const GAME_OVER_DELAY_MS: f32 = 3000.0;

    /// Undrained events kept before the oldest are dropped
    pub const EVENT_QUEUE_CAPACITY: usize = 256;
}
