//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod pool;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Resolution, resolve_collision, resolve_collisions};
pub use pool::{Entity, EntityId, EntityKind, EntityPool};
pub use spawner::{SpawnTimer, Spawner};
pub use state::{
    Animation, Facing, GameEvent, GameOverTransition, GamePhase, GameState, Player, Scene,
    Snapshot, Tint, GAME_OVER_MESSAGE, INTRO_MESSAGE,
};
pub use tick::{TickInput, sweep_entities, tick};
