//! Game state and core simulation types
//!
//! Everything a run needs lives in `GameState`: the player, the entity pool,
//! both spawners, the seeded RNG and the clock. The host only ever reads it
//! back through `snapshot()` and `drain_events()`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::pool::{Entity, EntityId, EntityKind, EntityPool};
use super::spawner::Spawner;
use crate::consts::EVENT_QUEUE_CAPACITY;
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Spawning, moving and colliding
    Active,
    /// Player was hit; nothing moves any more
    GameOver,
}

/// Scenes the simulation can ask the host to switch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scene {
    GameOver,
}

/// Which way the player sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Player run cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Animation {
    #[default]
    Running,
    Stopped,
}

/// Player tint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tint {
    #[default]
    Normal,
    /// Red, after a hazard hit
    Dead,
}

/// Notifications for the host (sound, effects, HUD, scene changes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Spawned {
        id: EntityId,
        kind: EntityKind,
        key: String,
    },
    /// Fell off the bottom of the screen
    Retired { id: EntityId },
    Collected {
        id: EntityId,
        key: String,
        score: u64,
    },
    PlayerHit { id: EntityId },
    CameraShake { duration_ms: f32, intensity: f32 },
    Message { text: String },
    SceneTransition { scene: Scene },
}

pub const INTRO_MESSAGE: &str = "Watch out for falling asteroids!";
pub const GAME_OVER_MESSAGE: &str = "GAME OVER\nExtinction by asteroid!";

/// The player's dinosaur
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Sprite center
    pub pos: Vec2,
    pub half_extents: Vec2,
    pub facing: Facing,
    pub animation: Animation,
    pub tint: Tint,
}

impl Player {
    /// Sprite center on the top-center of the ground strip
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.screen_width / 2.0, tuning.ground_y()),
            half_extents: tuning.player_half_extents(),
            facing: Facing::Right,
            animation: Animation::Running,
            tint: Tint::Normal,
        }
    }

    /// Allowed range for the sprite center
    pub fn x_bounds(&self, screen_width: f32) -> (f32, f32) {
        (self.half_extents.x, screen_width - self.half_extents.x)
    }

    /// Move one step for the held direction keys. Left wins when both are held.
    pub fn apply_input(&mut self, left: bool, right: bool, speed: f32, screen_width: f32) {
        let (min_x, max_x) = self.x_bounds(screen_width);

        if left && self.pos.x > min_x {
            self.pos.x -= speed;
            self.facing = Facing::Left;
        } else if right && self.pos.x < max_x {
            self.pos.x += speed;
            self.facing = Facing::Right;
        }

        self.pos.x = self.pos.x.clamp(min_x, max_x);
    }

    /// Sprite is drawn mirrored when facing left
    pub fn flip_x(&self) -> bool {
        self.facing == Facing::Left
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.half_extents)
    }
}

/// Countdown from the fatal hit to the GameOver scene
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameOverTransition {
    pub remaining_ms: f64,
    /// Scene change already requested
    pub fired: bool,
}

/// Read-only view handed to the host renderer
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub time_ms: f64,
    pub phase: GamePhase,
    pub score: u64,
    pub player: Player,
    pub flip_x: bool,
    pub entities: Vec<Entity>,
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulation clock; drives the spawn timers
    pub time_ms: f64,
    pub phase: GamePhase,
    pub score: u64,
    pub player: Player,
    pub pool: EntityPool,
    pub hazards: Spawner,
    pub collectibles: Spawner,
    /// Clock reading at the fatal hit
    pub died_at_ms: Option<f64>,
    pub transition: Option<GameOverTransition>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new run. Fails if the tuning is invalid.
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, ConfigError> {
        tuning.validate()?;

        let hazards = Spawner::new(
            EntityKind::Hazard,
            tuning.hazards.clone(),
            tuning.screen_width,
            0.0,
        )?;
        let collectibles = Spawner::new(
            EntityKind::Collectible,
            tuning.collectibles.clone(),
            tuning.screen_width,
            0.0,
        )?;

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(&tuning),
            pool: EntityPool::new(tuning.pool_capacity),
            tuning,
            time_ticks: 0,
            time_ms: 0.0,
            phase: GamePhase::Active,
            score: 0,
            hazards,
            collectibles,
            died_at_ms: None,
            transition: None,
            events: Vec::new(),
        };

        state.push_event(GameEvent::Message {
            text: INTRO_MESSAGE.to_string(),
        });

        Ok(state)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Queue an event for the host, dropping the oldest when full
    pub(crate) fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= EVENT_QUEUE_CAPACITY {
            let dropped = self.events.len() + 1 - EVENT_QUEUE_CAPACITY;
            self.events.drain(..dropped);
            log::debug!("Event queue full, dropped {} undrained event(s)", dropped);
        }
        self.events.push(event);
    }

    /// Pending events, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Hand all pending events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Terminal transition after a hazard hit by entity `by`
    pub(crate) fn enter_game_over(&mut self, by: EntityId) {
        if self.is_game_over() {
            return;
        }

        self.phase = GamePhase::GameOver;
        self.died_at_ms = Some(self.time_ms);
        self.player.animation = Animation::Stopped;
        self.player.tint = Tint::Dead;
        self.pool.freeze_all();

        log::info!(
            "Game over at {:.1}s with score {}",
            self.time_ms / 1000.0,
            self.score
        );

        self.push_event(GameEvent::PlayerHit { id: by });
        self.push_event(GameEvent::CameraShake {
            duration_ms: self.tuning.shake_duration_ms,
            intensity: self.tuning.shake_intensity,
        });
        self.push_event(GameEvent::Message {
            text: GAME_OVER_MESSAGE.to_string(),
        });

        let delay = self.tuning.game_over_delay_ms as f64;
        self.transition = Some(GameOverTransition {
            remaining_ms: delay,
            fired: false,
        });
        if delay <= 0.0 {
            self.advance_transition(0.0);
        }
    }

    /// Count down toward the GameOver scene; requests it exactly once
    pub(crate) fn advance_transition(&mut self, dt_ms: f64) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        if transition.fired {
            return;
        }

        transition.remaining_ms -= dt_ms;
        if transition.remaining_ms <= 0.0 {
            transition.remaining_ms = 0.0;
            transition.fired = true;
            log::info!("Switching to GameOver scene");
            self.push_event(GameEvent::SceneTransition {
                scene: Scene::GameOver,
            });
        }
    }

    /// Serializable view for the renderer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time_ms: self.time_ms,
            phase: self.phase,
            score: self.score,
            player: self.player.clone(),
            flip_x: self.player.flip_x(),
            entities: self.pool.iter_active().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_state() -> GameState {
        GameState::new(12345, Tuning::default()).unwrap()
    }

    #[test]
    fn test_new_state() {
        let state = new_state();
        assert_eq!(state.phase, GamePhase::Active);
        assert_eq!(state.score, 0);
        assert_eq!(state.pool.active_count(), 0);
        assert_eq!(state.player.animation, Animation::Running);
        assert_eq!(state.player.pos.x, state.tuning.screen_width / 2.0);
        // Center sits on the ground's top edge, half the sprite sinks into it
        assert_eq!(state.player.pos.y, 668.0);
        assert_eq!(state.player.bounds().max.y, 668.0 + 36.0);
        assert_eq!(
            state.events(),
            &[GameEvent::Message {
                text: INTRO_MESSAGE.to_string()
            }]
        );
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let mut tuning = Tuning::default();
        tuning.hazards.keys.clear();
        assert!(matches!(
            GameState::new(1, tuning),
            Err(ConfigError::EmptyKeyList {
                category: EntityKind::Hazard
            })
        ));
    }

    #[test]
    fn test_player_stops_at_left_bound() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        let (min_x, _) = player.x_bounds(tuning.screen_width);
        player.pos.x = min_x;

        player.apply_input(true, false, tuning.player_speed, tuning.screen_width);
        assert_eq!(player.pos.x, min_x);
    }

    #[test]
    fn test_player_never_overshoots() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        let (_, max_x) = player.x_bounds(tuning.screen_width);
        player.pos.x = max_x - 1.0;

        player.apply_input(false, true, tuning.player_speed, tuning.screen_width);
        assert_eq!(player.pos.x, max_x);
        assert_eq!(player.facing, Facing::Right);
    }

    #[test]
    fn test_player_faces_movement() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        let start = player.pos.x;

        player.apply_input(true, false, 4.0, tuning.screen_width);
        assert_eq!(player.pos.x, start - 4.0);
        assert!(player.flip_x());

        player.apply_input(false, true, 4.0, tuning.screen_width);
        assert_eq!(player.pos.x, start);
        assert!(!player.flip_x());
    }

    #[test]
    fn test_game_over_transition_fires_once() {
        let mut state = new_state();
        let id = EntityId {
            slot: 0,
            generation: 1,
        };
        state.enter_game_over(id);
        state.drain_events();

        state.advance_transition(2999.0);
        assert!(state.events().is_empty());
        state.advance_transition(1.0);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::SceneTransition {
                scene: Scene::GameOver
            }]
        );
        state.advance_transition(1000.0);
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_immediate_transition() {
        let tuning = Tuning {
            game_over_delay_ms: 0.0,
            ..Default::default()
        };
        let mut state = GameState::new(7, tuning).unwrap();
        state.enter_game_over(EntityId {
            slot: 0,
            generation: 1,
        });
        assert!(state.events().contains(&GameEvent::SceneTransition {
            scene: Scene::GameOver
        }));
    }

    #[test]
    fn test_event_queue_keeps_newest() {
        let mut state = new_state();
        for n in 0..EVENT_QUEUE_CAPACITY + 10 {
            state.push_event(GameEvent::Message {
                text: n.to_string(),
            });
        }

        let events = state.drain_events();
        assert_eq!(events.len(), EVENT_QUEUE_CAPACITY);
        assert_eq!(
            events.last(),
            Some(&GameEvent::Message {
                text: (EVENT_QUEUE_CAPACITY + 9).to_string()
            })
        );
        // Intro message was the oldest and went first
        assert!(!events.contains(&GameEvent::Message {
            text: INTRO_MESSAGE.to_string()
        }));
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = new_state();
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Active\""));
        assert!(json.contains("\"score\":0"));
    }
}
