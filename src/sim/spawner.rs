//! Timed spawning of hazards and collectibles
//!
//! A spawner owns its balance and a timer driven by the simulation clock.
//! Once the run is over a pending tick never fires.

use glam::Vec2;
use rand::Rng;

use super::pool::{EntityId, EntityKind, EntityPool};
use super::state::GamePhase;
use crate::error::{ConfigError, SpawnError};
use crate::tuning::{DifficultyRamp, ScaleSpec, SpawnerConfig};

/// Fires once per interval; the interval may shrink after each firing
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    pub interval_ms: f64,
    pub next_at_ms: f64,
    pub ramp: Option<DifficultyRamp>,
}

impl SpawnTimer {
    /// First firing is one interval after `start_ms`
    pub fn new(interval_ms: f64, ramp: Option<DifficultyRamp>, start_ms: f64) -> Self {
        Self {
            interval_ms,
            next_at_ms: start_ms + interval_ms,
            ramp,
        }
    }

    /// True when the deadline has strictly passed. Schedules the next one.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if now_ms <= self.next_at_ms {
            return false;
        }

        if let Some(ramp) = self.ramp {
            self.interval_ms = (self.interval_ms - ramp.step_ms as f64).max(ramp.floor_ms as f64);
        }
        self.next_at_ms = now_ms + self.interval_ms;
        true
    }
}

/// Factory for one entity category
#[derive(Debug, Clone)]
pub struct Spawner {
    kind: EntityKind,
    config: SpawnerConfig,
    screen_width: f32,
    timer: SpawnTimer,
    /// Spawns skipped because the pool was full
    pub skipped: u64,
}

impl Spawner {
    pub fn new(
        kind: EntityKind,
        config: SpawnerConfig,
        screen_width: f32,
        start_ms: f64,
    ) -> Result<Self, ConfigError> {
        config.validate(kind, screen_width)?;
        let timer = SpawnTimer::new(config.interval_ms as f64, config.ramp, start_ms);
        Ok(Self {
            kind,
            config,
            screen_width,
            timer,
            skipped: 0,
        })
    }

    pub fn timer(&self) -> &SpawnTimer {
        &self.timer
    }

    /// Current time between spawns
    pub fn interval_ms(&self) -> f64 {
        self.timer.interval_ms
    }

    /// Pull one entity from the pool and launch it from above the screen
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        pool: &mut EntityPool,
        rng: &mut R,
    ) -> Result<EntityId, SpawnError> {
        let config = &self.config;
        let key = &config.keys[rng.random_range(0..config.keys.len())];
        let entity = pool.acquire(self.kind, key)?;

        let x_range = config.x_range(self.screen_width);
        let x = rng.random_range(x_range.min..=x_range.max) as f32;

        let vx = config
            .drift
            .map_or(0, |drift| rng.random_range(drift.min..=drift.max));
        let vy = rng.random_range(config.fall_speed.min..=config.fall_speed.max);

        entity.pos = Vec2::new(x, config.spawn_y);
        entity.vel = Vec2::new(vx as f32, vy as f32);
        entity.angular_vel = config
            .spin
            .map_or(0, |spin| rng.random_range(spin.min..=spin.max)) as f32;
        entity.scale = match &config.scale {
            ScaleSpec::Range { min, max } => rng.random_range(*min..=*max),
            ScaleSpec::Choices(choices) => choices[rng.random_range(0..choices.len())],
        };
        entity.half_size = config.base_size * entity.scale / 2.0;

        log::debug!(
            "Spawned {:?} '{}' at x={} vel=({}, {})",
            self.kind,
            entity.key,
            x,
            vx,
            vy
        );

        Ok(entity.id)
    }

    /// Spawn if the timer is due. A full pool skips the spawn; a finished
    /// run neither spawns nor advances the timer.
    pub fn on_tick<R: Rng + ?Sized>(
        &mut self,
        now_ms: f64,
        phase: GamePhase,
        pool: &mut EntityPool,
        rng: &mut R,
    ) -> Option<EntityId> {
        if phase == GamePhase::GameOver || !self.timer.poll(now_ms) {
            return None;
        }

        match self.spawn(pool, rng) {
            Ok(id) => Some(id),
            Err(SpawnError::PoolExhausted) => {
                self.skipped += 1;
                log::debug!("{:?} spawn skipped: pool exhausted", self.kind);
                None
            }
        }
    }
}
