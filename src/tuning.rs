//! Data-driven game balance
//!
//! Every speed, interval and size the simulation uses lives here so runs can
//! be retuned from JSON without touching code. Missing fields fall back to
//! the defaults, which match the shipped game.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::EntityKind;

/// Inclusive integer range, sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

impl IntRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                field,
                min: self.min as f32,
                max: self.max as f32,
            });
        }
        Ok(())
    }
}

/// How a spawned entity's display scale is picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleSpec {
    /// Uniform float in [min, max]
    Range { min: f32, max: f32 },
    /// Uniform pick from a fixed list
    Choices(Vec<f32>),
}

impl ScaleSpec {
    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        match self {
            ScaleSpec::Range { min, max } => {
                if min > max {
                    return Err(ConfigError::InvalidRange {
                        field,
                        min: *min,
                        max: *max,
                    });
                }
                if *min <= 0.0 {
                    return Err(ConfigError::NonPositive { field });
                }
            }
            ScaleSpec::Choices(choices) => {
                if choices.is_empty() || choices.iter().any(|s| *s <= 0.0) {
                    return Err(ConfigError::NonPositive { field });
                }
            }
        }
        Ok(())
    }
}

/// Spawn interval shrinks by `step_ms` after every spawn, never below `floor_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRamp {
    pub step_ms: f32,
    pub floor_ms: f32,
}

/// Balance for one spawner (hazards or collectibles)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    /// Asset keys; duplicates weight the draw
    pub keys: Vec<String>,
    /// Milliseconds between spawns
    pub interval_ms: f32,
    #[serde(default)]
    pub ramp: Option<DifficultyRamp>,
    /// Spawn x is drawn from [x_inset, width - x_inset]
    pub x_inset: i32,
    /// Start height, above the visible top edge
    pub spawn_y: f32,
    /// Downward speed (pixels/s)
    pub fall_speed: IntRange,
    /// Sideways speed (pixels/s), none for straight falls
    #[serde(default)]
    pub drift: Option<IntRange>,
    /// Spin (degrees/s), none for no spin
    #[serde(default)]
    pub spin: Option<IntRange>,
    pub scale: ScaleSpec,
    /// Hitbox edge length at scale 1.0
    pub base_size: f32,
}

impl SpawnerConfig {
    /// Asteroids: drifting, spinning, speeding up over time
    pub fn hazards() -> Self {
        Self {
            keys: ["small_asteroid", "large_asteroid", "asteroid"]
                .map(String::from)
                .to_vec(),
            interval_ms: 1500.0,
            ramp: Some(DifficultyRamp {
                step_ms: 50.0,
                floor_ms: 500.0,
            }),
            x_inset: 50,
            spawn_y: -50.0,
            fall_speed: IntRange::new(150, 300),
            drift: Some(IntRange::new(-100, 100)),
            spin: Some(IntRange::new(-100, 100)),
            scale: ScaleSpec::Range { min: 0.5, max: 2.0 },
            base_size: 32.0,
        }
    }

    /// Food: straight falls at a steady rate, stars are the common drop
    pub fn collectibles() -> Self {
        Self {
            keys: ["fish", "steak", "jerky", "star", "star", "star", "bacon"]
                .map(String::from)
                .to_vec(),
            interval_ms: 2000.0,
            ramp: None,
            x_inset: 0,
            spawn_y: -25.0,
            fall_speed: IntRange::new(100, 200),
            drift: None,
            spin: None,
            scale: ScaleSpec::Choices(vec![1.0, 1.5, 2.0]),
            base_size: 24.0,
        }
    }

    /// Horizontal spawn range for a given screen width
    pub fn x_range(&self, screen_width: f32) -> IntRange {
        IntRange::new(self.x_inset, screen_width as i32 - self.x_inset)
    }

    pub fn validate(&self, category: EntityKind, screen_width: f32) -> Result<(), ConfigError> {
        if self.keys.is_empty() {
            return Err(ConfigError::EmptyKeyList { category });
        }
        if self.interval_ms <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "interval_ms",
            });
        }
        if let Some(ramp) = &self.ramp {
            if ramp.step_ms < 0.0 {
                return Err(ConfigError::Negative {
                    field: "ramp.step_ms",
                });
            }
            if ramp.floor_ms <= 0.0 {
                return Err(ConfigError::NonPositive {
                    field: "ramp.floor_ms",
                });
            }
            if ramp.floor_ms > self.interval_ms {
                return Err(ConfigError::InvalidRange {
                    field: "ramp.floor_ms",
                    min: ramp.floor_ms,
                    max: self.interval_ms,
                });
            }
        }
        if self.x_inset < 0 || self.x_range(screen_width).min > self.x_range(screen_width).max {
            return Err(ConfigError::InsetTooWide {
                category,
                inset: self.x_inset,
                width: screen_width,
            });
        }
        self.fall_speed.validate("fall_speed")?;
        if let Some(drift) = &self.drift {
            drift.validate("drift")?;
        }
        if let Some(spin) = &self.spin {
            spin.validate("spin")?;
        }
        self.scale.validate("scale")?;
        if self.base_size <= 0.0 {
            return Err(ConfigError::NonPositive { field: "base_size" });
        }
        Ok(())
    }
}

/// Complete game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Screen ===
    pub screen_width: f32,
    pub screen_height: f32,
    pub ground_height: f32,
    pub retire_margin: f32,

    // === Player ===
    pub player_frame_size: f32,
    pub player_scale: f32,
    /// Pixels per tick while a direction is held
    pub player_speed: f32,

    // === Rules ===
    pub pool_capacity: usize,
    pub collectible_points: u64,
    /// 0 switches to the GameOver scene immediately
    pub game_over_delay_ms: f32,

    // === Feedback ===
    pub shake_duration_ms: f32,
    pub shake_intensity: f32,

    // === Spawners ===
    pub hazards: SpawnerConfig,
    pub collectibles: SpawnerConfig,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            ground_height: GROUND_HEIGHT,
            retire_margin: RETIRE_MARGIN,

            player_frame_size: PLAYER_FRAME_SIZE,
            player_scale: PLAYER_SCALE,
            player_speed: PLAYER_SPEED,

            pool_capacity: POOL_CAPACITY,
            collectible_points: 1,
            game_over_delay_ms: GAME_OVER_DELAY_MS,

            shake_duration_ms: 500.0,
            shake_intensity: 0.05,

            hazards: SpawnerConfig::hazards(),
            collectibles: SpawnerConfig::collectibles(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("player_frame_size", self.player_frame_size),
            ("player_scale", self.player_scale),
            ("player_speed", self.player_speed),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field });
            }
        }
        for (field, value) in [
            ("ground_height", self.ground_height),
            ("retire_margin", self.retire_margin),
            ("game_over_delay_ms", self.game_over_delay_ms),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative { field });
            }
        }
        if self.pool_capacity == 0 {
            return Err(ConfigError::ZeroPoolCapacity);
        }
        if self.player_half_extents().x * 2.0 > self.screen_width {
            return Err(ConfigError::InvalidRange {
                field: "player width",
                min: self.player_half_extents().x * 2.0,
                max: self.screen_width,
            });
        }
        self.hazards
            .validate(EntityKind::Hazard, self.screen_width)?;
        self.collectibles
            .validate(EntityKind::Collectible, self.screen_width)?;
        Ok(())
    }

    /// Half the player's displayed size
    pub fn player_half_extents(&self) -> Vec2 {
        Vec2::splat(self.player_frame_size * self.player_scale / 2.0)
    }

    /// Top edge of the ground strip; the player's center rides along it
    pub fn ground_y(&self) -> f32 {
        self.screen_height - self.ground_height
    }

    /// Entities with y past this line are off screen for good
    pub fn retire_line(&self) -> f32 {
        self.screen_height + self.retire_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_star_is_weighted() {
        let keys = &SpawnerConfig::collectibles().keys;
        let stars = keys.iter().filter(|k| *k == "star").count();
        assert_eq!(stars, 3);
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn test_empty_key_list_fails_fast() {
        let mut tuning = Tuning::default();
        tuning.collectibles.keys.clear();
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::EmptyKeyList {
                category: EntityKind::Collectible
            })
        ));
    }

    #[test]
    fn test_ramp_floor_above_interval_rejected() {
        let mut tuning = Tuning::default();
        tuning.hazards.ramp = Some(DifficultyRamp {
            step_ms: 50.0,
            floor_ms: 2000.0,
        });
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::InvalidRange { field: "ramp.floor_ms", .. })
        ));
    }

    #[test]
    fn test_inset_too_wide() {
        let mut tuning = Tuning::default();
        tuning.screen_width = 800.0;
        tuning.hazards.x_inset = 401;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::InsetTooWide { .. })
        ));
    }

    #[test]
    fn test_zero_pool_rejected() {
        let tuning = Tuning {
            pool_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(ConfigError::ZeroPoolCapacity)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "screen_width": 800.0, "player_speed": 6.0 }"#).unwrap();
        assert_eq!(tuning.screen_width, 800.0);
        assert_eq!(tuning.player_speed, 6.0);
        assert_eq!(tuning.screen_height, SCREEN_HEIGHT);
        assert_eq!(tuning.hazards, SpawnerConfig::hazards());
    }

    #[test]
    fn test_json_scale_choices() {
        let json = r#"{
            "collectibles": {
                "keys": ["star"],
                "interval_ms": 1000.0,
                "x_inset": 0,
                "spawn_y": 0.0,
                "fall_speed": { "min": 150, "max": 300 },
                "scale": { "choices": [1.0, 2.0] },
                "base_size": 20.0
            }
        }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.collectibles.scale, ScaleSpec::Choices(vec![1.0, 2.0]));
        assert!(tuning.collectibles.ramp.is_none());
        assert!(tuning.collectibles.drift.is_none());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
