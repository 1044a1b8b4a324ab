//! Overlap tests and collision outcomes
//!
//! Hitboxes are axis-aligned boxes. Every frame the player's box is tested
//! against each live entity; what happens next depends on the entity kind.

use glam::Vec2;

use super::pool::{EntityId, EntityKind};
use super::state::{GameEvent, GameState};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Strict overlap; boxes that only share an edge do not collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// What resolving one player/entity contact did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Entity already gone or run already over
    Ignored,
    /// Collectible eaten; new score
    Collected { score: u64 },
    /// Hazard hit; run is over
    GameOver,
}

/// Resolve a single contact between the player and entity `id`.
///
/// Safe to call repeatedly for the same contact: a released entity or a
/// finished run yields `Resolution::Ignored` and changes nothing.
pub fn resolve_collision(state: &mut GameState, id: EntityId) -> Resolution {
    if state.is_game_over() {
        return Resolution::Ignored;
    }
    let Some(entity) = state.pool.get(id) else {
        log::debug!("Ignoring contact with inactive entity {:?}", id);
        return Resolution::Ignored;
    };

    let (kind, key) = (entity.kind, entity.key.clone());

    match kind {
        EntityKind::Collectible => {
            state.pool.release(id);
            state.score += state.tuning.collectible_points;
            log::debug!("Collected '{}', score {}", key, state.score);
            state.push_event(GameEvent::Collected {
                id,
                key,
                score: state.score,
            });
            Resolution::Collected { score: state.score }
        }
        EntityKind::Hazard => {
            state.enter_game_over(id);
            Resolution::GameOver
        }
    }
}

/// Test the player against every live entity and resolve the contacts.
///
/// Collectibles are resolved before hazards, so food grabbed in the same
/// frame as a fatal hit still counts. Within a kind, slot order applies.
pub fn resolve_collisions(state: &mut GameState) -> Vec<Resolution> {
    if state.is_game_over() {
        return Vec::new();
    }

    let player_box = state.player.bounds();
    let mut collectibles = Vec::new();
    let mut hazards = Vec::new();

    for entity in state.pool.iter_active() {
        if !entity.bounds().overlaps(&player_box) {
            continue;
        }
        match entity.kind {
            EntityKind::Collectible => collectibles.push(entity.id),
            EntityKind::Hazard => hazards.push(entity.id),
        }
    }

    collectibles
        .into_iter()
        .chain(hazards)
        .map(|id| resolve_collision(state, id))
        .filter(|r| *r != Resolution::Ignored)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Animation, GamePhase, Tint};
    use crate::tuning::Tuning;

    fn new_state() -> GameState {
        let mut state = GameState::new(12345, Tuning::default()).unwrap();
        state.drain_events();
        state
    }

    /// Place an entity of `kind` right on top of the player
    fn drop_on_player(state: &mut GameState, kind: EntityKind, key: &str) -> EntityId {
        let pos = state.player.pos;
        let entity = state.pool.acquire(kind, key).unwrap();
        entity.pos = pos;
        entity.vel = Vec2::new(10.0, 200.0);
        entity.angular_vel = 30.0;
        entity.half_size = 16.0;
        entity.id
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_center(Vec2::new(15.0, 5.0), Vec2::splat(10.0));
        let c = Aabb::from_center(Vec2::new(20.0, 0.0), Vec2::splat(10.0));
        let d = Aabb::from_center(Vec2::new(0.0, 40.0), Vec2::splat(10.0));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Touching edges only
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_collectible_scores_once() {
        let mut state = new_state();
        let id = drop_on_player(&mut state, EntityKind::Collectible, "star");

        assert_eq!(
            resolve_collision(&mut state, id),
            Resolution::Collected { score: 1 }
        );
        assert_eq!(state.score, 1);
        assert!(state.pool.get(id).is_none());
        assert_eq!(state.phase, GamePhase::Active);

        // Engine may report the same pair again
        assert_eq!(resolve_collision(&mut state, id), Resolution::Ignored);
        assert_eq!(state.score, 1);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Collected {
                id,
                key: "star".to_string(),
                score: 1
            }]
        );
    }

    #[test]
    fn test_hazard_ends_run_once() {
        let mut state = new_state();
        let other = state.pool.acquire(EntityKind::Hazard, "asteroid").unwrap();
        other.pos = Vec2::new(100.0, 100.0);
        other.vel = Vec2::new(0.0, 250.0);
        let other = other.id;
        let id = drop_on_player(&mut state, EntityKind::Hazard, "large_asteroid");

        assert_eq!(resolve_collision(&mut state, id), Resolution::GameOver);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.animation, Animation::Stopped);
        assert_eq!(state.player.tint, Tint::Dead);
        // Whole field freezes
        assert!(
            state
                .pool
                .iter_active()
                .all(|e| e.vel == Vec2::ZERO && e.angular_vel == 0.0)
        );
        assert!(state.pool.get(other).is_some());

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PlayerHit { id }));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::CameraShake { .. }))
        );

        // Same frame or later: no further side effects
        assert_eq!(resolve_collision(&mut state, id), Resolution::Ignored);
        assert!(resolve_collisions(&mut state).is_empty());
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_collectible_credited_before_hazard() {
        let mut state = new_state();
        // Hazard takes the lower slot so slot order alone would process it first
        let hazard = drop_on_player(&mut state, EntityKind::Hazard, "asteroid");
        let food = drop_on_player(&mut state, EntityKind::Collectible, "steak");
        assert!(hazard.slot < food.slot);

        let resolutions = resolve_collisions(&mut state);
        assert_eq!(
            resolutions,
            vec![Resolution::Collected { score: 1 }, Resolution::GameOver]
        );
        assert_eq!(state.score, 1);
        assert!(state.is_game_over());
    }

    #[test]
    fn test_distant_entities_ignored() {
        let mut state = new_state();
        let entity = state.pool.acquire(EntityKind::Hazard, "asteroid").unwrap();
        entity.pos = Vec2::new(10.0, -50.0);
        entity.half_size = 16.0;

        assert!(resolve_collisions(&mut state).is_empty());
        assert_eq!(state.phase, GamePhase::Active);
    }

    #[test]
    fn test_two_hazards_single_game_over() {
        let mut state = new_state();
        drop_on_player(&mut state, EntityKind::Hazard, "asteroid");
        drop_on_player(&mut state, EntityKind::Hazard, "small_asteroid");

        assert_eq!(resolve_collisions(&mut state), vec![Resolution::GameOver]);
        let hits = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PlayerHit { .. }))
            .count();
        assert_eq!(hits, 1);
    }
}
