//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.
//! Frame order: player movement, spawn timers, entity motion and
//! retirement, then collisions against the moved field.

use super::collision::resolve_collisions;
use super::pool::EntityKind;
use super::state::{GameEvent, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Left arrow held
    pub left: bool,
    /// Right arrow held
    pub right: bool,
    /// Idle/demo mode - AI plays the game
    pub autopilot: bool,
}

/// Extra clearance the autopilot keeps from a falling hazard
const AUTOPILOT_DODGE_MARGIN: f32 = 40.0;

/// Advance the game state by one fixed timestep (`dt` in seconds).
///
/// Events pile up in the state until the host calls `drain_events`, which it
/// should do every frame. Past `EVENT_QUEUE_CAPACITY` the oldest are dropped.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt_ms = dt as f64 * 1000.0;

    // Run is over: only the scene-change countdown keeps going
    if state.is_game_over() {
        state.advance_transition(dt_ms);
        return;
    }

    state.time_ticks += 1;
    state.time_ms += dt_ms;

    let input = if input.autopilot {
        autopilot_input(state)
    } else {
        input.clone()
    };

    let speed = state.tuning.player_speed;
    let width = state.tuning.screen_width;
    state
        .player
        .apply_input(input.left, input.right, speed, width);

    spawn_due(state, EntityKind::Hazard);
    spawn_due(state, EntityKind::Collectible);

    sweep_entities(state, dt);

    resolve_collisions(state);
}

/// Let one spawner fire if its interval has elapsed
fn spawn_due(state: &mut GameState, kind: EntityKind) {
    let (now, phase) = (state.time_ms, state.phase);
    let spawner = match kind {
        EntityKind::Hazard => &mut state.hazards,
        EntityKind::Collectible => &mut state.collectibles,
    };

    let Some(id) = spawner.on_tick(now, phase, &mut state.pool, &mut state.rng) else {
        return;
    };
    if let Some(entity) = state.pool.get(id) {
        let key = entity.key.clone();
        state.push_event(GameEvent::Spawned { id, kind, key });
    }
}

/// Move every live entity and retire the ones that fell past the bottom edge.
/// Does nothing once the run is over.
pub fn sweep_entities(state: &mut GameState, dt: f32) {
    if state.is_game_over() {
        return;
    }

    let retire_line = state.tuning.retire_line();
    let mut retired = Vec::new();

    for entity in state.pool.iter_active_mut() {
        entity.integrate(dt);
        if entity.pos.y > retire_line {
            retired.push(entity.id);
        }
    }

    for id in retired {
        if state.pool.release(id) {
            log::debug!("Retired {:?}", id);
            state.push_event(GameEvent::Retired { id });
        }
    }
}

/// Demo AI: dodge the closest hazard overhead, otherwise chase food
fn autopilot_input(state: &GameState) -> TickInput {
    let player = &state.player;
    let px = player.pos.x;
    let speed = state.tuning.player_speed;
    let (min_x, max_x) = player.x_bounds(state.tuning.screen_width);

    let threat = state
        .pool
        .iter_active()
        .filter(|e| e.kind == EntityKind::Hazard && e.pos.y < player.pos.y)
        .filter(|e| {
            (e.pos.x - px).abs() < player.half_extents.x + e.half_size + AUTOPILOT_DODGE_MARGIN
        })
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    if let Some(hazard) = threat {
        // Run away from it, unless pinned against a wall
        let mut go_left = hazard.pos.x >= px;
        if go_left && px - speed < min_x {
            go_left = false;
        } else if !go_left && px + speed > max_x {
            go_left = true;
        }
        return TickInput {
            left: go_left,
            right: !go_left,
            autopilot: true,
        };
    }

    let food = state
        .pool
        .iter_active()
        .filter(|e| e.kind == EntityKind::Collectible && e.pos.y < player.pos.y)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    match food {
        Some(food) if (food.pos.x - px).abs() > speed => TickInput {
            left: food.pos.x < px,
            right: food.pos.x > px,
            autopilot: true,
        },
        _ => TickInput {
            autopilot: true,
            ..Default::default()
        },
    }
}
